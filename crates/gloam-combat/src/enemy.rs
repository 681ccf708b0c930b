//! Hostile agents built from content definitions.

use gloam_common::Vec2;

use crate::animation::AnimationTable;
use crate::config::CombatConfig;
use crate::content::{ContentRegistry, ContentResult};
use crate::drops::DropTable;
use crate::entity::{CombatCapable, Combatant, Role};
use crate::pursuit::PursuitState;

/// A hostile agent.
#[derive(Debug, Clone)]
pub struct Enemy {
    combatant: Combatant,
    /// Definition the enemy was built from
    pub definition: String,
    /// Radius of the perception scan
    pub perception_range: f32,
    /// Loot rolled on teardown
    pub drops: DropTable,
    /// Path-following state
    pub pursuit: PursuitState,
}

impl Enemy {
    /// Builds an enemy from the definition `id`.
    ///
    /// `clip_exists` is asked which clips of the definition's texture are
    /// loaded. Fails fast when the definition is unknown.
    pub fn from_definition(
        registry: &ContentRegistry,
        id: &str,
        position: Vec2,
        config: &CombatConfig,
        clip_exists: impl Fn(&str) -> bool,
    ) -> ContentResult<Self> {
        let def = registry.enemy(id)?;
        let combatant = Combatant::new(Role::Enemy, def.stats)
            .with_position(position)
            .with_body(def.body_half_extents())
            .with_hit_zone(def.hit_zone_half_extents(), Vec2::ZERO)
            .with_animations(AnimationTable::build(&def.texture, clip_exists));

        Ok(Self {
            combatant,
            definition: def.id.clone(),
            perception_range: def
                .perception_range
                .unwrap_or(config.default_perception_range),
            drops: def.drop_table(),
            pursuit: PursuitState::new(config),
        })
    }

    /// Creates an enemy directly from a combatant.
    #[must_use]
    pub fn from_combatant(combatant: Combatant, perception_range: f32, config: &CombatConfig) -> Self {
        Self {
            combatant,
            definition: String::new(),
            perception_range,
            drops: DropTable::default(),
            pursuit: PursuitState::new(config),
        }
    }

    /// Combat state and pursuit state, borrowed together.
    pub fn parts_mut(&mut self) -> (&mut Combatant, &mut PursuitState) {
        (&mut self.combatant, &mut self.pursuit)
    }

    /// Sets the drop table.
    #[must_use]
    pub fn with_drops(mut self, drops: DropTable) -> Self {
        self.drops = drops;
        self
    }
}

impl CombatCapable for Enemy {
    fn combatant(&self) -> &Combatant {
        &self.combatant
    }

    fn combatant_mut(&mut self) -> &mut Combatant {
        &mut self.combatant
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::animation::{AnimationAction, AnimationKey, Direction};
    use crate::content::ContentError;

    const CONTENT: &str = r#"(
        items: [(id: (3), name: "Fang")],
        enemies: [
            (id: "wolf", texture: "wolf", stats: (attack: 6, health: 20, max_health: 20),
             drops: [(item: (3), chance: 40.0)]),
            (id: "bat", texture: "bat", perception_range: Some(150.0)),
        ],
    )"#;

    #[test]
    fn test_from_definition() {
        let registry = ContentRegistry::from_ron(CONTENT).expect("content");
        let config = CombatConfig::default();
        let wolf = Enemy::from_definition(
            &registry,
            "wolf",
            Vec2::new(10.0, 20.0),
            &config,
            |name| name == "wolf-attack-right",
        )
        .expect("wolf");

        assert_eq!(wolf.role(), Role::Enemy);
        assert_eq!(wolf.combatant().stats.attack, 6);
        assert_eq!(wolf.perception_range, config.default_perception_range);
        assert_eq!(wolf.drops.entries.len(), 1);
        assert!(wolf
            .combatant()
            .animations
            .get(AnimationKey::new(AnimationAction::Attack, Direction::Left))
            .is_some_and(|clip| clip.flip_x));

        let bat = Enemy::from_definition(&registry, "bat", Vec2::ZERO, &config, |_| false)
            .expect("bat");
        assert_eq!(bat.perception_range, 150.0);
    }

    #[test]
    fn test_unknown_definition_fails_fast() {
        let registry = ContentRegistry::from_ron(CONTENT).expect("content");
        let result = Enemy::from_definition(
            &registry,
            "dragon",
            Vec2::ZERO,
            &CombatConfig::default(),
            |_| true,
        );
        assert!(matches!(result, Err(ContentError::UnknownEnemy(id)) if id == "dragon"));
    }
}
