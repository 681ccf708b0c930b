//! The player character.

use gloam_common::Vec2;

use crate::animation::AnimationTable;
use crate::collaborators::ExperienceSink;
use crate::entity::{CombatCapable, CombatStats, Combatant, Role};

/// Experience needed to advance from `level` to the next one.
#[must_use]
pub const fn level_threshold(level: u32) -> u32 {
    100 * level
}

/// The player character.
#[derive(Debug, Clone)]
pub struct Player {
    combatant: Combatant,
    /// Current level, starting at 1
    pub level: u32,
    /// Experience toward the next level
    pub experience: u32,
    /// Experience earned in total
    pub total_experience: u64,
}

impl Player {
    /// Creates a level 1 player.
    #[must_use]
    pub fn new(stats: CombatStats, animations: AnimationTable, position: Vec2) -> Self {
        Self {
            combatant: Combatant::new(Role::Player, stats)
                .with_animations(animations)
                .with_position(position),
            level: 1,
            experience: 0,
            total_experience: 0,
        }
    }
}

impl CombatCapable for Player {
    fn combatant(&self) -> &Combatant {
        &self.combatant
    }

    fn combatant_mut(&mut self) -> &mut Combatant {
        &mut self.combatant
    }
}

impl ExperienceSink for Player {
    fn add_exp(&mut self, amount: u32) -> u32 {
        self.total_experience += u64::from(amount);
        self.experience = self.experience.saturating_add(amount);

        let mut gained = 0;
        while self.experience >= level_threshold(self.level) {
            self.experience -= level_threshold(self.level);
            self.level += 1;
            gained += 1;
        }
        gained
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_curve() {
        let mut player = Player::new(CombatStats::default(), AnimationTable::default(), Vec2::ZERO);
        assert_eq!(player.add_exp(50), 0);
        assert_eq!(player.add_exp(60), 1);
        assert_eq!(player.level, 2);
        assert_eq!(player.experience, 10);

        // 10 + 500 covers level 2 (200) and level 3 (300)
        assert_eq!(player.add_exp(500), 2);
        assert_eq!(player.level, 4);
        assert_eq!(player.experience, 10);
        assert_eq!(player.total_experience, 610);
    }

    #[test]
    fn test_player_role() {
        let player = Player::new(CombatStats::default(), AnimationTable::default(), Vec2::ONE);
        assert_eq!(player.role(), Role::Player);
        assert_eq!(player.position(), Vec2::ONE);
    }
}
