//! Run summary printed as JSON.

use gloam_combat::{CombatEvent, HitKind};
use gloam_common::{EntityId, ItemTypeId};
use serde::Serialize;

/// How a run ended.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    /// Every enemy was torn down
    Victory,
    /// The player died
    Defeat,
    /// Time ran out
    #[default]
    Timeout,
}

/// A pickup that was spawned.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LootRecord {
    /// Item
    pub item: ItemTypeId,
    /// Spawn position
    pub position: [f32; 2],
}

/// Tally of everything that happened in a run.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SimReport {
    /// How the run ended
    pub outcome: Outcome,
    /// Ticks simulated
    pub ticks: u64,
    /// Simulated time (ms)
    pub elapsed_ms: f64,

    /// Swings started by the player
    pub player_swings: u32,
    /// Swings started by enemies
    pub enemy_swings: u32,
    /// Non-critical hits landed by anyone
    pub hits: u32,
    /// Critical hits landed by anyone
    pub criticals: u32,
    /// Attacks evaded
    pub misses: u32,
    /// Hits taken behind a shield
    pub blocked_hits: u32,
    /// Damage the player dealt
    pub damage_dealt: u64,
    /// Damage the player took
    pub damage_taken: u64,

    /// Enemies brought to zero health
    pub enemies_defeated: u32,
    /// Experience earned by the player
    pub experience_earned: u64,
    /// Level-ups during the run
    pub levels_gained: u32,
    /// Pickups spawned
    pub loot: Vec<LootRecord>,

    /// Player health at the end
    pub player_health: i32,
    /// Player level at the end
    pub player_level: u32,
    /// Path searches served
    pub path_requests: usize,
}

impl SimReport {
    /// Folds one engine event into the tally.
    pub fn record(&mut self, event: &CombatEvent, player: Option<EntityId>) {
        let is_player = |id: &EntityId| player == Some(*id);

        match event {
            CombatEvent::SwingStarted { attacker, .. } => {
                if is_player(attacker) {
                    self.player_swings += 1;
                } else {
                    self.enemy_swings += 1;
                }
            },
            CombatEvent::DamageApplied {
                attacker,
                target,
                damage,
                kind,
                blocked,
            } => {
                match kind {
                    HitKind::Critical => self.criticals += 1,
                    HitKind::Hit => self.hits += 1,
                    HitKind::Miss => {},
                }
                if *blocked {
                    self.blocked_hits += 1;
                }
                if is_player(attacker) {
                    self.damage_dealt += u64::from(*damage);
                }
                if is_player(target) {
                    self.damage_taken += u64::from(*damage);
                }
            },
            CombatEvent::AttackMissed { .. } => self.misses += 1,
            CombatEvent::EntityDefeated { entity, .. } => {
                if !is_player(entity) {
                    self.enemies_defeated += 1;
                }
            },
            CombatEvent::ExperienceAwarded {
                amount,
                levels_gained,
                ..
            } => {
                self.experience_earned += u64::from(*amount);
                self.levels_gained += levels_gained;
            },
            CombatEvent::LootDropped { item, position, .. } => {
                self.loot.push(LootRecord {
                    item: *item,
                    position: position.to_array(),
                });
            },
            _ => {},
        }
    }
}
