//! Per-tick enemy behaviour.
//!
//! The [`EncounterDirector`] runs perception for every enemy, then either
//! attacks, pursues or idles, and finally advances the [`BattleManager`].

use gloam_common::{EntityId, Vec2};
use serde::Serialize;
use tracing::trace;

use crate::arena::CombatArena;
use crate::battle::BattleManager;
use crate::collaborators::Collaborators;
use crate::config::CombatConfig;
use crate::perception::{perceive, PerceptionVerdict};
use crate::pursuit::PursuitController;

/// Counts of what enemies did during one tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TickSummary {
    /// Enemies in striking distance
    pub engaged: usize,
    /// Enemies chasing the player
    pub pursuing: usize,
    /// Enemies with no target
    pub idle: usize,
    /// Swings started by enemies
    pub swings_started: usize,
}

/// Runs the enemy side of an encounter.
#[derive(Debug)]
pub struct EncounterDirector {
    battle: BattleManager,
    pursuit: PursuitController,
}

impl EncounterDirector {
    /// Creates a director with a fresh battle manager.
    #[must_use]
    pub fn new(config: CombatConfig) -> Self {
        let pursuit = PursuitController::new(&config);
        Self {
            battle: BattleManager::new(config),
            pursuit,
        }
    }

    /// The battle manager.
    pub fn battle(&self) -> &BattleManager {
        &self.battle
    }

    /// The battle manager, mutably. Player input goes through here.
    pub fn battle_mut(&mut self) -> &mut BattleManager {
        &mut self.battle
    }

    /// Advances every enemy and the battle to `now_ms`.
    pub fn tick(
        &mut self,
        now_ms: f64,
        arena: &mut CombatArena,
        collab: &mut Collaborators<'_>,
    ) -> TickSummary {
        let mut summary = TickSummary::default();
        self.pursuit.collect_replies(arena);

        for id in arena.enemy_ids() {
            match perceive(id, arena, collab.line_of_sight) {
                PerceptionVerdict::Engage { position, .. } => {
                    summary.engaged += 1;
                    if self.engage(id, position, arena, collab) {
                        summary.swings_started += 1;
                    }
                },
                PerceptionVerdict::Pursue { position, .. } => {
                    summary.pursuing += 1;
                    if let Some(enemy) = arena.enemy_mut(id) {
                        let mode = self.pursuit.pursue(enemy, position, now_ms, collab);
                        trace!(%id, ?mode, "pursuing");
                    }
                },
                PerceptionVerdict::NoTarget => {
                    summary.idle += 1;
                    if let Some(enemy) = arena.enemy_mut(id) {
                        let (combatant, state) = enemy.parts_mut();
                        combatant.halt(&mut *collab.animation);
                        state.clear();
                    }
                },
            }
        }

        self.battle.tick(now_ms, arena, collab);
        summary
    }

    fn engage(
        &mut self,
        id: EntityId,
        target: Vec2,
        arena: &mut CombatArena,
        collab: &mut Collaborators<'_>,
    ) -> bool {
        let Some(enemy) = arena.enemy_mut(id) else {
            return false;
        };
        let (combatant, state) = enemy.parts_mut();
        combatant.movement.stop();
        state.clear();
        if combatant.is_attacking || !combatant.can_attack() {
            return false;
        }
        combatant.face_toward(target, &mut *collab.animation);

        self.battle.attack(id, arena, &mut *collab.animation).is_ok()
    }
}
