//! Per-enemy target detection.

use gloam_common::{Circle, EntityId, Vec2};
use tracing::trace;

use crate::arena::{Actor, CombatArena};
use crate::collaborators::LineOfSight;
use crate::entity::{CombatCapable, Role};

/// What an enemy should do about the player this tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PerceptionVerdict {
    /// Nobody visible in range.
    NoTarget,
    /// Player visible and within striking distance.
    Engage {
        /// Player id
        target: EntityId,
        /// Player position
        position: Vec2,
    },
    /// Player visible but out of reach.
    Pursue {
        /// Player id
        target: EntityId,
        /// Player position
        position: Vec2,
    },
}

/// Scans around `enemy` for a visible player.
///
/// Without a line-of-sight service every player in range counts as
/// visible. The player is within striking distance when the enemy's body
/// overlaps the player's hit zone.
pub fn perceive(
    enemy: EntityId,
    arena: &CombatArena,
    line_of_sight: Option<&dyn LineOfSight>,
) -> PerceptionVerdict {
    let Some(agent) = arena.get(enemy).and_then(Actor::as_enemy) else {
        return PerceptionVerdict::NoTarget;
    };
    let me = agent.combatant();
    if !me.active || me.dying {
        return PerceptionVerdict::NoTarget;
    }

    let scan = Circle::new(me.position, agent.perception_range);
    for candidate in arena.bodies_in_radius(&scan) {
        let Some(other) = arena.combatant(candidate) else {
            continue;
        };
        if other.role != Role::Player || other.dying {
            continue;
        }

        let visible = line_of_sight.map_or(true, |los| los.is_visible(me.position, other.position));
        if !visible {
            trace!(%enemy, target = %candidate, "target hidden");
            continue;
        }

        return if me.body().overlaps(&other.hit_zone()) {
            PerceptionVerdict::Engage {
                target: candidate,
                position: other.position,
            }
        } else {
            PerceptionVerdict::Pursue {
                target: candidate,
                position: other.position,
            }
        };
    }

    PerceptionVerdict::NoTarget
}
