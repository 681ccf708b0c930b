//! Directional attack volumes.
//!
//! A hitbox sits flush against the attacker's hit zone on the side the
//! attacker faces. It has no velocity; it only exists to be overlap-tested
//! while its swing is resolving.

use gloam_common::{Aabb, EntityId};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::animation::Direction;
use crate::config::CombatConfig;
use crate::entity::Combatant;

/// Transient collision volume of one swing.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HitboxVolume {
    /// Entity swinging
    pub owner: EntityId,
    /// World-space bounds
    pub bounds: Aabb,
    /// Side of the owner the box sits on
    pub direction: Direction,
    /// Rotation in degrees (0 right, 90 down, 180 left, -90 up)
    pub rotation_degrees: f32,
}

impl HitboxVolume {
    /// Returns true if the volume overlaps `other`.
    #[must_use]
    pub fn overlaps(&self, other: &Aabb) -> bool {
        self.bounds.overlaps(other)
    }
}

/// Builds the hitbox for `attacker`'s current facing.
///
/// Returns `None` and logs a warning when the facing cannot be resolved from
/// the current animation. The swing continues without a hitbox.
pub fn create_hitbox(attacker: &Combatant, config: &CombatConfig) -> Option<HitboxVolume> {
    let Some(direction) = attacker.facing() else {
        warn!(
            entity = %attacker.id,
            animation = ?attacker.animation.current,
            "cannot resolve facing, swing has no hitbox"
        );
        return None;
    };
    Some(hitbox_for(attacker.id, &attacker.hit_zone(), direction, config))
}

/// Places a hitbox against `zone` on the `direction` side.
#[must_use]
pub fn hitbox_for(
    owner: EntityId,
    zone: &Aabb,
    direction: Direction,
    config: &CombatConfig,
) -> HitboxVolume {
    let length = config.hitbox_length;
    let half_thickness = config.hitbox_thickness / 2.0;
    let center = zone.center();

    let bounds = match direction {
        Direction::Right => Aabb::new(
            zone.max_x,
            center.y - half_thickness,
            zone.max_x + length,
            center.y + half_thickness,
        ),
        Direction::Left => Aabb::new(
            zone.min_x - length,
            center.y - half_thickness,
            zone.min_x,
            center.y + half_thickness,
        ),
        Direction::Down => Aabb::new(
            center.x - half_thickness,
            zone.max_y,
            center.x + half_thickness,
            zone.max_y + length,
        ),
        Direction::Up => Aabb::new(
            center.x - half_thickness,
            zone.min_y - length,
            center.x + half_thickness,
            zone.min_y,
        ),
    };

    HitboxVolume {
        owner,
        bounds,
        direction,
        rotation_degrees: direction.rotation_degrees(),
    }
}
