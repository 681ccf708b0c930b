//! Combat participants.
//!
//! [`Combatant`] carries everything the engine reads or writes on an entity
//! that can fight: stats, flags, input locks, animation state and spatial
//! volumes. [`Player`](crate::player::Player) and
//! [`Enemy`](crate::enemy::Enemy) embed one and expose it through
//! [`CombatCapable`].

use gloam_common::{Aabb, EntityId, Vec2};
use serde::{Deserialize, Serialize};

use crate::animation::{AnimationAction, AnimationKey, AnimationState, AnimationTable, Direction};
use crate::battle::SwingId;
use crate::collaborators::AnimationPlayer;
use crate::input_lock::InputLocks;

/// Which side an entity fights on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    /// The player character
    Player,
    /// A hostile agent
    Enemy,
}

impl Role {
    /// The role this one attacks.
    #[must_use]
    pub const fn opposing(self) -> Self {
        match self {
            Self::Player => Self::Enemy,
            Self::Enemy => Self::Player,
        }
    }
}

// ============================================================================
// Stats
// ============================================================================

/// Stat snapshot used by combat resolution.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CombatStats {
    /// Base attack
    pub attack: i32,
    /// Base defense
    pub defense: i32,
    /// Critical chance (0-100)
    pub critical: f32,
    /// Evasion
    pub flee: f32,
    /// Accuracy
    pub hit: f32,
    /// Current health
    pub health: i32,
    /// Maximum health
    pub max_health: i32,
    /// Movement speed (units per second)
    pub speed: f32,
    /// Experience granted to the player on defeat
    pub experience_reward: u32,
}

impl Default for CombatStats {
    fn default() -> Self {
        Self {
            attack: 1,
            defense: 0,
            critical: 0.0,
            flee: 0.0,
            hit: 1.0,
            health: 10,
            max_health: 10,
            speed: 60.0,
            experience_reward: 0,
        }
    }
}

impl CombatStats {
    /// Subtracts damage from health, clamping at zero. Returns the new health.
    pub fn apply_damage(&mut self, amount: u32) -> i32 {
        let amount = i32::try_from(amount).unwrap_or(i32::MAX);
        self.health = self.health.saturating_sub(amount).max(0);
        self.health
    }

    /// Returns true while health is above zero.
    #[must_use]
    pub fn is_alive(&self) -> bool {
        self.health > 0
    }
}

// ============================================================================
// Movement
// ============================================================================

/// Movement gating written by combat and AI. Velocity integration happens
/// elsewhere.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Movement {
    /// Requested velocity
    pub velocity: Vec2,
    /// Current speed cap
    pub max_speed: f32,
    /// Whether footstep dust is emitted while moving
    pub dust_emitting: bool,
}

impl Movement {
    /// Creates movement with the given speed cap.
    #[must_use]
    pub fn new(max_speed: f32) -> Self {
        Self {
            velocity: Vec2::ZERO,
            max_speed,
            dust_emitting: true,
        }
    }

    /// Zeroes velocity.
    pub fn stop(&mut self) {
        self.velocity = Vec2::ZERO;
    }

    /// Zeroes velocity and speed cap and silences dust.
    pub fn freeze(&mut self) {
        self.velocity = Vec2::ZERO;
        self.max_speed = 0.0;
        self.dust_emitting = false;
    }

    /// Returns true if the entity is currently requesting movement.
    #[must_use]
    pub fn is_moving(&self) -> bool {
        self.velocity != Vec2::ZERO
    }
}

// ============================================================================
// Combatant
// ============================================================================

/// State shared by every entity that can attack, defend and move.
#[derive(Debug, Clone)]
pub struct Combatant {
    /// Stable identity
    pub id: EntityId,
    /// Side
    pub role: Role,
    /// Stats
    pub stats: CombatStats,
    /// Input locks; `can_move`/`can_attack` are derived from these
    pub locks: InputLocks,
    /// A swing is in progress
    pub is_attacking: bool,
    /// Guarding stance is up
    pub is_blocking: bool,
    /// Whether the entity may guard at all
    pub can_block: bool,
    /// Entity is in water; swimming entities cannot attack
    pub is_swimming: bool,
    /// Debug drawing of hitboxes
    pub show_hit_box: bool,
    /// Block tint is applied
    pub block_tint: bool,
    /// Entity takes part in the simulation
    pub active: bool,
    /// Killing blow landed, teardown pending
    pub dying: bool,
    /// Swing that currently holds this entity's damage lock
    damage_lock: Option<SwingId>,
    /// World position (center)
    pub position: Vec2,
    /// Half extents of the movement collider
    pub body_half_extents: Vec2,
    /// Half extents of the hit zone
    pub hit_zone_half_extents: Vec2,
    /// Offset of the hit zone center from `position`
    pub hit_zone_offset: Vec2,
    /// Movement gating
    pub movement: Movement,
    /// Resolved clips
    pub animations: AnimationTable,
    /// Currently playing clip
    pub animation: AnimationState,
}

impl Combatant {
    /// Creates a combatant at the origin with default volumes.
    #[must_use]
    pub fn new(role: Role, stats: CombatStats) -> Self {
        Self {
            id: EntityId::new(),
            role,
            stats,
            locks: InputLocks::new(),
            is_attacking: false,
            is_blocking: false,
            can_block: true,
            is_swimming: false,
            show_hit_box: false,
            block_tint: false,
            active: true,
            dying: false,
            damage_lock: None,
            position: Vec2::ZERO,
            body_half_extents: Vec2::new(8.0, 8.0),
            hit_zone_half_extents: Vec2::new(6.0, 6.0),
            hit_zone_offset: Vec2::ZERO,
            movement: Movement::new(stats.speed),
            animations: AnimationTable::default(),
            animation: AnimationState::default(),
        }
    }

    /// Sets the world position.
    #[must_use]
    pub fn with_position(mut self, position: Vec2) -> Self {
        self.position = position;
        self
    }

    /// Sets the movement collider half extents.
    #[must_use]
    pub fn with_body(mut self, half_extents: Vec2) -> Self {
        self.body_half_extents = half_extents;
        self
    }

    /// Sets the hit zone half extents and offset.
    #[must_use]
    pub fn with_hit_zone(mut self, half_extents: Vec2, offset: Vec2) -> Self {
        self.hit_zone_half_extents = half_extents;
        self.hit_zone_offset = offset;
        self
    }

    /// Sets the animation table.
    #[must_use]
    pub fn with_animations(mut self, animations: AnimationTable) -> Self {
        self.animations = animations;
        self
    }

    /// Movement is allowed by every held lock.
    #[must_use]
    pub fn can_move(&self) -> bool {
        self.locks.can_move()
    }

    /// Attacking is allowed by every held lock.
    #[must_use]
    pub fn can_attack(&self) -> bool {
        self.locks.can_attack()
    }

    /// No swing currently holds the damage lock.
    #[must_use]
    pub fn can_take_damage(&self) -> bool {
        self.damage_lock.is_none()
    }

    /// Swing holding the damage lock, if any.
    #[must_use]
    pub fn damage_lock(&self) -> Option<SwingId> {
        self.damage_lock
    }

    /// Takes the damage lock for `swing`. Fails if another swing holds it.
    pub fn lock_damage(&mut self, swing: SwingId) -> bool {
        match self.damage_lock {
            None => {
                self.damage_lock = Some(swing);
                true
            },
            Some(owner) => owner == swing,
        }
    }

    /// Releases the damage lock if `swing` holds it.
    pub fn release_damage(&mut self, swing: SwingId) -> bool {
        if self.damage_lock == Some(swing) {
            self.damage_lock = None;
            true
        } else {
            false
        }
    }

    /// Movement collider in world space.
    #[must_use]
    pub fn body(&self) -> Aabb {
        Aabb::from_center(
            self.position,
            self.body_half_extents.x,
            self.body_half_extents.y,
        )
    }

    /// Hit zone in world space.
    #[must_use]
    pub fn hit_zone(&self) -> Aabb {
        Aabb::from_center(
            self.position + self.hit_zone_offset,
            self.hit_zone_half_extents.x,
            self.hit_zone_half_extents.y,
        )
    }

    /// Facing derived from the current animation.
    #[must_use]
    pub fn facing(&self) -> Option<Direction> {
        self.animation.facing()
    }

    /// Plays the clip for `action`, preferring `direction`.
    ///
    /// Does nothing if the same clip is already playing. Returns the key that
    /// is playing afterwards, or `None` when no clip exists for the action.
    pub fn play(
        &mut self,
        action: AnimationAction,
        direction: Option<Direction>,
        animator: &mut dyn AnimationPlayer,
    ) -> Option<AnimationKey> {
        self.start_clip(action, direction, animator, false)
    }

    /// Plays the clip for `action` from its first frame, even if it is
    /// already playing.
    pub fn restart(
        &mut self,
        action: AnimationAction,
        direction: Option<Direction>,
        animator: &mut dyn AnimationPlayer,
    ) -> Option<AnimationKey> {
        self.start_clip(action, direction, animator, true)
    }

    fn start_clip(
        &mut self,
        action: AnimationAction,
        direction: Option<Direction>,
        animator: &mut dyn AnimationPlayer,
        force: bool,
    ) -> Option<AnimationKey> {
        let (key, clip) = self.animations.resolve(action, direction)?;
        let flip_before = self.animation.flip_x;
        let same_clip = self.animation.current == Some(key);
        self.animation.set_playing(key, clip, direction);
        if force || !same_clip || flip_before != self.animation.flip_x {
            animator.play(self.id, key, clip, self.animation.flip_x);
        }
        Some(key)
    }

    /// Steers toward `target` at the current speed cap. Locked entities stop.
    ///
    /// Returns the direction walked, if any.
    pub fn steer_toward(
        &mut self,
        target: Vec2,
        animator: &mut dyn AnimationPlayer,
    ) -> Option<Direction> {
        if !self.can_move() || self.is_attacking {
            self.movement.stop();
            return None;
        }
        let angle = gloam_common::angle_between(self.position, target);
        let heading = Vec2::new(angle.cos(), angle.sin());
        self.movement.velocity = heading * self.movement.max_speed;
        let direction = Direction::from_vector(heading);
        if direction.is_some() {
            self.play(AnimationAction::Walk, direction, animator);
        }
        direction
    }

    /// Turns toward `point` without moving.
    ///
    /// Sheets without a matching idle clip keep the heading and are mirrored
    /// for horizontal turns.
    pub fn face_toward(&mut self, point: Vec2, animator: &mut dyn AnimationPlayer) {
        let Some(direction) = Direction::from_vector(point - self.position) else {
            return;
        };
        if self.play(AnimationAction::Idle, Some(direction), animator).is_none() {
            self.animation.heading = Some(direction);
            if direction.is_horizontal() {
                self.animation.flip_x = direction == Direction::Left;
            }
        }
    }

    /// Clears velocity and returns to the idle clip.
    pub fn halt(&mut self, animator: &mut dyn AnimationPlayer) {
        self.movement.stop();
        if !self.is_attacking {
            let facing = self.facing();
            self.play(AnimationAction::Idle, facing, animator);
        }
    }
}

/// Capability set of every entity that takes part in combat.
pub trait CombatCapable {
    /// Shared combat state.
    fn combatant(&self) -> &Combatant;

    /// Shared combat state, mutably.
    fn combatant_mut(&mut self) -> &mut Combatant;

    /// Entity id.
    fn id(&self) -> EntityId {
        self.combatant().id
    }

    /// Side.
    fn role(&self) -> Role {
        self.combatant().role
    }

    /// World position.
    fn position(&self) -> Vec2 {
        self.combatant().position
    }

    /// Current health.
    fn health(&self) -> i32 {
        self.combatant().stats.health
    }

    /// A swing is in progress.
    fn is_attacking(&self) -> bool {
        self.combatant().is_attacking
    }

    /// Guarding stance is up.
    fn is_blocking(&self) -> bool {
        self.combatant().is_blocking
    }

    /// Movement allowed.
    fn can_move(&self) -> bool {
        self.combatant().can_move()
    }

    /// Attacking allowed.
    fn can_attack(&self) -> bool {
        self.combatant().can_attack()
    }

    /// Damage lock is free.
    fn can_take_damage(&self) -> bool {
        self.combatant().can_take_damage()
    }
}

impl CombatCapable for Combatant {
    fn combatant(&self) -> &Combatant {
        self
    }

    fn combatant_mut(&mut self) -> &mut Combatant {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input_lock::LockReason;
    use crate::testing::RecordingAnimator;
    use proptest::prelude::*;

    #[test]
    fn test_new_combatant_is_permissive() {
        let c = Combatant::new(Role::Player, CombatStats::default());
        assert!(c.can_move());
        assert!(c.can_attack());
        assert!(c.can_take_damage());
        assert!(!c.is_attacking);
        assert!(!c.is_blocking);
        assert!(c.can_block);
    }

    #[test]
    fn test_health_clamps_at_zero() {
        let mut stats = CombatStats {
            health: 5,
            ..CombatStats::default()
        };
        assert_eq!(stats.apply_damage(10), 0);
        assert_eq!(stats.health, 0);
        assert!(!stats.is_alive());
    }

    #[test]
    fn test_damage_lock_owned_by_one_swing() {
        let mut c = Combatant::new(Role::Enemy, CombatStats::default());
        let first = SwingId::from_raw(1);
        let second = SwingId::from_raw(2);

        assert!(c.lock_damage(first));
        assert!(!c.lock_damage(second));
        assert!(!c.release_damage(second));
        assert!(!c.can_take_damage());
        assert!(c.release_damage(first));
        assert!(c.can_take_damage());
    }

    #[test]
    fn test_hit_zone_offset() {
        let c = Combatant::new(Role::Player, CombatStats::default())
            .with_position(Vec2::new(100.0, 50.0))
            .with_hit_zone(Vec2::new(4.0, 4.0), Vec2::new(0.0, 2.0));
        let zone = c.hit_zone();
        assert_eq!(zone.center(), Vec2::new(100.0, 52.0));
        assert_eq!(zone.width(), 8.0);
    }

    #[test]
    fn test_steer_respects_locks() {
        let mut animator = RecordingAnimator::with_clips(&["hero-walk-right"]);
        let mut c = Combatant::new(Role::Player, CombatStats::default())
            .with_animations(animator.table("hero"));

        c.locks.push(LockReason::Dialog);
        assert_eq!(c.steer_toward(Vec2::new(10.0, 0.0), &mut animator), None);
        assert!(!c.movement.is_moving());

        c.locks.pop(LockReason::Dialog);
        assert_eq!(
            c.steer_toward(Vec2::new(10.0, 0.0), &mut animator),
            Some(Direction::Right)
        );
        assert!(c.movement.velocity.x > 0.0);
        assert_eq!(animator.plays.len(), 1);
    }

    #[test]
    fn test_play_does_not_restart_same_clip() {
        let mut animator = RecordingAnimator::with_clips(&["hero-walk-down"]);
        let mut c = Combatant::new(Role::Player, CombatStats::default())
            .with_animations(animator.table("hero"));
        c.play(AnimationAction::Walk, Some(Direction::Down), &mut animator);
        c.play(AnimationAction::Walk, Some(Direction::Down), &mut animator);
        assert_eq!(animator.plays.len(), 1);
    }

    proptest! {
        #[test]
        fn prop_health_is_monotonic_and_non_negative(
            start in 0i32..500,
            hits in proptest::collection::vec(0u32..200, 0..20),
        ) {
            let mut stats = CombatStats { health: start, max_health: start, ..CombatStats::default() };
            let mut previous = stats.health;
            for amount in hits {
                let now = stats.apply_damage(amount);
                prop_assert!(now <= previous);
                prop_assert!(now >= 0);
                previous = now;
            }
        }
    }
}
