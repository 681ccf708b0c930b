//! # Gloam Combat
//!
//! Combat resolution and enemy encounters for a top-down action RPG.
//!
//! This crate provides:
//! - Damage math (variation, critical hits, evasion, block mitigation)
//! - Directional hitboxes derived from the attacker's facing
//! - The attack lifecycle, driven by animation milestones
//! - Blocking and input locks
//! - Enemy perception, path-following pursuit and loot drops
//! - RON content definitions for enemies and items
//! - An event bus for UI and audio feedback
//!
//! The engine is single-threaded and tick driven. Animation, pathfinding,
//! line of sight and pickup spawning are supplied by the host through the
//! traits in [`collaborators`].

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(clippy::unwrap_used)]

pub mod animation;
pub mod arena;
pub mod battle;
pub mod block;
pub mod collaborators;
pub mod combat_math;
pub mod config;
pub mod content;
pub mod drops;
pub mod encounter;
pub mod enemy;
pub mod entity;
pub mod events;
pub mod hitbox;
pub mod input_lock;
pub mod perception;
pub mod player;
pub mod pursuit;
pub mod rng;
pub mod timers;

#[cfg(test)]
mod testing;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::animation::*;
    pub use crate::arena::*;
    pub use crate::battle::*;
    pub use crate::block::*;
    pub use crate::collaborators::*;
    pub use crate::combat_math::*;
    pub use crate::config::*;
    pub use crate::content::*;
    pub use crate::drops::*;
    pub use crate::encounter::*;
    pub use crate::enemy::*;
    pub use crate::entity::*;
    pub use crate::events::*;
    pub use crate::hitbox::*;
    pub use crate::input_lock::*;
    pub use crate::perception::*;
    pub use crate::player::*;
    pub use crate::pursuit::*;
    pub use crate::rng::*;
    pub use crate::timers::*;
}

pub use prelude::*;

#[cfg(test)]
mod tests {
    use super::*;
    use gloam_common::Vec2;

    #[test]
    fn test_prelude_exposes_engine() {
        let config = CombatConfig::default();
        let director = EncounterDirector::new(config);
        assert_eq!(director.battle().swing_count(), 0);

        let mut arena = CombatArena::new();
        let id = arena.spawn(Player::new(
            CombatStats::default(),
            AnimationTable::default(),
            Vec2::ZERO,
        ));
        assert_eq!(arena.player_id(), Some(id));
    }
}
