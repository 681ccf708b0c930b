//! Combat and encounter tuning.
//!
//! Every constant the engine uses lives here so that content designers can
//! override them from a config file without touching code.

use gloam_common::GloamError;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Multiplier applied to the attacker's base attack on a critical hit.
pub const CRITICAL_MULTIPLIER: f32 = 1.5;

/// Errors raised by [`CombatConfig::validate`].
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    /// A value must be finite and non-negative
    #[error("{field} must be finite and non-negative, got {value}")]
    Negative {
        /// Offending field
        field: &'static str,
        /// Value found
        value: f32,
    },
    /// A value must be inside a closed range
    #[error("{field} must be within [{min}, {max}], got {value}")]
    OutOfRange {
        /// Offending field
        field: &'static str,
        /// Value found
        value: f32,
        /// Lower bound
        min: f32,
        /// Upper bound
        max: f32,
    },
    /// Hitbox dimensions must be strictly positive
    #[error("hitbox dimensions must be positive, got {length}x{thickness}")]
    EmptyHitbox {
        /// Configured length
        length: f32,
        /// Configured thickness
        thickness: f32,
    },
}

impl From<ConfigError> for GloamError {
    fn from(err: ConfigError) -> Self {
        GloamError::Config(err.to_string())
    }
}

/// Tuning parameters for combat resolution, perception and pursuit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CombatConfig {
    // === Damage ===
    /// Symmetric random variation applied to non-critical damage (percent)
    pub variation_percent: f32,
    /// Critical damage multiplier on base attack
    pub critical_multiplier: f32,
    /// Fraction of damage absorbed while blocking (0.0 - 1.0)
    pub block_damage_reduction: f32,

    // === Swing timing ===
    /// How long an enemy hitbox stays alive after its animation completes (ms)
    pub enemy_hitbox_lifetime_ms: f64,
    /// Delay between a killing blow and loot drop + teardown (ms)
    pub death_teardown_delay_ms: f64,

    // === Hitbox geometry ===
    /// Hitbox extent along the facing axis
    pub hitbox_length: f32,
    /// Hitbox extent across the facing axis
    pub hitbox_thickness: f32,

    // === Perception ===
    /// Perception radius used when an enemy definition does not set one
    pub default_perception_range: f32,

    // === Pursuit ===
    /// Minimum time between path re-plans (ms)
    pub path_update_interval_ms: f64,
    /// Distance at which a waypoint counts as reached
    pub waypoint_reached_distance: f32,
    /// Paths with fewer points than this fall back to direct steering
    pub min_path_len: usize,

    // === Loot ===
    /// Maximum offset of a dropped pickup from the death position
    pub drop_scatter: f32,
}

impl Default for CombatConfig {
    fn default() -> Self {
        Self {
            // Damage
            variation_percent: 10.0,
            critical_multiplier: CRITICAL_MULTIPLIER,
            block_damage_reduction: 0.5,

            // Swing timing
            enemy_hitbox_lifetime_ms: 200.0,
            death_teardown_delay_ms: 300.0,

            // Hitbox geometry
            hitbox_length: 24.0,
            hitbox_thickness: 16.0,

            // Perception
            default_perception_range: 100.0,

            // Pursuit
            path_update_interval_ms: 1000.0,
            waypoint_reached_distance: 10.0,
            min_path_len: 2,

            // Loot
            drop_scatter: 12.0,
        }
    }
}

impl CombatConfig {
    /// Checks that every value is usable by the engine.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let non_negative = [
            ("variation_percent", self.variation_percent),
            ("critical_multiplier", self.critical_multiplier),
            ("enemy_hitbox_lifetime_ms", self.enemy_hitbox_lifetime_ms as f32),
            ("death_teardown_delay_ms", self.death_teardown_delay_ms as f32),
            ("default_perception_range", self.default_perception_range),
            ("path_update_interval_ms", self.path_update_interval_ms as f32),
            ("waypoint_reached_distance", self.waypoint_reached_distance),
            ("drop_scatter", self.drop_scatter),
        ];
        for (field, value) in non_negative {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::Negative { field, value });
            }
        }

        if !(0.0..=1.0).contains(&self.block_damage_reduction) {
            return Err(ConfigError::OutOfRange {
                field: "block_damage_reduction",
                value: self.block_damage_reduction,
                min: 0.0,
                max: 1.0,
            });
        }

        if self.hitbox_length <= 0.0 || self.hitbox_thickness <= 0.0 {
            return Err(ConfigError::EmptyHitbox {
                length: self.hitbox_length,
                thickness: self.hitbox_thickness,
            });
        }

        Ok(())
    }
}
