//! Damage, hit, critical and block mitigation rolls.
//!
//! Everything here is pure: the only input besides the stats is the
//! [`RandomSource`] the caller passes in.
//!
//! Resolution order for one attacker/defender pair:
//! 1. Roll critical. A critical always hits and deals
//!    `ceil(attack * critical_multiplier)`.
//! 2. Otherwise roll hit against the defender's flee. A hit deals the
//!    variated `attack - defense` roll.
//! 3. Otherwise the attack is a miss and deals nothing.
//!
//! Blocking defenders absorb a fraction of non-miss damage.

use serde::{Deserialize, Serialize};

use crate::config::CombatConfig;
use crate::entity::CombatStats;
use crate::rng::RandomSource;

/// Minimum damage of any attack that is not a miss.
pub const MIN_DAMAGE: u32 = 1;

/// How an attack landed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HitKind {
    /// Critical hit, cannot miss.
    Critical,
    /// Regular hit.
    Hit,
    /// The defender evaded.
    Miss,
}

/// Result of resolving one attack against one defender.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttackOutcome {
    /// How the attack landed.
    pub kind: HitKind,
    /// Damage to subtract from the defender's health.
    pub damage: u32,
    /// Whether the defender's block reduced the damage.
    pub blocked: bool,
}

impl AttackOutcome {
    /// A miss with no health change.
    pub const MISS: Self = Self {
        kind: HitKind::Miss,
        damage: 0,
        blocked: false,
    };

    /// Returns true if the attack missed.
    #[must_use]
    pub fn is_miss(&self) -> bool {
        self.kind == HitKind::Miss
    }

    /// Returns true if the attack was a critical hit.
    #[must_use]
    pub fn is_critical(&self) -> bool {
        self.kind == HitKind::Critical
    }
}

/// Rolls variated damage for a regular hit.
///
/// The variation is `variation_percent` of `attack - defense`. It is added
/// when the coin flip (`rng > 0.5`) comes up, subtracted otherwise, so a
/// roll of exactly `0.5` subtracts. The result is floored and never below
/// [`MIN_DAMAGE`].
pub fn roll_damage(
    attack: i32,
    defense: i32,
    variation_percent: f32,
    rng: &mut dyn RandomSource,
) -> u32 {
    let delta = attack.saturating_sub(defense) as f32;
    let variation = delta * variation_percent / 100.0;
    let rolled = if rng.next_f32() > 0.5 {
        delta + variation
    } else {
        delta - variation
    };
    clamp_damage(rolled.floor())
}

/// Rolls whether an attack is critical. `critical_chance` is 0-100.
pub fn roll_is_critical(critical_chance: f32, rng: &mut dyn RandomSource) -> bool {
    rng.next_f32() * 100.0 <= critical_chance
}

/// Rolls whether a non-critical attack hits.
///
/// A defender with zero flee is always hit.
pub fn roll_is_hit(hit: f32, flee: f32, rng: &mut dyn RandomSource) -> bool {
    if flee == 0.0 {
        return true;
    }
    let ratio = hit * 100.0 / flee;
    if !ratio.is_finite() {
        return true;
    }
    rng.next_f32() * 100.0 <= ratio
}

/// Damage dealt by a critical hit.
#[must_use]
pub fn critical_damage(attack: i32, multiplier: f32) -> u32 {
    clamp_damage((attack as f32 * multiplier).ceil())
}

/// Applies block mitigation to a non-miss damage value.
#[must_use]
pub fn mitigate_blocked(damage: u32, reduction: f32) -> u32 {
    let reduced = (damage as f32 * (1.0 - reduction.clamp(0.0, 1.0))).floor();
    clamp_damage(reduced)
}

/// Resolves one attack from `attacker` against `defender`.
pub fn resolve_attack(
    attacker: &CombatStats,
    defender: &CombatStats,
    defender_blocking: bool,
    config: &CombatConfig,
    rng: &mut dyn RandomSource,
) -> AttackOutcome {
    let (kind, damage) = if roll_is_critical(attacker.critical, rng) {
        (
            HitKind::Critical,
            critical_damage(attacker.attack, config.critical_multiplier),
        )
    } else if roll_is_hit(attacker.hit, defender.flee, rng) {
        (
            HitKind::Hit,
            roll_damage(
                attacker.attack,
                defender.defense,
                config.variation_percent,
                rng,
            ),
        )
    } else {
        return AttackOutcome::MISS;
    };

    if defender_blocking {
        AttackOutcome {
            kind,
            damage: mitigate_blocked(damage, config.block_damage_reduction),
            blocked: true,
        }
    } else {
        AttackOutcome {
            kind,
            damage,
            blocked: false,
        }
    }
}

fn clamp_damage(value: f32) -> u32 {
    if value.is_finite() && value >= MIN_DAMAGE as f32 {
        value as u32
    } else {
        MIN_DAMAGE
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::{FixedRandom, SequenceRandom};
    use proptest::prelude::*;

    fn stats(attack: i32, defense: i32, critical: f32, hit: f32, flee: f32) -> CombatStats {
        CombatStats {
            attack,
            defense,
            critical,
            hit,
            flee,
            ..CombatStats::default()
        }
    }

    #[test]
    fn test_roll_damage_at_half_subtracts_variation() {
        // 10 - 4 = 6, 10% variation = 0.6, coin flip at 0.5 subtracts: floor(5.4)
        let damage = roll_damage(10, 4, 10.0, &mut FixedRandom(0.5));
        assert_eq!(damage, 5);
    }

    #[test]
    fn test_roll_damage_above_half_adds_variation() {
        let damage = roll_damage(10, 4, 10.0, &mut FixedRandom(0.75));
        assert_eq!(damage, 6);
    }

    #[test]
    fn test_roll_damage_minimum_one() {
        assert_eq!(roll_damage(3, 10, 10.0, &mut FixedRandom(0.9)), 1);
        assert_eq!(roll_damage(5, 5, 10.0, &mut FixedRandom(0.1)), 1);
    }

    #[test]
    fn test_roll_damage_extreme_stats_saturate() {
        assert_eq!(roll_damage(i32::MIN, i32::MAX, 10.0, &mut FixedRandom(0.9)), 1);
        assert!(roll_damage(i32::MAX, i32::MIN, 10.0, &mut FixedRandom(0.1)) > 1_000_000);
    }

    #[test]
    fn test_full_critical_chance_always_crits() {
        for r in [0.0, 0.25, 0.5, 0.999] {
            assert!(roll_is_critical(100.0, &mut FixedRandom(r)));
        }
    }

    #[test]
    fn test_zero_flee_always_hits() {
        for hit in [0.0, 1.0, 50.0] {
            assert!(roll_is_hit(hit, 0.0, &mut FixedRandom(0.999)));
        }
    }

    #[test]
    fn test_hit_ratio() {
        // hit 5 vs flee 10 => 50% threshold
        assert!(roll_is_hit(5.0, 10.0, &mut FixedRandom(0.4)));
        assert!(!roll_is_hit(5.0, 10.0, &mut FixedRandom(0.6)));
    }

    #[test]
    fn test_critical_damage_rounds_up() {
        assert_eq!(critical_damage(10, 1.5), 15);
        assert_eq!(critical_damage(7, 1.5), 11);
        assert_eq!(critical_damage(0, 1.5), 1);
    }

    #[test]
    fn test_critical_bypasses_flee() {
        let attacker = stats(10, 0, 100.0, 0.0, 0.0);
        let defender = stats(0, 4, 0.0, 0.0, 1000.0);
        let outcome = resolve_attack(
            &attacker,
            &defender,
            false,
            &CombatConfig::default(),
            &mut FixedRandom(0.9),
        );
        assert_eq!(outcome.kind, HitKind::Critical);
        assert_eq!(outcome.damage, 15);
    }

    #[test]
    fn test_miss_deals_nothing() {
        let attacker = stats(10, 0, 0.0, 1.0, 0.0);
        let defender = stats(0, 0, 0.0, 0.0, 100.0);
        // crit roll 90 > 0, hit roll 90 > 1
        let outcome = resolve_attack(
            &attacker,
            &defender,
            false,
            &CombatConfig::default(),
            &mut FixedRandom(0.9),
        );
        assert_eq!(outcome, AttackOutcome::MISS);
    }

    #[test]
    fn test_regular_hit_uses_variated_roll() {
        let attacker = stats(10, 0, 5.0, 10.0, 0.0);
        let defender = stats(0, 4, 0.0, 0.0, 10.0);
        // crit: 60 > 5 no; hit: 20 <= 100 yes; coin: 0.5 subtracts
        let mut rng = SequenceRandom::new(vec![0.6, 0.2, 0.5]);
        let outcome = resolve_attack(
            &attacker,
            &defender,
            false,
            &CombatConfig::default(),
            &mut rng,
        );
        assert_eq!(outcome.kind, HitKind::Hit);
        assert_eq!(outcome.damage, 5);
    }

    #[test]
    fn test_block_mitigation() {
        let attacker = stats(10, 0, 100.0, 0.0, 0.0);
        let defender = stats(0, 0, 0.0, 0.0, 0.0);
        let outcome = resolve_attack(
            &attacker,
            &defender,
            true,
            &CombatConfig::default(),
            &mut FixedRandom(0.0),
        );
        assert!(outcome.blocked);
        // ceil(15) * 0.5 floored
        assert_eq!(outcome.damage, 7);
        assert_eq!(mitigate_blocked(1, 0.9), 1);
    }

    proptest! {
        #[test]
        fn prop_non_miss_damage_is_at_least_one(
            attack in -100i32..200,
            defense in -100i32..200,
            variation in 0.0f32..100.0,
            roll in 0.0f32..1.0,
        ) {
            let damage = roll_damage(attack, defense, variation, &mut FixedRandom(roll));
            prop_assert!(damage >= MIN_DAMAGE);
        }

        #[test]
        fn prop_rolls_are_reproducible(roll in 0.0f32..1.0, chance in 0.0f32..100.0) {
            let a = roll_is_critical(chance, &mut FixedRandom(roll));
            let b = roll_is_critical(chance, &mut FixedRandom(roll));
            prop_assert_eq!(a, b);
        }
    }
}
