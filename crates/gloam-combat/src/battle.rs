//! Attack lifecycle.
//!
//! [`BattleManager`] owns every swing in flight. A swing moves through
//! [`SwingPhase`]s driven by animation milestones that the animation player
//! sends to [`BattleManager::animation_events`]; milestones are consumed at
//! the start of [`BattleManager::tick`], so it does not matter whether the
//! player reports them before or after `play` returns.
//!
//! Player swings arm their hitbox when the attack clip starts and retire it
//! when the clip completes. Enemy swings arm when the clip completes and
//! retire after `enemy_hitbox_lifetime_ms`.
//!
//! Each tick, a live hitbox damages every overlapping opponent whose damage
//! lock is free, then takes that lock on behalf of the swing. Locks are
//! released when the swing ends, which bounds damage to one application per
//! victim per swing.

use std::fmt;

use ahash::{AHashMap, AHashSet};
use crossbeam_channel::{unbounded, Receiver, Sender};
use gloam_common::{Aabb, EntityId};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, trace, warn};

use crate::animation::{AnimationAction, AnimationEvent, AnimationEventKind, AnimationKey, Direction};
use crate::arena::{Actor, CombatArena};
use crate::block::{begin_block, end_block};
use crate::collaborators::{AnimationPlayer, Collaborators, ExperienceSink, PickupSpawner};
use crate::combat_math::{resolve_attack, AttackOutcome};
use crate::config::CombatConfig;
use crate::entity::{CombatCapable, Combatant, Role};
use crate::events::{CombatEvent, EventBus, Feedback};
use crate::hitbox::{create_hitbox, HitboxVolume};
use crate::input_lock::LockReason;
use crate::rng::RandomSource;
use crate::timers::TimerQueue;

// ============================================================================
// Swing
// ============================================================================

/// Identifier of one swing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SwingId(u64);

impl SwingId {
    /// Creates a swing id from a raw value.
    #[must_use]
    pub const fn from_raw(value: u64) -> Self {
        Self(value)
    }

    /// Returns the raw value.
    #[must_use]
    pub const fn raw(self) -> u64 {
        self.0
    }
}

impl fmt::Display for SwingId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "swing:{}", self.0)
    }
}

/// Where a swing is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SwingPhase {
    /// Attack clip playing, no hitbox yet.
    Winding,
    /// Hitbox live and overlap-tested every tick.
    Resolving,
    /// No hitbox, waiting for the clip to finish.
    Recovering,
}

/// One attack in flight.
#[derive(Debug, Clone)]
pub struct AttackSwing {
    /// Swing id
    pub id: SwingId,
    /// Attacking entity
    pub attacker: EntityId,
    /// Side of the attacker
    pub role: Role,
    /// Lifecycle phase
    pub phase: SwingPhase,
    /// Attack clip that drives the swing
    pub animation: AnimationKey,
    /// Facing at swing start
    pub direction: Option<Direction>,
    /// Live hitbox
    pub hitbox: Option<HitboxVolume>,
    /// Victims already damaged
    pub already_hit: AHashSet<EntityId>,
    /// Enemy swings retire their hitbox at this time
    pub hitbox_expires_at_ms: Option<f64>,
    restore_max_speed: f32,
    restore_dust: bool,
}

/// Why `attack` did not start a swing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SwingRejection {
    /// No such entity
    #[error("attacker does not exist")]
    UnknownAttacker,
    /// Entity is inactive or dying
    #[error("attacker is inactive")]
    Inactive,
    /// A swing is already in flight
    #[error("attacker is already swinging")]
    AlreadySwinging,
    /// An input lock suspends attacking or movement
    #[error("attacker input is locked")]
    Locked,
    /// Guard is up
    #[error("attacker is blocking")]
    Blocking,
    /// Entity is in water
    #[error("attacker is swimming")]
    Swimming,
    /// No attack clip for the current facing
    #[error("attacker has no attack animation")]
    NoAttackClip,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum PendingAction {
    Teardown(EntityId),
}

// ============================================================================
// Battle Manager
// ============================================================================

/// Orchestrates swings, damage, blocking and death.
#[derive(Debug)]
pub struct BattleManager {
    config: CombatConfig,
    swings: AHashMap<EntityId, AttackSwing>,
    next_swing: u64,
    animation_tx: Sender<AnimationEvent>,
    animation_rx: Receiver<AnimationEvent>,
    events: EventBus,
    timers: TimerQueue<PendingAction>,
    now_ms: f64,
}

impl BattleManager {
    /// Creates a manager with the given tuning.
    #[must_use]
    pub fn new(config: CombatConfig) -> Self {
        let (animation_tx, animation_rx) = unbounded();
        Self {
            config,
            swings: AHashMap::new(),
            next_swing: 1,
            animation_tx,
            animation_rx,
            events: EventBus::default(),
            timers: TimerQueue::new(),
            now_ms: 0.0,
        }
    }

    /// Tuning in use.
    #[must_use]
    pub fn config(&self) -> &CombatConfig {
        &self.config
    }

    /// Published combat events.
    #[must_use]
    pub fn events(&self) -> &EventBus {
        &self.events
    }

    /// Sender the animation player reports milestones to.
    #[must_use]
    pub fn animation_events(&self) -> Sender<AnimationEvent> {
        self.animation_tx.clone()
    }

    /// Swing currently in flight for `attacker`.
    #[must_use]
    pub fn swing(&self, attacker: EntityId) -> Option<&AttackSwing> {
        self.swings.get(&attacker)
    }

    /// Number of swings in flight.
    #[must_use]
    pub fn swing_count(&self) -> usize {
        self.swings.len()
    }

    /// Time of the last tick (ms).
    #[must_use]
    pub fn now_ms(&self) -> f64 {
        self.now_ms
    }

    /// Returns true if `entity` is waiting to be torn down.
    #[must_use]
    pub fn teardown_pending(&self, entity: EntityId) -> bool {
        self.timers
            .any(|action| *action == PendingAction::Teardown(entity))
    }

    // ------------------------------------------------------------------------
    // Entry points
    // ------------------------------------------------------------------------

    /// Starts a swing for `attacker`.
    ///
    /// Rejections are normal control flow: the caller may simply ignore
    /// them.
    pub fn attack(
        &mut self,
        attacker: EntityId,
        arena: &mut CombatArena,
        animator: &mut dyn AnimationPlayer,
    ) -> Result<SwingId, SwingRejection> {
        let Some(c) = arena.combatant_mut(attacker) else {
            return Err(SwingRejection::UnknownAttacker);
        };
        if let Err(reason) = attack_guard(c) {
            trace!(entity = %attacker, %reason, "attack rejected");
            return Err(reason);
        }
        if self.swings.contains_key(&attacker) {
            return Err(SwingRejection::AlreadySwinging);
        }

        let facing = c.facing();
        let Some(animation) = c.restart(AnimationAction::Attack, facing, animator) else {
            warn!(
                entity = %attacker,
                texture = c.animations.texture(),
                ?facing,
                "no attack animation"
            );
            return Err(SwingRejection::NoAttackClip);
        };

        let restore_max_speed = c.movement.max_speed;
        let restore_dust = c.movement.dust_emitting;
        c.is_attacking = true;
        c.locks.push(LockReason::Swing);
        c.movement.freeze();

        let id = SwingId(self.next_swing);
        self.next_swing += 1;
        let swing = AttackSwing {
            id,
            attacker,
            role: c.role,
            phase: SwingPhase::Winding,
            animation,
            direction: c.facing(),
            hitbox: None,
            already_hit: AHashSet::new(),
            hitbox_expires_at_ms: None,
            restore_max_speed,
            restore_dust,
        };
        debug!(%id, entity = %attacker, role = ?swing.role, direction = ?swing.direction, "swing started");
        self.swings.insert(attacker, swing);
        self.events
            .publish(CombatEvent::SwingStarted { swing: id, attacker });
        Ok(id)
    }

    /// Raises `defender`'s guard. Returns false if rejected.
    pub fn block(&mut self, defender: EntityId, arena: &mut CombatArena) -> bool {
        let Some(c) = arena.combatant_mut(defender) else {
            return false;
        };
        if !begin_block(c) {
            return false;
        }
        self.events
            .publish(CombatEvent::BlockStarted { entity: defender });
        true
    }

    /// Lowers `defender`'s guard. Returns false if it was not raised.
    ///
    /// Only the block lock is released; input stays suspended while any
    /// other system holds a lock.
    pub fn stop_block(&mut self, defender: EntityId, arena: &mut CombatArena) -> bool {
        let Some(c) = arena.combatant_mut(defender) else {
            return false;
        };
        if !end_block(c) {
            return false;
        }
        self.events
            .publish(CombatEvent::BlockEnded { entity: defender });
        true
    }

    /// Resolves one attack of `attacker` against `target` and applies it.
    ///
    /// Returns `None` if either entity is missing or the target is already
    /// dying.
    pub fn take_damage(
        &mut self,
        attacker: EntityId,
        target: EntityId,
        arena: &mut CombatArena,
        rng: &mut dyn RandomSource,
    ) -> Option<AttackOutcome> {
        let (attacker_stats, attacker_role) = arena
            .combatant(attacker)
            .map(|c| (c.stats, c.role))?;

        let (outcome, defeated) = {
            let victim = arena.combatant_mut(target)?;
            if victim.dying {
                return None;
            }
            let outcome = resolve_attack(
                &attacker_stats,
                &victim.stats,
                victim.is_blocking,
                &self.config,
                rng,
            );
            if outcome.is_miss() {
                self.events
                    .publish(CombatEvent::AttackMissed { attacker, target });
                self.events.publish(CombatEvent::FloatingText {
                    entity: target,
                    text: "MISS".to_string(),
                });
                return Some(outcome);
            }

            let health = victim.stats.apply_damage(outcome.damage);
            self.publish_damage(attacker, victim, outcome);

            let defeated = health <= 0;
            if defeated {
                victim.dying = true;
                victim.movement.stop();
            }
            (outcome, defeated.then_some(victim.stats.experience_reward))
        };

        if let Some(reward) = defeated {
            info!(entity = %target, by = %attacker, "defeated");
            self.events.publish(CombatEvent::EntityDefeated {
                entity: target,
                by: attacker,
            });
            if attacker_role == Role::Player {
                self.award_experience(attacker, reward, arena);
            }
            self.timers.schedule(
                self.now_ms + self.config.death_teardown_delay_ms,
                PendingAction::Teardown(target),
            );
        }

        Some(outcome)
    }

    // ------------------------------------------------------------------------
    // Tick
    // ------------------------------------------------------------------------

    /// Advances every swing and timer to `now_ms`.
    ///
    /// Order: animation milestones, cancellation of swings whose attacker is
    /// gone, enemy hitbox expiry, overlap resolution, due timers.
    pub fn tick(&mut self, now_ms: f64, arena: &mut CombatArena, collab: &mut Collaborators<'_>) {
        self.now_ms = now_ms;

        let milestones: Vec<_> = self.animation_rx.try_iter().collect();
        for event in milestones {
            self.on_animation_event(event, arena);
        }

        self.cancel_orphaned_swings(arena);
        self.retire_expired_hitboxes(arena);
        self.resolve_overlaps(arena, collab.rng);

        for action in self.timers.take_due(now_ms) {
            match action {
                PendingAction::Teardown(entity) => {
                    self.tear_down(entity, arena, collab.pickups, collab.rng);
                },
            }
        }
    }

    fn on_animation_event(&mut self, event: AnimationEvent, arena: &mut CombatArena) {
        let Some(swing) = self.swings.get(&event.entity) else {
            return;
        };
        if swing.animation != event.key {
            return;
        }

        match (swing.role, event.kind, swing.phase) {
            (Role::Player, AnimationEventKind::Started, SwingPhase::Winding) => {
                self.arm_hitbox(event.entity, arena, None);
            },
            (Role::Player, AnimationEventKind::Completed, _) => {
                self.finish_swing(event.entity, arena, false);
            },
            (Role::Enemy, AnimationEventKind::Completed, SwingPhase::Winding) => {
                let expires = self.now_ms + self.config.enemy_hitbox_lifetime_ms;
                if !self.arm_hitbox(event.entity, arena, Some(expires)) {
                    self.finish_swing(event.entity, arena, false);
                }
            },
            _ => {},
        }
    }

    fn arm_hitbox(&mut self, attacker: EntityId, arena: &CombatArena, expires: Option<f64>) -> bool {
        let hitbox = arena
            .combatant(attacker)
            .and_then(|c| create_hitbox(c, &self.config));
        let Some(swing) = self.swings.get_mut(&attacker) else {
            return false;
        };

        match hitbox {
            Some(volume) => {
                swing.hitbox = Some(volume);
                swing.phase = SwingPhase::Resolving;
                swing.hitbox_expires_at_ms = expires;
                debug!(id = %swing.id, direction = ?volume.direction, "hitbox armed");
                self.events.publish(CombatEvent::HitboxSpawned {
                    swing: swing.id,
                    attacker,
                    direction: volume.direction,
                });
                true
            },
            None => {
                swing.phase = SwingPhase::Recovering;
                false
            },
        }
    }

    fn cancel_orphaned_swings(&mut self, arena: &mut CombatArena) {
        let orphaned: Vec<_> = self
            .swings
            .keys()
            .copied()
            .filter(|id| {
                arena
                    .combatant(*id)
                    .map_or(true, |c| !c.active || c.dying || !c.stats.is_alive())
            })
            .collect();
        for attacker in orphaned {
            self.finish_swing(attacker, arena, true);
        }
    }

    fn retire_expired_hitboxes(&mut self, arena: &mut CombatArena) {
        let now = self.now_ms;
        let expired: Vec<_> = self
            .swings
            .values()
            .filter(|s| s.hitbox_expires_at_ms.is_some_and(|t| t <= now))
            .map(|s| s.attacker)
            .collect();
        for attacker in expired {
            self.finish_swing(attacker, arena, false);
        }
    }

    fn resolve_overlaps(&mut self, arena: &mut CombatArena, rng: &mut dyn RandomSource) {
        let mut live: Vec<(SwingId, EntityId, Role, Aabb)> = self
            .swings
            .values()
            .filter_map(|s| s.hitbox.map(|h| (s.id, s.attacker, s.role, h.bounds)))
            .collect();
        live.sort_by_key(|(id, ..)| *id);

        for (swing_id, attacker, role, bounds) in live {
            for victim in arena.hit_zones_overlapping(&bounds, role.opposing()) {
                let already_hit = self
                    .swings
                    .get(&attacker)
                    .map_or(true, |s| s.already_hit.contains(&victim));
                if already_hit {
                    continue;
                }
                let Some(v) = arena.combatant_mut(victim) else {
                    continue;
                };
                if v.dying || !v.lock_damage(swing_id) {
                    continue;
                }

                if let Some(swing) = self.swings.get_mut(&attacker) {
                    swing.already_hit.insert(victim);
                }
                if let Some(a) = arena.combatant_mut(attacker) {
                    a.locks.ensure(LockReason::Swing);
                }
                trace!(id = %swing_id, %victim, "hitbox overlap");
                self.take_damage(attacker, victim, arena, rng);
            }
        }
    }

    fn finish_swing(&mut self, attacker: EntityId, arena: &mut CombatArena, cancelled: bool) {
        let Some(swing) = self.swings.remove(&attacker) else {
            return;
        };

        if swing.hitbox.is_some() {
            self.events.publish(CombatEvent::HitboxRetired {
                swing: swing.id,
                attacker,
            });
        }
        for victim in &swing.already_hit {
            if let Some(v) = arena.combatant_mut(*victim) {
                v.release_damage(swing.id);
            }
        }
        if let Some(c) = arena.combatant_mut(attacker) {
            c.is_attacking = false;
            c.locks.release_all(LockReason::Swing);
            c.movement.max_speed = swing.restore_max_speed;
            c.movement.dust_emitting = swing.restore_dust;
        }

        if cancelled {
            debug!(id = %swing.id, entity = %attacker, "swing cancelled");
            self.events.publish(CombatEvent::SwingCancelled {
                swing: swing.id,
                attacker,
            });
        } else {
            debug!(id = %swing.id, entity = %attacker, victims = swing.already_hit.len(), "swing complete");
            self.events.publish(CombatEvent::SwingComplete {
                swing: swing.id,
                attacker,
                victims: swing.already_hit.len(),
            });
        }
    }

    fn publish_damage(&self, attacker: EntityId, victim: &Combatant, outcome: AttackOutcome) {
        let target = victim.id;
        self.events.publish(CombatEvent::DamageApplied {
            attacker,
            target,
            damage: outcome.damage,
            kind: outcome.kind,
            blocked: outcome.blocked,
        });
        self.events.publish(CombatEvent::HealthChanged {
            entity: target,
            current: victim.stats.health,
            max: victim.stats.max_health,
        });
        self.events.publish(CombatEvent::Feedback {
            entity: target,
            cue: Feedback::Flash,
        });
        self.events.publish(CombatEvent::Feedback {
            entity: target,
            cue: Feedback::Sound,
        });
        self.events.publish(CombatEvent::FloatingText {
            entity: target,
            text: outcome.damage.to_string(),
        });
    }

    fn award_experience(&self, recipient: EntityId, amount: u32, arena: &mut CombatArena) {
        let Some(player) = arena.get_mut(recipient).and_then(Actor::as_player_mut) else {
            return;
        };
        let levels_gained = player.add_exp(amount);
        if levels_gained > 0 {
            info!(entity = %recipient, level = player.level, "level up");
        }
        self.events.publish(CombatEvent::ExperienceAwarded {
            recipient,
            amount,
            levels_gained,
        });
    }

    fn tear_down(
        &mut self,
        entity: EntityId,
        arena: &mut CombatArena,
        pickups: &mut dyn PickupSpawner,
        rng: &mut dyn RandomSource,
    ) {
        let Some(actor) = arena.despawn(entity) else {
            return;
        };
        if let Some(enemy) = actor.as_enemy() {
            for loot in enemy
                .drops
                .roll(enemy.position(), self.config.drop_scatter, rng)
            {
                pickups.spawn_pickup(loot.item, loot.position);
                self.events.publish(CombatEvent::LootDropped {
                    entity,
                    item: loot.item,
                    position: loot.position,
                });
            }
        }
        debug!(%entity, "torn down");
        self.events.publish(CombatEvent::EntityTornDown { entity });
    }
}

fn attack_guard(c: &Combatant) -> Result<(), SwingRejection> {
    if !c.active || c.dying {
        Err(SwingRejection::Inactive)
    } else if c.is_attacking {
        Err(SwingRejection::AlreadySwinging)
    } else if c.is_blocking {
        Err(SwingRejection::Blocking)
    } else if c.is_swimming {
        Err(SwingRejection::Swimming)
    } else if !c.can_attack() || !c.can_move() {
        Err(SwingRejection::Locked)
    } else {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::animation::AnimationTable;
    use crate::config::CombatConfig;
    use crate::drops::{DropEntry, DropTable};
    use crate::enemy::Enemy;
    use crate::entity::CombatStats;
    use crate::player::Player;
    use crate::rng::FixedRandom;
    use crate::testing::{RecordingAnimator, RecordingPickups};
    use gloam_common::{ItemTypeId, Vec2};
    use proptest::prelude::*;

    const CLIPS: &[&str] = &[
        "hero-idle-right",
        "hero-attack-right",
        "hero-attack-left",
        "slime-attack",
    ];

    struct Fixture {
        battle: BattleManager,
        arena: CombatArena,
        animator: RecordingAnimator,
        pickups: RecordingPickups,
        rng: FixedRandom,
        player: EntityId,
        enemy: EntityId,
    }

    impl Fixture {
        /// Player at the origin facing right, slime 20 units to the right
        /// facing left. Both hit zones overlap the other's hitbox.
        fn new() -> Self {
            let animator = RecordingAnimator::with_clips(CLIPS);
            let config = CombatConfig::default();

            let player_stats = CombatStats {
                attack: 3,
                health: 30,
                max_health: 30,
                ..CombatStats::default()
            };
            let mut player = Player::new(player_stats, animator.table("hero"), Vec2::ZERO);
            player.combatant_mut().animation.current =
                Some(AnimationKey::new(AnimationAction::Idle, Direction::Right));

            let enemy_stats = CombatStats {
                attack: 2,
                health: 10,
                max_health: 10,
                experience_reward: 25,
                ..CombatStats::default()
            };
            let mut slime = Combatant::new(Role::Enemy, enemy_stats)
                .with_position(Vec2::new(20.0, 0.0))
                .with_animations(animator.table("slime"));
            slime.animation.flip_x = true;
            let enemy = Enemy::from_combatant(slime, 100.0, &config).with_drops(DropTable::new(vec![
                DropEntry {
                    item: ItemTypeId::new(7),
                    chance: 100.0,
                },
            ]));

            let mut arena = CombatArena::new();
            let player = arena.spawn(player);
            let enemy = arena.spawn(enemy);

            Self {
                battle: BattleManager::new(config),
                arena,
                animator,
                pickups: RecordingPickups::default(),
                // crit roll 90 misses, flee 0 always hits, coin flip adds
                rng: FixedRandom(0.9),
                player,
                enemy,
            }
        }

        fn attack(&mut self, who: EntityId) -> Result<SwingId, SwingRejection> {
            self.battle.attack(who, &mut self.arena, &mut self.animator)
        }

        fn tick(&mut self, now_ms: f64) {
            let mut collab = Collaborators::new(&mut self.animator, &mut self.pickups, &mut self.rng);
            self.battle.tick(now_ms, &mut self.arena, &mut collab);
        }

        fn send(&self, event: AnimationEvent) {
            self.battle
                .animation_events()
                .send(event)
                .expect("inbox open");
        }

        fn swing_key(&self, who: EntityId) -> AnimationKey {
            self.battle.swing(who).expect("swing in flight").animation
        }

        fn combatant(&self, who: EntityId) -> &Combatant {
            self.arena.combatant(who).expect("entity exists")
        }

        fn health(&self, who: EntityId) -> i32 {
            self.combatant(who).stats.health
        }
    }

    #[test]
    fn test_player_swing_lifecycle() {
        let mut f = Fixture::new();
        let player = f.player;

        f.attack(player).expect("swing starts");
        let c = f.combatant(player);
        assert!(c.is_attacking);
        assert!(!c.can_attack());
        assert_eq!(c.movement.max_speed, 0.0);
        assert!(!c.movement.dust_emitting);
        assert_eq!(
            f.animator.last_play().map(|p| p.name.as_str()),
            Some("hero-attack-right")
        );

        let key = f.swing_key(player);
        f.send(AnimationEvent::started(player, key));
        f.tick(0.0);

        // 3 - 0 = 3, +10% on the add branch = 3.3, floored
        assert_eq!(f.health(f.enemy), 7);
        assert_eq!(
            f.battle.swing(player).map(|s| s.phase),
            Some(SwingPhase::Resolving)
        );
        assert!(!f.combatant(f.enemy).can_take_damage());

        f.send(AnimationEvent::completed(player, key));
        f.tick(16.0);

        assert!(f.battle.swing(player).is_none());
        let c = f.combatant(player);
        assert!(!c.is_attacking);
        assert!(c.can_attack());
        assert_eq!(c.movement.max_speed, 60.0);
        assert!(c.movement.dust_emitting);
        assert!(f.combatant(f.enemy).can_take_damage());
    }

    #[test]
    fn test_milestone_before_tick_is_not_lost() {
        let mut f = Fixture::new();
        let player = f.player;
        f.attack(player).expect("swing starts");
        let key = f.swing_key(player);

        // both milestones arrive before the first tick
        f.send(AnimationEvent::started(player, key));
        f.send(AnimationEvent::completed(player, key));
        f.tick(0.0);

        assert!(f.battle.swing(player).is_none());
        let events = f.battle.events().drain();
        assert!(events
            .iter()
            .any(|e| matches!(e, CombatEvent::HitboxSpawned { .. })));
        assert!(events
            .iter()
            .any(|e| matches!(e, CombatEvent::SwingComplete { .. })));
    }

    #[test]
    fn test_damage_applies_once_per_swing() {
        let mut f = Fixture::new();
        let player = f.player;
        f.attack(player).expect("swing starts");
        let key = f.swing_key(player);
        f.send(AnimationEvent::started(player, key));

        for frame in 0..30 {
            f.tick(f64::from(frame) * 16.0);
        }
        assert_eq!(f.health(f.enemy), 7);
        assert_eq!(
            f.battle.swing(player).map(|s| s.already_hit.len()),
            Some(1)
        );
    }

    #[test]
    fn test_second_attack_without_tick_is_rejected() {
        let mut f = Fixture::new();
        let first = f.attack(f.player);
        let second = f.attack(f.player);
        assert!(first.is_ok());
        assert_eq!(second, Err(SwingRejection::AlreadySwinging));
        assert_eq!(f.battle.swing_count(), 1);
    }

    #[test]
    fn test_enemy_swing_arms_on_completion_and_expires() {
        let mut f = Fixture::new();
        let enemy = f.enemy;
        f.attack(enemy).expect("enemy swing");
        let key = f.swing_key(enemy);

        // start milestone does nothing for enemies
        f.send(AnimationEvent::started(enemy, key));
        f.tick(0.0);
        assert_eq!(f.health(f.player), 30);

        f.send(AnimationEvent::completed(enemy, key));
        f.tick(100.0);
        // enemy attack 2, +10% = 2.2
        assert_eq!(f.health(f.player), 28);
        assert_eq!(
            f.battle.swing(enemy).and_then(|s| s.hitbox_expires_at_ms),
            Some(300.0)
        );

        f.tick(200.0);
        assert!(f.battle.swing(enemy).is_some());
        f.tick(300.0);
        assert!(f.battle.swing(enemy).is_none());
        assert!(!f.combatant(enemy).is_attacking);
        assert!(f.combatant(f.player).can_take_damage());
        assert_eq!(f.health(f.player), 28);
    }

    #[test]
    fn test_dead_attacker_swing_is_cancelled() {
        let mut f = Fixture::new();
        let enemy = f.enemy;
        f.attack(enemy).expect("enemy swing");
        let key = f.swing_key(enemy);
        f.send(AnimationEvent::completed(enemy, key));
        f.tick(0.0);
        assert!(!f.combatant(f.player).can_take_damage());

        if let Some(c) = f.arena.combatant_mut(enemy) {
            c.active = false;
        }
        f.tick(16.0);

        assert!(f.battle.swing(enemy).is_none());
        assert!(f.combatant(f.player).can_take_damage());
        assert!(f
            .battle
            .events()
            .drain()
            .iter()
            .any(|e| matches!(e, CombatEvent::SwingCancelled { .. })));
    }

    #[test]
    fn test_unresolved_facing_swings_without_hitbox() {
        let mut f = Fixture::new();
        let enemy = f.enemy;
        if let Some(c) = f.arena.combatant_mut(enemy) {
            c.animation.flip_x = false;
        }
        f.attack(enemy).expect("swing still starts");
        let key = f.swing_key(enemy);
        f.send(AnimationEvent::completed(enemy, key));
        f.tick(0.0);

        assert!(f.battle.swing(enemy).is_none());
        assert!(!f.combatant(enemy).is_attacking);
        assert_eq!(f.health(f.player), 30);
    }

    #[test]
    fn test_missing_attack_clip_rejects() {
        let mut f = Fixture::new();
        let config = CombatConfig::default();
        let blob = Enemy::from_combatant(
            Combatant::new(Role::Enemy, CombatStats::default())
                .with_animations(AnimationTable::build("blob", |_| false)),
            50.0,
            &config,
        );
        let blob = f.arena.spawn(blob);
        assert_eq!(f.attack(blob), Err(SwingRejection::NoAttackClip));
        assert!(!f.combatant(blob).is_attacking);
        assert!(f.combatant(blob).can_attack());
    }

    #[test]
    fn test_attack_guards() {
        let mut f = Fixture::new();
        let player = f.player;

        assert!(f.battle.block(player, &mut f.arena));
        assert_eq!(f.attack(player), Err(SwingRejection::Blocking));
        assert!(f.battle.stop_block(player, &mut f.arena));

        if let Some(c) = f.arena.combatant_mut(player) {
            c.is_swimming = true;
        }
        assert_eq!(f.attack(player), Err(SwingRejection::Swimming));
    }

    #[test]
    fn test_block_rejected_while_attacking() {
        let mut f = Fixture::new();
        f.attack(f.player).expect("swing");
        assert!(!f.battle.block(f.player, &mut f.arena));
        assert!(!f.combatant(f.player).is_blocking);
    }

    #[test]
    fn test_stop_block_keeps_dialog_lock() {
        let mut f = Fixture::new();
        let player = f.player;
        assert!(f.battle.block(player, &mut f.arena));
        if let Some(c) = f.arena.combatant_mut(player) {
            c.locks.push(LockReason::Dialog);
        }
        assert!(f.battle.stop_block(player, &mut f.arena));

        let c = f.combatant(player);
        assert!(!c.is_blocking);
        assert!(!c.can_move());
        assert!(!c.can_attack());
    }

    #[test]
    fn test_blocking_halves_damage() {
        let mut f = Fixture::new();
        assert!(f.battle.block(f.player, &mut f.arena));
        let outcome = f
            .battle
            .take_damage(f.enemy, f.player, &mut f.arena, &mut FixedRandom(0.9))
            .expect("both exist");
        assert!(outcome.blocked);
        // floor(2.2) = 2, halved
        assert_eq!(outcome.damage, 1);
        assert_eq!(f.health(f.player), 29);
    }

    #[test]
    fn test_kill_awards_experience_and_tears_down_once() {
        let mut f = Fixture::new();
        let (player, enemy) = (f.player, f.enemy);
        if let Some(c) = f.arena.combatant_mut(enemy) {
            c.stats.health = 2;
        }

        f.battle
            .take_damage(player, enemy, &mut f.arena, &mut FixedRandom(0.9))
            .expect("hit");
        assert_eq!(f.health(enemy), 0);
        assert!(f.combatant(enemy).dying);
        assert!(f.battle.teardown_pending(enemy));
        assert_eq!(
            f.arena.player().map(|p| p.total_experience),
            Some(25)
        );

        // further hits on a dying entity are ignored
        assert!(f
            .battle
            .take_damage(player, enemy, &mut f.arena, &mut FixedRandom(0.9))
            .is_none());

        f.tick(100.0);
        assert!(f.arena.contains(enemy));
        f.tick(300.0);
        assert!(!f.arena.contains(enemy));
        assert_eq!(f.pickups.spawned.len(), 1);
        assert_eq!(f.pickups.spawned[0].0, ItemTypeId::new(7));

        f.tick(1000.0);
        let torn_down = f
            .battle
            .events()
            .drain()
            .into_iter()
            .filter(|e| matches!(e, CombatEvent::EntityTornDown { .. }))
            .count();
        assert_eq!(torn_down, 1);
    }

    #[test]
    fn test_enemy_kill_awards_no_experience() {
        let mut f = Fixture::new();
        if let Some(c) = f.arena.combatant_mut(f.player) {
            c.stats.health = 1;
        }
        f.battle
            .take_damage(f.enemy, f.player, &mut f.arena, &mut FixedRandom(0.9))
            .expect("hit");
        assert!(!f
            .battle
            .events()
            .drain()
            .iter()
            .any(|e| matches!(e, CombatEvent::ExperienceAwarded { .. })));
    }

    #[test]
    fn test_miss_publishes_text() {
        let mut f = Fixture::new();
        if let Some(c) = f.arena.combatant_mut(f.enemy) {
            c.stats.flee = 100.0;
        }
        // crit: 90 > 0, hit: 90 > 1 * 100 / 100
        let outcome = f
            .battle
            .take_damage(f.player, f.enemy, &mut f.arena, &mut FixedRandom(0.9))
            .expect("both exist");
        assert!(outcome.is_miss());
        assert_eq!(f.health(f.enemy), 10);
        assert!(f.battle.events().drain().contains(&CombatEvent::FloatingText {
            entity: f.enemy,
            text: "MISS".to_string(),
        }));
    }

    #[derive(Debug, Clone, Copy)]
    enum Op {
        Attack,
        Block,
        StopBlock,
        Start,
        Complete,
        Tick,
    }

    fn op() -> impl Strategy<Value = Op> {
        prop_oneof![
            Just(Op::Attack),
            Just(Op::Block),
            Just(Op::StopBlock),
            Just(Op::Start),
            Just(Op::Complete),
            Just(Op::Tick),
        ]
    }

    proptest! {
        #[test]
        fn prop_attack_and_block_are_exclusive(ops in proptest::collection::vec(op(), 1..60)) {
            let mut f = Fixture::new();
            let player = f.player;
            let mut now = 0.0;
            for op in ops {
                match op {
                    Op::Attack => { let _ = f.attack(player); },
                    Op::Block => { f.battle.block(player, &mut f.arena); },
                    Op::StopBlock => { f.battle.stop_block(player, &mut f.arena); },
                    Op::Start | Op::Complete => {
                        if let Some(swing) = f.battle.swing(player) {
                            let key = swing.animation;
                            let event = if matches!(op, Op::Start) {
                                AnimationEvent::started(player, key)
                            } else {
                                AnimationEvent::completed(player, key)
                            };
                            f.send(event);
                        }
                    },
                    Op::Tick => {
                        now += 16.0;
                        f.tick(now);
                    },
                }
                let c = f.combatant(player);
                prop_assert!(!(c.is_attacking && c.is_blocking));
            }
        }

        #[test]
        fn prop_one_hit_per_swing(ticks in 1usize..80) {
            let mut f = Fixture::new();
            if let Some(c) = f.arena.combatant_mut(f.enemy) {
                c.stats.health = 1000;
                c.stats.max_health = 1000;
            }
            let player = f.player;
            f.attack(player).expect("swing");
            let key = f.swing_key(player);
            f.send(AnimationEvent::started(player, key));

            let mut previous = 1000;
            for i in 0..ticks {
                f.tick(i as f64 * 16.0);
                let health = f.health(f.enemy);
                prop_assert!(health <= previous);
                previous = health;
            }
            prop_assert_eq!(previous, 997);
        }
    }
}
