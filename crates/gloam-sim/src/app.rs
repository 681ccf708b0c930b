//! Simulation lifecycle.
//!
//! Fixed-step loop that drives a scripted player against the enemies of
//! the configured encounter.

use anyhow::{Context, Result};
use std::fs;
use std::path::Path;
use tracing::{debug, info, warn};

use gloam_combat::{
    AnimationPlayer, AnimationTable, CombatArena, CombatCapable, Collaborators, ContentError,
    ContentRegistry, EncounterDirector, Enemy, FastRandom, Player,
};
use gloam_common::{EntityId, GloamResult, Vec2};

use crate::config::SimConfig;
use crate::host::{OpenField, PickupLog, ScriptedAnimator, StraightLinePathfinder};
use crate::report::{Outcome, SimReport};

/// Nearest live enemy as seen by the player script.
#[derive(Debug, Clone, Copy)]
struct Threat {
    position: Vec2,
    distance: f32,
    swinging: bool,
}

/// A running encounter.
pub struct SimApp {
    /// Simulator configuration
    config: SimConfig,

    // === Engine ===
    /// Enemy behaviour and attack lifecycle
    director: EncounterDirector,
    /// Every live combatant
    arena: CombatArena,

    // === Stand-ins ===
    /// Animation milestones
    animator: ScriptedAnimator,
    /// Path searches
    pathfinder: StraightLinePathfinder,
    /// Spawned loot
    pickups: PickupLog,
    /// Combat rolls
    rng: FastRandom,

    // === Player script ===
    /// Player id
    player: EntityId,
    /// Earliest time of the next player swing (ms)
    next_swing_ms: f64,

    // === Results ===
    /// Running tally
    report: SimReport,
}

impl SimApp {
    /// Spawns the player and every configured enemy.
    ///
    /// Fails if a spawn point names an enemy that is not defined.
    pub fn new(config: SimConfig, registry: &ContentRegistry) -> Result<Self, ContentError> {
        let director = EncounterDirector::new(config.combat.clone());
        let animator = ScriptedAnimator::new(
            director.battle().animation_events(),
            config.attack_clip_ms,
        );
        let rng = config.seed.map_or_else(FastRandom::new, FastRandom::with_seed);

        let mut arena = CombatArena::new();
        let setup = &config.player;
        let player = arena.spawn(Player::new(
            setup.stats,
            AnimationTable::build(&setup.texture, |name| animator.exists(name)),
            Vec2::from(setup.position),
        ));

        for spawn in &config.spawns {
            let enemy = Enemy::from_definition(
                registry,
                &spawn.enemy,
                spawn.position(),
                &config.combat,
                |name| animator.exists(name),
            )?;
            let id = arena.spawn(enemy);
            debug!(%id, kind = %spawn.enemy, "enemy spawned");
        }

        info!(enemies = config.spawns.len(), "encounter ready");

        Ok(Self {
            config,
            director,
            arena,
            animator,
            pathfinder: StraightLinePathfinder::default(),
            pickups: PickupLog::default(),
            rng,
            player,
            next_swing_ms: 0.0,
            report: SimReport::default(),
        })
    }

    /// Runs until the encounter is decided or time runs out.
    pub fn run(mut self) -> SimReport {
        let tick_ms = self.config.tick_ms;
        let mut now_ms = 0.0;
        let mut outcome = Outcome::Timeout;

        while now_ms <= self.config.duration_ms {
            self.step(now_ms);
            self.report.ticks += 1;
            self.report.elapsed_ms = now_ms;

            if let Some(decided) = self.outcome() {
                outcome = decided;
                break;
            }
            now_ms += tick_ms;
        }

        self.finish(outcome)
    }

    /// Advances the encounter by one tick ending at `now_ms`.
    fn step(&mut self, now_ms: f64) {
        self.animator.advance(now_ms);
        self.drive_player(now_ms);

        let sight = OpenField {
            sight_distance: self.config.sight_distance,
        };
        let mut collab = Collaborators::new(&mut self.animator, &mut self.pickups, &mut self.rng)
            .with_pathfinder(&mut self.pathfinder)
            .with_line_of_sight(&sight);
        let summary = self.director.tick(now_ms, &mut self.arena, &mut collab);
        if summary.swings_started > 0 {
            debug!(now_ms, ?summary, "enemies swung");
        }

        let player = self.arena.player_id();
        for event in self.director.battle().events().drain() {
            self.report.record(&event, player);
        }

        self.integrate_movement(self.config.tick_ms / 1000.0);
    }

    /// Attacks the nearest enemy when in reach, walks toward it otherwise,
    /// and blocks while it winds up.
    fn drive_player(&mut self, now_ms: f64) {
        let Some(me) = self.arena.combatant(self.player) else {
            return;
        };
        if me.dying {
            return;
        }
        let reach = self.config.combat.hitbox_length + me.hit_zone_half_extents.x;
        let Some(threat) = self.nearest_threat(me.position) else {
            self.director.battle_mut().stop_block(self.player, &mut self.arena);
            if let Some(me) = self.arena.combatant_mut(self.player) {
                me.halt(&mut self.animator);
            }
            return;
        };

        let battle = self.director.battle_mut();
        let in_reach = threat.distance <= reach;
        if self.config.player.blocks && threat.swinging && in_reach {
            if !self.arena.combatant(self.player).is_some_and(|c| c.is_attacking) {
                battle.block(self.player, &mut self.arena);
                return;
            }
        } else {
            battle.stop_block(self.player, &mut self.arena);
        }

        let Some(me) = self.arena.combatant_mut(self.player) else {
            return;
        };
        if !in_reach {
            me.steer_toward(threat.position, &mut self.animator);
            return;
        }

        me.movement.stop();
        if me.is_attacking || !me.can_attack() || now_ms < self.next_swing_ms {
            return;
        }
        me.face_toward(threat.position, &mut self.animator);
        match battle.attack(self.player, &mut self.arena, &mut self.animator) {
            Ok(swing) => {
                debug!(%swing, now_ms, "player swings");
                self.next_swing_ms = now_ms + self.config.player.attack_cooldown_ms;
            },
            Err(reason) => warn!(%reason, "player swing rejected"),
        }
    }

    fn nearest_threat(&self, from: Vec2) -> Option<Threat> {
        self.arena
            .enemy_ids()
            .into_iter()
            .filter_map(|id| self.arena.combatant(id))
            .filter(|c| c.active && !c.dying)
            .map(|c| Threat {
                position: c.position,
                distance: c.position.distance(from),
                swinging: c.is_attacking,
            })
            .min_by(|a, b| a.distance.total_cmp(&b.distance))
    }

    /// Moves every live combatant along its velocity.
    fn integrate_movement(&mut self, dt_secs: f64) {
        let dt = dt_secs as f32;
        for actor in self.arena.iter_mut() {
            let c = actor.combatant_mut();
            if c.active && !c.dying {
                c.position += c.movement.velocity * dt;
            }
        }
    }

    fn outcome(&self) -> Option<Outcome> {
        match self.arena.player() {
            None => return Some(Outcome::Defeat),
            Some(player) if player.combatant().dying => return Some(Outcome::Defeat),
            Some(_) => {},
        }
        self.arena
            .enemy_ids()
            .is_empty()
            .then_some(Outcome::Victory)
    }

    fn finish(mut self, outcome: Outcome) -> SimReport {
        self.report.outcome = outcome;
        self.report.path_requests = self.pathfinder.requests();
        if let Some(player) = self.arena.player() {
            self.report.player_health = player.health();
            self.report.player_level = player.level;
        }
        info!(
            ?outcome,
            ticks = self.report.ticks,
            defeated = self.report.enemies_defeated,
            pickups = self.pickups.spawned.len(),
            clips = self.animator.plays(),
            "encounter finished"
        );
        self.report
    }
}

/// Reads and validates the configuration, then the content it points at.
pub fn load_scenario(config_path: &Path) -> GloamResult<(SimConfig, ContentRegistry)> {
    let mut config = SimConfig::load_from(config_path)?;
    config.validate()?;

    let content_path = config.content_path_from(config_path);
    let source = fs::read_to_string(&content_path)?;
    let registry = ContentRegistry::from_ron(&source)?;
    Ok((config, registry))
}

/// Loads the scenario at `config_path` and runs one encounter.
pub fn run(config_path: &Path) -> Result<SimReport> {
    let (config, registry) = load_scenario(config_path)
        .with_context(|| format!("failed to load scenario {}", config_path.display()))?;

    info!("Configuration loaded:");
    info!("  Tick: {} ms", config.tick_ms);
    info!("  Content: {} enemy kinds", registry.enemy_count());

    let app = SimApp::new(config, &registry)?;
    Ok(app.run())
}
