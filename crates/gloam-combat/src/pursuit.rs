//! Path-following pursuit of a perceived target.
//!
//! Path searches are asynchronous: [`PursuitController::pursue`] files a
//! [`PathRequest`] with the pathfinder and keeps steering directly until the
//! reply arrives on the controller's channel. Replies are collected at the
//! start of the next tick. A reply whose ticket no longer matches the
//! agent's latest request is stale and dropped.

use crossbeam_channel::{unbounded, Receiver, Sender};
use gloam_common::Vec2;
use tracing::{debug, trace};

use crate::arena::CombatArena;
use crate::collaborators::{Collaborators, PathRequest, PathResult};
use crate::config::CombatConfig;
use crate::enemy::Enemy;

/// Per-agent path-following state.
#[derive(Debug, Clone, PartialEq)]
pub struct PursuitState {
    /// Waypoints of the accepted path
    pub current_path: Option<Vec<Vec2>>,
    /// Next waypoint to reach
    pub waypoint_index: usize,
    /// Time of the last path request (ms)
    pub last_replan_ms: Option<f64>,
    /// Minimum time between requests (ms)
    pub replan_interval_ms: f64,
    /// Distance at which a waypoint counts as reached
    pub arrival_radius: f32,
    pending_ticket: Option<u64>,
    next_ticket: u64,
}

impl PursuitState {
    /// Creates an idle state with timings from `config`.
    #[must_use]
    pub fn new(config: &CombatConfig) -> Self {
        Self {
            current_path: None,
            waypoint_index: 0,
            last_replan_ms: None,
            replan_interval_ms: config.path_update_interval_ms,
            arrival_radius: config.waypoint_reached_distance,
            pending_ticket: None,
            next_ticket: 1,
        }
    }

    /// Forgets the path and any request in flight.
    pub fn clear(&mut self) {
        self.current_path = None;
        self.waypoint_index = 0;
        self.last_replan_ms = None;
        self.pending_ticket = None;
    }

    /// Returns true if a new path should be requested at `now_ms`.
    ///
    /// Due once the re-plan interval has elapsed, or straight away when the
    /// agent has no path and nothing is in flight.
    #[must_use]
    pub fn replan_due(&self, now_ms: f64) -> bool {
        if self.current_path.is_none() && !self.awaiting_path() {
            return true;
        }
        self.last_replan_ms
            .map_or(true, |last| now_ms - last >= self.replan_interval_ms)
    }

    /// Returns true while a request is unanswered.
    #[must_use]
    pub fn awaiting_path(&self) -> bool {
        self.pending_ticket.is_some()
    }

    /// Records a request made at `now_ms` and returns its ticket.
    ///
    /// Any earlier unanswered request becomes stale.
    pub fn begin_request(&mut self, now_ms: f64) -> u64 {
        let ticket = self.next_ticket;
        self.next_ticket += 1;
        self.pending_ticket = Some(ticket);
        self.last_replan_ms = Some(now_ms);
        ticket
    }

    /// Installs a reply. Returns false for stale tickets.
    ///
    /// Paths shorter than `min_len` points, and failed searches, leave the
    /// agent without a path so it steers directly.
    pub fn accept(&mut self, result: PathResult, min_len: usize) -> bool {
        if self.pending_ticket != Some(result.ticket) {
            return false;
        }
        self.pending_ticket = None;
        self.current_path = result.path.filter(|path| path.len() >= min_len);
        self.waypoint_index = 0;
        true
    }

    /// Advances past waypoints within the arrival radius of `position` and
    /// returns the next one to head for.
    ///
    /// The path is dropped once its last waypoint is reached.
    pub fn next_waypoint(&mut self, position: Vec2) -> Option<Vec2> {
        let path = self.current_path.as_ref()?;
        while self.waypoint_index < path.len()
            && path[self.waypoint_index].distance(position) <= self.arrival_radius
        {
            self.waypoint_index += 1;
        }
        match path.get(self.waypoint_index).copied() {
            Some(waypoint) => Some(waypoint),
            None => {
                self.current_path = None;
                self.waypoint_index = 0;
                None
            },
        }
    }
}

/// How an agent moved this tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PursuitMode {
    /// Mid-swing; movement left alone
    Suspended,
    /// Walking the accepted path
    FollowingPath,
    /// Heading straight for the target
    Direct,
}

/// Drives enemies along planned paths.
#[derive(Debug)]
pub struct PursuitController {
    min_path_len: usize,
    reply_tx: Sender<PathResult>,
    reply_rx: Receiver<PathResult>,
}

impl PursuitController {
    /// Creates a controller.
    #[must_use]
    pub fn new(config: &CombatConfig) -> Self {
        let (reply_tx, reply_rx) = unbounded();
        Self {
            min_path_len: config.min_path_len,
            reply_tx,
            reply_rx,
        }
    }

    /// Hands every path reply received so far to its agent.
    ///
    /// Returns how many were accepted. Replies for despawned agents and
    /// stale tickets are dropped.
    pub fn collect_replies(&mut self, arena: &mut CombatArena) -> usize {
        let mut accepted = 0;
        for result in self.reply_rx.try_iter() {
            let agent = result.agent;
            let ticket = result.ticket;
            let Some(enemy) = arena.enemy_mut(agent) else {
                trace!(%agent, ticket, "path reply for despawned agent");
                continue;
            };
            if enemy.pursuit.accept(result, self.min_path_len) {
                debug!(%agent, ticket, has_path = enemy.pursuit.current_path.is_some(), "path reply");
                accepted += 1;
            } else {
                trace!(%agent, ticket, "stale path reply");
            }
        }
        accepted
    }

    /// Moves `enemy` one step toward `target`.
    ///
    /// Requests a new path when a pathfinder is available and either the
    /// agent has no path or the re-plan interval has elapsed. Follows the current path if there is one,
    /// otherwise steers straight at the target.
    pub fn pursue(
        &mut self,
        enemy: &mut Enemy,
        target: Vec2,
        now_ms: f64,
        collab: &mut Collaborators<'_>,
    ) -> PursuitMode {
        let (combatant, state) = enemy.parts_mut();
        if combatant.is_attacking {
            return PursuitMode::Suspended;
        }

        if let Some(pathfinder) = collab.pathfinder.as_mut() {
            if state.replan_due(now_ms) {
                let ticket = state.begin_request(now_ms);
                trace!(agent = %combatant.id, ticket, "path requested");
                pathfinder.find_path(
                    combatant.position,
                    target,
                    PathRequest::new(combatant.id, ticket, self.reply_tx.clone()),
                );
            }
        }

        if let Some(waypoint) = state.next_waypoint(combatant.position) {
            combatant.steer_toward(waypoint, &mut *collab.animation);
            return PursuitMode::FollowingPath;
        }

        combatant.steer_toward(target, &mut *collab.animation);
        PursuitMode::Direct
    }
}
