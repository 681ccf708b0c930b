//! Services the engine consumes but does not implement.
//!
//! Animation playback, pathfinding, line of sight and pickup spawning are
//! owned by the host game. Replies that arrive later (path results,
//! animation milestones) are delivered over channels and picked up on the
//! next tick.

use crossbeam_channel::Sender;
use gloam_common::{EntityId, ItemTypeId, Vec2};

use crate::animation::{AnimationClip, AnimationKey};
use crate::rng::RandomSource;

/// Animation playback surface.
///
/// Implementations report milestones by sending
/// [`AnimationEvent`](crate::animation::AnimationEvent)s to the sender
/// returned by [`BattleManager::animation_events`](crate::battle::BattleManager::animation_events).
pub trait AnimationPlayer {
    /// Returns true if a clip with this name is loaded.
    fn exists(&self, name: &str) -> bool;

    /// Starts playing `clip` for `entity`.
    fn play(&mut self, entity: EntityId, key: AnimationKey, clip: &AnimationClip, flip_x: bool);
}

/// Outcome of a path request.
#[derive(Debug, Clone, PartialEq)]
pub struct PathResult {
    /// Agent the path was requested for
    pub agent: EntityId,
    /// Request ticket, used to discard stale replies
    pub ticket: u64,
    /// Waypoints from start to goal, or `None` if no path was found
    pub path: Option<Vec<Vec2>>,
}

/// Reply handle handed to a [`Pathfinder`].
#[derive(Debug, Clone)]
pub struct PathRequest {
    /// Agent the path is for
    pub agent: EntityId,
    /// Request ticket
    pub ticket: u64,
    reply: Sender<PathResult>,
}

impl PathRequest {
    /// Creates a request that answers on `reply`.
    #[must_use]
    pub fn new(agent: EntityId, ticket: u64, reply: Sender<PathResult>) -> Self {
        Self {
            agent,
            ticket,
            reply,
        }
    }

    /// Delivers the result. May be called from any later point in the frame.
    pub fn respond(self, path: Option<Vec<Vec2>>) {
        // receiver gone means the controller was dropped
        let _ = self.reply.send(PathResult {
            agent: self.agent,
            ticket: self.ticket,
            path,
        });
    }
}

/// Asynchronous path search.
pub trait Pathfinder {
    /// Starts a search from `from` to `to` and answers through `request`.
    fn find_path(&mut self, from: Vec2, to: Vec2, request: PathRequest);
}

/// Synchronous visibility query.
pub trait LineOfSight {
    /// Returns true if nothing blocks the segment between the two points.
    fn is_visible(&self, from: Vec2, to: Vec2) -> bool;
}

/// Creates pickups in the world.
pub trait PickupSpawner {
    /// Spawns a pickup for `item` at `at`.
    fn spawn_pickup(&mut self, item: ItemTypeId, at: Vec2);
}

/// Receives experience for killing blows.
pub trait ExperienceSink {
    /// Adds experience. Returns the number of levels gained.
    fn add_exp(&mut self, amount: u32) -> u32;
}

/// Per-tick bundle of the collaborators the engine talks to.
///
/// Pathfinding and line of sight are optional; without them pursuit steers
/// directly and every target in range counts as visible.
pub struct Collaborators<'a> {
    /// Animation playback
    pub animation: &'a mut dyn AnimationPlayer,
    /// Loot spawning
    pub pickups: &'a mut dyn PickupSpawner,
    /// Random source for rolls and drop scatter
    pub rng: &'a mut dyn RandomSource,
    /// Optional path search
    pub pathfinder: Option<&'a mut dyn Pathfinder>,
    /// Optional visibility check
    pub line_of_sight: Option<&'a dyn LineOfSight>,
}

impl<'a> Collaborators<'a> {
    /// Creates a bundle without pathfinding or line of sight.
    pub fn new(
        animation: &'a mut dyn AnimationPlayer,
        pickups: &'a mut dyn PickupSpawner,
        rng: &'a mut dyn RandomSource,
    ) -> Self {
        Self {
            animation,
            pickups,
            rng,
            pathfinder: None,
            line_of_sight: None,
        }
    }

    /// Adds a pathfinder.
    #[must_use]
    pub fn with_pathfinder(mut self, pathfinder: &'a mut dyn Pathfinder) -> Self {
        self.pathfinder = Some(pathfinder);
        self
    }

    /// Adds a line-of-sight check.
    #[must_use]
    pub fn with_line_of_sight(mut self, line_of_sight: &'a dyn LineOfSight) -> Self {
        self.line_of_sight = Some(line_of_sight);
        self
    }
}

impl std::fmt::Debug for Collaborators<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Collaborators")
            .field("pathfinder", &self.pathfinder.is_some())
            .field("line_of_sight", &self.line_of_sight.is_some())
            .finish_non_exhaustive()
    }
}
