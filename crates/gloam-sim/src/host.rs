//! Stand-in collaborators for headless runs.
//!
//! No sprites, no navigation mesh and no physics exist here. The animator
//! reports attack milestones on a fixed clip length, the pathfinder answers
//! with a straight line and sight is limited only by distance.

use ahash::AHashMap;
use crossbeam_channel::Sender;
use gloam_combat::{
    AnimationAction, AnimationClip, AnimationEvent, AnimationKey, AnimationPlayer, LineOfSight,
    PathRequest, Pathfinder, PickupSpawner, TimerQueue,
};
use gloam_common::{EntityId, ItemTypeId, Vec2};
use tracing::trace;

/// Animator that plays every clip instantly and completes attack clips
/// after a fixed length.
#[derive(Debug)]
pub struct ScriptedAnimator {
    clip_ms: f64,
    now_ms: f64,
    inbox: Sender<AnimationEvent>,
    pending: TimerQueue<AnimationEvent>,
    playing: AHashMap<EntityId, AnimationKey>,
    plays: usize,
}

impl ScriptedAnimator {
    /// Creates an animator reporting to `inbox`.
    #[must_use]
    pub fn new(inbox: Sender<AnimationEvent>, clip_ms: f64) -> Self {
        Self {
            clip_ms,
            now_ms: 0.0,
            inbox,
            pending: TimerQueue::new(),
            playing: AHashMap::new(),
            plays: 0,
        }
    }

    /// Moves the clock and reports every attack clip that has finished.
    ///
    /// A clip replaced before it finished never completes.
    pub fn advance(&mut self, now_ms: f64) {
        self.now_ms = now_ms;
        for event in self.pending.take_due(now_ms) {
            if self.playing.get(&event.entity) == Some(&event.key) {
                trace!(entity = %event.entity, "clip completed");
                self.report(event);
            }
        }
    }

    /// Number of clips started so far.
    #[must_use]
    pub fn plays(&self) -> usize {
        self.plays
    }

    fn report(&self, event: AnimationEvent) {
        // receiver lives in the battle manager for the whole run
        let _ = self.inbox.send(event);
    }
}

impl AnimationPlayer for ScriptedAnimator {
    fn exists(&self, _name: &str) -> bool {
        true
    }

    fn play(&mut self, entity: EntityId, key: AnimationKey, _clip: &AnimationClip, _flip_x: bool) {
        self.plays += 1;
        self.playing.insert(entity, key);
        if key.action == AnimationAction::Attack {
            self.report(AnimationEvent::started(entity, key));
            self.pending
                .schedule(self.now_ms + self.clip_ms, AnimationEvent::completed(entity, key));
        }
    }
}

/// Pathfinder that walks straight at the goal through a midpoint.
#[derive(Debug, Default)]
pub struct StraightLinePathfinder {
    requests: usize,
}

impl StraightLinePathfinder {
    /// Number of searches served.
    #[must_use]
    pub fn requests(&self) -> usize {
        self.requests
    }
}

impl Pathfinder for StraightLinePathfinder {
    fn find_path(&mut self, from: Vec2, to: Vec2, request: PathRequest) {
        self.requests += 1;
        request.respond(Some(vec![from, from.lerp(to, 0.5), to]));
    }
}

/// Sight limited only by distance.
#[derive(Debug, Clone, Copy)]
pub struct OpenField {
    /// Farthest visible distance
    pub sight_distance: f32,
}

impl LineOfSight for OpenField {
    fn is_visible(&self, from: Vec2, to: Vec2) -> bool {
        from.distance(to) <= self.sight_distance
    }
}

/// Pickup spawner that only records.
#[derive(Debug, Default)]
pub struct PickupLog {
    /// Spawned pickups, in order
    pub spawned: Vec<(ItemTypeId, Vec2)>,
}

impl PickupSpawner for PickupLog {
    fn spawn_pickup(&mut self, item: ItemTypeId, at: Vec2) {
        self.spawned.push((item, at));
    }
}
