//! Mock collaborators for unit tests.

use gloam_common::{EntityId, ItemTypeId, Vec2};

use crate::animation::{AnimationClip, AnimationKey, AnimationTable};
use crate::collaborators::{AnimationPlayer, LineOfSight, PathRequest, Pathfinder, PickupSpawner};

/// A clip handed to [`RecordingAnimator::play`].
#[derive(Debug, Clone, PartialEq)]
pub struct PlayedClip {
    pub entity: EntityId,
    pub key: AnimationKey,
    pub name: String,
    pub flip_x: bool,
}

/// Animator with a fixed clip list that records every play call.
#[derive(Debug, Default)]
pub struct RecordingAnimator {
    clips: Vec<String>,
    pub plays: Vec<PlayedClip>,
}

impl RecordingAnimator {
    pub fn with_clips(names: &[&str]) -> Self {
        Self {
            clips: names.iter().map(|n| (*n).to_string()).collect(),
            plays: Vec::new(),
        }
    }

    pub fn table(&self, texture: &str) -> AnimationTable {
        AnimationTable::build(texture, |name| self.exists(name))
    }

    pub fn last_play(&self) -> Option<&PlayedClip> {
        self.plays.last()
    }
}

impl AnimationPlayer for RecordingAnimator {
    fn exists(&self, name: &str) -> bool {
        self.clips.iter().any(|c| c == name)
    }

    fn play(&mut self, entity: EntityId, key: AnimationKey, clip: &AnimationClip, flip_x: bool) {
        self.plays.push(PlayedClip {
            entity,
            key,
            name: clip.name.clone(),
            flip_x,
        });
    }
}

/// Records spawned pickups.
#[derive(Debug, Default)]
pub struct RecordingPickups {
    pub spawned: Vec<(ItemTypeId, Vec2)>,
}

impl PickupSpawner for RecordingPickups {
    fn spawn_pickup(&mut self, item: ItemTypeId, at: Vec2) {
        self.spawned.push((item, at));
    }
}

/// Holds requests until the test answers them.
#[derive(Debug, Default)]
pub struct DeferredPathfinder {
    pub requests: Vec<(Vec2, Vec2, PathRequest)>,
}

impl DeferredPathfinder {
    /// Answers the oldest request.
    pub fn answer(&mut self, path: Option<Vec<Vec2>>) {
        if !self.requests.is_empty() {
            let (_, _, request) = self.requests.remove(0);
            request.respond(path);
        }
    }
}

impl Pathfinder for DeferredPathfinder {
    fn find_path(&mut self, from: Vec2, to: Vec2, request: PathRequest) {
        self.requests.push((from, to, request));
    }
}

/// Fixed visibility answer.
#[derive(Debug, Clone, Copy)]
pub struct FixedSight(pub bool);

impl LineOfSight for FixedSight {
    fn is_visible(&self, _from: Vec2, _to: Vec2) -> bool {
        self.0
    }
}
