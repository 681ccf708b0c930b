//! Animation keys, clip lookup and facing resolution.
//!
//! Clip names follow the `"{texture}-{action}-{direction}"` convention of
//! the sprite sheets (or `"{texture}-{action}"` for clips without a
//! direction). The names are resolved once, when an entity's
//! [`AnimationTable`] is built, and everything afterwards works on
//! [`AnimationKey`]s.

use ahash::AHashMap;
use gloam_common::{EntityId, Vec2};
use serde::{Deserialize, Serialize};

/// Cardinal facing direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    /// Toward -Y
    Up,
    /// Toward +Y
    Down,
    /// Toward -X
    Left,
    /// Toward +X
    Right,
}

impl Direction {
    /// All directions.
    pub const ALL: [Self; 4] = [Self::Up, Self::Down, Self::Left, Self::Right];

    /// Clip name suffix.
    #[must_use]
    pub const fn suffix(self) -> &'static str {
        match self {
            Self::Up => "up",
            Self::Down => "down",
            Self::Left => "left",
            Self::Right => "right",
        }
    }

    /// Hitbox rotation in degrees for this facing.
    #[must_use]
    pub const fn rotation_degrees(self) -> f32 {
        match self {
            Self::Right => 0.0,
            Self::Down => 90.0,
            Self::Left => 180.0,
            Self::Up => -90.0,
        }
    }

    /// Returns true for left and right.
    #[must_use]
    pub const fn is_horizontal(self) -> bool {
        matches!(self, Self::Left | Self::Right)
    }

    /// Dominant direction of a movement vector. Ties favour the horizontal axis.
    #[must_use]
    pub fn from_vector(v: Vec2) -> Option<Self> {
        if v.x == 0.0 && v.y == 0.0 {
            return None;
        }
        Some(if v.x.abs() >= v.y.abs() {
            if v.x < 0.0 {
                Self::Left
            } else {
                Self::Right
            }
        } else if v.y < 0.0 {
            Self::Up
        } else {
            Self::Down
        })
    }
}

/// What an animation shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AnimationAction {
    /// Standing still
    Idle,
    /// Walking
    Walk,
    /// Attack swing
    Attack,
}

impl AnimationAction {
    /// All actions.
    pub const ALL: [Self; 3] = [Self::Idle, Self::Walk, Self::Attack];

    /// Clip name segment.
    #[must_use]
    pub const fn segment(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Walk => "walk",
            Self::Attack => "attack",
        }
    }
}

/// Typed animation identity: action plus optional direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AnimationKey {
    /// What the clip shows
    pub action: AnimationAction,
    /// Direction baked into the clip, if any
    pub direction: Option<Direction>,
}

impl AnimationKey {
    /// Creates a directional key.
    #[must_use]
    pub const fn new(action: AnimationAction, direction: Direction) -> Self {
        Self {
            action,
            direction: Some(direction),
        }
    }

    /// Creates a key for a clip without direction.
    #[must_use]
    pub const fn undirected(action: AnimationAction) -> Self {
        Self {
            action,
            direction: None,
        }
    }
}

/// A playable clip resolved from the sprite sheet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnimationClip {
    /// Clip name as known to the animation player
    pub name: String,
    /// Whether the clip must be mirrored horizontally
    pub flip_x: bool,
}

/// Lookup from [`AnimationKey`] to clip, built once per texture.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AnimationTable {
    texture: String,
    clips: AHashMap<AnimationKey, AnimationClip>,
}

impl AnimationTable {
    /// Builds the table by probing which clips exist.
    ///
    /// A missing left-facing clip is filled with the right-facing clip
    /// mirrored horizontally.
    pub fn build(texture: &str, exists: impl Fn(&str) -> bool) -> Self {
        let mut clips = AHashMap::new();

        for action in AnimationAction::ALL {
            let undirected = format!("{texture}-{}", action.segment());
            if exists(&undirected) {
                clips.insert(
                    AnimationKey::undirected(action),
                    AnimationClip {
                        name: undirected,
                        flip_x: false,
                    },
                );
            }

            for direction in Direction::ALL {
                let name = format!("{texture}-{}-{}", action.segment(), direction.suffix());
                if exists(&name) {
                    clips.insert(
                        AnimationKey::new(action, direction),
                        AnimationClip {
                            name,
                            flip_x: false,
                        },
                    );
                }
            }

            let left = AnimationKey::new(action, Direction::Left);
            let right = AnimationKey::new(action, Direction::Right);
            if !clips.contains_key(&left) {
                if let Some(clip) = clips.get(&right) {
                    let mirrored = AnimationClip {
                        name: clip.name.clone(),
                        flip_x: true,
                    };
                    clips.insert(left, mirrored);
                }
            }
        }

        Self {
            texture: texture.to_string(),
            clips,
        }
    }

    /// Texture the table was built for.
    #[must_use]
    pub fn texture(&self) -> &str {
        &self.texture
    }

    /// Looks up an exact key.
    #[must_use]
    pub fn get(&self, key: AnimationKey) -> Option<&AnimationClip> {
        self.clips.get(&key)
    }

    /// Finds the best clip for an action, preferring the requested direction
    /// and falling back to the undirected clip.
    #[must_use]
    pub fn resolve(
        &self,
        action: AnimationAction,
        facing: Option<Direction>,
    ) -> Option<(AnimationKey, &AnimationClip)> {
        facing
            .map(|direction| AnimationKey::new(action, direction))
            .and_then(|key| self.clips.get(&key).map(|clip| (key, clip)))
            .or_else(|| {
                let key = AnimationKey::undirected(action);
                self.clips.get(&key).map(|clip| (key, clip))
            })
    }

    /// Number of resolved clips.
    #[must_use]
    pub fn len(&self) -> usize {
        self.clips.len()
    }

    /// Returns true if no clip was found for the texture.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.clips.is_empty()
    }
}

/// The animation an entity is currently showing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnimationState {
    /// Key of the clip being played
    pub current: Option<AnimationKey>,
    /// Horizontal mirror flag of the sprite
    pub flip_x: bool,
    /// Last direction asked for when a clip was started
    pub heading: Option<Direction>,
}

impl AnimationState {
    /// Resolves the facing used to aim hitboxes.
    ///
    /// The direction baked into the current clip wins, then the last
    /// requested heading. A mirrored sprite with neither faces left.
    /// Anything else is unresolved.
    #[must_use]
    pub fn facing(&self) -> Option<Direction> {
        self.current
            .and_then(|key| key.direction)
            .or(self.heading)
            .or_else(|| self.flip_x.then_some(Direction::Left))
    }

    /// Records that `clip` started playing for `key`.
    ///
    /// Undirected clips keep their mirror flag driven by the requested
    /// horizontal direction.
    pub fn set_playing(
        &mut self,
        key: AnimationKey,
        clip: &AnimationClip,
        requested: Option<Direction>,
    ) {
        self.current = Some(key);
        if requested.is_some() {
            self.heading = requested;
        }
        if key.direction.is_some() {
            self.flip_x = clip.flip_x;
        } else {
            match requested {
                Some(Direction::Left) => self.flip_x = true,
                Some(Direction::Right) => self.flip_x = false,
                _ => {},
            }
        }
    }
}

/// Playback milestone reported by the animation player.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AnimationEventKind {
    /// First frame shown
    Started,
    /// Last frame finished
    Completed,
}

/// An animation milestone for one entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnimationEvent {
    /// Entity whose animation reached the milestone
    pub entity: EntityId,
    /// Animation that reached the milestone
    pub key: AnimationKey,
    /// Which milestone
    pub kind: AnimationEventKind,
}

impl AnimationEvent {
    /// Animation started.
    #[must_use]
    pub const fn started(entity: EntityId, key: AnimationKey) -> Self {
        Self {
            entity,
            key,
            kind: AnimationEventKind::Started,
        }
    }

    /// Animation completed.
    #[must_use]
    pub const fn completed(entity: EntityId, key: AnimationKey) -> Self {
        Self {
            entity,
            key,
            kind: AnimationEventKind::Completed,
        }
    }
}
