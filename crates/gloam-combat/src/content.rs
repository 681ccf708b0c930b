//! Enemy and item definitions.
//!
//! Definitions are authored in RON and loaded into a [`ContentRegistry`] at
//! level load. A spawner that references an unknown enemy or an enemy that
//! drops an unknown item gets a [`ContentError`]; these are content defects
//! and are not recovered from at runtime.

use ahash::AHashMap;
use gloam_common::{GloamError, ItemTypeId, Vec2};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::drops::{DropEntry, DropTable};
use crate::entity::CombatStats;

/// Upper bound for authored attack and defense.
pub const MAX_STAT: i32 = 100_000;

/// Errors raised while loading or looking up content.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ContentError {
    /// No enemy definition with this id.
    #[error("Unknown enemy definition: {0}")]
    UnknownEnemy(String),

    /// No item definition with this id.
    #[error("Unknown item {item} referenced by {referenced_by}")]
    UnknownItem {
        /// Missing item
        item: ItemTypeId,
        /// Definition that referenced it
        referenced_by: String,
    },

    /// Two enemies share an id.
    #[error("Duplicate enemy id: {0}")]
    DuplicateEnemy(String),

    /// Two items share an id.
    #[error("Duplicate item id: {0}")]
    DuplicateItem(ItemTypeId),

    /// A field holds an unusable value.
    #[error("Invalid definition {id}: {reason}")]
    Invalid {
        /// Definition id
        id: String,
        /// What is wrong
        reason: String,
    },

    /// The RON source could not be parsed.
    #[error("Failed to parse content: {0}")]
    Parse(String),
}

/// Result type for content operations.
pub type ContentResult<T> = Result<T, ContentError>;

impl From<ContentError> for GloamError {
    fn from(err: ContentError) -> Self {
        GloamError::Content(err.to_string())
    }
}

/// Authoring data for one enemy kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnemyDefinition {
    /// Unique id referenced by spawners
    pub id: String,
    /// Display name
    #[serde(default)]
    pub name: String,
    /// Sprite sheet the animation clips belong to
    pub texture: String,
    /// Combat stats
    #[serde(default)]
    pub stats: CombatStats,
    /// Perception radius; the configured default when absent
    #[serde(default)]
    pub perception_range: Option<f32>,
    /// Half extents of the movement collider
    #[serde(default = "default_body")]
    pub body: (f32, f32),
    /// Half extents of the hit zone
    #[serde(default = "default_hit_zone")]
    pub hit_zone: (f32, f32),
    /// Loot
    #[serde(default)]
    pub drops: Vec<DropEntry>,
}

fn default_body() -> (f32, f32) {
    (8.0, 8.0)
}

fn default_hit_zone() -> (f32, f32) {
    (6.0, 6.0)
}

impl EnemyDefinition {
    /// Movement collider half extents.
    #[must_use]
    pub fn body_half_extents(&self) -> Vec2 {
        Vec2::new(self.body.0, self.body.1)
    }

    /// Hit zone half extents.
    #[must_use]
    pub fn hit_zone_half_extents(&self) -> Vec2 {
        Vec2::new(self.hit_zone.0, self.hit_zone.1)
    }

    /// Drop table built from the entries.
    #[must_use]
    pub fn drop_table(&self) -> DropTable {
        DropTable::new(self.drops.clone())
    }

    /// Checks values that do not depend on other definitions.
    pub fn validate(&self) -> ContentResult<()> {
        let invalid = |reason: String| ContentError::Invalid {
            id: self.id.clone(),
            reason,
        };

        if self.id.is_empty() {
            return Err(invalid("empty id".to_string()));
        }
        if self.texture.is_empty() {
            return Err(invalid("empty texture".to_string()));
        }
        if self.stats.max_health <= 0 {
            return Err(invalid(format!(
                "max_health must be positive, got {}",
                self.stats.max_health
            )));
        }
        for (stat, value) in [("attack", self.stats.attack), ("defense", self.stats.defense)] {
            if !(0..=MAX_STAT).contains(&value) {
                return Err(invalid(format!("{stat} must be 0-{MAX_STAT}, got {value}")));
            }
        }
        if !(0.0..=100.0).contains(&self.stats.critical) {
            return Err(invalid(format!(
                "critical must be 0-100, got {}",
                self.stats.critical
            )));
        }
        if let Some(range) = self.perception_range {
            if !range.is_finite() || range < 0.0 {
                return Err(invalid(format!("perception_range {range}")));
            }
        }
        for drop in &self.drops {
            if !(0.0..=100.0).contains(&drop.chance) {
                return Err(invalid(format!(
                    "drop chance for {} must be 0-100, got {}",
                    drop.item, drop.chance
                )));
            }
        }
        Ok(())
    }
}

/// Authoring data for one item kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemDefinition {
    /// Unique id
    pub id: ItemTypeId,
    /// Display name
    pub name: String,
}

/// Top-level layout of a content file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ContentFile {
    /// Items
    #[serde(default)]
    pub items: Vec<ItemDefinition>,
    /// Enemies
    #[serde(default)]
    pub enemies: Vec<EnemyDefinition>,
}

/// Lookup of all loaded definitions.
#[derive(Debug, Clone, Default)]
pub struct ContentRegistry {
    enemies: AHashMap<String, EnemyDefinition>,
    items: AHashMap<ItemTypeId, ItemDefinition>,
}

impl ContentRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses RON content and validates it.
    pub fn from_ron(source: &str) -> ContentResult<Self> {
        let file: ContentFile =
            ron::from_str(source).map_err(|e| ContentError::Parse(e.to_string()))?;
        Self::from_file(file)
    }

    /// Registers every definition of `file` and validates the result.
    pub fn from_file(file: ContentFile) -> ContentResult<Self> {
        let mut registry = Self::new();
        for item in file.items {
            registry.register_item(item)?;
        }
        for enemy in file.enemies {
            registry.register_enemy(enemy)?;
        }
        registry.validate()?;
        debug!(
            enemies = registry.enemies.len(),
            items = registry.items.len(),
            "content loaded"
        );
        Ok(registry)
    }

    /// Adds an item definition.
    pub fn register_item(&mut self, item: ItemDefinition) -> ContentResult<()> {
        if self.items.contains_key(&item.id) {
            return Err(ContentError::DuplicateItem(item.id));
        }
        self.items.insert(item.id, item);
        Ok(())
    }

    /// Adds an enemy definition.
    pub fn register_enemy(&mut self, enemy: EnemyDefinition) -> ContentResult<()> {
        enemy.validate()?;
        if self.enemies.contains_key(&enemy.id) {
            return Err(ContentError::DuplicateEnemy(enemy.id));
        }
        self.enemies.insert(enemy.id.clone(), enemy);
        Ok(())
    }

    /// Checks that every drop references a known item.
    pub fn validate(&self) -> ContentResult<()> {
        for enemy in self.enemies.values() {
            for drop in &enemy.drops {
                self.item(drop.item).map_err(|_| ContentError::UnknownItem {
                    item: drop.item,
                    referenced_by: enemy.id.clone(),
                })?;
            }
        }
        Ok(())
    }

    /// Looks up an enemy definition.
    pub fn enemy(&self, id: &str) -> ContentResult<&EnemyDefinition> {
        self.enemies
            .get(id)
            .ok_or_else(|| ContentError::UnknownEnemy(id.to_string()))
    }

    /// Looks up an item definition.
    pub fn item(&self, id: ItemTypeId) -> ContentResult<&ItemDefinition> {
        self.items.get(&id).ok_or(ContentError::UnknownItem {
            item: id,
            referenced_by: String::from("lookup"),
        })
    }

    /// Iterates enemy definitions.
    pub fn enemies(&self) -> impl Iterator<Item = &EnemyDefinition> {
        self.enemies.values()
    }

    /// Number of enemy definitions.
    #[must_use]
    pub fn enemy_count(&self) -> usize {
        self.enemies.len()
    }

    /// Number of item definitions.
    #[must_use]
    pub fn item_count(&self) -> usize {
        self.items.len()
    }
}
