//! Loot rolled when an entity is torn down.

use gloam_common::{ItemTypeId, Vec2};
use serde::{Deserialize, Serialize};

use crate::rng::RandomSource;

/// One possible drop.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DropEntry {
    /// Item that drops
    pub item: ItemTypeId,
    /// Drop chance (0-100)
    pub chance: f32,
}

/// A pickup to spawn.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LootDrop {
    /// Item
    pub item: ItemTypeId,
    /// Spawn position
    pub position: Vec2,
}

/// Per-entity list of independent drop rolls.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DropTable {
    /// Entries, each rolled separately
    pub entries: Vec<DropEntry>,
}

impl DropTable {
    /// Creates a table from entries.
    #[must_use]
    pub fn new(entries: Vec<DropEntry>) -> Self {
        Self { entries }
    }

    /// Returns true if nothing can drop.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Rolls every entry and places the winners around `origin`.
    ///
    /// Each entry rolls `uniform(0, 100) * 100` and drops when the chance
    /// is at least the roll, or when the chance is 100. A chance of zero
    /// never drops.
    pub fn roll(&self, origin: Vec2, scatter: f32, rng: &mut dyn RandomSource) -> Vec<LootDrop> {
        let mut drops = Vec::new();
        for entry in &self.entries {
            if !rolls_drop(entry.chance, rng) {
                continue;
            }
            let offset = Vec2::new(rng.range(-scatter, scatter), rng.range(-scatter, scatter));
            drops.push(LootDrop {
                item: entry.item,
                position: origin + offset,
            });
        }
        drops
    }
}

/// Rolls a single drop chance.
pub fn rolls_drop(chance: f32, rng: &mut dyn RandomSource) -> bool {
    let roll = rng.range(0.0, 100.0) * 100.0;
    chance >= 100.0 || (chance > 0.0 && chance - roll >= 0.0)
}
