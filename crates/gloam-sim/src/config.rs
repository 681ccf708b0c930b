//! Simulator configuration.
//!
//! Provides the encounter layout, pacing and combat tuning for a headless
//! run. Configuration can be loaded from and saved to a TOML file.

use gloam_combat::{CombatConfig, CombatStats, ConfigError};
use gloam_common::{GloamError, GloamResult, Vec2};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

/// Configuration file name.
const CONFIG_FILE: &str = "gloam.toml";

/// Where an enemy is placed at the start of a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpawnPoint {
    /// Enemy definition id
    pub enemy: String,
    /// World position
    pub position: [f32; 2],
}

impl SpawnPoint {
    /// Position as a vector.
    #[must_use]
    pub fn position(&self) -> Vec2 {
        Vec2::from(self.position)
    }
}

/// The scripted player.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerSetup {
    /// Sprite sheet
    pub texture: String,
    /// Start position
    pub position: [f32; 2],
    /// Raise the shield while an enemy winds up
    pub blocks: bool,
    /// Minimum time between swings (ms)
    pub attack_cooldown_ms: f64,
    /// Combat stats
    pub stats: CombatStats,
}

impl Default for PlayerSetup {
    fn default() -> Self {
        Self {
            texture: "hero".to_string(),
            position: [0.0, 0.0],
            blocks: true,
            attack_cooldown_ms: 450.0,
            stats: CombatStats {
                attack: 6,
                defense: 2,
                critical: 10.0,
                flee: 5.0,
                hit: 90.0,
                health: 60,
                max_health: 60,
                speed: 80.0,
                experience_reward: 0,
            },
        }
    }
}

/// Simulator configuration parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    // === Pacing ===
    /// Simulated time per tick (ms)
    pub tick_ms: f64,
    /// Run length before the encounter is called a timeout (ms)
    pub duration_ms: f64,
    /// RNG seed (None = random)
    pub seed: Option<u64>,

    // === Stand-in collaborators ===
    /// Length of every attack clip (ms)
    pub attack_clip_ms: f64,
    /// Maximum distance at which enemies can see the player
    pub sight_distance: f32,

    // === Content ===
    /// RON file with enemy and item definitions, relative to the config file
    pub content_path: PathBuf,

    // === Encounter ===
    /// The player
    pub player: PlayerSetup,
    /// Enemies placed at start
    pub spawns: Vec<SpawnPoint>,

    // === Combat ===
    /// Engine tuning
    pub combat: CombatConfig,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            // Pacing
            tick_ms: 16.0,
            duration_ms: 60_000.0,
            seed: None,

            // Stand-ins
            attack_clip_ms: 300.0,
            sight_distance: 250.0,

            // Content
            content_path: PathBuf::from("content/enemies.ron"),

            // Encounter
            player: PlayerSetup::default(),
            spawns: vec![
                SpawnPoint {
                    enemy: "slime".to_string(),
                    position: [80.0, 0.0],
                },
                SpawnPoint {
                    enemy: "bat".to_string(),
                    position: [-60.0, 90.0],
                },
            ],

            // Combat
            combat: CombatConfig::default(),
        }
    }
}

impl SimConfig {
    /// Loads the configuration at `path`.
    ///
    /// A missing file yields the defaults. A file that exists but cannot be
    /// read or parsed is an error, so a typo never silently runs the
    /// default encounter.
    pub fn load_from<P: AsRef<Path>>(path: P) -> GloamResult<Self> {
        let path = path.as_ref();
        if !path.exists() {
            info!(path = %path.display(), "no config file, using defaults");
            return Ok(Self::default());
        }

        let source = fs::read_to_string(path)?;
        let config = toml::from_str(&source)
            .map_err(|e| GloamError::Serialization(format!("{}: {e}", path.display())))?;
        info!(path = %path.display(), "config loaded");
        Ok(config)
    }

    /// Writes the configuration as pretty TOML, creating parent directories.
    pub fn save_to<P: AsRef<Path>>(&self, path: P) -> GloamResult<()> {
        let path = path.as_ref();
        let source = toml::to_string_pretty(self)
            .map_err(|e| GloamError::Serialization(e.to_string()))?;

        if let Some(parent) = path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, source)?;

        info!(path = %path.display(), "config saved");
        Ok(())
    }

    /// Get the default configuration file path.
    pub fn config_path() -> PathBuf {
        PathBuf::from(CONFIG_FILE)
    }

    /// Resolves `content_path` against the directory of the config file.
    #[must_use]
    pub fn content_path_from(&self, config_file: &Path) -> PathBuf {
        if self.content_path.is_absolute() {
            return self.content_path.clone();
        }
        config_file
            .parent()
            .map_or_else(|| self.content_path.clone(), |dir| dir.join(&self.content_path))
    }

    /// Clamps pacing values to sensible ranges and checks combat tuning.
    pub fn validate(&mut self) -> Result<(), ConfigError> {
        // Pacing
        self.tick_ms = self.tick_ms.clamp(1.0, 100.0);
        self.duration_ms = self.duration_ms.clamp(self.tick_ms, 3_600_000.0);

        // Stand-ins
        self.attack_clip_ms = self.attack_clip_ms.max(self.tick_ms);
        self.sight_distance = self.sight_distance.max(0.0);
        self.player.attack_cooldown_ms = self.player.attack_cooldown_ms.max(0.0);

        self.combat.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = SimConfig::default();
        assert_eq!(config.tick_ms, 16.0);
        assert_eq!(config.spawns.len(), 2);
        assert!(config.player.blocks);
        assert_eq!(config.combat, CombatConfig::default());
    }

    #[test]
    fn test_config_validation() {
        let mut config = SimConfig::default();
        config.tick_ms = 0.0;
        config.attack_clip_ms = 0.0;
        config.sight_distance = -5.0;

        config.validate().expect("combat tuning untouched");

        assert_eq!(config.tick_ms, 1.0);
        assert_eq!(config.attack_clip_ms, 1.0);
        assert_eq!(config.sight_distance, 0.0);
    }

    #[test]
    fn test_validation_rejects_bad_combat_tuning() {
        let mut config = SimConfig::default();
        config.combat.block_damage_reduction = 3.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_save_load() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let config_path = temp_dir.path().join("test_config.toml");

        let mut config = SimConfig::default();
        config.seed = Some(12345);
        config.player.blocks = false;
        config.combat.hitbox_length = 30.0;

        config.save_to(&config_path).expect("Failed to save config");

        let loaded = SimConfig::load_from(&config_path).expect("Failed to load config");
        assert_eq!(loaded.seed, Some(12345));
        assert!(!loaded.player.blocks);
        assert_eq!(loaded.combat.hitbox_length, 30.0);
        assert_eq!(loaded.spawns, config.spawns);
    }

    #[test]
    fn test_config_load_missing_file() {
        let config = SimConfig::load_from("/nonexistent/path/gloam.toml").expect("defaults");
        assert_eq!(config, SimConfig::default());
    }

    #[test]
    fn test_malformed_config_is_an_error() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let config_path = temp_dir.path().join("broken.toml");
        fs::write(&config_path, "tick_ms = \"fast\"\n[[spawns]]\n").expect("write");

        let err = SimConfig::load_from(&config_path).expect_err("type mismatch");
        assert!(matches!(err, GloamError::Serialization(_)));
        assert!(err.to_string().contains("broken.toml"));
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let config: SimConfig = toml::from_str(
            r#"
            tick_ms = 20.0

            [combat]
            variation_percent = 0.0
            "#,
        )
        .expect("valid toml");
        assert_eq!(config.tick_ms, 20.0);
        assert_eq!(config.combat.variation_percent, 0.0);
        assert_eq!(config.combat.hitbox_length, 24.0);
        assert_eq!(config.player, PlayerSetup::default());
    }

    #[test]
    fn test_content_path_is_relative_to_config() {
        let config = SimConfig::default();
        assert_eq!(
            config.content_path_from(Path::new("scenarios/arena.toml")),
            PathBuf::from("scenarios/content/enemies.ron")
        );
    }
}
