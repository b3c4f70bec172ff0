//! JSON configuration parsing for headless mode
//!
//! Parses JSON run configurations and checks them against the stage
//! directory and the weapon catalog before anything is spawned.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::combat::ability::AbilityKind;

/// Headless run configuration loaded from JSON
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeadlessRunConfig {
    /// Stage name, resolved as `<stage_dir>/<stage>.ron` (default: "candy_lane")
    #[serde(default = "default_stage")]
    pub stage: String,
    /// Directory holding stage files (default: "assets/stages")
    #[serde(default = "default_stage_dir")]
    pub stage_dir: PathBuf,
    /// Weapon handed to the player (default: "BurgerPunch")
    #[serde(default = "default_player_weapon")]
    pub player_weapon: String,
    /// Maximum run duration in seconds of simulated time (default: 120)
    #[serde(default = "default_max_duration")]
    pub max_duration_secs: f32,
    /// Random seed for deterministic run reproduction
    #[serde(default)]
    pub random_seed: Option<u64>,
    /// Upper bound for heals; absent leaves health uncapped
    #[serde(default)]
    pub health_cap: Option<f32>,
    /// Custom output path for the combat log (optional)
    #[serde(default)]
    pub output_path: Option<String>,
    /// Fixed simulation step in milliseconds (default: 16)
    #[serde(default = "default_frame_step")]
    pub frame_step_ms: u64,
}

fn default_stage() -> String {
    "candy_lane".to_string()
}

fn default_stage_dir() -> PathBuf {
    PathBuf::from("assets/stages")
}

fn default_player_weapon() -> String {
    "BurgerPunch".to_string()
}

fn default_max_duration() -> f32 {
    120.0
}

fn default_frame_step() -> u64 {
    16
}

impl Default for HeadlessRunConfig {
    fn default() -> Self {
        Self {
            stage: default_stage(),
            stage_dir: default_stage_dir(),
            player_weapon: default_player_weapon(),
            max_duration_secs: default_max_duration(),
            random_seed: None,
            health_cap: None,
            output_path: None,
            frame_step_ms: default_frame_step(),
        }
    }
}

impl HeadlessRunConfig {
    /// Load configuration from a JSON file
    pub fn load_from_file(path: &Path) -> Result<Self, String> {
        let contents =
            std::fs::read_to_string(path).map_err(|e| format!("Failed to read config file: {}", e))?;
        Self::from_json(&contents)
    }

    /// Parse and validate a JSON document
    pub fn from_json(contents: &str) -> Result<Self, String> {
        let config: HeadlessRunConfig =
            serde_json::from_str(contents).map_err(|e| format!("Failed to parse JSON: {}", e))?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.stage.trim().is_empty() {
            return Err("stage must not be empty".to_string());
        }

        self.weapon()?;

        if self.max_duration_secs <= 0.0 {
            return Err("max_duration_secs must be positive".to_string());
        }

        if self.frame_step_ms == 0 {
            return Err("frame_step_ms must be at least 1".to_string());
        }

        if let Some(cap) = self.health_cap {
            if cap <= 0.0 {
                return Err(format!("health_cap must be positive, got {}", cap));
            }
        }

        Ok(())
    }

    /// The player's weapon as a catalog key
    pub fn weapon(&self) -> Result<AbilityKind, String> {
        AbilityKind::parse(&self.player_weapon)
    }

    /// Run length in milliseconds of simulated time
    pub fn max_duration_ms(&self) -> u64 {
        (self.max_duration_secs * 1000.0) as u64
    }
}
