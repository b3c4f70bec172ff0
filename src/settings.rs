//! Game settings and configuration
//!
//! Tunables that are not part of the ability catalog: the optional health cap,
//! the fixed frame step, projectile culling margin and master volume.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// User-configurable simulation settings
#[derive(Resource, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameSettings {
    /// Upper bound applied by heals. `None` leaves health uncapped.
    pub health_cap: Option<f32>,
    /// Frame step used by the fixed-step clock, in milliseconds
    pub frame_step_ms: u64,
    /// How far outside the stage bounds a projectile may travel before it is culled
    pub projectile_margin: f32,
    /// Multiplier applied to every sound cue volume
    pub master_volume: f32,
}

impl Default for GameSettings {
    fn default() -> Self {
        Self {
            health_cap: None,
            frame_step_ms: 16,
            projectile_margin: 64.0,
            master_volume: 1.0,
        }
    }
}

impl GameSettings {
    /// Get the path to the settings file
    fn settings_path() -> PathBuf {
        PathBuf::from("settings.ron")
    }

    /// Load settings from `settings.ron`, or return defaults if the file doesn't exist
    pub fn load() -> Self {
        Self::load_from(&Self::settings_path())
    }

    /// Load settings from `path`, falling back to defaults on any problem
    pub fn load_from(path: &Path) -> Self {
        if !path.exists() {
            info!("No settings file found, using defaults");
            return Self::default();
        }
        match fs::read_to_string(path) {
            Ok(contents) => match ron::from_str(&contents) {
                Ok(settings) => {
                    info!("Loaded settings from {:?}", path);
                    settings
                }
                Err(e) => {
                    warn!("Failed to parse settings file: {}", e);
                    Self::default()
                }
            },
            Err(e) => {
                warn!("Failed to read settings file: {}", e);
                Self::default()
            }
        }
    }
}
