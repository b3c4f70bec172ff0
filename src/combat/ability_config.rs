//! Data-Driven Ability Catalog
//!
//! Every weapon the game knows about is described in `assets/config/abilities.ron`:
//! damage, timing windows, spawn geometry, whether the action produces a melee
//! hitbox or a projectile, and the sound cue played on activation.
//!
//! The catalog is a tagged-variant registry: an [`AbilityKind`] maps to a
//! construction recipe, and [`Ability::from_config`](super::ability::Ability::from_config)
//! turns the recipe into a live component.
//!
//! ## Usage
//! ```ignore
//! fn my_system(abilities: Res<AbilityDefinitions>) {
//!     let def = abilities.get(&AbilityKind::BurgerPunch).unwrap();
//!     println!("Burger Punch cooldown: {:?}", def.cooldown);
//! }
//! ```

use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

use super::ability::{AbilityKind, SpawnOffset};
use crate::audio::SoundCue;
use crate::rng::GameRng;

/// Catalog compiled into the binary, used when no file is given
const BUILTIN_ABILITIES: &str = include_str!("../../assets/config/abilities.ron");

/// Default location of the editable catalog
pub const ABILITIES_PATH: &str = "assets/config/abilities.ron";

/// A duration in milliseconds, either fixed or drawn once from a uniform range.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum TimingSpec {
    Fixed(u64),
    /// Uniform draw from `[min, max)`, made once when the ability is created
    Uniform { min: u64, max: u64 },
}

impl TimingSpec {
    pub fn draw(&self, rng: &mut GameRng) -> u64 {
        match *self {
            TimingSpec::Fixed(ms) => ms,
            TimingSpec::Uniform { min, max } => rng.range_u64(min, max),
        }
    }

    pub fn is_valid(&self) -> bool {
        match *self {
            TimingSpec::Fixed(_) => true,
            TimingSpec::Uniform { min, max } => min <= max,
        }
    }
}

/// How a ranged ability picks the direction of its projectile
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Aim {
    /// Straight at the player's current position
    Tracking,
    /// Along the owner's facing
    Facing,
}

/// What an activation produces.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum EffectConfig {
    /// A static damage zone that lives for the active window
    Melee {
        /// Width and height in pixels
        hitbox: [f32; 2],
    },
    /// A moving damage carrier with its own lifetime
    Projectile {
        /// Pixels per millisecond
        speed: f32,
        size: [f32; 2],
        aim: Aim,
        /// Projectiles leave this many pixels above the owner's position
        launch_height: f32,
    },
}

/// One catalog entry
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AbilityConfig {
    /// Display name used in logs
    pub name: String,
    pub damage: f32,
    pub active_duration: TimingSpec,
    pub cooldown: TimingSpec,
    pub spawn: SpawnOffset,
    pub effect: EffectConfig,
    #[serde(default)]
    pub sound: Option<SoundCue>,
}

impl AbilityConfig {
    pub fn is_ranged(&self) -> bool {
        matches!(self.effect, EffectConfig::Projectile { .. })
    }
}

/// Root structure for the abilities.ron file
#[derive(Debug, Serialize, Deserialize)]
pub struct AbilitiesConfig {
    pub abilities: HashMap<AbilityKind, AbilityConfig>,
}

/// Resource containing all ability definitions.
///
/// Access via `Res<AbilityDefinitions>` in systems.
#[derive(Resource, Debug)]
pub struct AbilityDefinitions {
    definitions: HashMap<AbilityKind, AbilityConfig>,
}

impl Default for AbilityDefinitions {
    /// The catalog compiled into the binary.
    /// Panics if the embedded file is broken, which the test suite rules out.
    fn default() -> Self {
        Self::builtin().expect("Embedded ability catalog is invalid")
    }
}

impl AbilityDefinitions {
    /// Create from a loaded config
    pub fn new(config: AbilitiesConfig) -> Self {
        Self {
            definitions: config.abilities,
        }
    }

    /// Parse and validate a catalog from RON text
    pub fn from_ron(contents: &str) -> Result<Self, String> {
        let config: AbilitiesConfig =
            ron::from_str(contents).map_err(|e| format!("Failed to parse ability catalog: {}", e))?;
        let definitions = Self::new(config);
        definitions.validate()?;
        Ok(definitions)
    }

    /// The catalog compiled into the binary
    pub fn builtin() -> Result<Self, String> {
        Self::from_ron(BUILTIN_ABILITIES)
    }

    /// Get the configuration for an ability kind
    pub fn get(&self, kind: &AbilityKind) -> Option<&AbilityConfig> {
        self.definitions.get(kind)
    }

    /// Get the configuration for an ability kind, panicking if not found.
    /// Use this when you know the ability must exist (validated at startup).
    pub fn get_unchecked(&self, kind: &AbilityKind) -> &AbilityConfig {
        self.definitions
            .get(kind)
            .unwrap_or_else(|| panic!("Ability {:?} not found in definitions", kind))
    }

    /// Check that every kind is defined and every timing range is well formed
    pub fn validate(&self) -> Result<(), String> {
        let missing: Vec<AbilityKind> = AbilityKind::ALL
            .into_iter()
            .filter(|kind| !self.definitions.contains_key(kind))
            .collect();
        if !missing.is_empty() {
            return Err(format!("Missing ability definitions: {:?}", missing));
        }

        for (kind, config) in &self.definitions {
            if !config.active_duration.is_valid() || !config.cooldown.is_valid() {
                return Err(format!("{:?}: random timing range has min > max", kind));
            }
            if config.damage < 0.0 {
                return Err(format!("{:?}: damage cannot be negative", kind));
            }
            if let EffectConfig::Projectile { speed, .. } = config.effect {
                if speed <= 0.0 {
                    return Err(format!("{:?}: projectile speed must be positive", kind));
                }
            }
        }
        Ok(())
    }

    /// Get all ability kinds that are defined
    pub fn ability_kinds(&self) -> impl Iterator<Item = &AbilityKind> {
        self.definitions.keys()
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }
}

/// Load ability definitions from `path`
pub fn load_ability_definitions(path: &Path) -> Result<AbilityDefinitions, String> {
    let contents = std::fs::read_to_string(path)
        .map_err(|e| format!("Failed to read {}: {}", path.display(), e))?;

    let definitions = AbilityDefinitions::from_ron(&contents)
        .map_err(|e| format!("{}: {}", path.display(), e))?;

    info!("Loaded {} ability definitions from {}", definitions.len(), path.display());

    Ok(definitions)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_catalog_is_complete() {
        let defs = AbilityDefinitions::builtin().unwrap();
        assert_eq!(defs.len(), AbilityKind::ALL.len());
    }

    #[test]
    fn test_pizza_bite_timings_are_random_ranges() {
        let defs = AbilityDefinitions::default();
        let bite = defs.get_unchecked(&AbilityKind::PizzaBite);
        assert_eq!(bite.active_duration, TimingSpec::Uniform { min: 300, max: 1000 });
        assert_eq!(bite.cooldown, TimingSpec::Uniform { min: 1000, max: 2500 });
    }

    #[test]
    fn test_only_shooters_are_ranged() {
        let defs = AbilityDefinitions::default();
        for kind in AbilityKind::ALL {
            let ranged = matches!(kind, AbilityKind::SeedShooter | AbilityKind::MeatballShooter);
            assert_eq!(defs.get_unchecked(&kind).is_ranged(), ranged, "{:?}", kind);
        }
    }

    #[test]
    fn test_inverted_range_is_rejected() {
        let mut defs = AbilityDefinitions::default();
        if let Some(config) = defs.definitions.get_mut(&AbilityKind::BurgerPunch) {
            config.cooldown = TimingSpec::Uniform { min: 900, max: 100 };
        }
        assert!(defs.validate().is_err());
    }

    #[test]
    fn test_missing_kind_is_rejected() {
        let mut defs = AbilityDefinitions::default();
        defs.definitions.remove(&AbilityKind::PastaWhip);
        let err = defs.validate().unwrap_err();
        assert!(err.contains("PastaWhip"));
    }

    #[test]
    fn test_fixed_timing_ignores_rng() {
        let mut rng = GameRng::from_seed(3);
        assert_eq!(TimingSpec::Fixed(1500).draw(&mut rng), 1500);
    }
}
