//! Command-line interface for foodfight
//!
//! Every run is headless. Flags override the matching fields of the JSON
//! config (or the defaults when no config is given).

use clap::Parser;
use std::path::PathBuf;

use crate::headless::HeadlessRunConfig;

/// Side-scrolling food fight simulator
#[derive(Parser, Debug)]
#[command(name = "foodfight")]
#[command(about = "Side-scrolling food fight simulator")]
#[command(version)]
pub struct Args {
    /// JSON run config file
    #[arg(long, value_name = "CONFIG_FILE")]
    pub config: Option<PathBuf>,

    /// Stage to load, by name
    #[arg(long, value_name = "STAGE")]
    pub stage: Option<String>,

    /// Output path for the combat log
    #[arg(long, value_name = "OUTPUT_PATH")]
    pub output: Option<PathBuf>,

    /// Maximum run duration in seconds
    #[arg(long)]
    pub max_duration: Option<f32>,

    /// Random seed for a reproducible run
    #[arg(long)]
    pub seed: Option<u64>,
}

impl Args {
    /// Load the config file (if any) and apply the flag overrides.
    pub fn to_run_config(&self) -> Result<HeadlessRunConfig, String> {
        let mut config = match &self.config {
            Some(path) => HeadlessRunConfig::load_from_file(path)?,
            None => HeadlessRunConfig::default(),
        };

        if let Some(stage) = &self.stage {
            config.stage = stage.clone();
        }
        if let Some(output) = &self.output {
            config.output_path = Some(output.to_string_lossy().to_string());
        }
        if let Some(max_duration) = self.max_duration {
            config.max_duration_secs = max_duration;
        }
        if self.seed.is_some() {
            config.random_seed = self.seed;
        }

        config.validate()?;
        Ok(config)
    }
}

pub fn parse_args() -> Args {
    Args::parse()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flags_override_defaults() {
        let args = Args::parse_from(["foodfight", "--stage", "pasta_pit", "--seed", "7", "--max-duration", "30"]);
        let config = args.to_run_config().unwrap();
        assert_eq!(config.stage, "pasta_pit");
        assert_eq!(config.random_seed, Some(7));
        assert_eq!(config.max_duration_secs, 30.0);
        assert_eq!(config.player_weapon, "BurgerPunch");
    }

    #[test]
    fn test_invalid_override_is_rejected() {
        let args = Args::parse_from(["foodfight", "--max-duration=-1"]);
        assert!(args.to_run_config().is_err());
    }
}
