//! foodfight - side-scrolling food fight simulator
//!
//! Loads a stage, drives the player with the autopilot and reports how the
//! run ended.

use foodfight::cli;
use foodfight::headless::run_headless;

fn main() {
    let args = cli::parse_args();

    let config = match args.to_run_config() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Invalid configuration: {}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = run_headless(config) {
        eprintln!("Run failed: {}", e);
        std::process::exit(1);
    }
}
