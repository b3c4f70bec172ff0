//! Headless mode for automated testing
//!
//! This module runs a stage without any graphical output: the player is
//! driven by an autopilot, time advances by a fixed step and the run ends on
//! victory, defeat or timeout.
//!
//! ## Usage
//!
//! ```bash
//! # Run a headless stage
//! cargo run --release -- --config run_config.json
//! ```
//!
//! ## JSON Configuration
//!
//! ```json
//! {
//!   "stage": "candy_lane",
//!   "player_weapon": "BurgerPunch",
//!   "max_duration_secs": 120,
//!   "random_seed": 42
//! }
//! ```

pub mod config;
pub mod runner;

pub use config::HeadlessRunConfig;
pub use runner::{build_headless_app, run_headless, step_until_complete, RunOutcome, RunResult};
