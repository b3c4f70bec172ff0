//! foodfight - side-scrolling combat and stage core
//!
//! Actors with health, invincibility windows and Stand/Walk/Jump movement;
//! weapons driven by an Idle/Active/CoolingDown state machine; stages built
//! from tile grids and kept in draw order.
//!
//! This library exposes the core game modules for testing and reuse.

pub mod actor;
pub mod audio;
pub mod cli;
pub mod clock;
pub mod collision;
pub mod combat;
pub mod headless;
pub mod rng;
pub mod settings;
pub mod simulation;
pub mod stage;

// Re-export commonly used types
pub use actor::{Actor, ActorKind, Faction, MovementState};
pub use combat::ability::{Ability, AbilityKind, AbilityState};
pub use combat::log::{CombatLog, CombatLogEventType};
pub use headless::HeadlessRunConfig;
pub use simulation::SimulationPlugin;
pub use stage::{Stage, StageError};
