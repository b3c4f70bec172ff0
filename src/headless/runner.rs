//! Headless run execution
//!
//! Runs a stage without any graphical output, suitable for automated testing.
//! The clock advances by a fixed step per frame and the RNG is seeded when a
//! seed is given, so the same config always replays the same run.

use bevy::log::LogPlugin;
use bevy::prelude::*;
use std::path::Path;

use crate::actor::behavior::{apply_player_intent, autopilot_player};
use crate::actor::{Actor, Enemy, Player};
use crate::clock::{ClockMode, GameClock};
use crate::combat::ability_config::{load_ability_definitions, AbilityDefinitions, ABILITIES_PATH};
use crate::combat::log::{CombatLog, CombatLogEventType};
use crate::rng::GameRng;
use crate::settings::GameSettings;
use crate::simulation::{flush_despawn_queue, SimulationPhase, SimulationPlugin};
use crate::stage::{FileTileSource, PlayerLoadout, Stage};

use super::config::HeadlessRunConfig;

/// How a headless run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    /// Every enemy on the stage was destroyed
    Victory,
    /// The player was destroyed
    Defeat,
    /// Neither happened before the time limit
    Timeout,
}

/// Result of a completed headless run
///
/// This struct provides programmatic access to run results for testing and analysis.
#[derive(Debug, Clone, PartialEq)]
pub struct RunResult {
    pub outcome: RunOutcome,
    /// Simulated time at the end of the run
    pub elapsed_ms: u64,
    /// Player health at the end (0 if dead)
    pub player_health: f32,
    /// Enemies still standing
    pub enemies_remaining: usize,
    /// Total damage the player dealt
    pub player_damage_dealt: f32,
    /// Total damage the player took
    pub player_damage_taken: f32,
    /// Random seed used (if deterministic mode)
    pub random_seed: Option<u64>,
}

/// Resource to track headless run state
#[derive(Resource, Debug)]
pub struct HeadlessRunState {
    /// Simulated time after which the run is declared a timeout
    pub max_duration_ms: u64,
    /// Custom output path for the combat log
    pub output_path: Option<String>,
    /// Whether the run has completed
    pub complete: bool,
    /// Random seed for deterministic simulation (if provided)
    pub random_seed: Option<u64>,
    /// Run result (populated when the run completes)
    pub result: Option<RunResult>,
}

/// Decide whether the run is over. Runs after the Stage phase and before
/// queued despawns are applied, so dying actors are still visible.
pub fn check_run_end(
    clock: Res<GameClock>,
    players: Query<&Actor, With<Player>>,
    enemies: Query<&Actor, With<Enemy>>,
    mut combat_log: ResMut<CombatLog>,
    mut state: ResMut<HeadlessRunState>,
) {
    if state.complete {
        return;
    }

    let player = players.get_single().ok();
    let player_alive = player.is_some_and(|p| !p.is_destroy_scheduled());
    let enemies_remaining = enemies.iter().filter(|e| !e.is_destroy_scheduled()).count();
    let now = clock.now_ms();

    let outcome = if !player_alive {
        RunOutcome::Defeat
    } else if enemies_remaining == 0 {
        RunOutcome::Victory
    } else if now >= state.max_duration_ms {
        RunOutcome::Timeout
    } else {
        return;
    };

    match outcome {
        RunOutcome::Victory => info!("Run ended at {}ms: stage cleared!", now),
        RunOutcome::Defeat => info!("Run ended at {}ms: player was destroyed", now),
        RunOutcome::Timeout => info!(
            "Run timed out after {}ms with {} enemies left",
            now, enemies_remaining
        ),
    }
    combat_log.log(CombatLogEventType::StageEvent, format!("Run ended: {:?}", outcome));

    let player_name = crate::actor::ActorKind::Player.name();
    state.result = Some(RunResult {
        outcome,
        elapsed_ms: now,
        player_health: player.map_or(0.0, |p| p.health().max(0.0)),
        enemies_remaining,
        player_damage_dealt: combat_log.damage_by_ability(player_name).values().sum(),
        player_damage_taken: combat_log.damage_taken(player_name),
        random_seed: state.random_seed,
    });
    state.complete = true;
}

/// Plugin for headless run execution
pub struct HeadlessPlugin {
    pub config: HeadlessRunConfig,
}

impl Plugin for HeadlessPlugin {
    fn build(&self, app: &mut App) {
        app.insert_resource(HeadlessRunState {
            max_duration_ms: self.config.max_duration_ms(),
            output_path: self.config.output_path.clone(),
            complete: false,
            random_seed: self.config.random_seed,
            result: None,
        })
        .add_systems(
            Update,
            autopilot_player
                .in_set(SimulationPhase::Actors)
                .before(apply_player_intent)
                .run_if(resource_exists::<Stage>),
        )
        .add_systems(
            Update,
            check_run_end
                .after(SimulationPhase::Stage)
                .before(flush_despawn_queue),
        );
    }
}

/// Build a ready-to-step app for `config`.
///
/// Fails when the config names an unknown weapon or the stage cannot be
/// loaded. Nothing is spawned until the first `update`.
pub fn build_headless_app(config: &HeadlessRunConfig) -> Result<App, String> {
    config.validate()?;
    let weapon = config.weapon()?;

    let source = FileTileSource::new(&config.stage_dir);
    let stage = Stage::load(&source, &config.stage).map_err(|e| format!("Failed to load stage: {}", e))?;

    let game_rng = match config.random_seed {
        Some(seed) => {
            info!("Using deterministic RNG with seed: {}", seed);
            GameRng::from_seed(seed)
        }
        None => {
            info!("Using non-deterministic RNG (no seed provided)");
            GameRng::from_entropy()
        }
    };

    let settings = GameSettings {
        health_cap: config.health_cap,
        frame_step_ms: config.frame_step_ms,
        ..GameSettings::load()
    };

    let definitions = load_ability_definitions(Path::new(ABILITIES_PATH)).unwrap_or_else(|e| {
        warn!("{}, using the built-in ability catalog", e);
        AbilityDefinitions::default()
    });

    let mut app = App::new();
    app.add_plugins(MinimalPlugins)
        .insert_resource(ClockMode::Fixed {
            step_ms: config.frame_step_ms,
        })
        .insert_resource(settings)
        .insert_resource(game_rng)
        .insert_resource(definitions)
        .insert_resource(PlayerLoadout { weapon })
        .add_plugins(SimulationPlugin)
        .add_plugins(HeadlessPlugin { config: config.clone() })
        .insert_resource(stage);

    Ok(app)
}

/// Step `app` until [`HeadlessRunState`] reports completion. The time limit
/// guarantees this returns.
pub fn step_until_complete(app: &mut App) -> RunResult {
    loop {
        app.update();
        if let Some(result) = app.world().resource::<HeadlessRunState>().result.clone() {
            return result;
        }
    }
}

/// Run a headless stage with the given configuration
pub fn run_headless(config: HeadlessRunConfig) -> Result<RunResult, String> {
    println!("Starting headless run...");
    println!("  Stage: {} ({})", config.stage, config.stage_dir.display());
    println!("  Weapon: {}", config.player_weapon);
    println!("  Max duration: {:.0}s", config.max_duration_secs);

    let mut app = build_headless_app(&config)?;
    app.add_plugins(LogPlugin::default());
    app.finish();
    app.cleanup();

    let result = step_until_complete(&mut app);

    if let Some(path) = config.output_path.as_deref() {
        app.world().resource::<CombatLog>().save_to_file(Path::new(path))?;
        println!("Combat log saved to: {}", path);
    }

    println!(
        "Run complete: {:?} after {:.1}s (player health {:.0}, {} enemies left)",
        result.outcome,
        result.elapsed_ms as f32 / 1000.0,
        result.player_health,
        result.enemies_remaining
    );
    Ok(result)
}
