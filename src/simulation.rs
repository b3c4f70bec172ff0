//! Frame ordering and deferred destruction
//!
//! ## Phase Ordering
//! One frame runs these phases in order:
//! 1. **Clock** - advance the millisecond clock
//! 2. **Actors** - intents and AI set velocities, then every actor updates
//!    (animation, movement state, movement, invincibility)
//! 3. **Abilities** - advance cooldown/active timers, then handle attack requests
//! 4. **Attacks** - hitboxes follow owners, projectiles move, overlaps are detected
//! 5. **Damage** - overlaps become damage, damage and heals are applied
//! 6. **Stage** - membership sync and draw-order sort
//!
//! Destruction requested anywhere in the frame is queued in [`DespawnQueue`]
//! and applied once, after the Stage phase.

use bevy::prelude::*;

use crate::actor::behavior::{apply_player_intent, drive_enemies, PlayerIntent};
use crate::actor::systems::update_actors;
use crate::audio::{dispatch_sound_requests, SoundLedger, SoundRequest};
use crate::clock::{tick_game_clock, ClockMode, GameClock};
use crate::combat::ability_config::AbilityDefinitions;
use crate::combat::log::CombatLog;
use crate::combat::CombatPlugin;
use crate::rng::GameRng;
use crate::settings::GameSettings;
use crate::stage::{Stage, StagePlugin};

/// System sets for the per-frame phases, chained in declaration order
#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub enum SimulationPhase {
    Clock,
    Actors,
    Abilities,
    Attacks,
    Damage,
    Stage,
}

/// Entities to destroy at the end of the frame
#[derive(Resource, Default, Debug)]
pub struct DespawnQueue {
    pending: Vec<Entity>,
}

impl DespawnQueue {
    /// Queue `entity`. Returns false if it was already queued.
    pub fn schedule(&mut self, entity: Entity) -> bool {
        if self.pending.contains(&entity) {
            return false;
        }
        self.pending.push(entity);
        true
    }

    pub fn contains(&self, entity: Entity) -> bool {
        self.pending.contains(&entity)
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn drain(&mut self) -> std::vec::Drain<'_, Entity> {
        self.pending.drain(..)
    }
}

/// Apply every queued despawn. Despawned entities also leave the stage's
/// child list so it never holds dead handles between frames.
pub fn flush_despawn_queue(
    mut commands: Commands,
    mut queue: ResMut<DespawnQueue>,
    stage: Option<ResMut<Stage>>,
) {
    if queue.is_empty() {
        return;
    }
    let doomed: Vec<Entity> = queue.drain().collect();
    if let Some(mut stage) = stage {
        stage.retain_children(|e| !doomed.contains(e));
    }
    for entity in doomed {
        if let Some(entity_commands) = commands.get_entity(entity) {
            entity_commands.despawn_recursive();
        }
    }
}

/// Keep combat log timestamps in step with the clock
pub fn stamp_combat_log(clock: Res<GameClock>, mut combat_log: ResMut<CombatLog>) {
    combat_log.now_ms = clock.now_ms();
}

/// Configure the phase ordering. Call once per app.
pub fn configure_simulation_ordering(app: &mut App) {
    app.configure_sets(
        Update,
        (
            SimulationPhase::Clock,
            SimulationPhase::Actors,
            SimulationPhase::Abilities,
            SimulationPhase::Attacks,
            SimulationPhase::Damage,
            SimulationPhase::Stage,
        )
            .chain(),
    );
}

/// Add the clock, actor and despawn systems gated by `run_condition`.
///
/// Combat and stage systems come from their own plugins.
pub fn add_core_simulation_systems<M>(app: &mut App, run_condition: impl Condition<M> + Clone)
where
    M: 'static,
{
    app.add_systems(
        Update,
        (tick_game_clock, stamp_combat_log)
            .chain()
            .in_set(SimulationPhase::Clock)
            .run_if(run_condition.clone()),
    )
    .add_systems(
        Update,
        (apply_player_intent, drive_enemies, update_actors)
            .chain()
            .in_set(SimulationPhase::Actors)
            .run_if(run_condition.clone()),
    )
    .add_systems(
        Update,
        (dispatch_sound_requests, flush_despawn_queue)
            .chain()
            .after(SimulationPhase::Stage)
            .run_if(run_condition),
    );
}

/// Everything needed to step the simulation inside an `App`.
///
/// Resources already present (a seeded [`GameRng`], custom [`GameSettings`],
/// a [`ClockMode`]) are left alone.
pub struct SimulationPlugin;

impl Plugin for SimulationPlugin {
    fn build(&self, app: &mut App) {
        let step_ms = app
            .world()
            .get_resource::<GameSettings>()
            .map_or(GameSettings::default().frame_step_ms, |s| s.frame_step_ms);

        if !app.world().contains_resource::<ClockMode>() {
            app.insert_resource(ClockMode::Fixed { step_ms });
        }

        app.init_resource::<GameClock>()
            .init_resource::<GameRng>()
            .init_resource::<GameSettings>()
            .init_resource::<AbilityDefinitions>()
            .init_resource::<CombatLog>()
            .init_resource::<DespawnQueue>()
            .init_resource::<PlayerIntent>()
            .init_resource::<SoundLedger>()
            .add_event::<SoundRequest>();

        configure_simulation_ordering(app);
        add_core_simulation_systems(app, || true);

        app.add_plugins((CombatPlugin, StagePlugin));
    }
}
