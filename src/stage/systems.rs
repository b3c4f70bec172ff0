//! Stage systems
//!
//! Population, membership tracking, draw-order sorting and teardown.

use bevy::prelude::*;

use super::spawn::{DecorationStyle, SpawnKind};
use super::Stage;
use crate::actor::kinds::spawn_actor;
use crate::actor::{ActorKind, AnimationCycle, AnimationPlayer, RenderState};
use crate::clock::GameClock;
use crate::collision::Body;
use crate::combat::ability::{Ability, AbilityKind};
use crate::combat::ability_config::AbilityDefinitions;
use crate::combat::log::{CombatLog, CombatLogEventType};
use crate::rng::GameRng;
use crate::settings::GameSettings;
use crate::simulation::{DespawnQueue, SimulationPhase};

/// Marks an entity as a child of the current stage
#[derive(Component, Debug, Default, Clone, Copy)]
pub struct StageMember;

/// Static blocker: tiles with code 1 and the stage borders
#[derive(Component, Debug, Default, Clone, Copy)]
pub struct Obstacle;

/// Purely visual looping animation
#[derive(Component, Debug, Clone, Copy)]
pub struct Decoration {
    pub scale: f32,
}

/// Weapon handed to the player when the stage spawns it
#[derive(Resource, Debug, Clone, Copy)]
pub struct PlayerLoadout {
    pub weapon: AbilityKind,
}

impl Default for PlayerLoadout {
    fn default() -> Self {
        Self {
            weapon: AbilityKind::BurgerPunch,
        }
    }
}

/// Request to despawn everything the stage created
#[derive(Event, Debug, Clone, Copy, Default)]
pub struct StageTeardown;

/// Spawn everything in the stage's plan.
///
/// Runs once per inserted [`Stage`]. Spawned entities become members through
/// [`sync_stage_children`] on the same frame.
pub fn populate_stage(
    mut commands: Commands,
    stage: Res<Stage>,
    definitions: Res<AbilityDefinitions>,
    settings: Res<GameSettings>,
    loadout: Res<PlayerLoadout>,
    mut rng: ResMut<GameRng>,
    mut combat_log: ResMut<CombatLog>,
) {
    let plan = stage.spawn_plan();
    let (mut obstacles, mut decorations, mut enemies) = (0usize, 0usize, 0usize);

    for item in plan {
        let position = item.position;
        match item.kind {
            SpawnKind::Obstacle { size } => {
                commands.spawn((
                    Obstacle,
                    StageMember,
                    Body::new(size.x, size.y),
                    Transform::from_xyz(position.x, position.y, 0.0),
                    Name::new("Obstacle"),
                ));
                obstacles += 1;
            }
            SpawnKind::Decoration(style) => {
                spawn_decoration(&mut commands, style, position);
                decorations += 1;
            }
            SpawnKind::Player => {
                let weapon = Ability::from_config(loadout.weapon, definitions.get_unchecked(&loadout.weapon), &mut rng);
                let player = spawn_actor(&mut commands, ActorKind::Player, position, Some(weapon), settings.health_cap);
                commands.entity(player).insert(StageMember);
            }
            SpawnKind::Enemy(kind) => {
                let weapon = kind
                    .profile()
                    .default_weapon
                    .map(|weapon| Ability::from_config(weapon, definitions.get_unchecked(&weapon), &mut rng));
                let enemy = spawn_actor(&mut commands, kind, position, weapon, settings.health_cap);
                commands.entity(enemy).insert(StageMember);
                enemies += 1;
            }
        }
    }

    info!(
        "Loaded stage '{}' ({}x{} px): {} obstacles, {} decorations, {} enemies",
        stage.name(),
        stage.width(),
        stage.height(),
        obstacles,
        decorations,
        enemies
    );
    combat_log.log(
        CombatLogEventType::StageEvent,
        format!("Stage '{}' loaded with {} enemies", stage.name(), enemies),
    );
}

fn spawn_decoration(commands: &mut Commands, style: DecorationStyle, position: Vec2) -> Entity {
    commands
        .spawn((
            Decoration { scale: style.scale },
            StageMember,
            AnimationPlayer::new(AnimationCycle::new(1, style.frames, style.frame_delay_ms)),
            RenderState::new(style.sheet),
            Transform::from_xyz(position.x, position.y, 0.0),
            Name::new("Decoration"),
        ))
        .id()
}

/// Keep the stage's child list in step with the world: drop despawned
/// members, append new ones.
pub fn sync_stage_children(
    mut stage: ResMut<Stage>,
    added: Query<Entity, Added<StageMember>>,
    members: Query<(), With<StageMember>>,
) {
    stage.retain_children(|&e| members.contains(e));
    for entity in added.iter() {
        stage.add_child(entity);
    }
}

/// Re-derive draw order from vertical position
pub fn sort_stage_children(mut stage: ResMut<Stage>, positions: Query<&Transform, With<StageMember>>) {
    stage.sort_draw_order(|e| positions.get(e).ok().map(|t| t.translation.y));
}

pub fn animate_decorations(clock: Res<GameClock>, mut decorations: Query<&mut AnimationPlayer, With<Decoration>>) {
    for mut animation in decorations.iter_mut() {
        animation.advance(clock.delta_ms());
    }
}

/// Schedule every stage child for despawn
pub fn teardown_stage(
    mut requests: EventReader<StageTeardown>,
    mut stage: ResMut<Stage>,
    mut despawns: ResMut<DespawnQueue>,
    mut combat_log: ResMut<CombatLog>,
) {
    if requests.read().count() == 0 {
        return;
    }
    let children = stage.take_children();
    info!("Tearing down stage '{}' ({} objects)", stage.name(), children.len());
    for child in children {
        despawns.schedule(child);
    }
    combat_log.log(CombatLogEventType::StageEvent, format!("Stage '{}' torn down", stage.name()));
}

/// Stage population, membership and ordering
pub struct StagePlugin;

impl Plugin for StagePlugin {
    fn build(&self, app: &mut App) {
        app.add_event::<StageTeardown>()
            .init_resource::<PlayerLoadout>()
            .add_systems(PreUpdate, populate_stage.run_if(resource_added::<Stage>))
            .add_systems(
                Update,
                (
                    animate_decorations,
                    teardown_stage,
                    sync_stage_children,
                    sort_stage_children,
                )
                    .chain()
                    .run_if(resource_exists::<Stage>)
                    .in_set(SimulationPhase::Stage),
            );
    }
}
