//! Integration tests for stage loading, population and draw order
//!
//! These tests verify that:
//! - Shipped stage files parse and validate
//! - Populating a grid creates the mapped objects plus three borders
//! - Entity queries only return actors
//! - Children are kept sorted by vertical position
//! - Teardown removes every child

use bevy::ecs::system::SystemState;
use bevy::prelude::*;

use foodfight::actor::{Actor, AnimationPlayer, Enemy, Player};
use foodfight::clock::{ClockMode, GameClock};
use foodfight::rng::GameRng;
use foodfight::simulation::SimulationPlugin;
use foodfight::stage::{
    Decoration, FileTileSource, MemoryTileSource, Obstacle, Stage, StageError, StageMember, StageTeardown, TileGrid,
};

fn build_app(rows: Vec<Vec<u32>>) -> App {
    let source = MemoryTileSource::new().with("test", TileGrid::from_rows(64, rows));
    let stage = Stage::load(&source, "test").unwrap();
    let mut app = App::new();
    app.add_plugins(MinimalPlugins)
        .insert_resource(ClockMode::Manual)
        .insert_resource(GameRng::from_seed(21))
        .add_plugins(SimulationPlugin)
        .insert_resource(stage);
    app
}

fn step(app: &mut App, delta_ms: u64) {
    app.world_mut().resource_mut::<GameClock>().advance(delta_ms);
    app.update();
}

fn position(app: &App, entity: Entity) -> Vec2 {
    app.world().get::<Transform>(entity).unwrap().translation.truncate()
}

// =============================================================================
// Loading Tests
// =============================================================================

#[test]
fn test_shipped_stages_load() {
    let source = FileTileSource::new("assets/stages");
    let stage = Stage::load(&source, "candy_lane").expect("candy_lane should load");
    assert_eq!((stage.width(), stage.height()), (1024.0, 384.0));

    let practice = Stage::load(&source, "practice_pen").expect("practice_pen should load");
    assert_eq!(practice.grid().width, 6);
}

#[test]
fn test_unknown_stage_is_reported() {
    let source = FileTileSource::new("assets/stages");
    assert!(matches!(
        Stage::load(&source, "no_such_stage"),
        Err(StageError::UnknownStage(name)) if name == "no_such_stage"
    ));
}

#[test]
fn test_missing_layers_fail_without_partial_stage() {
    let mut grid = TileGrid::from_rows(64, vec![vec![2]]);
    grid.layers.clear();
    let source = MemoryTileSource::new().with("bare", grid);
    let err = Stage::load(&source, "bare").unwrap_err();
    assert!(err.to_string().contains("bare"), "error should name the stage: {}", err);
}

// =============================================================================
// Population Tests
// =============================================================================

#[test]
fn test_two_by_two_scenario() {
    let mut app = build_app(vec![vec![1, 2], vec![0, 5]]);
    step(&mut app, 0);

    let mut players = app.world_mut().query_filtered::<Entity, With<Player>>();
    let player = players.single(app.world());
    let mut enemies = app.world_mut().query_filtered::<Entity, With<Enemy>>();
    let enemy = enemies.single(app.world());

    assert_eq!(position(&app, player), Vec2::new(64.0, 0.0));
    assert_eq!(position(&app, enemy), Vec2::new(64.0, 64.0));

    let mut obstacles = app.world_mut().query_filtered::<Entity, With<Obstacle>>();
    let mut obstacle_positions: Vec<(f32, f32)> = obstacles
        .iter(app.world())
        .map(|e| {
            let p = position(&app, e);
            (p.x, p.y)
        })
        .collect();
    obstacle_positions.sort_by(|a, b| a.partial_cmp(b).unwrap());
    assert_eq!(
        obstacle_positions,
        vec![(-64.0, 0.0), (0.0, 0.0), (0.0, 128.0), (128.0, 0.0)]
    );

    let stage = app.world().resource::<Stage>();
    assert_eq!(stage.children().len(), 6);
}

#[test]
fn test_get_entities_returns_only_actors() {
    let mut app = build_app(vec![vec![1, 2], vec![0, 5]]);
    step(&mut app, 0);

    let mut state: SystemState<(Res<Stage>, Query<(), With<Actor>>, Query<(), With<Enemy>>)> =
        SystemState::new(app.world_mut());
    let (stage, actors, enemy_marker) = state.get(app.world());

    let entities = stage.entities(&actors);
    assert_eq!(entities.len(), 2);
    for entity in &entities {
        assert!(actors.contains(*entity));
    }
    assert_eq!(stage.enemies(&enemy_marker).len(), 1);
}

#[test]
fn test_decorations_are_members_and_animate() {
    let mut app = build_app(vec![vec![2, 3, 4]]);
    step(&mut app, 0);

    let mut decorations = app.world_mut().query_filtered::<Entity, With<Decoration>>();
    let spawned: Vec<Entity> = decorations.iter(app.world()).collect();
    assert_eq!(spawned.len(), 2);
    for entity in &spawned {
        assert!(app.world().get::<StageMember>(*entity).is_some());
        assert_eq!(app.world().get::<AnimationPlayer>(*entity).unwrap().current_frame(), 1);
    }

    step(&mut app, 120);
    for entity in &spawned {
        assert_eq!(app.world().get::<AnimationPlayer>(*entity).unwrap().current_frame(), 3);
    }
}

// =============================================================================
// Draw Order Tests
// =============================================================================

fn assert_sorted_by_y(app: &App) {
    let stage = app.world().resource::<Stage>();
    let ys: Vec<f32> = stage
        .children()
        .iter()
        .map(|e| app.world().get::<Transform>(*e).unwrap().translation.y)
        .collect();
    for pair in ys.windows(2) {
        assert!(pair[0] <= pair[1], "children out of order: {:?}", ys);
    }
}

#[test]
fn test_children_sorted_after_update() {
    let mut app = build_app(vec![vec![0, 0, 5, 0], vec![0, 2, 0, 0], vec![1, 0, 0, 6]]);
    step(&mut app, 16);
    assert_sorted_by_y(&app);

    for _ in 0..20 {
        step(&mut app, 16);
        assert_sorted_by_y(&app);
    }
}

#[test]
fn test_despawned_children_leave_the_stage() {
    let mut app = build_app(vec![vec![2, 0, 0, 6]]);
    step(&mut app, 16);

    let mut enemies = app.world_mut().query_filtered::<Entity, With<Enemy>>();
    let enemy = enemies.single(app.world());
    app.world_mut().entity_mut(enemy).despawn_recursive();
    step(&mut app, 16);

    let stage = app.world().resource::<Stage>();
    assert!(!stage.children().contains(&enemy));
}

#[test]
fn test_teardown_removes_all_children() {
    let mut app = build_app(vec![vec![1, 2], vec![3, 5]]);
    step(&mut app, 16);
    assert!(!app.world().resource::<Stage>().children().is_empty());

    app.world_mut().send_event(StageTeardown);
    step(&mut app, 16);

    assert!(app.world().resource::<Stage>().children().is_empty());
    let mut members = app.world_mut().query_filtered::<Entity, With<StageMember>>();
    assert_eq!(members.iter(app.world()).count(), 0);
}
