//! Tests for the weapon catalog and the ability state machine
//!
//! These tests verify that:
//! - Every catalog entry has sane timings and damage
//! - Idle -> Active -> CoolingDown -> Idle follows the configured windows
//! - Activation requests outside Idle are ignored
//! - Activations inside an App spawn attacks and log their use

use bevy::prelude::*;

use foodfight::actor::{Actor, Faction, Player};
use foodfight::clock::{ClockMode, GameClock};
use foodfight::combat::ability::{Ability, AbilityKind, AbilityState, ActionContext};
use foodfight::combat::ability_config::{AbilityDefinitions, EffectConfig, TimingSpec};
use foodfight::combat::attack::{AttackSpawn, Hitbox};
use foodfight::combat::events::AttackRequest;
use foodfight::combat::log::{CombatLog, CombatLogEventType};
use foodfight::rng::GameRng;
use foodfight::simulation::SimulationPlugin;
use foodfight::stage::{MemoryTileSource, Stage, TileGrid};

/// Helper to load ability definitions for tests
fn load_abilities() -> AbilityDefinitions {
    AbilityDefinitions::default()
}

fn context(facing_left: bool) -> ActionContext {
    ActionContext {
        owner: Entity::from_raw(10),
        owner_position: Vec2::new(300.0, 200.0),
        facing_left,
        faction: Faction::Player,
        player_position: None,
    }
}

/// A melee ability with the exact timings used by the state machine checks
fn fixed_ability(active_ms: u64, cooldown_ms: u64) -> Ability {
    let abilities = load_abilities();
    Ability::new(
        AbilityKind::BurgerPunch,
        abilities.get_unchecked(&AbilityKind::BurgerPunch),
        active_ms,
        cooldown_ms,
    )
}

// =============================================================================
// Catalog Validation Tests
// =============================================================================

#[test]
fn test_catalog_has_every_kind() {
    let abilities = load_abilities();
    assert_eq!(abilities.len(), AbilityKind::ALL.len());
    for kind in AbilityKind::ALL {
        assert!(abilities.get(&kind).is_some(), "{:?} missing from catalog", kind);
    }
}

#[test]
fn test_all_abilities_have_names_and_damage() {
    let abilities = load_abilities();
    for kind in AbilityKind::ALL {
        let def = abilities.get_unchecked(&kind);
        assert!(!def.name.is_empty(), "{:?} should have a name", kind);
        assert!(def.damage > 0.0, "{:?} should deal damage, got {}", kind, def.damage);
    }
}

#[test]
fn test_random_ranges_are_ordered() {
    let abilities = load_abilities();
    for kind in AbilityKind::ALL {
        let def = abilities.get_unchecked(&kind);
        for timing in [&def.active_duration, &def.cooldown] {
            if let TimingSpec::Uniform { min, max } = timing {
                assert!(min <= max, "{:?} has inverted range {}..{}", kind, min, max);
            }
        }
    }
}

#[test]
fn test_shooters_are_ranged() {
    let abilities = load_abilities();
    assert!(abilities.get_unchecked(&AbilityKind::SeedShooter).is_ranged());
    assert!(abilities.get_unchecked(&AbilityKind::MeatballShooter).is_ranged());
    assert!(!abilities.get_unchecked(&AbilityKind::BurgerPunch).is_ranged());
    assert!(matches!(
        abilities.get_unchecked(&AbilityKind::PastaWhip).effect,
        EffectConfig::Melee { .. }
    ));
}

#[test]
fn test_randomized_timings_drawn_within_range() {
    let abilities = load_abilities();
    let config = abilities.get_unchecked(&AbilityKind::PizzaBite);
    let mut rng = GameRng::from_seed(3);
    for _ in 0..50 {
        let bite = Ability::from_config(AbilityKind::PizzaBite, config, &mut rng);
        assert!((300..=1000).contains(&bite.active_duration_ms()));
        assert!((1000..=2500).contains(&bite.cooldown_duration_ms()));
    }
}

#[test]
fn test_same_seed_draws_same_timings() {
    let abilities = load_abilities();
    let config = abilities.get_unchecked(&AbilityKind::PizzaBite);
    let a = Ability::from_config(AbilityKind::PizzaBite, config, &mut GameRng::from_seed(11));
    let b = Ability::from_config(AbilityKind::PizzaBite, config, &mut GameRng::from_seed(11));
    assert_eq!(a.active_duration_ms(), b.active_duration_ms());
    assert_eq!(a.cooldown_duration_ms(), b.cooldown_duration_ms());
}

// =============================================================================
// State Machine Tests
// =============================================================================

#[test]
fn test_cooldown_scenario() {
    let mut ability = fixed_ability(300, 1000);
    let ctx = context(false);

    assert!(ability.try_activate(0, &ctx).is_some());
    assert_eq!(ability.state(), AbilityState::Active { since_ms: 0 });

    ability.advance(200);
    assert!(ability.try_activate(200, &ctx).is_none(), "re-activation while active must be ignored");
    assert!(ability.is_active());

    assert_eq!(ability.advance(301), Some(AbilityState::CoolingDown { since_ms: 300 }));
    assert!(ability.try_activate(301, &ctx).is_none());

    assert_eq!(ability.advance(1300), None);
    assert!(matches!(ability.state(), AbilityState::CoolingDown { .. }));
    assert!(ability.try_activate(1300, &ctx).is_none());

    assert_eq!(ability.advance(1301), Some(AbilityState::Idle));
    assert!(ability.try_activate(1301, &ctx).is_some());
    assert_eq!(ability.activated_at_ms(), Some(1301));
}

#[test]
fn test_cooldown_scenario_every_millisecond() {
    let mut ability = fixed_ability(300, 1000);
    let ctx = context(false);
    assert!(ability.try_activate(0, &ctx).is_some());

    for now in 1..=1301u64 {
        ability.advance(now);
        match now {
            1..=299 => assert!(ability.is_active(), "t={}: {:?}", now, ability.state()),
            300..=1300 => {
                assert_eq!(ability.state(), AbilityState::CoolingDown { since_ms: 300 }, "t={}", now);
                assert!(ability.try_activate(now, &ctx).is_none(), "t={}", now);
            }
            _ => assert!(ability.is_idle(), "t={}: {:?}", now, ability.state()),
        }
    }
    assert!(ability.try_activate(1301, &ctx).is_some());
}

#[test]
fn test_idle_instant_does_not_depend_on_frame_step() {
    for step in [1u64, 7, 16, 33, 100] {
        let mut ability = fixed_ability(300, 1000);
        ability.try_activate(0, &context(false));
        let mut now = 0;
        while !ability.is_idle() {
            now += step;
            ability.advance(now);
        }
        assert!(now >= 1301 && now < 1301 + 2 * step, "step {} reached Idle at {}", step, now);
    }
}

#[test]
fn test_no_retrigger_before_window_ends() {
    let mut ability = fixed_ability(300, 1000);
    let ctx = context(true);
    assert!(ability.try_activate(0, &ctx).is_some());

    let mut fired = 0;
    for now in (16..1300).step_by(16) {
        ability.advance(now);
        if ability.try_activate(now, &ctx).is_some() {
            fired += 1;
        }
    }
    assert_eq!(fired, 0);
}

#[test]
fn test_melee_hitbox_uses_facing_offset() {
    let mut ability = fixed_ability(300, 1500);
    let activation = ability.try_activate(40, &context(true)).unwrap();
    let AttackSpawn::Hitbox(hitbox) = activation.attack else {
        panic!("melee ability should produce a hitbox");
    };
    assert_eq!(hitbox.offset, Vec2::new(-64.0, -96.0));
    assert_eq!(hitbox.size, Vec2::new(64.0, 64.0));
    assert_eq!(hitbox.expires_at_ms, 340);
    assert_eq!(hitbox.payload.damage, 2.0);
    assert_eq!(hitbox.payload.source, "Burger Punch");
}

#[test]
fn test_tracking_projectile_aims_at_player() {
    let abilities = load_abilities();
    let mut shooter = Ability::new(
        AbilityKind::SeedShooter,
        abilities.get_unchecked(&AbilityKind::SeedShooter),
        0,
        500,
    );
    let ctx = ActionContext {
        player_position: Some(Vec2::new(0.0, 200.0)),
        faction: Faction::Enemy,
        ..context(false)
    };
    let activation = shooter.try_activate(0, &ctx).unwrap();
    let AttackSpawn::Projectile(projectile) = activation.attack else {
        panic!("shooter should produce a projectile");
    };
    assert_eq!(projectile.direction, Vec2::NEG_X);
    assert_eq!(projectile.origin, Vec2::new(300.0, 150.0));
    assert!(activation.sound.is_some());
}

#[test]
fn test_zero_active_window_goes_straight_to_cooldown() {
    let abilities = load_abilities();
    let mut shooter = Ability::new(
        AbilityKind::MeatballShooter,
        abilities.get_unchecked(&AbilityKind::MeatballShooter),
        0,
        500,
    );
    shooter.try_activate(100, &context(false)).unwrap();
    assert_eq!(shooter.advance(100), Some(AbilityState::CoolingDown { since_ms: 100 }));
    assert_eq!(shooter.advance(600), None);
    assert_eq!(shooter.advance(601), Some(AbilityState::Idle));
}

// =============================================================================
// ECS Tests
// =============================================================================

/// Player at (64, 64) facing right, a pizza zombie two tiles to the right
fn punch_app() -> App {
    let grid = TileGrid::from_rows(64, vec![vec![0, 0, 0, 0, 0], vec![0, 2, 0, 5, 0], vec![0, 0, 0, 0, 0]]);
    let source = MemoryTileSource::new().with("punch", grid);
    let stage = Stage::load(&source, "punch").unwrap();

    let mut app = App::new();
    app.add_plugins(MinimalPlugins)
        .insert_resource(ClockMode::Manual)
        .insert_resource(GameRng::from_seed(1))
        .add_plugins(SimulationPlugin)
        .insert_resource(stage);
    app
}

fn step(app: &mut App, delta_ms: u64) {
    app.world_mut().resource_mut::<GameClock>().advance(delta_ms);
    app.update();
}

fn player(app: &mut App) -> Entity {
    let mut query = app.world_mut().query_filtered::<Entity, With<Player>>();
    query.single(app.world())
}

#[test]
fn test_attack_request_spawns_hitbox_and_logs() {
    let mut app = punch_app();
    step(&mut app, 16);
    let player = player(&mut app);

    app.world_mut().send_event(AttackRequest { attacker: player });
    step(&mut app, 16);

    let mut hitboxes = app.world_mut().query::<&Hitbox>();
    assert_eq!(hitboxes.iter(app.world()).count(), 1);

    let log = app.world().resource::<CombatLog>();
    let uses = log.filter_by_type(CombatLogEventType::AbilityUsed);
    assert_eq!(uses.len(), 1);
    assert_eq!(uses[0].message, "Player uses Burger Punch");

    let ability = app.world().get::<Ability>(player).unwrap();
    assert!(ability.is_active());
}

#[test]
fn test_punch_damages_enemy_once_per_activation() {
    let mut app = punch_app();
    step(&mut app, 16);
    let player = player(&mut app);

    app.world_mut().send_event(AttackRequest { attacker: player });
    step(&mut app, 16);

    let mut enemies = app.world_mut().query::<&Actor>();
    let zombie_health: Vec<f32> = enemies
        .iter(app.world())
        .filter(|a| a.faction == Faction::Enemy)
        .map(Actor::health)
        .collect();
    assert_eq!(zombie_health, vec![2.0]);

    // The hitbox stays active for 300ms but the zombie is invincible meanwhile
    for _ in 0..10 {
        step(&mut app, 16);
    }
    let mut enemies = app.world_mut().query::<&Actor>();
    let zombie = enemies.iter(app.world()).find(|a| a.faction == Faction::Enemy).unwrap();
    assert_eq!(zombie.health(), 2.0);
}

#[test]
fn test_hitbox_expires_after_active_window() {
    let mut app = punch_app();
    step(&mut app, 16);
    let player = player(&mut app);
    app.world_mut().send_event(AttackRequest { attacker: player });
    step(&mut app, 16);

    for _ in 0..20 {
        step(&mut app, 16);
    }
    let mut hitboxes = app.world_mut().query::<&Hitbox>();
    assert_eq!(hitboxes.iter(app.world()).count(), 0);
}
