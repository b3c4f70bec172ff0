//! Per-frame actor update

use bevy::prelude::*;

use super::{Actor, AnimationPlayer, MovementState, RenderState, NORMAL_TINT};
use crate::clock::GameClock;
use crate::collision::{resolve_movement, Body, MoveResolver, ObstacleWorld};
use crate::combat::ability::Ability;
use crate::rng::GameRng;
use crate::stage::Obstacle;

/// Lowest alpha drawn while flickering
pub const FLICKER_MIN_ALPHA: f32 = 0.6;

/// What happened to one actor during [`update_actor`]
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ActorUpdate {
    /// Set when the animation cycle had to change
    pub state_changed: Option<MovementState>,
    /// Displacement actually applied after collision
    pub moved: Vec2,
    /// The invincibility window closed this frame
    pub became_damageable: bool,
}

/// Run one frame of an actor's state machine, in this order:
///
/// 1. advance the animation
/// 2. re-derive the movement state; switch animation cycle only if it changed
/// 3. with a non-zero velocity: move Y then X up to the first blocker,
///    face the horizontal direction, and clear the velocity
/// 4. close the invincibility window once it has fully elapsed
/// 5. while not damageable, pick a random alpha for the flicker
#[allow(clippy::too_many_arguments)]
pub fn update_actor(
    actor: &mut Actor,
    animation: &mut AnimationPlayer,
    render: &mut RenderState,
    position: &mut Vec2,
    body: &Body,
    resolver: &impl MoveResolver,
    clock: &GameClock,
    rng: &mut GameRng,
) -> ActorUpdate {
    let mut update = ActorUpdate::default();

    animation.advance(clock.delta_ms());

    actor.update_movement_state();
    let wanted = actor.movement_state().cycle(animation.cycle().frame_delay_ms);
    if animation.cycle() != wanted {
        animation.set_cycle(wanted);
        update.state_changed = Some(actor.movement_state());
    }

    if actor.velocity != Vec2::ZERO {
        let delta = actor.frame_displacement(clock.delta_ms());
        let applied = resolve_movement(resolver, body.aabb(*position), delta);
        *position += applied;
        update.moved = applied;
        render.mirrored = actor.face_from_velocity();
        actor.clear_velocity();
    }

    if actor.refresh_invincibility(clock.now_ms()) {
        render.tint = NORMAL_TINT;
        render.alpha = 1.0;
        update.became_damageable = true;
    }

    if !actor.is_damageable() {
        render.alpha = rng.random_range(FLICKER_MIN_ALPHA, 1.0);
    }

    update
}

/// Update every actor against the stage's obstacles
pub fn update_actors(
    clock: Res<GameClock>,
    mut rng: ResMut<GameRng>,
    obstacles: Query<(&Transform, &Body), (With<Obstacle>, Without<Actor>)>,
    mut actors: Query<(
        &mut Actor,
        &mut AnimationPlayer,
        &mut RenderState,
        &mut Transform,
        &Body,
        Option<&mut Ability>,
    )>,
) {
    let world: ObstacleWorld = obstacles
        .iter()
        .map(|(transform, body)| body.aabb(transform.translation.truncate()))
        .collect();

    for (mut actor, mut animation, mut render, mut transform, body, weapon) in actors.iter_mut() {
        let mut position = transform.translation.truncate();
        let update = update_actor(
            &mut actor,
            &mut animation,
            &mut render,
            &mut position,
            body,
            &world,
            &clock,
            &mut rng,
        );
        if update.moved != Vec2::ZERO {
            transform.translation.x = position.x;
            transform.translation.y = position.y;
        }
        if let Some(mut weapon) = weapon {
            if weapon.mirrored != render.mirrored {
                weapon.mirrored = render.mirrored;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actor::{ActorKind, Faction};
    use crate::collision::Aabb;

    struct Fixture {
        actor: Actor,
        animation: AnimationPlayer,
        render: RenderState,
        position: Vec2,
        body: Body,
        clock: GameClock,
        rng: GameRng,
    }

    impl Fixture {
        fn new() -> Self {
            Self {
                actor: Actor::new(ActorKind::Player, Faction::Player, 10.0, 0.0, 1.0, 500),
                animation: AnimationPlayer::new(MovementState::Stand.cycle(100)),
                render: RenderState::new("player.png"),
                position: Vec2::new(100.0, 100.0),
                body: Body::new(32.0, 16.0),
                clock: GameClock::default(),
                rng: GameRng::from_seed(5),
            }
        }

        fn step(&mut self, world: &ObstacleWorld, delta_ms: u64) -> ActorUpdate {
            self.clock.advance(delta_ms);
            update_actor(
                &mut self.actor,
                &mut self.animation,
                &mut self.render,
                &mut self.position,
                &self.body,
                world,
                &self.clock,
                &mut self.rng,
            )
        }
    }

    #[test]
    fn test_velocity_is_an_impulse() {
        let mut f = Fixture::new();
        let world = ObstacleWorld::default();
        f.actor.velocity = Vec2::new(1.0, 0.0);
        let update = f.step(&world, 10);
        assert_eq!(update.moved, Vec2::new(10.0, 0.0));
        assert_eq!(f.position, Vec2::new(110.0, 100.0));
        assert_eq!(f.actor.velocity, Vec2::ZERO);

        let update = f.step(&world, 10);
        assert_eq!(update.moved, Vec2::ZERO);
        assert_eq!(f.position, Vec2::new(110.0, 100.0));
    }

    #[test]
    fn test_walk_cycle_starts_on_movement() {
        let mut f = Fixture::new();
        let world = ObstacleWorld::default();
        f.actor.velocity = Vec2::new(0.0, 1.0);
        let update = f.step(&world, 16);
        assert_eq!(update.state_changed, Some(MovementState::Walk));
        assert_eq!(f.animation.current_frame(), 1);
        let update = f.step(&world, 16);
        assert_eq!(update.state_changed, Some(MovementState::Stand));
        assert_eq!(f.animation.current_frame(), 5);
    }

    #[test]
    fn test_diagonal_against_wall_still_moves_vertically() {
        let mut f = Fixture::new();
        let world = ObstacleWorld::new(vec![Aabb::new(Vec2::new(132.0, 0.0), Vec2::new(64.0, 400.0))]);
        f.actor.velocity = Vec2::new(1.0, 1.0);
        f.step(&world, 10);
        assert_eq!(f.position, Vec2::new(100.0, 110.0));
    }

    #[test]
    fn test_mirroring_follows_horizontal_direction() {
        let mut f = Fixture::new();
        let world = ObstacleWorld::default();
        f.actor.velocity = Vec2::new(-1.0, 0.0);
        f.step(&world, 16);
        assert!(f.render.mirrored);
        f.actor.velocity = Vec2::new(0.0, 1.0);
        f.step(&world, 16);
        assert!(!f.render.mirrored, "vertical travel un-mirrors");
        assert!(!f.actor.facing_left());
    }

    #[test]
    fn test_flicker_then_restore() {
        let mut f = Fixture::new();
        let world = ObstacleWorld::default();
        f.actor.damage(1.0, 0);
        f.render.tint = crate::actor::DAMAGE_TINT;

        f.step(&world, 250);
        assert!(f.render.alpha >= FLICKER_MIN_ALPHA && f.render.alpha < 1.0);

        let update = f.step(&world, 251);
        assert!(update.became_damageable);
        assert_eq!(f.render.alpha, 1.0);
        assert_eq!(f.render.tint, NORMAL_TINT);
    }

    #[test]
    fn test_jump_cycle_from_external_trigger() {
        let mut f = Fixture::new();
        let world = ObstacleWorld::default();
        f.actor.begin_jump();
        let update = f.step(&world, 16);
        assert_eq!(update.state_changed, Some(MovementState::Jump));
        assert_eq!(f.animation.current_frame(), 4);
    }
}
