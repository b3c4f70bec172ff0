//! Actor decision making
//!
//! Nothing here moves an actor directly. Decisions become a velocity impulse
//! and, optionally, an [`AttackRequest`]; the per-frame update and the
//! ability systems do the rest.
//!
//! - The player follows [`PlayerIntent`], filled by whatever reads input
//!   (or by [`autopilot_player`] in headless runs).
//! - Enemies walk toward the player and attack once they are in range.

use bevy::prelude::*;

use super::{Actor, Enemy, Player};
use crate::combat::ability::Ability;
use crate::combat::events::AttackRequest;
use crate::stage::Stage;

/// Vertical distance at which a melee attacker counts as lined up
pub const MELEE_ROW_TOLERANCE: f32 = 16.0;

/// Horizontal impulse used to turn around without really moving
const FACE_NUDGE: f32 = 0.05;

/// Player input for the current frame, consumed by [`apply_player_intent`]
#[derive(Resource, Debug, Clone, Copy, Default, PartialEq)]
pub struct PlayerIntent {
    /// Desired direction; lengths above 1 are clamped
    pub movement: Vec2,
    pub attack: bool,
}

/// Turn the frame's [`PlayerIntent`] into a velocity impulse and attack request.
pub fn apply_player_intent(
    mut intent: ResMut<PlayerIntent>,
    mut players: Query<(Entity, &mut Actor), With<Player>>,
    mut requests: EventWriter<AttackRequest>,
) {
    let Ok((entity, mut actor)) = players.get_single_mut() else {
        return;
    };
    if actor.is_destroy_scheduled() {
        *intent = PlayerIntent::default();
        return;
    }

    if intent.movement != Vec2::ZERO {
        actor.velocity = intent.movement.clamp_length_max(1.0);
    }
    if intent.attack {
        requests.send(AttackRequest { attacker: entity });
    }
    *intent = PlayerIntent::default();
}

/// Signed unit step toward `delta`, or zero inside `tolerance`
fn step_toward(delta: f32, tolerance: f32) -> f32 {
    if delta.abs() <= tolerance {
        0.0
    } else {
        delta.signum()
    }
}

/// Whether an actor facing `facing_left` is looking at something `dx` away
fn is_facing(facing_left: bool, dx: f32) -> bool {
    if dx < 0.0 {
        facing_left
    } else {
        !facing_left
    }
}

/// Walk every enemy toward the player and attack when in range.
///
/// Melee enemies close the horizontal gap to their attack range and line up
/// on the player's row. Ranged enemies only need to be within range; their
/// shots track the player.
pub fn drive_enemies(
    players: Query<(&Transform, &Actor), (With<Player>, Without<Enemy>)>,
    mut enemies: Query<(Entity, &mut Actor, &Transform, Option<&Ability>), With<Enemy>>,
    mut requests: EventWriter<AttackRequest>,
) {
    let Ok((player_transform, player)) = players.get_single() else {
        return;
    };
    if player.is_destroy_scheduled() {
        return;
    }
    let target = player_transform.translation.truncate();

    for (entity, mut enemy, transform, weapon) in enemies.iter_mut() {
        if enemy.is_destroy_scheduled() {
            continue;
        }
        let range = enemy.kind.profile().attack_range;
        let offset = target - transform.translation.truncate();
        let ranged = weapon.is_some_and(Ability::is_ranged);

        let in_range = if ranged {
            offset.length() <= range
        } else {
            offset.x.abs() <= range && offset.y.abs() <= MELEE_ROW_TOLERANCE
        };

        if in_range {
            if !ranged && !is_facing(enemy.facing_left(), offset.x) {
                enemy.velocity = Vec2::new(offset.x.signum() * FACE_NUDGE, 0.0);
            }
            if weapon.is_some_and(Ability::is_idle) {
                requests.send(AttackRequest { attacker: entity });
            }
            continue;
        }

        enemy.velocity = if ranged {
            offset.normalize_or_zero()
        } else {
            Vec2::new(step_toward(offset.x, range), step_toward(offset.y, MELEE_ROW_TOLERANCE * 0.5))
                .normalize_or_zero()
        };
    }
}

/// Where the player stands relative to an enemy to land a punch, by side
const AUTOPILOT_STANCE_RIGHT: f32 = 96.0;
const AUTOPILOT_STANCE_LEFT: f32 = -64.0;
const AUTOPILOT_SLACK: f32 = 16.0;
const AUTOPILOT_ROW_TOLERANCE: f32 = 24.0;

/// Fill [`PlayerIntent`] for unattended runs: pick the nearest enemy, line up
/// beside it and punch whenever it is in reach.
pub fn autopilot_player(
    stage: Res<Stage>,
    mut intent: ResMut<PlayerIntent>,
    players: Query<(&Transform, &Actor), With<Player>>,
    enemy_marker: Query<(), With<Enemy>>,
    enemies: Query<(&Transform, &Actor), (With<Enemy>, Without<Player>)>,
) {
    let Ok((player_transform, player)) = players.get_single() else {
        return;
    };
    let position = player_transform.translation.truncate();

    let nearest = stage
        .enemies(&enemy_marker)
        .into_iter()
        .filter_map(|e| enemies.get(e).ok())
        .filter(|(_, actor)| !actor.is_destroy_scheduled())
        .map(|(transform, _)| transform.translation.truncate())
        .min_by(|a, b| a.distance_squared(position).total_cmp(&b.distance_squared(position)));

    let Some(enemy) = nearest else {
        *intent = PlayerIntent::default();
        return;
    };

    let dx = enemy.x - position.x;
    let dy = enemy.y - position.y;
    let stance = if dx >= 0.0 {
        AUTOPILOT_STANCE_RIGHT
    } else {
        AUTOPILOT_STANCE_LEFT
    };
    let gap = dx - stance;

    let lined_up = gap.abs() <= AUTOPILOT_SLACK * 2.0 && dy.abs() <= AUTOPILOT_ROW_TOLERANCE;
    let movement = if !lined_up {
        Vec2::new(step_toward(gap, AUTOPILOT_SLACK), step_toward(dy, AUTOPILOT_ROW_TOLERANCE * 0.5))
    } else if !is_facing(player.facing_left(), dx) {
        Vec2::new(dx.signum() * FACE_NUDGE, 0.0)
    } else {
        Vec2::ZERO
    };

    *intent = PlayerIntent {
        movement,
        attack: lined_up && is_facing(player.facing_left(), dx),
    };
}
