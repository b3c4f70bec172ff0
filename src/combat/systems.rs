//! Combat systems
//!
//! ECS systems for the Abilities, Attacks and Damage phases.

use bevy::prelude::*;
use smallvec::SmallVec;

use super::ability::{Ability, ActionContext};
use super::attack::{spawn_attack, AttackPayload, Hitbox, Projectile};
use super::events::*;
use super::log::CombatLog;
use crate::actor::{Actor, DamageOutcome, Faction, Player, RenderState, DAMAGE_TINT};
use crate::audio::SoundRequest;
use crate::clock::GameClock;
use crate::collision::{Aabb, Body, Hurtbox};
use crate::settings::GameSettings;
use crate::simulation::DespawnQueue;
use crate::stage::Stage;

fn display_name(names: &Query<&Name>, entity: Entity) -> String {
    names
        .get(entity)
        .map(|n| n.as_str().to_string())
        .unwrap_or_else(|_| format!("{:?}", entity))
}

// ============================================================================
// Abilities phase
// ============================================================================

/// Progress every equipped ability's timers
pub fn advance_abilities(clock: Res<GameClock>, mut abilities: Query<&mut Ability>) {
    let now = clock.now_ms();
    for mut ability in abilities.iter_mut() {
        ability.advance(now);
    }
}

/// Turn attack requests into activations.
///
/// A request for an ability that is not Idle does nothing. A successful
/// activation spawns the attack, requests the sound cue and logs the use.
#[allow(clippy::too_many_arguments)]
pub fn trigger_abilities(
    mut commands: Commands,
    clock: Res<GameClock>,
    mut requests: EventReader<AttackRequest>,
    mut owners: Query<(&Actor, &Transform, &mut Ability, Option<&Name>)>,
    players: Query<&Transform, With<Player>>,
    mut sounds: EventWriter<SoundRequest>,
    mut activations: EventWriter<AbilityActivated>,
    mut combat_log: ResMut<CombatLog>,
) {
    let player_position = players.get_single().ok().map(|t| t.translation.truncate());

    for request in requests.read() {
        let Ok((actor, transform, mut ability, name)) = owners.get_mut(request.attacker) else {
            continue;
        };
        if actor.is_destroy_scheduled() {
            continue;
        }

        let owner_position = transform.translation.truncate();
        let ctx = ActionContext {
            owner: request.attacker,
            owner_position,
            facing_left: actor.facing_left(),
            faction: actor.faction,
            player_position,
        };
        let Some(activation) = ability.try_activate(clock.now_ms(), &ctx) else {
            continue;
        };

        let attack = spawn_attack(&mut commands, activation.attack, owner_position);
        if let Some(cue) = activation.sound {
            sounds.send(SoundRequest {
                source: request.attacker,
                cue,
            });
        }

        let owner_name = name.map_or_else(|| actor.kind.name().to_string(), |n| n.as_str().to_string());
        debug!("{} activates {} at {}ms", owner_name, ability.name, clock.now_ms());
        combat_log.log_ability(owner_name, ability.name.clone());
        activations.send(AbilityActivated {
            owner: request.attacker,
            kind: ability.kind,
            name: ability.name.clone(),
            attack,
        });
    }
}

// ============================================================================
// Attacks phase
// ============================================================================

/// Pin melee hitboxes to their owners. Orphaned hitboxes are removed.
pub fn follow_owners(
    mut hitboxes: Query<(Entity, &Hitbox, &AttackPayload, &mut Transform), Without<Actor>>,
    owners: Query<&Transform, With<Actor>>,
    mut despawns: ResMut<DespawnQueue>,
) {
    for (entity, hitbox, payload, mut transform) in hitboxes.iter_mut() {
        match owners.get(payload.owner) {
            Ok(owner) => {
                let position = owner.translation.truncate() + hitbox.offset;
                transform.translation.x = position.x;
                transform.translation.y = position.y;
            }
            Err(_) => {
                despawns.schedule(entity);
            }
        }
    }
}

/// Remove hitboxes whose active window has ended
pub fn expire_hitboxes(clock: Res<GameClock>, hitboxes: Query<(Entity, &Hitbox)>, mut despawns: ResMut<DespawnQueue>) {
    for (entity, hitbox) in hitboxes.iter() {
        if clock.now_ms() >= hitbox.expires_at_ms {
            despawns.schedule(entity);
        }
    }
}

/// Move projectiles along their direction and cull those that left the stage
pub fn move_projectiles(
    clock: Res<GameClock>,
    settings: Res<GameSettings>,
    stage: Option<Res<Stage>>,
    mut projectiles: Query<(Entity, &Projectile, &Body, &mut Transform)>,
    mut despawns: ResMut<DespawnQueue>,
) {
    let step = clock.delta_ms() as f32;
    let bounds = stage.map(|s| s.bounds().expanded(settings.projectile_margin));

    for (entity, projectile, body, mut transform) in projectiles.iter_mut() {
        let delta = projectile.direction * projectile.speed * step;
        transform.translation += delta.extend(0.0);

        if let Some(bounds) = bounds {
            if !body.aabb(transform.translation.truncate()).intersects(&bounds) {
                despawns.schedule(entity);
            }
        }
    }
}

struct OverlapCandidate {
    entity: Entity,
    hurtbox: Aabb,
    body: Aabb,
    faction: Faction,
    contact_damage: f32,
}

/// Stand-in for the engine's trigger notifications: reports attacks touching
/// actors' hurtboxes and hostile actors touching each other's bodies.
pub fn detect_overlaps(
    attacks: Query<(Entity, &Transform, &Body), With<AttackPayload>>,
    actors: Query<(Entity, &Transform, &Body, &Hurtbox, &Actor)>,
    despawns: Res<DespawnQueue>,
    mut overlaps: EventWriter<OverlapEvent>,
) {
    let candidates: SmallVec<[OverlapCandidate; 16]> = actors
        .iter()
        .filter(|(entity, .., actor)| !actor.is_destroy_scheduled() && !despawns.contains(*entity))
        .map(|(entity, transform, body, hurtbox, actor)| {
            let position = transform.translation.truncate();
            OverlapCandidate {
                entity,
                hurtbox: hurtbox.aabb(position),
                body: body.aabb(position),
                faction: actor.faction,
                contact_damage: actor.contact_damage,
            }
        })
        .collect();

    for (attack, transform, body) in attacks.iter() {
        if despawns.contains(attack) {
            continue;
        }
        let area = body.aabb(transform.translation.truncate());
        for target in candidates.iter().filter(|c| area.intersects(&c.hurtbox)) {
            overlaps.send(OverlapEvent {
                instigator: attack,
                target: target.entity,
            });
        }
    }

    for instigator in candidates.iter().filter(|c| c.contact_damage > 0.0) {
        for target in &candidates {
            if instigator.entity != target.entity
                && instigator.faction.is_hostile_to(target.faction)
                && instigator.body.intersects(&target.body)
            {
                overlaps.send(OverlapEvent {
                    instigator: instigator.entity,
                    target: target.entity,
                });
            }
        }
    }
}

// ============================================================================
// Damage phase
// ============================================================================

/// Decide which overlaps deal damage.
///
/// Attacks never hurt their owner or the owner's faction. A projectile is
/// consumed by the first actor it damages.
pub fn resolve_overlaps(
    mut overlaps: EventReader<OverlapEvent>,
    attacks: Query<(&AttackPayload, Has<Projectile>)>,
    actors: Query<&Actor>,
    mut despawns: ResMut<DespawnQueue>,
    mut damage: EventWriter<DamageEvent>,
) {
    for overlap in overlaps.read() {
        let Ok(target) = actors.get(overlap.target) else {
            continue;
        };

        if let Ok((payload, is_projectile)) = attacks.get(overlap.instigator) {
            if payload.owner == overlap.target || !payload.faction.is_hostile_to(target.faction) {
                continue;
            }
            if is_projectile && !despawns.schedule(overlap.instigator) {
                // Already spent on another target this frame
                continue;
            }
            damage.send(DamageEvent {
                source: payload.owner,
                target: overlap.target,
                amount: payload.damage,
                cause: DamageCause::Attack(payload.source.clone()),
            });
        } else if let Ok(instigator) = actors.get(overlap.instigator) {
            if instigator.faction.is_hostile_to(target.faction) && instigator.contact_damage > 0.0 {
                damage.send(DamageEvent {
                    source: overlap.instigator,
                    target: overlap.target,
                    amount: instigator.contact_damage,
                    cause: DamageCause::Contact,
                });
            }
        }
    }
}

/// Apply damage events to actors.
///
/// Invincible and dead targets absorb the hit silently. A lethal hit queues
/// the actor for despawn and fires [`ActorDied`] once.
pub fn apply_damage(
    clock: Res<GameClock>,
    mut events: EventReader<DamageEvent>,
    mut actors: Query<(&mut Actor, &mut RenderState)>,
    names: Query<&Name>,
    mut despawns: ResMut<DespawnQueue>,
    mut deaths: EventWriter<ActorDied>,
    mut combat_log: ResMut<CombatLog>,
) {
    for event in events.read() {
        let Ok((mut actor, mut render)) = actors.get_mut(event.target) else {
            continue;
        };
        let outcome = actor.damage(event.amount, clock.now_ms());
        if outcome == DamageOutcome::Ignored {
            continue;
        }
        render.tint = DAMAGE_TINT;

        let source = display_name(&names, event.source);
        let target = display_name(&names, event.target);
        let killed = outcome == DamageOutcome::Killed;
        combat_log.log_damage(source.clone(), target.clone(), event.cause.label().to_string(), event.amount, killed);

        if killed {
            debug!("{} killed by {} ({})", target, source, event.cause.label());
            combat_log.log_death(target, Some(source));
            despawns.schedule(event.target);
            deaths.send(ActorDied {
                victim: event.target,
                kind: actor.kind,
                killer: Some(event.source).filter(|&s| s != event.target),
            });
        }
    }
}

/// Apply heal requests, respecting each actor's health cap
pub fn apply_heals(
    mut requests: EventReader<HealRequest>,
    mut actors: Query<(&mut Actor, Option<&Name>)>,
    mut combat_log: ResMut<CombatLog>,
) {
    for request in requests.read() {
        let Ok((mut actor, name)) = actors.get_mut(request.target) else {
            continue;
        };
        if actor.is_destroy_scheduled() {
            continue;
        }
        let before = actor.health();
        let after = actor.add_health(request.amount);
        let target = name.map_or_else(|| actor.kind.name().to_string(), |n| n.as_str().to_string());
        combat_log.log_healing(target, after - before);
    }
}
