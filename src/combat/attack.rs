//! Attack entities: melee hitboxes and projectiles
//!
//! Both carry an [`AttackPayload`] naming their owner, so overlap resolution
//! can skip the owner and its allies. The owner reference is an entity
//! handle; an attack outliving its owner simply stops following it.

use bevy::prelude::*;

use crate::actor::Faction;
use crate::collision::Body;
use crate::stage::StageMember;

/// Damage carried by a hitbox or projectile
#[derive(Component, Debug, Clone, PartialEq)]
pub struct AttackPayload {
    pub owner: Entity,
    pub faction: Faction,
    pub damage: f32,
    /// Ability name, for the combat log
    pub source: String,
}

/// A melee damage zone pinned to its owner
#[derive(Component, Debug, Clone, Copy, PartialEq)]
pub struct Hitbox {
    /// Offset from the owner's position, fixed at activation
    pub offset: Vec2,
    pub expires_at_ms: u64,
}

/// A moving damage carrier
#[derive(Component, Debug, Clone, Copy, PartialEq)]
pub struct Projectile {
    /// Unit vector
    pub direction: Vec2,
    /// Pixels per millisecond
    pub speed: f32,
}

#[derive(Debug, Clone)]
pub struct HitboxSpawn {
    pub payload: AttackPayload,
    pub offset: Vec2,
    pub size: Vec2,
    pub expires_at_ms: u64,
}

#[derive(Debug, Clone)]
pub struct ProjectileSpawn {
    pub payload: AttackPayload,
    pub origin: Vec2,
    pub direction: Vec2,
    pub speed: f32,
    pub size: Vec2,
}

/// What an ability's action asks the world to create
#[derive(Debug, Clone)]
pub enum AttackSpawn {
    Hitbox(HitboxSpawn),
    Projectile(ProjectileSpawn),
}

impl AttackSpawn {
    pub fn payload(&self) -> &AttackPayload {
        match self {
            AttackSpawn::Hitbox(spawn) => &spawn.payload,
            AttackSpawn::Projectile(spawn) => &spawn.payload,
        }
    }
}

/// Create the entity for an attack.
///
/// Projectiles live on the stage like any other object; hitboxes belong to
/// their owner and are positioned from it every frame.
pub fn spawn_attack(commands: &mut Commands, spawn: AttackSpawn, owner_position: Vec2) -> Entity {
    match spawn {
        AttackSpawn::Hitbox(hitbox) => {
            let position = owner_position + hitbox.offset;
            commands
                .spawn((
                    Hitbox {
                        offset: hitbox.offset,
                        expires_at_ms: hitbox.expires_at_ms,
                    },
                    Body::new(hitbox.size.x, hitbox.size.y),
                    Transform::from_xyz(position.x, position.y, 0.0),
                    hitbox.payload,
                ))
                .id()
        }
        AttackSpawn::Projectile(projectile) => commands
            .spawn((
                Projectile {
                    direction: projectile.direction,
                    speed: projectile.speed,
                },
                Body::new(projectile.size.x, projectile.size.y),
                Transform::from_xyz(projectile.origin.x, projectile.origin.y, 0.0),
                projectile.payload,
                StageMember,
            ))
            .id(),
    }
}
