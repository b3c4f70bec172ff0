//! Combat events
//!
//! Defines the events that flow between the actor, ability and damage phases.

use bevy::prelude::*;

use super::ability::AbilityKind;
use crate::actor::ActorKind;

/// An actor wants to use its equipped weapon this frame
#[derive(Event, Debug, Clone, Copy)]
pub struct AttackRequest {
    pub attacker: Entity,
}

/// Fired when an ability actually activated (requests while not Idle fire nothing)
#[derive(Event, Debug, Clone)]
pub struct AbilityActivated {
    pub owner: Entity,
    pub kind: AbilityKind,
    pub name: String,
    /// The hitbox or projectile that was spawned
    pub attack: Entity,
}

/// Trigger-style overlap notification from the collision layer.
///
/// `instigator` is the hitbox, projectile or actor doing the touching.
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct OverlapEvent {
    pub instigator: Entity,
    pub target: Entity,
}

/// What caused a damage event
#[derive(Debug, Clone, PartialEq)]
pub enum DamageCause {
    /// A hitbox or projectile from the named ability
    Attack(String),
    /// Body contact with an enemy
    Contact,
}

impl DamageCause {
    pub fn label(&self) -> &str {
        match self {
            DamageCause::Attack(name) => name,
            DamageCause::Contact => "Contact",
        }
    }
}

/// Damage to apply to an actor
#[derive(Event, Debug, Clone)]
pub struct DamageEvent {
    /// Actor credited with the damage
    pub source: Entity,
    pub target: Entity,
    pub amount: f32,
    pub cause: DamageCause,
}

/// Fired exactly once per actor, on the hit that kills it
#[derive(Event, Debug, Clone, Copy)]
pub struct ActorDied {
    pub victim: Entity,
    pub kind: ActorKind,
    pub killer: Option<Entity>,
}

/// Request to add health to an actor
#[derive(Event, Debug, Clone, Copy)]
pub struct HealRequest {
    pub target: Entity,
    pub amount: f32,
}
