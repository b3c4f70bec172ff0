//! Combat system
//!
//! Implements the weapon and damage mechanics:
//! - Ability state machine and the data-driven weapon catalog
//! - Melee hitboxes and projectiles
//! - Overlap resolution with faction and owner exclusion
//! - Damage, death and heals
//! - Combat logging

use bevy::prelude::*;

pub mod ability;
pub mod ability_config;
pub mod attack;
pub mod events;
pub mod log;
pub mod systems;

use crate::simulation::SimulationPhase;
use events::*;
use systems::*;

/// Plugin for the combat system
pub struct CombatPlugin;

impl Plugin for CombatPlugin {
    fn build(&self, app: &mut App) {
        app
            // Combat events
            .add_event::<AttackRequest>()
            .add_event::<AbilityActivated>()
            .add_event::<OverlapEvent>()
            .add_event::<DamageEvent>()
            .add_event::<ActorDied>()
            .add_event::<HealRequest>()
            // Systems
            .add_systems(
                Update,
                (advance_abilities, trigger_abilities)
                    .chain()
                    .in_set(SimulationPhase::Abilities),
            )
            .add_systems(
                Update,
                (follow_owners, move_projectiles, expire_hitboxes, detect_overlaps)
                    .chain()
                    .in_set(SimulationPhase::Attacks),
            )
            .add_systems(
                Update,
                (resolve_overlaps, apply_damage, apply_heals)
                    .chain()
                    .in_set(SimulationPhase::Damage),
            );
    }
}
