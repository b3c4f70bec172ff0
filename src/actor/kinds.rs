//! Actor archetypes
//!
//! Every actor the stage can spawn is one of a fixed set of kinds. Stats live
//! in a single match table so adding an archetype never touches spawn code.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use super::{Actor, AnimationPlayer, Enemy, Faction, MovementState, Player, RenderState};
use crate::collision::{Body, Hurtbox};
use crate::combat::ability::{Ability, AbilityKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ActorKind {
    Player,
    /// Melee enemy (tile code 5)
    PizzaZombie,
    /// Ranged enemy (tile code 6)
    TomatoZombie,
}

/// Static stats for an [`ActorKind`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ActorProfile {
    pub name: &'static str,
    pub health: f32,
    pub contact_damage: f32,
    /// Pixels per millisecond at unit velocity
    pub speed: f32,
    pub invincibility_ms: u64,
    pub body: Vec2,
    /// Hittable region as (offset, size) relative to the position
    pub hurtbox: (Vec2, Vec2),
    pub sheet: &'static str,
    pub frame_delay_ms: u64,
    pub default_weapon: Option<AbilityKind>,
    /// Horizontal distance at which the AI starts attacking
    pub attack_range: f32,
}

impl ActorKind {
    pub const ALL: [ActorKind; 3] = [ActorKind::Player, ActorKind::PizzaZombie, ActorKind::TomatoZombie];

    pub fn profile(self) -> ActorProfile {
        match self {
            ActorKind::Player => ActorProfile {
                name: "Player",
                health: 10.0,
                contact_damage: 0.0,
                speed: 0.35,
                invincibility_ms: 1000,
                body: Vec2::new(64.0, 32.0),
                hurtbox: (Vec2::new(0.0, -96.0), Vec2::new(64.0, 128.0)),
                sheet: "player.png",
                frame_delay_ms: 120,
                default_weapon: Some(AbilityKind::BurgerPunch),
                attack_range: 96.0,
            },
            ActorKind::PizzaZombie => ActorProfile {
                name: "Pizza Zombie",
                health: 4.0,
                contact_damage: 1.0,
                speed: 0.12,
                invincibility_ms: 400,
                body: Vec2::new(64.0, 32.0),
                hurtbox: (Vec2::new(0.0, -80.0), Vec2::new(64.0, 112.0)),
                sheet: "pizza_zombie.png",
                frame_delay_ms: 150,
                default_weapon: Some(AbilityKind::PizzaBite),
                attack_range: 72.0,
            },
            ActorKind::TomatoZombie => ActorProfile {
                name: "Tomato Zombie",
                health: 3.0,
                contact_damage: 1.0,
                speed: 0.08,
                invincibility_ms: 400,
                body: Vec2::new(56.0, 28.0),
                hurtbox: (Vec2::new(0.0, -64.0), Vec2::new(56.0, 92.0)),
                sheet: "tomato_zombie.png",
                frame_delay_ms: 150,
                default_weapon: Some(AbilityKind::SeedShooter),
                attack_range: 480.0,
            },
        }
    }

    pub fn faction(self) -> Faction {
        match self {
            ActorKind::Player => Faction::Player,
            ActorKind::PizzaZombie | ActorKind::TomatoZombie => Faction::Enemy,
        }
    }

    pub fn name(self) -> &'static str {
        self.profile().name
    }
}

/// Spawn an actor of `kind` with its top-left corner at `position`.
///
/// `weapon` is attached as the equipped ability. The caller is responsible
/// for registering the entity with the stage.
pub fn spawn_actor(
    commands: &mut Commands,
    kind: ActorKind,
    position: Vec2,
    weapon: Option<Ability>,
    health_cap: Option<f32>,
) -> Entity {
    let profile = kind.profile();
    let actor = Actor::from_kind(kind).with_health_cap(health_cap);
    let animation = AnimationPlayer::new(MovementState::Stand.cycle(profile.frame_delay_ms));

    let mut entity = commands.spawn((
        actor,
        Body::new(profile.body.x, profile.body.y),
        Hurtbox {
            offset: profile.hurtbox.0,
            size: profile.hurtbox.1,
        },
        Transform::from_xyz(position.x, position.y, 0.0),
        animation,
        RenderState::new(profile.sheet),
        Name::new(profile.name),
    ));
    match kind.faction() {
        Faction::Player => entity.insert(Player),
        Faction::Enemy => entity.insert(Enemy),
    };
    if let Some(ability) = weapon {
        entity.insert(ability);
    }
    entity.id()
}

/// Attach `ability` as the equipped weapon of `owner`, replacing any previous one.
pub fn set_weapon(commands: &mut Commands, owner: Entity, ability: Ability) {
    commands.entity(owner).insert(ability);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_player_is_player_faction() {
        for kind in ActorKind::ALL {
            assert_eq!(kind.faction() == Faction::Player, kind == ActorKind::Player);
        }
    }

    #[test]
    fn test_profiles_are_sane() {
        for kind in ActorKind::ALL {
            let profile = kind.profile();
            assert!(profile.health > 0.0, "{:?} has no health", kind);
            assert!(profile.speed > 0.0);
            assert!(profile.body.x > 0.0 && profile.body.y > 0.0);
            assert!(profile.default_weapon.is_some());
        }
    }

    #[test]
    fn test_player_deals_no_contact_damage() {
        assert_eq!(ActorKind::Player.profile().contact_damage, 0.0);
        assert!(ActorKind::PizzaZombie.profile().contact_damage > 0.0);
    }
}
