//! Ability state machine
//!
//! An [`Ability`] is the equipped weapon of an actor. It cycles through
//! `Idle -> Active -> CoolingDown -> Idle`:
//!
//! - [`Ability::try_activate`] only does something while Idle. It enters
//!   Active, records the activation time and runs the ability's action,
//!   which produces either a melee hitbox or a projectile.
//! - [`Ability::advance`] leaves Active once the active window has elapsed
//!   and leaves CoolingDown once the full cooldown has elapsed since then.
//!
//! Both operations are pure with respect to the world: the caller receives an
//! [`Activation`] describing what to spawn and which sound to request.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use super::ability_config::{AbilityConfig, Aim, EffectConfig};
use super::attack::{AttackPayload, AttackSpawn, HitboxSpawn, ProjectileSpawn};
use crate::actor::Faction;
use crate::audio::SoundCue;
use crate::rng::GameRng;

/// Every weapon in the catalog
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AbilityKind {
    BurgerPunch,
    PastaWhip,
    PizzaBite,
    BurgerExplosion,
    SeedShooter,
    MeatballShooter,
}

impl AbilityKind {
    pub const ALL: [AbilityKind; 6] = [
        AbilityKind::BurgerPunch,
        AbilityKind::PastaWhip,
        AbilityKind::PizzaBite,
        AbilityKind::BurgerExplosion,
        AbilityKind::SeedShooter,
        AbilityKind::MeatballShooter,
    ];

    /// Parse a kind from its identifier, as written in config files
    pub fn parse(name: &str) -> Result<Self, String> {
        Self::ALL
            .into_iter()
            .find(|kind| format!("{:?}", kind) == name)
            .ok_or_else(|| {
                let valid: Vec<String> = Self::ALL.iter().map(|k| format!("{:?}", k)).collect();
                format!("Unknown ability: '{}'. Valid abilities: {}", name, valid.join(", "))
            })
    }
}

/// Where an attack appears relative to its owner's position.
///
/// `x_min`/`x_max` are the horizontal offsets for an owner facing left and
/// right respectively; `y` is shared.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpawnOffset {
    pub x_min: f32,
    pub x_max: f32,
    pub y: f32,
}

impl SpawnOffset {
    pub fn resolve(&self, facing_left: bool) -> Vec2 {
        let x = if facing_left { self.x_min } else { self.x_max };
        Vec2::new(x, self.y)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AbilityState {
    Idle,
    Active { since_ms: u64 },
    CoolingDown { since_ms: u64 },
}

/// Everything an action may read about the world.
///
/// Built by the caller for each activation so abilities never reach into
/// global state to find their owner or the player.
#[derive(Debug, Clone, Copy)]
pub struct ActionContext {
    pub owner: Entity,
    pub owner_position: Vec2,
    pub facing_left: bool,
    pub faction: Faction,
    /// Current player position, if a player exists
    pub player_position: Option<Vec2>,
}

impl ActionContext {
    fn facing_direction(&self) -> Vec2 {
        if self.facing_left {
            Vec2::NEG_X
        } else {
            Vec2::X
        }
    }
}

/// The result of a successful activation
#[derive(Debug, Clone)]
pub struct Activation {
    pub attack: AttackSpawn,
    pub sound: Option<SoundCue>,
}

/// An equipped weapon, stored on the same entity as its owning actor
#[derive(Component, Debug, Clone)]
pub struct Ability {
    pub kind: AbilityKind,
    pub name: String,
    pub damage: f32,
    active_duration_ms: u64,
    cooldown_duration_ms: u64,
    pub spawn: SpawnOffset,
    pub effect: EffectConfig,
    pub sound: Option<SoundCue>,
    state: AbilityState,
    activated_at_ms: Option<u64>,
    /// Mirrors the owner's facing
    pub mirrored: bool,
}

impl Ability {
    /// Build from a catalog entry. Random timings are drawn here, once.
    pub fn from_config(kind: AbilityKind, config: &AbilityConfig, rng: &mut GameRng) -> Self {
        let active = config.active_duration.draw(rng);
        let cooldown = config.cooldown.draw(rng);
        Self::new(kind, config, active, cooldown)
    }

    /// Build from a catalog entry with explicit timings
    pub fn new(kind: AbilityKind, config: &AbilityConfig, active_duration_ms: u64, cooldown_duration_ms: u64) -> Self {
        Self {
            kind,
            name: config.name.clone(),
            damage: config.damage,
            active_duration_ms,
            cooldown_duration_ms,
            spawn: config.spawn,
            effect: config.effect.clone(),
            sound: config.sound.clone(),
            state: AbilityState::Idle,
            activated_at_ms: None,
            mirrored: false,
        }
    }

    pub fn state(&self) -> AbilityState {
        self.state
    }

    pub fn is_idle(&self) -> bool {
        self.state == AbilityState::Idle
    }

    pub fn is_active(&self) -> bool {
        matches!(self.state, AbilityState::Active { .. })
    }

    /// Fires projectiles rather than a melee hitbox
    pub fn is_ranged(&self) -> bool {
        matches!(self.effect, EffectConfig::Projectile { .. })
    }

    pub fn active_duration_ms(&self) -> u64 {
        self.active_duration_ms
    }

    pub fn cooldown_duration_ms(&self) -> u64 {
        self.cooldown_duration_ms
    }

    /// When the ability last entered Active
    pub fn activated_at_ms(&self) -> Option<u64> {
        self.activated_at_ms
    }

    /// Activate if Idle. Any other state is a silent no-op returning `None`.
    pub fn try_activate(&mut self, now_ms: u64, ctx: &ActionContext) -> Option<Activation> {
        if self.state != AbilityState::Idle {
            return None;
        }
        self.state = AbilityState::Active { since_ms: now_ms };
        self.activated_at_ms = Some(now_ms);

        Some(Activation {
            attack: self.action(now_ms, ctx),
            sound: self.sound.clone(),
        })
    }

    /// Progress the timers. Returns the new state when a transition happened.
    ///
    /// At most one transition per call. The cooldown is anchored at the end of
    /// the active window, not at the frame that noticed it, so the Idle instant
    /// does not depend on the frame step. Idle is reached once strictly more
    /// than the cooldown has elapsed.
    pub fn advance(&mut self, now_ms: u64) -> Option<AbilityState> {
        let next = match self.state {
            AbilityState::Active { since_ms } if now_ms.saturating_sub(since_ms) >= self.active_duration_ms => {
                AbilityState::CoolingDown {
                    since_ms: since_ms + self.active_duration_ms,
                }
            }
            AbilityState::CoolingDown { since_ms } if now_ms.saturating_sub(since_ms) > self.cooldown_duration_ms => {
                AbilityState::Idle
            }
            _ => return None,
        };
        self.state = next;
        Some(next)
    }

    /// What this ability produces when it fires
    fn action(&self, now_ms: u64, ctx: &ActionContext) -> AttackSpawn {
        let payload = AttackPayload {
            owner: ctx.owner,
            faction: ctx.faction,
            damage: self.damage,
            source: self.name.clone(),
        };

        match &self.effect {
            EffectConfig::Melee { hitbox } => AttackSpawn::Hitbox(HitboxSpawn {
                payload,
                offset: self.spawn.resolve(ctx.facing_left),
                size: Vec2::from(*hitbox),
                expires_at_ms: now_ms + self.active_duration_ms,
            }),
            EffectConfig::Projectile {
                speed,
                size,
                aim,
                launch_height,
            } => {
                let direction = match aim {
                    Aim::Tracking => ctx
                        .player_position
                        .map(|target| (target - ctx.owner_position).normalize_or_zero())
                        .filter(|dir| *dir != Vec2::ZERO)
                        .unwrap_or_else(|| ctx.facing_direction()),
                    Aim::Facing => ctx.facing_direction(),
                };
                AttackSpawn::Projectile(ProjectileSpawn {
                    payload,
                    origin: ctx.owner_position - Vec2::new(0.0, *launch_height),
                    direction,
                    speed: *speed,
                    size: Vec2::from(*size),
                })
            }
        }
    }
}
