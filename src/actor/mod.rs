//! Actors: the player and every enemy
//!
//! An [`Actor`] owns health, contact damage, a per-frame velocity impulse, an
//! invincibility window and the Stand/Walk/Jump movement state. The equipped
//! weapon is a separate [`Ability`](crate::combat::ability::Ability) component
//! on the same entity, so it is created and destroyed together with it.
//!
//! ## Per-frame update
//! See [`systems::update_actor`] for the exact order of operations.

pub mod animation;
pub mod behavior;
pub mod kinds;
pub mod systems;

use bevy::prelude::*;

pub use animation::{AnimationCycle, AnimationPlayer};
pub use kinds::{ActorKind, ActorProfile};

/// Which side an actor fights on. Attacks never hurt their own faction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Faction {
    Player,
    Enemy,
}

impl Faction {
    pub fn is_hostile_to(self, other: Faction) -> bool {
        self != other
    }
}

/// Movement/animation state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MovementState {
    Stand,
    Walk,
    /// Only entered through [`Actor::begin_jump`]; velocity alone never produces it
    Jump,
}

impl MovementState {
    /// Animation frames for this state on the shared actor sheet layout
    pub fn cycle(self, frame_delay_ms: u64) -> AnimationCycle {
        match self {
            MovementState::Stand => AnimationCycle::new(5, 3, frame_delay_ms),
            MovementState::Walk => AnimationCycle::new(1, 3, frame_delay_ms),
            MovementState::Jump => AnimationCycle::new(4, 1, frame_delay_ms),
        }
    }
}

/// What a call to [`Actor::damage`] did
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DamageOutcome {
    /// Dead or inside the invincibility window; nothing changed
    Ignored,
    /// Health was reduced and the actor survived
    Wounded { remaining: f32 },
    /// Health reached zero; the actor is now scheduled for destruction
    Killed,
}

/// Marker for the single player-controlled actor
#[derive(Component, Debug, Default, Clone, Copy)]
pub struct Player;

/// Marker for hostile actors
#[derive(Component, Debug, Default, Clone, Copy)]
pub struct Enemy;

/// Colour applied while the damage flash is showing
pub const DAMAGE_TINT: [f32; 3] = [1.0, 0.35, 0.35];
/// Neutral colour
pub const NORMAL_TINT: [f32; 3] = [1.0, 1.0, 1.0];

/// Everything the renderer needs to draw an actor or decoration.
#[derive(Component, Debug, Clone, PartialEq)]
pub struct RenderState {
    /// Sprite sheet path
    pub sheet: String,
    /// Horizontally mirrored (facing left)
    pub mirrored: bool,
    /// 0.0 = invisible, 1.0 = opaque
    pub alpha: f32,
    pub tint: [f32; 3],
}

impl RenderState {
    pub fn new(sheet: impl Into<String>) -> Self {
        Self {
            sheet: sheet.into(),
            mirrored: false,
            alpha: 1.0,
            tint: NORMAL_TINT,
        }
    }
}

/// Core actor component containing health, damage and movement state.
#[derive(Component, Debug, Clone)]
pub struct Actor {
    pub kind: ActorKind,
    pub faction: Faction,
    health: f32,
    /// Optional ceiling for [`Actor::add_health`]
    health_cap: Option<f32>,
    /// Damage dealt to hostile actors on body contact
    pub contact_damage: f32,
    /// Per-frame movement impulse; consumed and reset by the update
    pub velocity: Vec2,
    /// Pixels per millisecond at unit velocity
    pub speed: f32,
    invincibility_duration_ms: u64,
    last_damage_ms: u64,
    damageable: bool,
    movement_state: MovementState,
    facing_left: bool,
    destroy_scheduled: bool,
}

impl Actor {
    pub fn new(
        kind: ActorKind,
        faction: Faction,
        health: f32,
        contact_damage: f32,
        speed: f32,
        invincibility_duration_ms: u64,
    ) -> Self {
        Self {
            kind,
            faction,
            health,
            health_cap: None,
            contact_damage,
            velocity: Vec2::ZERO,
            speed,
            invincibility_duration_ms,
            last_damage_ms: 0,
            damageable: true,
            movement_state: MovementState::Stand,
            facing_left: false,
            destroy_scheduled: false,
        }
    }

    /// Create an actor with the stats of `kind`.
    pub fn from_kind(kind: ActorKind) -> Self {
        let profile = kind.profile();
        Self::new(
            kind,
            kind.faction(),
            profile.health,
            profile.contact_damage,
            profile.speed,
            profile.invincibility_ms,
        )
    }

    pub fn with_health_cap(mut self, cap: Option<f32>) -> Self {
        self.health_cap = cap;
        self
    }

    pub fn health(&self) -> f32 {
        self.health
    }

    pub fn health_cap(&self) -> Option<f32> {
        self.health_cap
    }

    pub fn is_alive(&self) -> bool {
        self.health > 0.0
    }

    pub fn is_damageable(&self) -> bool {
        self.damageable
    }

    pub fn is_destroy_scheduled(&self) -> bool {
        self.destroy_scheduled
    }

    pub fn invincibility_duration_ms(&self) -> u64 {
        self.invincibility_duration_ms
    }

    pub fn last_damage_ms(&self) -> u64 {
        self.last_damage_ms
    }

    pub fn movement_state(&self) -> MovementState {
        self.movement_state
    }

    pub fn facing_left(&self) -> bool {
        self.facing_left
    }

    /// Apply `amount` damage at time `now_ms`.
    ///
    /// Ignored while invincible and after death. A surviving hit starts the
    /// invincibility window; a lethal hit schedules the actor for destruction
    /// and reports [`DamageOutcome::Killed`] exactly once.
    pub fn damage(&mut self, amount: f32, now_ms: u64) -> DamageOutcome {
        debug_assert!(amount >= 0.0, "Actor::damage: amount cannot be negative, got {}", amount);

        if !self.damageable || self.destroy_scheduled {
            return DamageOutcome::Ignored;
        }

        self.health -= amount;
        self.last_damage_ms = now_ms;
        self.damageable = false;

        if self.health <= 0.0 {
            self.destroy_scheduled = true;
            DamageOutcome::Killed
        } else {
            DamageOutcome::Wounded {
                remaining: self.health,
            }
        }
    }

    /// Increase health, clamped only by the configured cap. Returns the new health.
    pub fn add_health(&mut self, amount: f32) -> f32 {
        self.health += amount;
        if let Some(cap) = self.health_cap {
            self.health = self.health.min(cap);
        }
        self.health
    }

    /// Restore damageability once the invincibility window has passed.
    /// Returns true on the frame the window closes.
    pub fn refresh_invincibility(&mut self, now_ms: u64) -> bool {
        if self.damageable || self.destroy_scheduled {
            return false;
        }
        if now_ms.saturating_sub(self.last_damage_ms) > self.invincibility_duration_ms {
            self.damageable = true;
            return true;
        }
        false
    }

    /// Derive Stand/Walk from the current velocity.
    /// Returns the new state when it changed. Jump is left alone.
    pub fn update_movement_state(&mut self) -> Option<MovementState> {
        if self.movement_state == MovementState::Jump {
            return None;
        }
        let next = if self.velocity.length() == 0.0 {
            MovementState::Stand
        } else {
            MovementState::Walk
        };
        if next == self.movement_state {
            return None;
        }
        self.movement_state = next;
        Some(next)
    }

    /// Externally driven vertical motion started
    pub fn begin_jump(&mut self) -> bool {
        if self.movement_state == MovementState::Jump {
            return false;
        }
        self.movement_state = MovementState::Jump;
        true
    }

    /// Externally driven vertical motion finished; the next update re-derives Stand/Walk
    pub fn end_jump(&mut self) {
        if self.movement_state == MovementState::Jump {
            self.movement_state = MovementState::Stand;
        }
    }

    /// Mirror only while travelling left. Any other impulse, a purely vertical
    /// one included, faces right.
    pub fn face_from_velocity(&mut self) -> bool {
        self.facing_left = self.velocity.x < 0.0;
        self.facing_left
    }

    /// The displacement this frame's impulse produces over `delta_ms`
    pub fn frame_displacement(&self, delta_ms: u64) -> Vec2 {
        self.velocity * delta_ms as f32 * self.speed
    }

    /// Velocity is an impulse: cleared after every movement step
    pub fn clear_velocity(&mut self) {
        self.velocity = Vec2::ZERO;
    }
}
