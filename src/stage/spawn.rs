//! Tile code to spawn mapping
//!
//! A fixed registry: each code maps to a recipe describing what to create at
//! that cell. Codes not listed spawn nothing.

use bevy::prelude::*;

use crate::actor::ActorKind;

pub const TILE_OBSTACLE: u32 = 1;
pub const TILE_PLAYER: u32 = 2;

/// How an animated decoration is drawn
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DecorationStyle {
    pub sheet: &'static str,
    pub frames: u16,
    pub frame_delay_ms: u64,
    /// Added to the cell position
    pub offset: Vec2,
    pub scale: f32,
}

pub const CANDY_CANE: DecorationStyle = DecorationStyle {
    sheet: "models/candy_cane.png",
    frames: 24,
    frame_delay_ms: 50,
    offset: Vec2::new(-128.0, -128.0),
    scale: 2.0,
};

pub const LOLLIPOP: DecorationStyle = DecorationStyle {
    sheet: "models/lollipop.png",
    frames: 24,
    frame_delay_ms: 50,
    offset: Vec2::new(-128.0, -32.0),
    scale: 1.25,
};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SpawnKind {
    Obstacle { size: Vec2 },
    Player,
    Decoration(DecorationStyle),
    Enemy(ActorKind),
}

impl SpawnKind {
    /// Recipe for `code`, or `None` for empty and unknown codes
    pub fn for_code(code: u32, tile_size: Vec2) -> Option<Self> {
        match code {
            TILE_OBSTACLE => Some(SpawnKind::Obstacle { size: tile_size }),
            TILE_PLAYER => Some(SpawnKind::Player),
            3 => Some(SpawnKind::Decoration(CANDY_CANE)),
            4 => Some(SpawnKind::Decoration(LOLLIPOP)),
            5 => Some(SpawnKind::Enemy(ActorKind::PizzaZombie)),
            6 => Some(SpawnKind::Enemy(ActorKind::TomatoZombie)),
            _ => None,
        }
    }
}

/// One object to create when the stage is populated
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpawnPlan {
    pub kind: SpawnKind,
    /// Final position (top-left), offsets already applied
    pub position: Vec2,
}
