//! Stage: tile grid, spawned objects and draw order
//!
//! A [`Stage`] is built from a named tile grid. Populating it walks every
//! cell, creates the mapped object at the cell's pixel position and then adds
//! three border obstacles (left, right, floor) regardless of what the grid
//! contains. Every frame its children are re-sorted by vertical position so
//! objects lower on screen draw in front.
//!
//! Membership is tracked separately from the ECS: the stage holds entity
//! handles, and [`systems::sync_stage_children`] keeps that list in step with
//! spawns and despawns.

pub mod error;
pub mod spawn;
pub mod systems;
pub mod tiles;

use bevy::ecs::query::QueryFilter;
use bevy::prelude::*;

use crate::actor::{Actor, Enemy};
use crate::collision::Aabb;

pub use error::StageError;
pub use spawn::{DecorationStyle, SpawnKind, SpawnPlan};
pub use systems::{Decoration, Obstacle, PlayerLoadout, StageMember, StagePlugin, StageTeardown};
pub use tiles::{FileTileSource, MemoryTileSource, TileGrid, TileLayer, TileSource};

/// Thickness of the border obstacles in pixels
pub const BORDER_THICKNESS: f32 = 64.0;

/// The currently loaded stage
#[derive(Resource, Debug, Clone)]
pub struct Stage {
    name: String,
    grid: TileGrid,
    width: f32,
    height: f32,
    children: Vec<Entity>,
}

impl Stage {
    /// Resolve `name` through `source` and validate the grid.
    pub fn load(source: &impl TileSource, name: &str) -> Result<Self, StageError> {
        let grid = source.load(name)?;
        Self::from_grid(name, grid)
    }

    /// Validate an already parsed grid.
    ///
    /// Fails when there is no layer, when a layer's rows do not match the
    /// declared grid size, or when the main layer does not hold exactly one
    /// player spawn.
    pub fn from_grid(name: impl Into<String>, grid: TileGrid) -> Result<Self, StageError> {
        let name = name.into();
        let Some(main) = grid.main_layer() else {
            return Err(StageError::NoLayers(name));
        };

        let (width, height) = (grid.width as usize, grid.height as usize);
        for (layer_index, layer) in grid.layers.iter().enumerate() {
            for row in 0..height.max(layer.rows.len()) {
                let found = layer.rows.get(row).map_or(0, Vec::len);
                let expected = if row < height { width } else { 0 };
                if found != expected {
                    return Err(StageError::RaggedLayer {
                        layer: layer_index,
                        row,
                        found,
                        expected,
                    });
                }
            }
        }

        let players = main
            .rows
            .iter()
            .flatten()
            .filter(|&&code| code == spawn::TILE_PLAYER)
            .count();
        if players != 1 {
            return Err(StageError::PlayerSpawnCount {
                stage: name,
                found: players,
            });
        }

        Ok(Self {
            width: grid.pixel_width(),
            height: grid.pixel_height(),
            name,
            grid,
            children: Vec::new(),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn grid(&self) -> &TileGrid {
        &self.grid
    }

    pub fn width(&self) -> f32 {
        self.width
    }

    pub fn height(&self) -> f32 {
        self.height
    }

    /// The playable area
    pub fn bounds(&self) -> Aabb {
        Aabb::new(Vec2::ZERO, Vec2::new(self.width, self.height))
    }

    /// Everything the stage creates, in grid order (column by column) followed
    /// by the left, floor and right borders.
    pub fn spawn_plan(&self) -> Vec<SpawnPlan> {
        let mut plan = Vec::new();
        let tile = Vec2::new(self.grid.tile_width as f32, self.grid.tile_height as f32);

        if let Some(layer) = self.grid.main_layer() {
            for col in 0..self.grid.width as usize {
                for row in 0..self.grid.height as usize {
                    let Some(kind) = layer.code(col, row).and_then(|code| SpawnKind::for_code(code, tile)) else {
                        continue;
                    };
                    let cell = Vec2::new(col as f32 * tile.x, row as f32 * tile.y);
                    let position = match kind {
                        SpawnKind::Decoration(style) => cell + style.offset,
                        _ => cell,
                    };
                    plan.push(SpawnPlan { kind, position });
                }
            }
        }

        plan.extend(self.border_plan());
        plan
    }

    fn border_plan(&self) -> [SpawnPlan; 3] {
        [
            SpawnPlan {
                kind: SpawnKind::Obstacle {
                    size: Vec2::new(BORDER_THICKNESS, self.height),
                },
                position: Vec2::new(-BORDER_THICKNESS, 0.0),
            },
            SpawnPlan {
                kind: SpawnKind::Obstacle {
                    size: Vec2::new(self.width, BORDER_THICKNESS),
                },
                position: Vec2::new(0.0, self.height),
            },
            SpawnPlan {
                kind: SpawnKind::Obstacle {
                    size: Vec2::new(BORDER_THICKNESS, self.height),
                },
                position: Vec2::new(self.width, 0.0),
            },
        ]
    }

    /// Children in draw order (back to front)
    pub fn children(&self) -> &[Entity] {
        &self.children
    }

    /// Register a child. Returns false if it was already a member.
    pub fn add_child(&mut self, entity: Entity) -> bool {
        if self.children.contains(&entity) {
            return false;
        }
        self.children.push(entity);
        true
    }

    /// Drop every child for which `keep` returns false, preserving order
    pub fn retain_children(&mut self, keep: impl FnMut(&Entity) -> bool) {
        self.children.retain(keep);
    }

    /// Remove and return every child
    pub fn take_children(&mut self) -> Vec<Entity> {
        std::mem::take(&mut self.children)
    }

    /// Re-sort children by ascending vertical position.
    ///
    /// The sort is stable, so objects on the same row keep their relative
    /// order. Children without a position sort to the back. Only the order of
    /// the list changes; nothing about the children themselves.
    pub fn sort_draw_order(&mut self, y_of: impl Fn(Entity) -> Option<f32>) {
        let mut keyed: Vec<(f32, Entity)> = self
            .children
            .iter()
            .map(|&e| (y_of(e).unwrap_or(f32::NEG_INFINITY), e))
            .collect();
        keyed.sort_by(|a, b| a.0.total_cmp(&b.0));
        self.children = keyed.into_iter().map(|(_, e)| e).collect();
    }

    /// Snapshot of the children accepted by `keep`, in draw order
    pub fn children_where(&self, keep: impl Fn(Entity) -> bool) -> Vec<Entity> {
        self.children.iter().copied().filter(|&e| keep(e)).collect()
    }

    /// Snapshot of the children matched by `query`
    pub fn children_matching<F: QueryFilter>(&self, query: &Query<(), F>) -> Vec<Entity> {
        self.children_where(|e| query.contains(e))
    }

    /// Every actor currently on the stage, derived fresh on each call
    pub fn entities(&self, actors: &Query<(), With<Actor>>) -> Vec<Entity> {
        self.children_matching(actors)
    }

    /// Every enemy currently on the stage, derived fresh on each call
    pub fn enemies(&self, enemies: &Query<(), With<Enemy>>) -> Vec<Entity> {
        self.children_matching(enemies)
    }
}
