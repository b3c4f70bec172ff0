//! Tile grids and where they come from
//!
//! The tile file format is owned by the level editor; the stage only ever
//! sees a finished [`TileGrid`]. [`TileSource`] is the seam: stages are
//! resolved by name, from RON files on disk or from memory.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::PathBuf;

use super::error::StageError;

/// One layer of tile codes, stored row by row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TileLayer {
    pub rows: Vec<Vec<u32>>,
}

impl TileLayer {
    pub fn new(rows: Vec<Vec<u32>>) -> Self {
        Self { rows }
    }

    /// Tile code at column `col`, row `row`
    pub fn code(&self, col: usize, row: usize) -> Option<u32> {
        self.rows.get(row).and_then(|r| r.get(col)).copied()
    }
}

/// A parsed stage layout
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TileGrid {
    /// Pixel size of one tile
    pub tile_width: u32,
    pub tile_height: u32,
    /// Grid size in tiles
    pub width: u32,
    pub height: u32,
    pub layers: Vec<TileLayer>,
}

impl TileGrid {
    /// Single-layer grid of square tiles, sized from `rows`
    pub fn from_rows(tile_size: u32, rows: Vec<Vec<u32>>) -> Self {
        let height = rows.len() as u32;
        let width = rows.first().map_or(0, |r| r.len()) as u32;
        Self {
            tile_width: tile_size,
            tile_height: tile_size,
            width,
            height,
            layers: vec![TileLayer::new(rows)],
        }
    }

    /// Computed in `f32` so oversized stage files cannot overflow
    pub fn pixel_width(&self) -> f32 {
        self.width as f32 * self.tile_width as f32
    }

    pub fn pixel_height(&self) -> f32 {
        self.height as f32 * self.tile_height as f32
    }

    /// The layer spawns are read from
    pub fn main_layer(&self) -> Option<&TileLayer> {
        self.layers.first()
    }
}

/// Resolves a stage name to its tile grid
pub trait TileSource {
    fn load(&self, name: &str) -> Result<TileGrid, StageError>;
}

/// Reads `<root>/<name>.ron`
#[derive(Debug, Clone)]
pub struct FileTileSource {
    root: PathBuf,
}

impl FileTileSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn path_for(&self, name: &str) -> PathBuf {
        self.root.join(format!("{}.ron", name))
    }
}

impl TileSource for FileTileSource {
    fn load(&self, name: &str) -> Result<TileGrid, StageError> {
        let path = self.path_for(name);
        let contents = std::fs::read_to_string(&path).map_err(|source| {
            if source.kind() == ErrorKind::NotFound {
                StageError::UnknownStage(name.to_string())
            } else {
                StageError::Io {
                    path: path.clone(),
                    source,
                }
            }
        })?;
        ron::from_str(&contents).map_err(|e| StageError::Parse {
            path,
            message: e.to_string(),
        })
    }
}

/// Stages held in memory, for tests and generated levels
#[derive(Debug, Clone, Default)]
pub struct MemoryTileSource {
    grids: HashMap<String, TileGrid>,
}

impl MemoryTileSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: impl Into<String>, grid: TileGrid) -> Self {
        self.insert(name, grid);
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, grid: TileGrid) {
        self.grids.insert(name.into(), grid);
    }
}

impl TileSource for MemoryTileSource {
    fn load(&self, name: &str) -> Result<TileGrid, StageError> {
        self.grids
            .get(name)
            .cloned()
            .ok_or_else(|| StageError::UnknownStage(name.to_string()))
    }
}
