use std::path::PathBuf;

use thiserror::Error;

/// Everything that can abort stage construction.
///
/// A failed load never leaves a partially populated stage behind.
#[derive(Debug, Error)]
pub enum StageError {
    #[error("stage '{0}' does not contain a tile layer")]
    NoLayers(String),

    #[error("unknown stage '{0}'")]
    UnknownStage(String),

    #[error("failed to read stage file {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse stage file {path:?}: {message}")]
    Parse { path: PathBuf, message: String },

    #[error("stage '{stage}' must contain exactly one player spawn, found {found}")]
    PlayerSpawnCount { stage: String, found: usize },

    #[error("layer {layer} row {row} has {found} tiles, expected {expected}")]
    RaggedLayer {
        layer: usize,
        row: usize,
        found: usize,
        expected: usize,
    },
}
