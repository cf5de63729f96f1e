use thiserror::Error;

#[derive(Debug, Error)]
pub enum MapError {
    #[error("tile table is empty")]
    Empty,

    #[error("row {row} has {actual} tiles, expected {expected}")]
    RaggedRow {
        row: usize,
        expected: usize,
        actual: usize,
    },

    #[error("unknown tile {tile:?} at row {row}, col {col}")]
    UnknownTile { row: usize, col: usize, tile: char },

    #[error("cell size must be positive, got {0}")]
    InvalidCellSize(f32),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}
