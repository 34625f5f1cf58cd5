//! Error types
//!
//! Gameplay failure (hitting an obstacle) is a state transition, not an
//! error. Only setup and storage problems surface here.

use std::path::PathBuf;

use thiserror::Error;

/// Invalid tuning detected at startup
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("{field} must be greater than zero (got {value})")]
    NotPositive { field: &'static str, value: f32 },
    #[error("{field} must be zero or greater (got {value})")]
    Negative { field: &'static str, value: f32 },
    #[error("{field} must be between 0.0 and 1.0 (got {value})")]
    NotProbability { field: &'static str, value: f32 },
    #[error("{field} range is empty ({min} > {max})")]
    EmptyRange {
        field: &'static str,
        min: f32,
        max: f32,
    },
    #[error("min_gap ({min_gap}) must be at least obstacle_depth ({obstacle_depth})")]
    GapTooSmall { min_gap: f32, obstacle_depth: f32 },
    #[error("obstacle kind weights must sum to more than zero")]
    EmptyKindWeights,
    #[error("max_obstacles_per_slice must be at least 1")]
    NoObstaclesPerSlice,
    #[error("tiles_ahead must be at least 1")]
    NoGroundTiles,
    #[error("failed to read tuning file {path}: {message}")]
    Unreadable { path: PathBuf, message: String },
    #[error("failed to parse tuning file {path}: {message}")]
    Malformed { path: PathBuf, message: String },
}

/// High score storage failure (never fatal to a run)
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("corrupt high score file {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}
