//! High score persistence
//!
//! A single named float survives between runs. Stores are injected into the
//! simulation so tests can run against memory and the runner against disk.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::StorageError;
use crate::persistence::{read_json, write_json_atomic};

/// Key the best score is stored under
pub const HIGH_SCORE_KEY: &str = "HighScore";

/// Get/set access to the persisted best score
pub trait HighScoreStore {
    /// Stored best score, 0.0 if nothing was saved yet
    fn get_high_score(&self) -> Result<f32, StorageError>;

    /// Persist a new best score and flush it immediately
    fn set_high_score(&mut self, score: f32) -> Result<(), StorageError>;
}

/// Read the best score, treating storage failures as "no score yet"
pub fn load_or_zero(store: &dyn HighScoreStore) -> f32 {
    match store.get_high_score() {
        Ok(score) => score,
        Err(e) => {
            log::warn!("Could not read high score, using 0: {}", e);
            0.0
        }
    }
}

/// On-disk layout: a flat key/value map of floats
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct SavedFloats {
    #[serde(flatten)]
    values: HashMap<String, f32>,
}

/// JSON file store with atomic replace on write
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> Result<SavedFloats, StorageError> {
        Ok(read_json(&self.path)?.unwrap_or_default())
    }
}

impl HighScoreStore for JsonFileStore {
    fn get_high_score(&self) -> Result<f32, StorageError> {
        Ok(self
            .load()?
            .values
            .get(HIGH_SCORE_KEY)
            .copied()
            .unwrap_or(0.0))
    }

    fn set_high_score(&mut self, score: f32) -> Result<(), StorageError> {
        // Keep any other keys that share the file
        let mut saved = self.load().unwrap_or_default();
        saved.values.insert(HIGH_SCORE_KEY.to_string(), score);
        write_json_atomic(&self.path, &saved)?;
        log::info!("High score {} saved to {}", score, self.path.display());
        Ok(())
    }
}

/// In-memory store (tests, or hosts without durable storage)
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    high_score: f32,
    writes: u32,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-seeded with a previous best
    pub fn with_high_score(high_score: f32) -> Self {
        Self {
            high_score,
            writes: 0,
        }
    }

    /// Number of times the best score was written
    pub fn writes(&self) -> u32 {
        self.writes
    }
}

impl HighScoreStore for MemoryStore {
    fn get_high_score(&self) -> Result<f32, StorageError> {
        Ok(self.high_score)
    }

    fn set_high_score(&mut self, score: f32) -> Result<(), StorageError> {
        self.high_score = score;
        self.writes += 1;
        Ok(())
    }
}
