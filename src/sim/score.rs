//! Scoring
//!
//! Score = distance run + coins collected. Distance earns double inside the
//! danger world; coins never do.

use serde::{Deserialize, Serialize};

use crate::highscores::{HighScoreStore, load_or_zero};
use crate::tuning::{DangerScoring, ScoreTuning};

/// Result of committing a finished run's score
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HighScoreOutcome {
    pub final_score: f32,
    /// Best score stored before this run
    pub previous: f32,
    /// Value to display: the better of the two
    pub high_score: f32,
    /// Whether the stored best was replaced
    pub new_record: bool,
}

/// Distance and coin score accumulator
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoreEngine {
    tuning: ScoreTuning,
    start_z: f32,
    last_z: f32,
    distance_score: f32,
    coin_score: f32,
}

impl ScoreEngine {
    pub fn new(tuning: ScoreTuning) -> Self {
        Self {
            tuning,
            start_z: 0.0,
            last_z: 0.0,
            distance_score: 0.0,
            coin_score: 0.0,
        }
    }

    /// Start measuring from forward position `z`
    pub fn reset(&mut self, z: f32) {
        self.start_z = z;
        self.last_z = z;
        self.distance_score = 0.0;
        self.coin_score = 0.0;
    }

    /// Update distance score for the player's new forward position
    pub fn update(&mut self, player_z: f32, danger_active: bool) {
        let rate = if danger_active {
            self.tuning.distance_multiplier * self.tuning.danger_multiplier
        } else {
            self.tuning.distance_multiplier
        };
        match self.tuning.danger_scoring {
            DangerScoring::Incremental => {
                let delta = (player_z - self.last_z).max(0.0);
                self.distance_score += delta * rate;
            }
            DangerScoring::Absolute => {
                self.distance_score = (player_z - self.start_z) * rate;
            }
        }
        self.last_z = player_z;
    }

    /// Add coin score (never multiplied)
    pub fn add_coin_score(&mut self, amount: f32) {
        self.coin_score += amount.max(0.0);
        log::debug!("Coin score: {}", self.coin_score);
    }

    pub fn distance_score(&self) -> f32 {
        self.distance_score
    }

    pub fn coin_score(&self) -> f32 {
        self.coin_score
    }

    /// Current score, floored
    pub fn score(&self) -> f32 {
        (self.distance_score + self.coin_score).floor()
    }

    /// Score as shown on the HUD
    pub fn display(&self) -> u64 {
        self.score().max(0.0) as u64
    }

    /// Compare the final score to the stored best and save it if beaten
    pub fn commit_high_score(&self, store: &mut dyn HighScoreStore) -> HighScoreOutcome {
        let previous = load_or_zero(store);
        let final_score = self.score();
        let new_record = final_score > previous;
        if new_record {
            if let Err(e) = store.set_high_score(final_score) {
                log::warn!("Could not save high score {}: {}", final_score, e);
            } else {
                log::info!("New high score: {} (was {})", final_score, previous);
            }
        }
        HighScoreOutcome {
            final_score,
            previous,
            high_score: final_score.max(previous),
            new_record,
        }
    }
}
