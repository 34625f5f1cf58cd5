//! Lane Runner - An endless three-lane runner simulation
//!
//! Core modules:
//! - `sim`: Simulation (player motion, placement, scoring, danger world)
//! - `tuning`: Data-driven game balance
//! - `highscores`: Persisted best score
//! - `persistence`: Atomic file writes for saved state
//! - `autopilot`: Input source that plays the game by itself

pub mod autopilot;
pub mod error;
pub mod highscores;
pub mod persistence;
pub mod sim;
pub mod tuning;

pub use error::{ConfigError, StorageError};
pub use highscores::{HighScoreStore, JsonFileStore, MemoryStore};
pub use tuning::Tuning;

/// Game configuration constants
pub mod consts {
    /// Fixed simulation timestep (50 Hz physics rate)
    pub const SIM_DT: f32 = 1.0 / 50.0;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;

    /// Lowest and highest lane index
    pub const MIN_LANE: i32 = -1;
    pub const MAX_LANE: i32 = 1;

    /// Lowest, middle and highest danger-world layer
    pub const MIN_LAYER: i32 = 0;
    pub const MID_LAYER: i32 = 1;
    pub const MAX_LAYER: i32 = 2;

    /// Jumps available after touching the ground
    pub const MAX_JUMPS: u8 = 2;

    /// Ground surface height
    pub const GROUND_Y: f32 = 0.0;
}

/// Critically damped approach of `current` toward `target`.
///
/// `velocity` carries the rate of change between calls. The result never
/// passes the target; when it would, it lands exactly on it and the
/// velocity is cleared.
pub fn smooth_damp(current: f32, target: f32, velocity: &mut f32, smooth_time: f32, dt: f32) -> f32 {
    if dt <= 0.0 {
        return current;
    }
    let smooth_time = smooth_time.max(0.0001);
    let omega = 2.0 / smooth_time;
    let x = omega * dt;
    let decay = 1.0 / (1.0 + x + 0.48 * x * x + 0.235 * x * x * x);

    let change = current - target;
    let temp = (*velocity + omega * change) * dt;
    *velocity = (*velocity - omega * temp) * decay;
    let mut output = target + (change + temp) * decay;

    if (target - current > 0.0) == (output > target) {
        output = target;
        *velocity = 0.0;
    }
    output
}

/// Linear interpolation with `t` clamped to [0, 1]
#[inline]
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t.clamp(0.0, 1.0)
}

/// World-space x of a lane centre
#[inline]
pub fn lane_to_x(lane: i32, lane_distance: f32) -> f32 {
    lane as f32 * lane_distance
}
