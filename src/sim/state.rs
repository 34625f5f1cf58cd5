//! Shared simulation types
//!
//! Entities, events and input commands passed between the simulation and
//! its host.

use glam::Vec3;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

/// Current phase of a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Constructed, `initialize` not called yet
    Ready,
    /// Active gameplay
    Running,
    /// Run ended
    GameOver,
}

/// Edge-triggered player commands (one per key press)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum InputAction {
    MoveLeft,
    MoveRight,
    Jump,
    Slide,
}

/// Obstacle types, named by the maneuver that clears them
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ObstacleKind {
    /// Low block, jump over it
    Jump,
    /// Overhead bar, slide under it
    Slide,
    /// Tall block, needs both jumps
    DoubleJump,
    /// Plain cube from the sliced spawner
    Generic,
}

impl ObstacleKind {
    /// Vertical extent (bottom, top) above the ground
    pub fn vertical_extent(self) -> (f32, f32) {
        match self {
            ObstacleKind::Jump => (0.0, 1.0),
            ObstacleKind::Slide => (1.2, 3.0),
            ObstacleKind::DoubleJump => (0.0, 5.5),
            ObstacleKind::Generic => (0.0, 1.0),
        }
    }

    /// Height of a coin placed with this obstacle, on the path of the
    /// maneuver that clears it
    pub fn coin_height(self) -> f32 {
        match self {
            ObstacleKind::Jump => 2.5,
            ObstacleKind::Slide => 0.5,
            ObstacleKind::DoubleJump => 6.5,
            ObstacleKind::Generic => 2.0,
        }
    }
}

/// Axis-aligned box
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    /// Box from a bottom-centre point and size
    pub fn from_base(base: Vec3, width: f32, height: f32, depth: f32) -> Self {
        let half = Vec3::new(width / 2.0, 0.0, depth / 2.0);
        Self {
            min: base - half,
            max: base + half + Vec3::new(0.0, height, 0.0),
        }
    }

    pub fn intersects(&self, other: &Aabb) -> bool {
        self.min.x < other.max.x
            && self.max.x > other.min.x
            && self.min.y < other.max.y
            && self.max.y > other.min.y
            && self.min.z < other.max.z
            && self.max.z > other.min.z
    }
}

/// An obstacle entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Obstacle {
    pub id: u32,
    /// Bottom-centre position
    pub pos: Vec3,
    pub lane: i32,
    pub kind: ObstacleKind,
    /// Frontier position when it was placed
    pub spawn_z: f32,
}

impl Obstacle {
    /// Collision box for a given footprint
    pub fn bounds(&self, width: f32, depth: f32) -> Aabb {
        let (bottom, top) = self.kind.vertical_extent();
        let base = Vec3::new(self.pos.x, self.pos.y + bottom, self.pos.z);
        Aabb::from_base(base, width, top - bottom, depth)
    }
}

/// Why the danger world ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DangerExitCause {
    TimerExpired,
    ShieldConsumed,
}

/// Notifications for the presentation layer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    /// Score shown on the HUD (sent every variable tick)
    ScoreUpdated { display: u64 },
    CoinCollected { amount: f32 },
    DangerEntered { trigger_score: f32 },
    DangerExited { exit_score: f32, cause: DangerExitCause },
    ShieldConsumed,
    GameOver {
        final_score: f32,
        high_score: f32,
        new_record: bool,
    },
}

/// RNG seed wrapper for serialization
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RngState {
    pub seed: u64,
}

impl RngState {
    pub fn new(seed: u64) -> Self {
        Self { seed }
    }

    pub fn to_rng(&self) -> Pcg32 {
        Pcg32::seed_from_u64(self.seed)
    }
}
