//! Runner simulation
//!
//! All gameplay logic lives here, with no rendering or engine
//! dependencies:
//! - Seeded RNG only, threaded explicitly into placement
//! - Fixed timestep for motion, variable timestep for track upkeep
//! - Contacts come in as events, presentation goes out as events

pub mod coin;
pub mod collision;
pub mod danger;
pub mod physics;
pub mod player;
pub mod pool;
pub mod score;
pub mod spawner;
pub mod state;
pub mod tick;
pub mod track;

pub use coin::{Coin, pickup_value};
pub use collision::{Contact, Resolution};
pub use danger::{DangerTransition, DangerWorld};
pub use physics::ArcadePhysics;
pub use player::{PlayerMotion, PlayerState};
pub use pool::{EntityPool, TrackPositioned};
pub use score::{HighScoreOutcome, ScoreEngine};
pub use spawner::{BlockPattern, ObstacleSpawner};
pub use state::{
    Aabb, DangerExitCause, GameEvent, GamePhase, InputAction, Obstacle, ObstacleKind, RngState,
};
pub use tick::{RunSummary, Simulation};
pub use track::TrackSegmenter;
