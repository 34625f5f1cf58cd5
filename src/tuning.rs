//! Data-driven game balance
//!
//! Every value has a default, so a tuning file only needs the fields it
//! overrides. Tuning is validated once at startup; the simulation assumes
//! it is sane afterwards.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// How the danger-world multiplier applies to distance score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum DangerScoring {
    /// Only distance covered while the danger world is active is doubled
    #[default]
    Incremental,
    /// Whole distance since the start is recomputed and doubled each tick
    Absolute,
}

/// Obstacle placement strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SpawnMode {
    /// Gap between placements shrinks as the player speeds up
    #[default]
    Paced,
    /// Fixed-length slices, each holding 1..=N generic obstacles
    Sliced,
}

/// Player movement
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerTuning {
    /// Forward speed at run start (units/s)
    pub start_forward_speed: f32,
    /// Forward acceleration (units/s²)
    pub speed_increase_rate: f32,
    /// Distance between lane centres
    pub lane_distance: f32,
    /// Smoothing time constant for lane changes (s)
    pub lane_smooth_time: f32,
    /// Upward impulse per jump (unit mass)
    pub jump_force: f32,
    /// Downward impulse when sliding in the air
    pub fall_impulse: f32,
    /// Gravity (units/s²)
    pub gravity: f32,
    /// How long a slide lasts (s)
    pub slide_duration: f32,
    /// Height multiplier while sliding
    pub slide_scale_y: f32,
    /// Standing height
    pub height: f32,
    /// Collision width
    pub width: f32,
    /// Vertical distance between danger-world layers
    pub layer_spacing: f32,
    /// Height of layer 0
    pub layer_base_height: f32,
    /// Smoothing time constant for layer changes (s)
    pub layer_smooth_time: f32,
    /// Minimum contact normal y for a ground contact to count
    pub ground_normal_threshold: f32,
}

impl Default for PlayerTuning {
    fn default() -> Self {
        Self {
            start_forward_speed: 5.0,
            speed_increase_rate: 0.1,
            lane_distance: 2.0,
            lane_smooth_time: 0.1,
            jump_force: 10.0,
            fall_impulse: 20.0,
            gravity: 9.81,
            slide_duration: 0.5,
            slide_scale_y: 0.5,
            height: 2.0,
            width: 1.0,
            layer_spacing: 2.0,
            layer_base_height: 0.0,
            layer_smooth_time: 0.1,
            ground_normal_threshold: 0.5,
        }
    }
}

/// Relative odds of each obstacle kind
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct KindWeights {
    pub jump: f32,
    pub slide: f32,
    pub double_jump: f32,
}

impl Default for KindWeights {
    fn default() -> Self {
        Self {
            jump: 0.2,
            slide: 0.4,
            double_jump: 0.4,
        }
    }
}

impl KindWeights {
    pub fn total(&self) -> f32 {
        self.jump + self.slide + self.double_jump
    }
}

/// Obstacle and coin placement
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SpawnTuning {
    pub mode: SpawnMode,
    /// How far ahead of the player placements are generated
    pub lookahead: f32,
    /// Distance from the start to the first placement
    pub first_placement_distance: f32,
    /// Smallest gap between consecutive placements
    pub min_gap: f32,
    /// Reaction time at zero difficulty (s)
    pub slow_reaction_time: f32,
    /// Reaction time at full difficulty (s)
    pub fast_reaction_time: f32,
    /// Forward speed at which difficulty reaches 1.0
    pub max_speed_for_difficulty: f32,
    /// Random gap multiplier range
    pub random_factor_min: f32,
    pub random_factor_max: f32,
    /// Two-lane block odds at zero difficulty
    pub double_block_base: f32,
    /// Extra two-lane block odds at full difficulty
    pub double_block_scale: f32,
    /// Difficulty from which three-lane blocks may appear
    pub full_block_min_difficulty: f32,
    /// Three-lane block odds at full difficulty
    pub full_block_chance: f32,
    pub kind_weights: KindWeights,
    /// Odds of a coin accompanying each obstacle
    pub coin_chance: f32,
    /// Obstacles further than this behind the player are removed
    pub despawn_offset: f32,
    /// Obstacle footprint across the lane
    pub obstacle_width: f32,
    /// Obstacle footprint along the track
    pub obstacle_depth: f32,
    /// Sliced mode: most obstacles in one slice
    pub max_obstacles_per_slice: u32,
}

impl Default for SpawnTuning {
    fn default() -> Self {
        Self {
            mode: SpawnMode::Paced,
            lookahead: 100.0,
            first_placement_distance: 30.0,
            min_gap: 10.0,
            slow_reaction_time: 1.6,
            fast_reaction_time: 0.6,
            max_speed_for_difficulty: 30.0,
            random_factor_min: 0.9,
            random_factor_max: 1.3,
            double_block_base: 0.15,
            double_block_scale: 0.45,
            full_block_min_difficulty: 0.6,
            full_block_chance: 0.25,
            kind_weights: KindWeights::default(),
            coin_chance: 0.35,
            despawn_offset: 5.0,
            obstacle_width: 1.6,
            obstacle_depth: 1.0,
            max_obstacles_per_slice: 3,
        }
    }
}

/// Coins
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CoinTuning {
    pub spin_deg_per_sec: f32,
    /// Coins further than this behind the player are removed
    pub cleanup_distance: f32,
    /// Pickup radius around the coin centre
    pub radius: f32,
}

impl Default for CoinTuning {
    fn default() -> Self {
        Self {
            spin_deg_per_sec: 200.0,
            cleanup_distance: 5.0,
            radius: 0.5,
        }
    }
}

/// Scoring
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoreTuning {
    pub distance_multiplier: f32,
    /// Distance score rate multiplier inside the danger world
    pub danger_multiplier: f32,
    /// Coin value = forward speed × this
    pub coin_value_per_speed: f32,
    pub danger_scoring: DangerScoring,
}

impl Default for ScoreTuning {
    fn default() -> Self {
        Self {
            distance_multiplier: 1.0,
            danger_multiplier: 2.0,
            coin_value_per_speed: 10.0,
            danger_scoring: DangerScoring::Incremental,
        }
    }
}

/// Danger world
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DangerTuning {
    pub initial_trigger_score: f32,
    /// Seconds the danger world lasts unless the shield is used
    pub duration: f32,
}

impl Default for DangerTuning {
    fn default() -> Self {
        Self {
            initial_trigger_score: 1000.0,
            duration: 10.0,
        }
    }
}

/// Track slicing and ground tiles
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackTuning {
    pub segment_length: f32,
    pub segments_ahead: u32,
    pub tile_length: f32,
    pub tiles_ahead: u32,
}

impl Default for TrackTuning {
    fn default() -> Self {
        Self {
            segment_length: 10.0,
            segments_ahead: 10,
            tile_length: 20.0,
            tiles_ahead: 3,
        }
    }
}

/// Complete game balance
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    pub player: PlayerTuning,
    pub spawn: SpawnTuning,
    pub coin: CoinTuning,
    pub score: ScoreTuning,
    pub danger: DangerTuning,
    pub track: TrackTuning,
}

fn positive(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::NotPositive { field, value })
    }
}

fn non_negative(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if value >= 0.0 {
        Ok(())
    } else {
        Err(ConfigError::Negative { field, value })
    }
}

fn probability(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::NotProbability { field, value })
    }
}

impl Tuning {
    /// Load tuning from a JSON file and validate it
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|e| ConfigError::Unreadable {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        let tuning: Tuning = serde_json::from_str(&text).map_err(|e| ConfigError::Malformed {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        tuning.validate()?;
        log::info!("Loaded tuning from {}", path.display());
        Ok(tuning)
    }

    /// Reject values the simulation cannot run with
    pub fn validate(&self) -> Result<(), ConfigError> {
        let p = &self.player;
        non_negative("start_forward_speed", p.start_forward_speed)?;
        non_negative("speed_increase_rate", p.speed_increase_rate)?;
        positive("lane_distance", p.lane_distance)?;
        positive("lane_smooth_time", p.lane_smooth_time)?;
        positive("jump_force", p.jump_force)?;
        non_negative("fall_impulse", p.fall_impulse)?;
        positive("gravity", p.gravity)?;
        positive("slide_duration", p.slide_duration)?;
        positive("slide_scale_y", p.slide_scale_y)?;
        positive("height", p.height)?;
        positive("width", p.width)?;
        positive("layer_spacing", p.layer_spacing)?;
        positive("layer_smooth_time", p.layer_smooth_time)?;
        probability("ground_normal_threshold", p.ground_normal_threshold)?;

        let s = &self.spawn;
        positive("lookahead", s.lookahead)?;
        non_negative("first_placement_distance", s.first_placement_distance)?;
        positive("min_gap", s.min_gap)?;
        positive("slow_reaction_time", s.slow_reaction_time)?;
        positive("fast_reaction_time", s.fast_reaction_time)?;
        positive("max_speed_for_difficulty", s.max_speed_for_difficulty)?;
        positive("random_factor_min", s.random_factor_min)?;
        if s.random_factor_min > s.random_factor_max {
            return Err(ConfigError::EmptyRange {
                field: "random_factor",
                min: s.random_factor_min,
                max: s.random_factor_max,
            });
        }
        probability("double_block_base", s.double_block_base)?;
        probability("double_block_scale", s.double_block_scale)?;
        probability("full_block_min_difficulty", s.full_block_min_difficulty)?;
        probability("full_block_chance", s.full_block_chance)?;
        probability("coin_chance", s.coin_chance)?;
        non_negative("kind_weights.jump", s.kind_weights.jump)?;
        non_negative("kind_weights.slide", s.kind_weights.slide)?;
        non_negative("kind_weights.double_jump", s.kind_weights.double_jump)?;
        if s.kind_weights.total() <= 0.0 {
            return Err(ConfigError::EmptyKindWeights);
        }
        non_negative("despawn_offset", s.despawn_offset)?;
        positive("obstacle_width", s.obstacle_width)?;
        positive("obstacle_depth", s.obstacle_depth)?;
        // Placements closer than one obstacle apart would overlap
        if s.min_gap < s.obstacle_depth {
            return Err(ConfigError::GapTooSmall {
                min_gap: s.min_gap,
                obstacle_depth: s.obstacle_depth,
            });
        }
        if s.max_obstacles_per_slice == 0 {
            return Err(ConfigError::NoObstaclesPerSlice);
        }

        non_negative("coin.spin_deg_per_sec", self.coin.spin_deg_per_sec)?;
        non_negative("coin.cleanup_distance", self.coin.cleanup_distance)?;
        positive("coin.radius", self.coin.radius)?;

        non_negative("distance_multiplier", self.score.distance_multiplier)?;
        positive("danger_multiplier", self.score.danger_multiplier)?;
        non_negative("coin_value_per_speed", self.score.coin_value_per_speed)?;

        positive("initial_trigger_score", self.danger.initial_trigger_score)?;
        positive("danger.duration", self.danger.duration)?;

        positive("segment_length", self.track.segment_length)?;
        positive("tile_length", self.track.tile_length)?;
        if self.track.tiles_ahead == 0 {
            return Err(ConfigError::NoGroundTiles);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        assert_eq!(Tuning::default().validate(), Ok(()));
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let json = r#"{ "danger": { "initial_trigger_score": 250.0 }, "spawn": { "mode": "sliced" } }"#;
        let tuning: Tuning = serde_json::from_str(json).unwrap();
        assert_eq!(tuning.danger.initial_trigger_score, 250.0);
        assert_eq!(tuning.danger.duration, 10.0);
        assert_eq!(tuning.spawn.mode, SpawnMode::Sliced);
        assert_eq!(tuning.spawn.min_gap, 10.0);
        assert_eq!(tuning.player.lane_distance, 2.0);
    }

    #[test]
    fn test_rejects_zero_min_gap() {
        let mut tuning = Tuning::default();
        tuning.spawn.min_gap = 0.0;
        assert_eq!(
            tuning.validate(),
            Err(ConfigError::NotPositive {
                field: "min_gap",
                value: 0.0
            })
        );
    }

    #[test]
    fn test_rejects_gap_tighter_than_an_obstacle() {
        let mut tuning = Tuning::default();
        tuning.spawn.min_gap = 1e-6;
        tuning.player.start_forward_speed = 0.0;
        tuning.player.speed_increase_rate = 0.0;
        assert_eq!(
            tuning.validate(),
            Err(ConfigError::GapTooSmall {
                min_gap: 1e-6,
                obstacle_depth: 1.0
            })
        );

        tuning.spawn.min_gap = 1.0;
        assert_eq!(tuning.validate(), Ok(()));
    }

    #[test]
    fn test_rejects_inverted_random_range() {
        let mut tuning = Tuning::default();
        tuning.spawn.random_factor_min = 2.0;
        tuning.spawn.random_factor_max = 1.0;
        assert!(matches!(
            tuning.validate(),
            Err(ConfigError::EmptyRange { .. })
        ));
    }

    #[test]
    fn test_rejects_empty_kind_weights() {
        let mut tuning = Tuning::default();
        tuning.spawn.kind_weights = KindWeights {
            jump: 0.0,
            slide: 0.0,
            double_jump: 0.0,
        };
        assert_eq!(tuning.validate(), Err(ConfigError::EmptyKindWeights));
    }

    #[test]
    fn test_rejects_bad_probability() {
        let mut tuning = Tuning::default();
        tuning.spawn.coin_chance = 1.5;
        assert!(matches!(
            tuning.validate(),
            Err(ConfigError::NotProbability { field: "coin_chance", .. })
        ));
    }

    #[test]
    fn test_load_reports_missing_file() {
        let err = Tuning::load(Path::new("/definitely/not/here.json")).unwrap_err();
        assert!(matches!(err, ConfigError::Unreadable { .. }));
    }

    #[test]
    fn test_load_reports_malformed_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tuning.json");
        fs::write(&path, "{ not json").unwrap();
        let err = Tuning::load(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Malformed { .. }));
    }

    #[test]
    fn test_load_validates() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tuning.json");
        fs::write(&path, r#"{ "track": { "tiles_ahead": 0 } }"#).unwrap();
        assert_eq!(Tuning::load(&path).unwrap_err(), ConfigError::NoGroundTiles);
    }
}
