//! Obstacle and coin placement
//!
//! Paced mode keeps a frontier ahead of the player and spaces placements by
//! how far the player travels in one reaction time, so gaps tighten as the
//! run speeds up but never drop below `min_gap`. Sliced mode fills whole
//! track slices with a few plain obstacles at random.

use glam::Vec3;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::coin::Coin;
use super::pool::EntityPool;
use super::state::{Obstacle, ObstacleKind};
use super::track::TrackSegmenter;
use crate::consts::*;
use crate::tuning::{SpawnMode, SpawnTuning};
use crate::{lane_to_x, lerp};

/// How many lanes one placement blocks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BlockPattern {
    /// One obstacle in one lane
    Single,
    /// Two distinct lanes, one left open
    Double,
    /// All three lanes; one of them is a low jump block
    Full,
}

/// What one placement produced
#[derive(Debug, Clone, Default)]
struct PlacementReport {
    obstacles: usize,
    coins: usize,
}

/// Obstacle/coin placer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObstacleSpawner {
    tuning: SpawnTuning,
    lane_distance: f32,
    /// Forward position up to which placements exist
    frontier: f32,
    enabled: bool,
    next_id: u32,
}

impl ObstacleSpawner {
    pub fn new(tuning: SpawnTuning, lane_distance: f32, start_z: f32) -> Self {
        let frontier = start_z + tuning.first_placement_distance;
        Self {
            tuning,
            lane_distance,
            frontier,
            enabled: true,
            next_id: 1,
        }
    }

    pub fn frontier(&self) -> f32 {
        self.frontier
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Stop placing for the rest of the run
    pub fn stop(&mut self) {
        if self.enabled {
            log::info!("Spawning stopped at frontier {:.1}", self.frontier);
        }
        self.enabled = false;
    }

    fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// 0 at standstill, 1 at `max_speed_for_difficulty` and beyond
    pub fn difficulty(&self, forward_speed: f32) -> f32 {
        (forward_speed / self.tuning.max_speed_for_difficulty).clamp(0.0, 1.0)
    }

    /// Time the player is given to react, shrinking with difficulty
    pub fn reaction_time(&self, forward_speed: f32) -> f32 {
        lerp(
            self.tuning.slow_reaction_time,
            self.tuning.fast_reaction_time,
            self.difficulty(forward_speed),
        )
    }

    /// Distance to the next placement
    pub fn gap_for(&self, forward_speed: f32, random_factor: f32) -> f32 {
        let min_gap = self.tuning.min_gap;
        let base = (forward_speed * self.reaction_time(forward_speed)).max(min_gap);
        (base * random_factor).max(min_gap)
    }

    /// Pick a pattern from a uniform roll in [0, 1)
    pub fn choose_pattern(&self, difficulty: f32, roll: f32) -> BlockPattern {
        let t = &self.tuning;
        let full = if difficulty >= t.full_block_min_difficulty {
            t.full_block_chance * difficulty
        } else {
            0.0
        };
        let double = (t.double_block_base + t.double_block_scale * difficulty).min(1.0);
        if roll < full {
            BlockPattern::Full
        } else if roll < full + double {
            BlockPattern::Double
        } else {
            BlockPattern::Single
        }
    }

    /// Pick an obstacle kind from a uniform roll in [0, 1)
    pub fn choose_kind(&self, roll: f32) -> ObstacleKind {
        let w = &self.tuning.kind_weights;
        let r = roll * w.total();
        if r < w.jump {
            ObstacleKind::Jump
        } else if r < w.jump + w.slide {
            ObstacleKind::Slide
        } else {
            ObstacleKind::DoubleJump
        }
    }

    /// Lanes occupied by a pattern. Distinct, in lane order.
    pub fn lanes_for<R: Rng + ?Sized>(pattern: BlockPattern, rng: &mut R) -> Vec<i32> {
        match pattern {
            BlockPattern::Single => vec![rng.random_range(MIN_LANE..=MAX_LANE)],
            BlockPattern::Double => {
                let open = rng.random_range(MIN_LANE..=MAX_LANE);
                (MIN_LANE..=MAX_LANE).filter(|&l| l != open).collect()
            }
            BlockPattern::Full => (MIN_LANE..=MAX_LANE).collect(),
        }
    }

    /// Generate ahead of the player. Returns the number of placements made.
    #[allow(clippy::too_many_arguments)]
    pub fn update<R: Rng + ?Sized>(
        &mut self,
        rng: &mut R,
        player_z: f32,
        forward_speed: f32,
        now: f32,
        track: &mut TrackSegmenter,
        obstacles: &mut EntityPool<Obstacle>,
        coins: &mut EntityPool<Coin>,
    ) -> usize {
        if !self.enabled {
            return 0;
        }
        match self.tuning.mode {
            SpawnMode::Paced => {
                let mut placed = 0;
                while player_z + self.tuning.lookahead > self.frontier {
                    let z = self.frontier;
                    self.place_pattern(rng, z, forward_speed, now, obstacles, coins);
                    let random_factor = rng
                        .random_range(self.tuning.random_factor_min..=self.tuning.random_factor_max);
                    self.frontier += self.gap_for(forward_speed, random_factor);
                    placed += 1;
                    // A gap lost to float precision would never reach the lookahead
                    if self.frontier <= z {
                        log::warn!("Frontier stuck at {:.1}, gap {} too small", z, self.tuning.min_gap);
                        break;
                    }
                }
                placed
            }
            SpawnMode::Sliced => {
                let slices = track.pending_slices(player_z);
                let count = (slices.end - slices.start).max(0) as usize;
                for slice in slices {
                    let start = track.slice_start(slice);
                    self.place_slice(rng, start, track.segment_length(), now, obstacles, coins);
                    self.frontier = self.frontier.max(start + track.segment_length());
                }
                count
            }
        }
    }

    /// Remove obstacles that fell behind. Runs even after spawning stopped.
    pub fn cleanup(&self, player_z: f32, obstacles: &mut EntityPool<Obstacle>) -> Vec<u32> {
        obstacles.despawn_behind(player_z, self.tuning.despawn_offset)
    }

    fn place_pattern<R: Rng + ?Sized>(
        &mut self,
        rng: &mut R,
        z: f32,
        forward_speed: f32,
        now: f32,
        obstacles: &mut EntityPool<Obstacle>,
        coins: &mut EntityPool<Coin>,
    ) -> PlacementReport {
        let difficulty = self.difficulty(forward_speed);
        let pattern = self.choose_pattern(difficulty, rng.random::<f32>());
        let lanes = Self::lanes_for(pattern, rng);

        // The full block keeps one lane clearable with a single jump
        let gate = match pattern {
            BlockPattern::Full => Some(rng.random_range(MIN_LANE..=MAX_LANE)),
            _ => None,
        };

        let mut report = PlacementReport::default();
        for lane in lanes {
            let kind = if gate == Some(lane) {
                ObstacleKind::Jump
            } else {
                self.choose_kind(rng.random::<f32>())
            };
            report.coins += self.place_obstacle(rng, lane, z, z, kind, now, obstacles, coins);
            report.obstacles += 1;
        }
        log::debug!(
            "Placed {:?} at z={:.1} (difficulty {:.2}): {} obstacles, {} coins",
            pattern,
            z,
            difficulty,
            report.obstacles,
            report.coins
        );
        report
    }

    fn place_slice<R: Rng + ?Sized>(
        &mut self,
        rng: &mut R,
        start: f32,
        length: f32,
        now: f32,
        obstacles: &mut EntityPool<Obstacle>,
        coins: &mut EntityPool<Coin>,
    ) {
        let count = rng.random_range(1..=self.tuning.max_obstacles_per_slice);
        for _ in 0..count {
            let lane = rng.random_range(MIN_LANE..=MAX_LANE);
            let z = start + rng.random::<f32>() * length;
            self.place_obstacle(rng, lane, z, start, ObstacleKind::Generic, now, obstacles, coins);
        }
    }

    /// Returns the number of coins placed (0 or 1). `spawn_z` is where the
    /// placement began: the pattern row, or the start of the slice.
    #[allow(clippy::too_many_arguments)]
    fn place_obstacle<R: Rng + ?Sized>(
        &mut self,
        rng: &mut R,
        lane: i32,
        z: f32,
        spawn_z: f32,
        kind: ObstacleKind,
        now: f32,
        obstacles: &mut EntityPool<Obstacle>,
        coins: &mut EntityPool<Coin>,
    ) -> usize {
        let x = lane_to_x(lane, self.lane_distance);
        let id = self.next_entity_id();
        obstacles.insert(Obstacle {
            id,
            pos: Vec3::new(x, GROUND_Y, z),
            lane,
            kind,
            spawn_z,
        });

        if rng.random_bool(self.tuning.coin_chance as f64) {
            let coin_id = self.next_entity_id();
            coins.insert(Coin {
                id: coin_id,
                pos: Vec3::new(x, GROUND_Y + kind.coin_height(), z),
                obstacle_id: Some(id),
                spawned_at: now,
            });
            1
        } else {
            0
        }
    }
}
