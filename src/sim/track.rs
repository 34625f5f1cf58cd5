//! Track slicing and ground tiles
//!
//! The track is cut into fixed-length slices; slices ahead of the player
//! are handed out once each for generation. Ground is a small ring of tiles
//! that leapfrog forward as the player passes them.

use std::collections::VecDeque;
use std::ops::Range;

use serde::{Deserialize, Serialize};

use crate::tuning::TrackTuning;

/// Slice bookkeeping and ground tile ring
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackSegmenter {
    tuning: TrackTuning,
    /// First slice not yet handed out
    next_slice: i64,
    /// Start z of each ground tile, nearest first
    tiles: VecDeque<f32>,
}

impl TrackSegmenter {
    pub fn new(tuning: TrackTuning) -> Self {
        let tiles = (0..tuning.tiles_ahead)
            .map(|i| i as f32 * tuning.tile_length)
            .collect();
        Self {
            tuning,
            next_slice: 0,
            tiles,
        }
    }

    /// Slice containing forward position `z`
    pub fn slice_index(&self, z: f32) -> i64 {
        (z / self.tuning.segment_length).floor() as i64
    }

    /// Start z of a slice
    pub fn slice_start(&self, slice: i64) -> f32 {
        slice as f32 * self.tuning.segment_length
    }

    pub fn segment_length(&self) -> f32 {
        self.tuning.segment_length
    }

    /// Slices that should exist ahead of `player_z` but have not been
    /// generated yet. Each slice is returned exactly once.
    pub fn pending_slices(&mut self, player_z: f32) -> Range<i64> {
        let horizon = self.slice_index(player_z) + self.tuning.segments_ahead as i64;
        let start = self.next_slice;
        if horizon > start {
            self.next_slice = horizon;
            start..horizon
        } else {
            start..start
        }
    }

    /// Move passed ground tiles to the front. Returns how many moved.
    pub fn recycle_ground(&mut self, player_z: f32) -> usize {
        let mut moved = 0;
        let span = self.tuning.tile_length * self.tuning.tiles_ahead as f32;
        while let Some(&first) = self.tiles.front() {
            if player_z - first <= self.tuning.tile_length {
                break;
            }
            self.tiles.pop_front();
            self.tiles.push_back(first + span);
            moved += 1;
        }
        moved
    }

    /// Start z of each ground tile, nearest first
    pub fn ground_tiles(&self) -> impl Iterator<Item = f32> + '_ {
        self.tiles.iter().copied()
    }

    /// Whether there is ground under forward position `z`
    pub fn has_ground_at(&self, z: f32) -> bool {
        self.tiles
            .iter()
            .any(|&start| z >= start && z < start + self.tuning.tile_length)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn track() -> TrackSegmenter {
        TrackSegmenter::new(TrackTuning::default())
    }

    #[test]
    fn test_slice_index_floors() {
        let t = track();
        assert_eq!(t.slice_index(0.0), 0);
        assert_eq!(t.slice_index(9.99), 0);
        assert_eq!(t.slice_index(10.0), 1);
        assert_eq!(t.slice_index(-0.5), -1);
    }

    #[test]
    fn test_pending_slices_hand_out_each_once() {
        let mut t = track();
        assert_eq!(t.pending_slices(0.0), 0..10);
        assert_eq!(t.pending_slices(5.0), 10..10);
        assert_eq!(t.pending_slices(25.0), 10..12);
        assert_eq!(t.pending_slices(25.0), 12..12);
    }

    #[test]
    fn test_ground_tiles_leapfrog() {
        let mut t = track();
        assert_eq!(t.ground_tiles().collect::<Vec<_>>(), vec![0.0, 20.0, 40.0]);
        assert_eq!(t.recycle_ground(20.0), 0);
        assert_eq!(t.recycle_ground(20.5), 1);
        assert_eq!(t.ground_tiles().collect::<Vec<_>>(), vec![20.0, 40.0, 60.0]);
        assert!(t.has_ground_at(59.0));
        assert!(!t.has_ground_at(5.0));
    }

    #[test]
    fn test_ground_catches_up_after_a_long_frame() {
        let mut t = track();
        assert_eq!(t.recycle_ground(65.0), 3);
        assert_eq!(t.ground_tiles().collect::<Vec<_>>(), vec![60.0, 80.0, 100.0]);
        assert!(t.has_ground_at(65.0));
    }
}
