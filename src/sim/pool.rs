//! Spawned entity bookkeeping
//!
//! Entities are kept sorted by id (spawn order) and removed once they fall
//! far enough behind the player.

use serde::{Deserialize, Serialize};

use super::coin::Coin;
use super::state::Obstacle;

/// Anything with a position along the track
pub trait TrackPositioned {
    fn id(&self) -> u32;
    fn track_z(&self) -> f32;
}

impl TrackPositioned for Obstacle {
    fn id(&self) -> u32 {
        self.id
    }

    fn track_z(&self) -> f32 {
        self.pos.z
    }
}

impl TrackPositioned for Coin {
    fn id(&self) -> u32 {
        self.id
    }

    fn track_z(&self) -> f32 {
        self.pos.z
    }
}

/// Live entities of one type
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntityPool<T> {
    items: Vec<T>,
}

impl<T> Default for EntityPool<T> {
    fn default() -> Self {
        Self { items: Vec::new() }
    }
}

impl<T: TrackPositioned> EntityPool<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, item: T) {
        self.items.push(item);
    }

    pub fn get(&self, id: u32) -> Option<&T> {
        self.items.iter().find(|e| e.id() == id)
    }

    /// Remove one entity, returning it if it was live
    pub fn remove(&mut self, id: u32) -> Option<T> {
        let idx = self.items.iter().position(|e| e.id() == id)?;
        Some(self.items.remove(idx))
    }

    /// Drop every entity more than `offset` behind `player_z`.
    /// Returns the ids removed.
    pub fn despawn_behind(&mut self, player_z: f32, offset: f32) -> Vec<u32> {
        let mut removed = Vec::new();
        self.items.retain(|e| {
            let behind = player_z - e.track_z() > offset;
            if behind {
                removed.push(e.id());
            }
            !behind
        });
        removed
    }

    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.items.iter()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
