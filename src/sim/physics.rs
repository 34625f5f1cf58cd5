//! Arcade physics host
//!
//! Stand-in for an engine's contact detection, used by the headless runner
//! and by tests. It only looks at the simulation and reports what touches
//! what; the simulation decides what that means.
//!
//! Contacts fire on entry, the way engine collision callbacks do: an
//! overlap that persists across steps is reported once.

use glam::Vec3;

use super::collision::Contact;
use super::tick::Simulation;
use crate::consts::GROUND_Y;

/// Box-overlap contact detector
#[derive(Debug, Default)]
pub struct ArcadePhysics {
    /// Obstacles overlapping the player as of the last step
    touching: Vec<u32>,
}

impl ArcadePhysics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Contacts produced by the current simulation state
    pub fn detect(&mut self, sim: &Simulation) -> Vec<Contact> {
        let mut contacts = Vec::new();
        let player = sim.player();
        let state = &player.state;

        // Ground: landing and running off the end of the tiles
        let over_ground = sim.track().has_ground_at(state.pos.z);
        if !state.layered {
            if !state.is_grounded && over_ground && state.pos.y <= GROUND_Y && state.vel.y <= 0.0 {
                contacts.push(Contact::Ground {
                    normal: Vec3::Y,
                    surface_y: GROUND_Y,
                });
            } else if state.is_grounded && !over_ground {
                contacts.push(Contact::GroundExit);
            }
        }

        let bounds = player.bounds();
        let spawn = &sim.tuning().spawn;
        let mut touching = Vec::new();
        for obstacle in sim.obstacles().iter() {
            if bounds.intersects(&obstacle.bounds(spawn.obstacle_width, spawn.obstacle_depth)) {
                touching.push(obstacle.id);
                if !self.touching.contains(&obstacle.id) {
                    contacts.push(Contact::Obstacle { id: obstacle.id });
                }
            }
        }
        self.touching = touching;

        let radius = sim.tuning().coin.radius;
        for coin in sim.coins().iter() {
            if bounds.intersects(&coin.trigger_bounds(radius)) {
                contacts.push(Contact::CoinTrigger { id: coin.id });
            }
        }

        contacts
    }
}
