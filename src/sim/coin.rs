//! Coin pickups
//!
//! Coins spin in place, vanish once the player has passed them, and pay out
//! in proportion to how fast the player was running when they grabbed one.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use super::state::Aabb;

/// A coin entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Coin {
    pub id: u32,
    /// Centre position
    pub pos: Vec3,
    /// Obstacle this coin was placed with, if any
    pub obstacle_id: Option<u32>,
    /// Simulation time when spawned (s)
    pub spawned_at: f32,
}

impl Coin {
    /// Rotation about the vertical axis at time `now` (radians, [0, 2π))
    pub fn spin_angle(&self, now: f32, deg_per_sec: f32) -> f32 {
        let elapsed = (now - self.spawned_at).max(0.0);
        (elapsed * deg_per_sec).to_radians().rem_euclid(std::f32::consts::TAU)
    }

    /// Pickup trigger volume
    pub fn trigger_bounds(&self, radius: f32) -> Aabb {
        Aabb::new(self.pos - Vec3::splat(radius), self.pos + Vec3::splat(radius))
    }
}

/// Score awarded for a pickup at the given forward speed
pub fn pickup_value(forward_speed: f32, value_per_speed: f32) -> f32 {
    forward_speed.max(0.0) * value_per_speed
}

#[cfg(test)]
mod tests {
    use super::*;

    fn coin() -> Coin {
        Coin {
            id: 1,
            pos: Vec3::new(0.0, 1.0, 10.0),
            obstacle_id: None,
            spawned_at: 2.0,
        }
    }

    #[test]
    fn test_spin_angle_advances_and_wraps() {
        let c = coin();
        assert_eq!(c.spin_angle(2.0, 200.0), 0.0);
        let quarter = c.spin_angle(2.45, 200.0); // 90 degrees
        assert!((quarter - std::f32::consts::FRAC_PI_2).abs() < 0.001);
        let wrapped = c.spin_angle(2.0 + 1.8 + 0.45, 200.0); // 360 + 90 degrees
        assert!((wrapped - std::f32::consts::FRAC_PI_2).abs() < 0.01);
    }

    #[test]
    fn test_pickup_value_scales_with_speed() {
        assert_eq!(pickup_value(5.0, 10.0), 50.0);
        assert_eq!(pickup_value(12.5, 10.0), 125.0);
        assert_eq!(pickup_value(-1.0, 10.0), 0.0);
    }

    #[test]
    fn test_trigger_bounds_centered() {
        let bounds = coin().trigger_bounds(0.5);
        assert_eq!(bounds.min, Vec3::new(-0.5, 0.5, 9.5));
        assert_eq!(bounds.max, Vec3::new(0.5, 1.5, 10.5));
    }
}
