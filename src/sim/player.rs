//! Player motion
//!
//! Forward speed only ever grows. Lateral position chases the current lane
//! with a critically damped step. Vertical motion has two modes: ground
//! mode (impulse jumps, gravity, slides) and layered mode (danger world,
//! where jump/slide step between three fixed heights instead).

use glam::Vec3;
use serde::{Deserialize, Serialize};

use super::state::Aabb;
use crate::consts::*;
use crate::tuning::PlayerTuning;
use crate::{lane_to_x, smooth_damp};

/// Everything that changes about the player from tick to tick
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerState {
    /// Feet position
    pub pos: Vec3,
    pub vel: Vec3,
    pub forward_speed: f32,
    pub current_lane: i32,
    pub current_layer: i32,
    pub jumps_remaining: u8,
    pub is_grounded: bool,
    pub is_sliding: bool,
    /// Seconds left in the current slide
    pub slide_timer: f32,
    /// 1.0 standing, `slide_scale_y` while sliding
    pub height_scale: f32,
    /// Danger-world movement mode
    pub layered: bool,
    /// False once the run has ended
    pub enabled: bool,
}

/// Player motion integrator and maneuver state machine
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerMotion {
    pub state: PlayerState,
    tuning: PlayerTuning,
    lateral_vel: f32,
    layer_vel: f32,
}

impl PlayerMotion {
    pub fn new(tuning: PlayerTuning) -> Self {
        Self {
            state: PlayerState {
                pos: Vec3::new(0.0, GROUND_Y, 0.0),
                vel: Vec3::ZERO,
                forward_speed: tuning.start_forward_speed,
                current_lane: 0,
                current_layer: MID_LAYER,
                jumps_remaining: MAX_JUMPS,
                is_grounded: true,
                is_sliding: false,
                slide_timer: 0.0,
                height_scale: 1.0,
                layered: false,
                enabled: true,
            },
            tuning,
            lateral_vel: 0.0,
            layer_vel: 0.0,
        }
    }

    pub fn tuning(&self) -> &PlayerTuning {
        &self.tuning
    }

    /// Advance one fixed step. Non-positive steps are ignored.
    pub fn tick_fixed(&mut self, dt: f32) {
        if !self.state.enabled || dt.is_nan() || dt <= 0.0 {
            return;
        }
        let t = &self.tuning;
        let s = &mut self.state;

        // Forward: accelerate, then advance
        s.vel.z = s.forward_speed;
        s.forward_speed += t.speed_increase_rate * dt;
        s.pos.z += s.vel.z * dt;

        // Lateral: chase the lane centre
        let target_x = lane_to_x(s.current_lane, t.lane_distance);
        let new_x = smooth_damp(s.pos.x, target_x, &mut self.lateral_vel, t.lane_smooth_time, dt);
        s.vel.x = (new_x - s.pos.x) / dt;
        s.pos.x = new_x;

        if s.layered {
            let target_y = t.layer_base_height + s.current_layer as f32 * t.layer_spacing;
            let new_y = smooth_damp(s.pos.y, target_y, &mut self.layer_vel, t.layer_smooth_time, dt);
            s.vel.y = (new_y - s.pos.y) / dt;
            s.pos.y = new_y;
        } else {
            if !s.is_grounded {
                s.vel.y -= t.gravity * dt;
                s.pos.y += s.vel.y * dt;
            }
            if s.is_sliding {
                s.slide_timer -= dt;
                if s.slide_timer <= 0.0 {
                    s.slide_timer = 0.0;
                    s.is_sliding = false;
                    s.height_scale = 1.0;
                }
            }
        }
    }

    /// Shift one lane left (-1) or right (+1), clamped to the track
    pub fn change_lane(&mut self, dir: i32) {
        if !self.state.enabled {
            return;
        }
        self.state.current_lane = (self.state.current_lane + dir).clamp(MIN_LANE, MAX_LANE);
    }

    /// Jump (ground mode) or move up a layer (layered mode).
    /// Returns false when the input was ignored.
    pub fn try_jump(&mut self) -> bool {
        if !self.state.enabled {
            return false;
        }
        let s = &mut self.state;
        if s.layered {
            if s.current_layer >= MAX_LAYER {
                return false;
            }
            s.current_layer += 1;
            return true;
        }
        if s.jumps_remaining == 0 {
            return false;
        }
        // Reset vertical before the impulse so a double jump is a full jump
        s.vel.y = self.tuning.jump_force;
        s.jumps_remaining -= 1;
        s.is_grounded = false;
        true
    }

    /// Slide (ground mode) or move down a layer (layered mode).
    /// Returns false when the input was ignored.
    pub fn try_slide(&mut self) -> bool {
        if !self.state.enabled {
            return false;
        }
        let t = &self.tuning;
        let s = &mut self.state;
        if s.layered {
            if s.current_layer <= MIN_LAYER {
                return false;
            }
            s.current_layer -= 1;
            return true;
        }
        if s.is_sliding {
            return false;
        }
        s.is_sliding = true;
        s.slide_timer = t.slide_duration;
        s.height_scale = t.slide_scale_y;

        // Fast fall when airborne, unless already falling that fast
        if !s.is_grounded && s.vel.y > -t.fall_impulse {
            s.vel.y -= t.fall_impulse;
        }
        true
    }

    /// Switch between ground and layered movement
    pub fn set_layered(&mut self, layered: bool) {
        let s = &mut self.state;
        if s.layered == layered {
            return;
        }
        s.layered = layered;
        s.current_layer = MID_LAYER;
        s.vel.y = 0.0;
        self.layer_vel = 0.0;

        // Any slide in progress is cut short by the mode change
        s.is_sliding = false;
        s.slide_timer = 0.0;
        s.height_scale = 1.0;

        if layered {
            s.is_grounded = false;
        } else {
            // Fall back to the ground with a fresh pair of jumps
            s.is_grounded = s.pos.y <= GROUND_Y;
            s.jumps_remaining = MAX_JUMPS;
        }
    }

    /// Touch down on a surface at `surface_y`
    pub fn land(&mut self, surface_y: f32) {
        let s = &mut self.state;
        if s.layered {
            return;
        }
        s.is_grounded = true;
        s.jumps_remaining = MAX_JUMPS;
        s.pos.y = surface_y;
        if s.vel.y < 0.0 {
            s.vel.y = 0.0;
        }
    }

    /// Lost contact with the ground
    pub fn leave_ground(&mut self) {
        if !self.state.layered {
            self.state.is_grounded = false;
        }
    }

    /// Stop dead: no velocity, frozen speed, no further input
    pub fn halt(&mut self) {
        let s = &mut self.state;
        s.vel = Vec3::ZERO;
        s.enabled = false;
        self.lateral_vel = 0.0;
        self.layer_vel = 0.0;
    }

    /// Current height, accounting for slides
    pub fn height(&self) -> f32 {
        self.tuning.height * self.state.height_scale
    }

    /// Collision box around the player
    pub fn bounds(&self) -> Aabb {
        Aabb::from_base(self.state.pos, self.tuning.width, self.height(), self.tuning.width)
    }
}
