//! Autopilot
//!
//! Plays the game from the same information a player would have: the lanes,
//! what is coming in each one, and the player's own state. Produces at most
//! one key press per call, like a human tapping keys.
//!
//! Priorities, most urgent first:
//! 1. Get out of a lane with something close ahead, if another lane is clearer
//! 2. Otherwise clear the obstacle with the move its kind calls for
//! 3. When nothing is close, drift toward a coin

use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::sim::coin::Coin;
use crate::sim::player::PlayerState;
use crate::sim::state::{InputAction, Obstacle, ObstacleKind};
use crate::sim::tick::Simulation;

/// How far past an obstacle's centre it still counts as in the way
const PASSING_MARGIN: f32 = 1.0;

/// Reaction settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Autopilot {
    /// Seconds of running to look ahead
    pub reaction_time: f32,
    /// Look-ahead floor (m) for slow speeds
    pub min_horizon: f32,
    /// Switch lanes only if the other lane is this much clearer (m)
    pub lane_preference: f32,
}

impl Default for Autopilot {
    fn default() -> Self {
        Self {
            reaction_time: 0.6,
            min_horizon: 4.0,
            lane_preference: 2.0,
        }
    }
}

impl Autopilot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Next key press for the running simulation, if any
    pub fn decide(&self, sim: &Simulation) -> Option<InputAction> {
        let obstacles: Vec<&Obstacle> = sim.obstacles().iter().collect();
        let coins: Vec<&Coin> = sim.coins().iter().collect();
        let lane_distance = sim.tuning().player.lane_distance;
        self.decide_from(&sim.player().state, &obstacles, &coins, lane_distance)
    }

    /// Next key press given the player and what lies ahead
    pub fn decide_from(
        &self,
        player: &PlayerState,
        obstacles: &[&Obstacle],
        coins: &[&Coin],
        lane_distance: f32,
    ) -> Option<InputAction> {
        if !player.enabled {
            return None;
        }
        let speed = player.forward_speed;
        let horizon = (speed * self.reaction_time).max(0.0) + self.min_horizon;
        let lane = player.current_lane;

        let ahead = nearest_in_lane(obstacles, player.pos.z, lane);
        let blocked = ahead.is_some_and(|(_, dist)| dist <= horizon);

        if blocked {
            let here = clearance(obstacles, player.pos.z, lane);
            if let Some(step) = self.escape_direction(obstacles, player.pos.z, lane, here) {
                return Some(step);
            }
            if let Some((obstacle, dist)) = ahead {
                return maneuver(player, obstacle.kind, dist);
            }
            return None;
        }

        // Mid double jump with nothing close: finish it if the obstacle we
        // jumped for is still under us
        if let Some((obstacle, dist)) = ahead {
            if obstacle.kind == ObstacleKind::DoubleJump && !player.layered {
                return maneuver(player, obstacle.kind, dist);
            }
        }

        self.chase_coin(player, obstacles, coins, horizon, lane_distance)
    }

    /// Step toward the clearest lane, if it is worth the move and the lane
    /// on the way is passable right now
    fn escape_direction(
        &self,
        obstacles: &[&Obstacle],
        z: f32,
        lane: i32,
        here: f32,
    ) -> Option<InputAction> {
        let mut best: Option<(i32, f32)> = None;
        for candidate in MIN_LANE..=MAX_LANE {
            if candidate == lane {
                continue;
            }
            let dir = (candidate - lane).signum();
            if !passable(obstacles, z, lane + dir) {
                continue;
            }
            let clear = clearance(obstacles, z, candidate);
            let better = match best {
                None => true,
                // Prefer the nearer lane when equally clear
                Some((b, bc)) => {
                    clear > bc || (clear == bc && (candidate - lane).abs() < (b - lane).abs())
                }
            };
            if better {
                best = Some((candidate, clear));
            }
        }
        let (target, clear) = best?;
        if clear < here + self.lane_preference {
            return None;
        }
        Some(step_toward(lane, target))
    }

    fn chase_coin(
        &self,
        player: &PlayerState,
        obstacles: &[&Obstacle],
        coins: &[&Coin],
        horizon: f32,
        lane_distance: f32,
    ) -> Option<InputAction> {
        let coin = coins
            .iter()
            .filter(|c| {
                let dist = c.pos.z - player.pos.z;
                dist > 0.0 && dist <= horizon * 2.0
            })
            .min_by(|a, b| a.pos.z.total_cmp(&b.pos.z))?;
        let coin_lane = ((coin.pos.x / lane_distance).round() as i32).clamp(MIN_LANE, MAX_LANE);
        if coin_lane == player.current_lane {
            return None;
        }
        let next = player.current_lane + (coin_lane - player.current_lane).signum();
        let safe = passable(obstacles, player.pos.z, next)
            && clearance(obstacles, player.pos.z, next) > horizon;
        safe.then(|| step_toward(player.current_lane, coin_lane))
    }
}

fn step_toward(lane: i32, target: i32) -> InputAction {
    if target < lane {
        InputAction::MoveLeft
    } else {
        InputAction::MoveRight
    }
}

/// Nearest obstacle in `lane` that is not yet behind the player
fn nearest_in_lane<'a>(obstacles: &[&'a Obstacle], z: f32, lane: i32) -> Option<(&'a Obstacle, f32)> {
    obstacles
        .iter()
        .filter(|o| o.lane == lane)
        .map(|o| (*o, o.pos.z - z))
        .filter(|(_, dist)| *dist > -PASSING_MARGIN)
        .min_by(|a, b| a.1.total_cmp(&b.1))
}

/// Free running room ahead in a lane
fn clearance(obstacles: &[&Obstacle], z: f32, lane: i32) -> f32 {
    nearest_in_lane(obstacles, z, lane).map_or(f32::INFINITY, |(_, dist)| dist)
}

/// Whether the player could be in `lane` right now without touching anything
fn passable(obstacles: &[&Obstacle], z: f32, lane: i32) -> bool {
    clearance(obstacles, z, lane) > PASSING_MARGIN * 1.5
}

/// The move that clears an obstacle of `kind` at distance `dist`
fn maneuver(player: &PlayerState, kind: ObstacleKind, dist: f32) -> Option<InputAction> {
    let speed = player.forward_speed;

    if player.layered {
        // Low blocks pass under the middle layer; bars only under the top
        let wanted = match kind {
            ObstacleKind::Jump | ObstacleKind::Generic => MID_LAYER,
            ObstacleKind::Slide => MAX_LAYER,
            ObstacleKind::DoubleJump => return None,
        };
        return (player.current_layer < wanted).then_some(InputAction::Jump);
    }

    match kind {
        ObstacleKind::Jump | ObstacleKind::Generic => {
            let trigger = 1.5 + speed * 0.3;
            (player.is_grounded && dist <= trigger).then_some(InputAction::Jump)
        }
        ObstacleKind::Slide => {
            let trigger = 1.0 + speed * 0.1;
            (!player.is_sliding && dist <= trigger).then_some(InputAction::Slide)
        }
        ObstacleKind::DoubleJump => {
            let trigger = 1.5 + speed * 1.2;
            if player.is_grounded {
                (dist <= trigger).then_some(InputAction::Jump)
            } else if player.jumps_remaining > 0 && player.vel.y <= 0.0 && dist > 0.0 {
                Some(InputAction::Jump)
            } else {
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::highscores::MemoryStore;
    use crate::sim::physics::ArcadePhysics;
    use crate::sim::player::PlayerMotion;
    use crate::sim::state::GamePhase;
    use crate::tuning::{PlayerTuning, Tuning};
    use glam::Vec3;

    const LANE: f32 = 2.0;

    fn player() -> PlayerState {
        PlayerMotion::new(PlayerTuning::default()).state
    }

    fn obstacle(id: u32, lane: i32, z: f32, kind: ObstacleKind) -> Obstacle {
        Obstacle {
            id,
            pos: Vec3::new(lane as f32 * 2.0, 0.0, z),
            lane,
            kind,
            spawn_z: z,
        }
    }

    #[test]
    fn test_nothing_ahead_does_nothing() {
        let pilot = Autopilot::new();
        assert_eq!(pilot.decide_from(&player(), &[], &[], LANE), None);
    }

    #[test]
    fn test_far_obstacle_ignored() {
        let pilot = Autopilot::new();
        let o = obstacle(1, 0, 50.0, ObstacleKind::Jump);
        assert_eq!(pilot.decide_from(&player(), &[&o], &[], LANE), None);
    }

    #[test]
    fn test_dodges_into_open_lane() {
        let pilot = Autopilot::new();
        let a = obstacle(1, 0, 5.0, ObstacleKind::Slide);
        let b = obstacle(2, -1, 5.0, ObstacleKind::Slide);
        assert_eq!(
            pilot.decide_from(&player(), &[&a, &b], &[], LANE),
            Some(InputAction::MoveRight)
        );
    }

    #[test]
    fn test_boxed_in_clears_obstacle_in_place() {
        let pilot = Autopilot::new();
        let a = obstacle(1, -1, 1.2, ObstacleKind::Jump);
        let b = obstacle(2, 0, 1.2, ObstacleKind::Slide);
        let c = obstacle(3, 1, 1.2, ObstacleKind::DoubleJump);
        let mut p = player();

        // Too close to change lanes
        assert_eq!(pilot.decide_from(&p, &[&a, &b, &c], &[], LANE), Some(InputAction::Slide));

        p.current_lane = -1;
        assert_eq!(pilot.decide_from(&p, &[&a, &b, &c], &[], LANE), Some(InputAction::Jump));
    }

    #[test]
    fn test_does_not_cut_through_an_adjacent_obstacle() {
        let pilot = Autopilot::new();
        let mut p = player();
        p.current_lane = -1;
        // Middle lane is blocked right beside the player; right lane is open
        let a = obstacle(1, -1, 3.0, ObstacleKind::Jump);
        let b = obstacle(2, 0, 0.5, ObstacleKind::Jump);
        assert_ne!(
            pilot.decide_from(&p, &[&a, &b], &[], LANE),
            Some(InputAction::MoveRight)
        );
    }

    #[test]
    fn test_double_jump_second_press_at_apex() {
        let o = obstacle(1, 0, 1.0, ObstacleKind::DoubleJump);
        let mut p = player();
        p.is_grounded = false;
        p.jumps_remaining = 1;
        p.vel.y = 3.0;
        assert_eq!(maneuver(&p, o.kind, 1.0), None);
        p.vel.y = -0.1;
        assert_eq!(maneuver(&p, o.kind, 1.0), Some(InputAction::Jump));
    }

    #[test]
    fn test_layered_mode_changes_layers() {
        let mut p = player();
        p.layered = true;
        p.current_layer = MIN_LAYER;
        assert_eq!(maneuver(&p, ObstacleKind::Jump, 3.0), Some(InputAction::Jump));
        p.current_layer = MID_LAYER;
        assert_eq!(maneuver(&p, ObstacleKind::Jump, 3.0), None);
        assert_eq!(maneuver(&p, ObstacleKind::Slide, 3.0), Some(InputAction::Jump));
        assert_eq!(maneuver(&p, ObstacleKind::DoubleJump, 3.0), None);
    }

    #[test]
    fn test_drifts_toward_coin_when_safe() {
        let pilot = Autopilot::new();
        let coin = Coin {
            id: 9,
            pos: Vec3::new(2.0, 0.5, 6.0),
            obstacle_id: None,
            spawned_at: 0.0,
        };
        assert_eq!(
            pilot.decide_from(&player(), &[], &[&coin], LANE),
            Some(InputAction::MoveRight)
        );
    }

    #[test]
    fn test_disabled_player_gets_no_input() {
        let pilot = Autopilot::new();
        let mut p = player();
        p.enabled = false;
        let o = obstacle(1, 0, 2.0, ObstacleKind::Jump);
        assert_eq!(pilot.decide_from(&p, &[&o], &[], LANE), None);
    }

    #[test]
    fn test_clears_the_first_placement() {
        let mut sim = Simulation::new(Tuning::default(), 3, Box::new(MemoryStore::new())).unwrap();
        sim.initialize();
        let first_z = sim
            .obstacles()
            .iter()
            .map(|o| o.pos.z)
            .fold(f32::INFINITY, f32::min);

        let pilot = Autopilot::new();
        let mut physics = ArcadePhysics::new();
        while sim.player().state.pos.z < first_z + 2.0 && sim.phase() == GamePhase::Running {
            if let Some(action) = pilot.decide(&sim) {
                sim.handle_action(action);
            }
            sim.tick_fixed(SIM_DT);
            for contact in physics.detect(&sim) {
                sim.on_contact(contact);
            }
            sim.tick_variable(SIM_DT);
        }
        assert_eq!(sim.phase(), GamePhase::Running);
    }
}
