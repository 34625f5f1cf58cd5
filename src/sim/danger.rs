//! Danger world
//!
//! Reaching the trigger score opens a timed window with one shield charge
//! and double distance score, during which the player moves between layers
//! instead of jumping. The window closes when the timer runs out or the
//! shield absorbs a hit, whichever comes first. The next window opens at
//! twice the score the last one closed at.

use serde::{Deserialize, Serialize};

use super::player::PlayerMotion;
use super::state::DangerExitCause;
use crate::tuning::DangerTuning;

/// A state change reported by the controller
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum DangerTransition {
    Entered { trigger_score: f32 },
    Exited { exit_score: f32, cause: DangerExitCause },
}

/// Danger-world state machine
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DangerWorld {
    tuning: DangerTuning,
    active: bool,
    has_shield: bool,
    timer: f32,
    last_exit_score: f32,
    activations: u32,
}

impl DangerWorld {
    pub fn new(tuning: DangerTuning) -> Self {
        Self {
            tuning,
            active: false,
            has_shield: false,
            timer: 0.0,
            last_exit_score: 0.0,
            activations: 0,
        }
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn has_shield(&self) -> bool {
        self.has_shield
    }

    /// Seconds left in the current window
    pub fn time_remaining(&self) -> f32 {
        if self.active { self.timer } else { 0.0 }
    }

    pub fn last_exit_score(&self) -> f32 {
        self.last_exit_score
    }

    /// How many times the danger world has opened this run
    pub fn activations(&self) -> u32 {
        self.activations
    }

    /// Score at which the danger world next opens
    pub fn next_trigger_score(&self) -> f32 {
        if self.last_exit_score > 0.0 {
            self.last_exit_score * 2.0
        } else {
            self.tuning.initial_trigger_score
        }
    }

    /// Check the trigger and run the countdown
    pub fn update(
        &mut self,
        dt: f32,
        score: f32,
        player: &mut PlayerMotion,
    ) -> Option<DangerTransition> {
        if !self.active {
            let trigger_score = self.next_trigger_score();
            if score >= trigger_score {
                self.enter(player);
                return Some(DangerTransition::Entered { trigger_score });
            }
            return None;
        }

        self.timer -= dt;
        if self.timer <= 0.0 {
            return Some(self.exit(score, DangerExitCause::TimerExpired, player));
        }
        None
    }

    /// Spend the shield on a hit. Returns the exit transition if the hit
    /// was absorbed, `None` if there was no shield to spend.
    pub fn use_shield(&mut self, score: f32, player: &mut PlayerMotion) -> Option<DangerTransition> {
        if !self.active || !self.has_shield {
            return None;
        }
        self.has_shield = false;
        Some(self.exit(score, DangerExitCause::ShieldConsumed, player))
    }

    fn enter(&mut self, player: &mut PlayerMotion) {
        self.active = true;
        self.has_shield = true;
        self.timer = self.tuning.duration;
        self.activations += 1;
        player.set_layered(true);
        log::info!(
            "Entered danger world (#{}, {:.0}s)",
            self.activations,
            self.tuning.duration
        );
    }

    fn exit(
        &mut self,
        score: f32,
        cause: DangerExitCause,
        player: &mut PlayerMotion,
    ) -> DangerTransition {
        self.active = false;
        self.has_shield = false;
        self.timer = 0.0;
        self.last_exit_score = score;
        player.set_layered(false);
        log::info!(
            "Exited danger world ({:?}, exit score {}, next trigger {})",
            cause,
            score,
            self.next_trigger_score()
        );
        DangerTransition::Exited {
            exit_score: score,
            cause,
        }
    }
}
