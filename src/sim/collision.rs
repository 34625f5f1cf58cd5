//! Contact resolution
//!
//! The host reports contacts; this decides what they mean. Ground contacts
//! only count when the surface faces up. An obstacle hit ends the run unless
//! the danger-world shield is there to absorb it.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use super::coin::{Coin, pickup_value};
use super::danger::{DangerTransition, DangerWorld};
use super::player::PlayerMotion;
use super::pool::EntityPool;
use super::score::{HighScoreOutcome, ScoreEngine};
use super::spawner::ObstacleSpawner;
use super::state::{GameEvent, Obstacle};
use crate::highscores::HighScoreStore;

/// A contact reported by the physics host
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Contact {
    /// Touched a ground surface
    Ground { normal: Vec3, surface_y: f32 },
    /// No longer touching the ground
    GroundExit,
    /// Ran into an obstacle
    Obstacle { id: u32 },
    /// Overlapped a coin trigger
    CoinTrigger { id: u32 },
}

/// What a contact turned out to mean
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Resolution {
    Ignored,
    Landed,
    LeftGround,
    CoinCollected { amount: f32 },
    ShieldAbsorbed { exit_score: f32 },
    GameOver(HighScoreOutcome),
}

/// Everything a contact may touch, borrowed for one resolution
pub struct CollisionContext<'a> {
    pub player: &'a mut PlayerMotion,
    pub danger: &'a mut DangerWorld,
    pub score: &'a mut ScoreEngine,
    pub spawner: &'a mut ObstacleSpawner,
    pub obstacles: &'a mut EntityPool<Obstacle>,
    pub coins: &'a mut EntityPool<Coin>,
    pub store: &'a mut dyn HighScoreStore,
    pub events: &'a mut Vec<GameEvent>,
    pub coin_value_per_speed: f32,
    pub ground_normal_threshold: f32,
}

/// Apply one contact
pub fn resolve(ctx: &mut CollisionContext<'_>, contact: Contact) -> Resolution {
    // Nothing reacts after the run is over
    if !ctx.player.state.enabled {
        return Resolution::Ignored;
    }
    match contact {
        Contact::Ground { normal, surface_y } => {
            if normal.y > ctx.ground_normal_threshold {
                ctx.player.land(surface_y);
                Resolution::Landed
            } else {
                Resolution::Ignored
            }
        }
        Contact::GroundExit => {
            ctx.player.leave_ground();
            Resolution::LeftGround
        }
        Contact::CoinTrigger { id } => match ctx.coins.remove(id) {
            Some(_) => {
                let amount = pickup_value(ctx.player.state.forward_speed, ctx.coin_value_per_speed);
                ctx.score.add_coin_score(amount);
                log::debug!(
                    "Coin picked up at speed {:.1} (+{:.0})",
                    ctx.player.state.forward_speed,
                    amount
                );
                ctx.events.push(GameEvent::CoinCollected { amount });
                Resolution::CoinCollected { amount }
            }
            None => Resolution::Ignored,
        },
        Contact::Obstacle { id } => {
            if ctx.obstacles.get(id).is_none() {
                log::debug!("Contact with unknown obstacle {}", id);
                return Resolution::Ignored;
            }
            obstacle_hit(ctx, id)
        }
    }
}

fn obstacle_hit(ctx: &mut CollisionContext<'_>, id: u32) -> Resolution {
    let score = ctx.score.score();
    if let Some(DangerTransition::Exited { exit_score, cause }) =
        ctx.danger.use_shield(score, ctx.player)
    {
        // The obstacle that was absorbed must not hit again next tick
        ctx.obstacles.remove(id);
        ctx.events.push(GameEvent::ShieldConsumed);
        ctx.events.push(GameEvent::DangerExited { exit_score, cause });
        return Resolution::ShieldAbsorbed { exit_score };
    }

    ctx.player.halt();
    ctx.spawner.stop();
    let outcome = ctx.score.commit_high_score(ctx.store);
    log::info!(
        "Game over: score {} (best {}{})",
        outcome.final_score,
        outcome.high_score,
        if outcome.new_record { ", new record" } else { "" }
    );
    ctx.events.push(GameEvent::GameOver {
        final_score: outcome.final_score,
        high_score: outcome.high_score,
        new_record: outcome.new_record,
    });
    Resolution::GameOver(outcome)
}
