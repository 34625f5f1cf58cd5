//! Headless lane runner
//!
//! Drives the simulation the way a game engine would: a frame loop feeding
//! a fixed-step accumulator, box-overlap physics reporting contacts, and the
//! autopilot pressing keys. Logs the run and saves the high score.
//!
//! Usage:
//!   lane-runner --seed 42 --max-seconds 120
//!   RUST_LOG=debug lane-runner --tuning tuning.json --save scores.json

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

use lane_runner::autopilot::Autopilot;
use lane_runner::consts::{MAX_SUBSTEPS, SIM_DT};
use lane_runner::sim::{ArcadePhysics, GameEvent, GamePhase, Simulation};
use lane_runner::{JsonFileStore, Tuning};

#[derive(Parser)]
#[command(name = "lane-runner")]
#[command(about = "Run an endless three-lane runner headless, played by the autopilot")]
struct Args {
    /// Tuning overrides (JSON); missing fields keep their defaults
    #[arg(long)]
    tuning: Option<PathBuf>,

    /// Placement seed; random if omitted
    #[arg(long)]
    seed: Option<u64>,

    /// Stop after this much game time even if the run is still going
    #[arg(long, default_value_t = 300.0)]
    max_seconds: f32,

    /// High score file
    #[arg(long, default_value = "highscores.json")]
    save: PathBuf,

    /// Simulated frame time (s); need not match the fixed step
    #[arg(long, default_value_t = 1.0 / 60.0)]
    frame_dt: f32,
}

/// Frame loop state
struct Runner {
    sim: Simulation,
    physics: ArcadePhysics,
    pilot: Autopilot,
    accumulator: f32,
}

impl Runner {
    fn new(sim: Simulation) -> Self {
        Self {
            sim,
            physics: ArcadePhysics::new(),
            pilot: Autopilot::new(),
            accumulator: 0.0,
        }
    }

    /// One rendered frame
    fn update(&mut self, dt: f32) {
        let dt = dt.min(0.1);
        self.accumulator += dt;

        let mut substeps = 0;
        while self.accumulator >= SIM_DT && substeps < MAX_SUBSTEPS {
            if let Some(action) = self.pilot.decide(&self.sim) {
                self.sim.handle_action(action);
            }
            self.sim.tick_fixed(SIM_DT);
            for contact in self.physics.detect(&self.sim) {
                self.sim.on_contact(contact);
            }
            self.accumulator -= SIM_DT;
            substeps += 1;
        }

        self.sim.tick_variable(dt);
        self.report();
    }

    fn report(&mut self) {
        for event in self.sim.drain_events() {
            match event {
                // Every frame; too chatty for info
                GameEvent::ScoreUpdated { display } => log::trace!("Score {}", display),
                GameEvent::CoinCollected { amount } => log::debug!("Coin +{:.0}", amount),
                GameEvent::DangerEntered { trigger_score } => {
                    log::info!("Danger world at score {}", trigger_score)
                }
                GameEvent::DangerExited { exit_score, cause } => {
                    log::info!("Back to normal at score {} ({:?})", exit_score, cause)
                }
                GameEvent::ShieldConsumed => log::info!("Shield absorbed a hit"),
                GameEvent::GameOver {
                    final_score,
                    high_score,
                    new_record,
                } => {
                    if new_record {
                        log::info!("Final score {} - new high score!", final_score);
                    } else {
                        log::info!("Final score {} (high score {})", final_score, high_score);
                    }
                }
            }
        }
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();

    let tuning = match &args.tuning {
        Some(path) => Tuning::load(path)
            .with_context(|| format!("Failed to load tuning from {}", path.display()))?,
        None => Tuning::default(),
    };
    if args.frame_dt.is_nan() || args.frame_dt <= 0.0 {
        anyhow::bail!("--frame-dt must be positive, got {}", args.frame_dt);
    }
    let seed = args.seed.unwrap_or_else(rand::random);

    log::info!("Lane runner starting (seed {})", seed);
    let store = JsonFileStore::new(args.save.clone());
    let sim = Simulation::new(tuning, seed, Box::new(store)).context("Invalid tuning")?;

    let mut runner = Runner::new(sim);
    runner.sim.initialize();
    let mut elapsed = 0.0;
    while runner.sim.phase() == GamePhase::Running && elapsed < args.max_seconds {
        runner.update(args.frame_dt);
        elapsed += args.frame_dt;
    }
    if runner.sim.phase() == GamePhase::Running {
        log::info!("Time limit reached after {:.0}s", elapsed);
    }

    let summary = runner.sim.summary();
    println!(
        "{}",
        serde_json::to_string_pretty(&summary).context("Failed to encode run summary")?
    );
    Ok(())
}
