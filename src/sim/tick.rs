//! Simulation loop
//!
//! `Simulation` owns every gameplay component and is the only thing that
//! mutates them. The host drives it with two clocks:
//! - `tick_fixed`: player motion and the danger-world countdown
//! - `tick_variable`: placement, cleanup, ground recycling and score
//!
//! Contacts come in through `on_contact`; notifications go out through
//! `drain_events`. Once the run is over every entry point is a no-op.

use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::coin::Coin;
use super::collision::{CollisionContext, Contact, Resolution, resolve};
use super::danger::{DangerTransition, DangerWorld};
use super::player::PlayerMotion;
use super::pool::EntityPool;
use super::score::ScoreEngine;
use super::spawner::ObstacleSpawner;
use super::state::{GameEvent, GamePhase, InputAction, Obstacle, RngState};
use super::track::TrackSegmenter;
use crate::error::ConfigError;
use crate::highscores::{HighScoreStore, load_or_zero};
use crate::tuning::Tuning;

/// End-of-run numbers for reporting
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunSummary {
    pub seed: u64,
    pub phase: GamePhase,
    pub seconds: f32,
    pub distance: f32,
    pub forward_speed: f32,
    pub score: u64,
    pub coin_score: f32,
    pub high_score: f32,
    pub danger_activations: u32,
}

/// The whole game, minus rendering and physics detection
pub struct Simulation {
    tuning: Tuning,
    rng_state: RngState,
    rng: Pcg32,
    phase: GamePhase,
    /// Seconds of variable time since `initialize`
    time: f32,
    player: PlayerMotion,
    spawner: ObstacleSpawner,
    track: TrackSegmenter,
    obstacles: EntityPool<Obstacle>,
    coins: EntityPool<Coin>,
    score: ScoreEngine,
    danger: DangerWorld,
    store: Box<dyn HighScoreStore>,
    /// Best score known at the start of the run, updated at game over
    high_score: f32,
    events: Vec<GameEvent>,
}

impl Simulation {
    /// Build a simulation. Fails if the tuning is unusable.
    pub fn new(
        tuning: Tuning,
        seed: u64,
        store: Box<dyn HighScoreStore>,
    ) -> Result<Self, ConfigError> {
        tuning.validate()?;
        let rng_state = RngState::new(seed);
        let player = PlayerMotion::new(tuning.player.clone());
        let start_z = player.state.pos.z;
        Ok(Self {
            rng: rng_state.to_rng(),
            rng_state,
            phase: GamePhase::Ready,
            time: 0.0,
            spawner: ObstacleSpawner::new(
                tuning.spawn.clone(),
                tuning.player.lane_distance,
                start_z,
            ),
            track: TrackSegmenter::new(tuning.track.clone()),
            obstacles: EntityPool::new(),
            coins: EntityPool::new(),
            score: ScoreEngine::new(tuning.score.clone()),
            danger: DangerWorld::new(tuning.danger.clone()),
            player,
            store,
            high_score: 0.0,
            events: Vec::new(),
            tuning,
        })
    }

    /// Start the run: begin scoring and fill the track ahead
    pub fn initialize(&mut self) {
        if self.phase != GamePhase::Ready {
            return;
        }
        self.phase = GamePhase::Running;
        self.score.reset(self.player.state.pos.z);
        self.high_score = load_or_zero(&*self.store);
        let placed = self.spawn_ahead();
        log::info!(
            "Run started (seed {}, {} placements, best {})",
            self.rng_state.seed,
            placed,
            self.high_score
        );
    }

    /// Apply one key press. Returns false if it had no effect.
    pub fn handle_action(&mut self, action: InputAction) -> bool {
        if self.phase != GamePhase::Running || !self.player.state.enabled {
            return false;
        }
        match action {
            InputAction::MoveLeft => {
                let before = self.player.state.current_lane;
                self.player.change_lane(-1);
                self.player.state.current_lane != before
            }
            InputAction::MoveRight => {
                let before = self.player.state.current_lane;
                self.player.change_lane(1);
                self.player.state.current_lane != before
            }
            InputAction::Jump => self.player.try_jump(),
            InputAction::Slide => self.player.try_slide(),
        }
    }

    /// Fixed step: move the player and run the danger-world clock.
    /// Non-positive steps are ignored.
    pub fn tick_fixed(&mut self, dt: f32) {
        if self.phase != GamePhase::Running || dt.is_nan() || dt <= 0.0 {
            return;
        }
        self.player.tick_fixed(dt);

        match self.danger.update(dt, self.score.score(), &mut self.player) {
            Some(DangerTransition::Entered { trigger_score }) => {
                self.events.push(GameEvent::DangerEntered { trigger_score });
            }
            Some(DangerTransition::Exited { exit_score, cause }) => {
                self.events.push(GameEvent::DangerExited { exit_score, cause });
            }
            None => {}
        }
    }

    /// Frame step: generate and clean up track content, update the score
    pub fn tick_variable(&mut self, dt: f32) {
        if self.phase != GamePhase::Running {
            return;
        }
        self.time += dt.max(0.0);
        let player_z = self.player.state.pos.z;

        let placed = self.spawn_ahead();
        if placed > 0 {
            log::debug!(
                "{} placements, frontier at {:.1}",
                placed,
                self.spawner.frontier()
            );
        }
        self.spawner.cleanup(player_z, &mut self.obstacles);
        self.coins
            .despawn_behind(player_z, self.tuning.coin.cleanup_distance);
        self.track.recycle_ground(player_z);

        self.score.update(player_z, self.danger.is_active());
        self.events.push(GameEvent::ScoreUpdated {
            display: self.score.display(),
        });
    }

    /// Feed a contact from the physics host
    pub fn on_contact(&mut self, contact: Contact) -> Resolution {
        if self.phase != GamePhase::Running {
            return Resolution::Ignored;
        }
        let mut ctx = CollisionContext {
            player: &mut self.player,
            danger: &mut self.danger,
            score: &mut self.score,
            spawner: &mut self.spawner,
            obstacles: &mut self.obstacles,
            coins: &mut self.coins,
            store: &mut *self.store,
            events: &mut self.events,
            coin_value_per_speed: self.tuning.score.coin_value_per_speed,
            ground_normal_threshold: self.tuning.player.ground_normal_threshold,
        };
        let resolution = resolve(&mut ctx, contact);
        if let Resolution::GameOver(outcome) = resolution {
            self.phase = GamePhase::GameOver;
            self.high_score = outcome.high_score;
        }
        resolution
    }

    /// Take all pending notifications, oldest first
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    fn spawn_ahead(&mut self) -> usize {
        self.spawner.update(
            &mut self.rng,
            self.player.state.pos.z,
            self.player.state.forward_speed,
            self.time,
            &mut self.track,
            &mut self.obstacles,
            &mut self.coins,
        )
    }

    pub fn phase(&self) -> GamePhase {
        self.phase
    }

    pub fn seed(&self) -> u64 {
        self.rng_state.seed
    }

    pub fn time(&self) -> f32 {
        self.time
    }

    pub fn tuning(&self) -> &Tuning {
        &self.tuning
    }

    pub fn player(&self) -> &PlayerMotion {
        &self.player
    }

    pub fn obstacles(&self) -> &EntityPool<Obstacle> {
        &self.obstacles
    }

    pub fn coins(&self) -> &EntityPool<Coin> {
        &self.coins
    }

    pub fn score(&self) -> &ScoreEngine {
        &self.score
    }

    pub fn danger(&self) -> &DangerWorld {
        &self.danger
    }

    pub fn spawner(&self) -> &ObstacleSpawner {
        &self.spawner
    }

    pub fn track(&self) -> &TrackSegmenter {
        &self.track
    }

    /// Current rotation of a coin for display (radians)
    pub fn coin_spin(&self, coin: &Coin) -> f32 {
        coin.spin_angle(self.time, self.tuning.coin.spin_deg_per_sec)
    }

    /// Best score: as loaded at start, or as committed at game over
    pub fn high_score(&self) -> f32 {
        self.high_score
    }

    pub fn summary(&self) -> RunSummary {
        RunSummary {
            seed: self.rng_state.seed,
            phase: self.phase,
            seconds: self.time,
            distance: self.player.state.pos.z,
            forward_speed: self.player.state.forward_speed,
            score: self.score.display(),
            coin_score: self.score.coin_score(),
            high_score: self.high_score.max(self.score.score()),
            danger_activations: self.danger.activations(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::*;
    use crate::highscores::MemoryStore;
    use crate::sim::state::DangerExitCause;
    use glam::Vec3;

    fn sim_with(tuning: Tuning, store: MemoryStore) -> Simulation {
        let mut sim = Simulation::new(tuning, 42, Box::new(store)).unwrap();
        sim.initialize();
        sim
    }

    fn sim() -> Simulation {
        sim_with(Tuning::default(), MemoryStore::new())
    }

    fn step(sim: &mut Simulation) {
        sim.tick_fixed(SIM_DT);
        sim.tick_variable(SIM_DT);
    }

    fn nearest_obstacle(sim: &Simulation) -> u32 {
        sim.obstacles()
            .iter()
            .min_by(|a, b| a.pos.z.total_cmp(&b.pos.z))
            .map(|o| o.id)
            .unwrap()
    }

    #[test]
    fn test_new_rejects_bad_tuning() {
        let mut tuning = Tuning::default();
        tuning.player.lane_distance = 0.0;
        let result = Simulation::new(tuning, 1, Box::new(MemoryStore::new()));
        assert!(matches!(result, Err(ConfigError::NotPositive { .. })));
    }

    #[test]
    fn test_initialize_fills_track_ahead() {
        let s = sim();
        assert_eq!(s.phase(), GamePhase::Running);
        assert!(!s.obstacles().is_empty());
        assert!(s.spawner().frontier() >= s.tuning().spawn.lookahead);
    }

    #[test]
    fn test_nothing_runs_before_initialize() {
        let mut s = Simulation::new(Tuning::default(), 1, Box::new(MemoryStore::new())).unwrap();
        step(&mut s);
        assert!(!s.handle_action(InputAction::Jump));
        assert_eq!(s.player().state.pos.z, 0.0);
        assert!(s.drain_events().is_empty());
    }

    #[test]
    fn test_running_accrues_score_and_speed() {
        let mut s = sim();
        for _ in 0..250 {
            step(&mut s);
        }
        let p = &s.player().state;
        assert!(p.pos.z > 25.0);
        assert!(p.forward_speed > s.tuning().player.start_forward_speed);
        assert!((s.score().score() - p.pos.z).abs() <= 1.0);

        let events = s.drain_events();
        assert!(matches!(events.last(), Some(GameEvent::ScoreUpdated { .. })));
        assert!(s.drain_events().is_empty());
    }

    #[test]
    fn test_same_seed_same_layout() {
        let a = sim();
        let b = sim();
        let layout = |s: &Simulation| {
            s.obstacles()
                .iter()
                .map(|o| (o.pos, o.kind))
                .collect::<Vec<_>>()
        };
        assert_eq!(layout(&a), layout(&b));
    }

    #[test]
    fn test_obstacles_behind_are_cleaned_up() {
        let mut s = sim();
        let first = nearest_obstacle(&s);
        let first_z = s.obstacles().get(first).unwrap().pos.z;
        // Contacts are never fed, so the player runs straight through
        while s.player().state.pos.z < first_z + s.tuning().spawn.despawn_offset + 1.0 {
            step(&mut s);
        }
        step(&mut s);
        assert!(s.obstacles().get(first).is_none());
        let z = s.player().state.pos.z;
        assert!(
            s.coins()
                .iter()
                .all(|c| z - c.pos.z <= s.tuning().coin.cleanup_distance)
        );
    }

    #[test]
    fn test_danger_world_enters_at_trigger_score() {
        let mut tuning = Tuning::default();
        tuning.danger.initial_trigger_score = 20.0;
        let mut s = sim_with(tuning, MemoryStore::new());

        let mut entered = None;
        for _ in 0..1000 {
            step(&mut s);
            if let Some(e) = s
                .drain_events()
                .into_iter()
                .find(|e| matches!(e, GameEvent::DangerEntered { .. }))
            {
                entered = Some(e);
                break;
            }
        }
        assert_eq!(
            entered,
            Some(GameEvent::DangerEntered {
                trigger_score: 20.0
            })
        );
        assert!(s.score().score() >= 20.0);
        assert!(s.danger().has_shield());
        assert!(s.player().state.layered);
    }

    #[test]
    fn test_hit_without_shield_ends_run_once() {
        let store = MemoryStore::with_high_score(5.0);
        let mut s = sim_with(Tuning::default(), store);
        for _ in 0..100 {
            step(&mut s);
        }
        let speed = s.player().state.forward_speed;
        let id = nearest_obstacle(&s);
        s.drain_events();

        assert!(matches!(
            s.on_contact(Contact::Obstacle { id }),
            Resolution::GameOver(_)
        ));
        assert_eq!(s.phase(), GamePhase::GameOver);
        assert_eq!(s.player().state.vel, Vec3::ZERO);
        assert_eq!(s.player().state.forward_speed, speed);
        assert!(!s.spawner().is_enabled());

        // Everything after this is ignored
        assert_eq!(s.on_contact(Contact::Obstacle { id }), Resolution::Ignored);
        let z = s.player().state.pos.z;
        step(&mut s);
        assert!(!s.handle_action(InputAction::Jump));
        assert_eq!(s.player().state.pos.z, z);

        let events = s.drain_events();
        let game_overs: Vec<_> = events
            .iter()
            .filter(|e| matches!(e, GameEvent::GameOver { .. }))
            .collect();
        assert_eq!(game_overs.len(), 1);
        assert!(matches!(
            game_overs[0],
            GameEvent::GameOver {
                new_record: true,
                ..
            }
        ));
        assert!(s.high_score() > 5.0);
    }

    #[test]
    fn test_hit_with_shield_continues_run() {
        let mut tuning = Tuning::default();
        tuning.danger.initial_trigger_score = 10.0;
        let mut s = sim_with(tuning, MemoryStore::new());
        while !s.danger().is_active() {
            step(&mut s);
        }
        s.drain_events();

        let id = nearest_obstacle(&s);
        let r = s.on_contact(Contact::Obstacle { id });
        assert!(matches!(r, Resolution::ShieldAbsorbed { .. }));
        assert_eq!(s.phase(), GamePhase::Running);
        assert!(!s.danger().is_active());
        assert!(s.danger().next_trigger_score() >= 20.0);

        let events = s.drain_events();
        assert_eq!(events[0], GameEvent::ShieldConsumed);
        assert!(matches!(
            events[1],
            GameEvent::DangerExited {
                cause: DangerExitCause::ShieldConsumed,
                ..
            }
        ));

        let z = s.player().state.pos.z;
        step(&mut s);
        assert!(s.player().state.pos.z > z);
    }

    #[test]
    fn test_coin_contact_adds_score() {
        let mut s = sim();
        let id = s
            .coins()
            .iter()
            .next()
            .map(|c| c.id)
            .expect("seed 42 places coins on the opening stretch");
        let r = s.on_contact(Contact::CoinTrigger { id });
        assert_eq!(r, Resolution::CoinCollected { amount: 50.0 });
        assert_eq!(s.score().coin_score(), 50.0);
        assert!(s.coins().get(id).is_none());
    }

    #[test]
    fn test_non_positive_fixed_step_is_ignored() {
        let mut tuning = Tuning::default();
        tuning.danger.initial_trigger_score = 10.0;
        let mut s = sim_with(tuning, MemoryStore::new());
        while !s.danger().is_active() {
            step(&mut s);
        }
        let speed = s.player().state.forward_speed;
        let z = s.player().state.pos.z;
        let remaining = s.danger().time_remaining();

        s.tick_fixed(0.0);
        s.tick_fixed(-0.5);
        let p = &s.player().state;
        assert!(!p.vel.is_nan());
        assert_eq!(p.forward_speed, speed);
        assert_eq!(p.pos.z, z);
        assert_eq!(s.danger().time_remaining(), remaining);
    }

    #[test]
    fn test_coin_spin_follows_run_time() {
        let mut s = sim();
        let id = s
            .coins()
            .iter()
            .next()
            .map(|c| c.id)
            .expect("seed 42 places coins on the opening stretch");
        for _ in 0..25 {
            step(&mut s);
        }
        let coin = s.coins().get(id).expect("coin still ahead");
        let elapsed = s.time() - coin.spawned_at;
        let expected = (elapsed * s.tuning().coin.spin_deg_per_sec)
            .to_radians()
            .rem_euclid(std::f32::consts::TAU);
        assert!(elapsed > 0.0);
        assert!((s.coin_spin(coin) - expected).abs() < 1e-4);
    }

    #[test]
    fn test_inputs_drive_player() {
        let mut s = sim();
        assert!(s.handle_action(InputAction::MoveLeft));
        assert!(!s.handle_action(InputAction::MoveLeft));
        assert_eq!(s.player().state.current_lane, MIN_LANE);
        assert!(s.handle_action(InputAction::Jump));
        assert!(s.handle_action(InputAction::Jump));
        assert!(!s.handle_action(InputAction::Jump));
        assert!(s.handle_action(InputAction::Slide));
    }

    #[test]
    fn test_summary_reports_run() {
        let mut s = sim();
        for _ in 0..50 {
            step(&mut s);
        }
        let summary = s.summary();
        assert_eq!(summary.seed, 42);
        assert_eq!(summary.phase, GamePhase::Running);
        assert_eq!(summary.score, s.score().display());
        assert!((summary.seconds - 1.0).abs() < 1e-3);
    }
}
