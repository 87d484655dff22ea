//! The game state machine
//!
//! Owns every subsystem, drains queued input at tick boundaries and advances
//! the world in fixed steps.

use std::collections::VecDeque;

use super::body::FlightBody;
use super::clock::Clock;
use super::collision::{CollisionKind, CollisionScorer, Verdict};
use super::obstacles::{ObstaclePool, PoolEvent};
use super::state::{
    Backdrop, Effect, GamePhase, InputEvent, ObstacleView, Occurrence, Snapshot, transition,
};
use crate::config::GameConfig;
use crate::error::SimError;

#[derive(Debug, Clone)]
pub struct GameStateMachine {
    config: GameConfig,
    seed: u64,
    phase: GamePhase,
    score: u32,
    /// Best score this session (not persisted)
    best_score: u32,
    clock: Clock,
    body: FlightBody,
    pool: ObstaclePool,
    scorer: CollisionScorer,
    backdrop: Backdrop,
    /// Input waiting for the next tick boundary
    queue: VecDeque<InputEvent>,
    /// Occurrences not yet handed out in a snapshot
    pending: Vec<Occurrence>,
}

impl GameStateMachine {
    /// Build a machine in the Ready phase. The seed drives gap placement.
    pub fn new(config: GameConfig, seed: u64) -> Result<Self, SimError> {
        config.validate()?;
        log::info!("Game initialized with seed: {}", seed);
        Ok(Self {
            seed,
            phase: GamePhase::Ready,
            score: 0,
            best_score: 0,
            clock: Clock::new(config.sim_hz, config.max_frame_dt),
            body: FlightBody::new(&config),
            pool: ObstaclePool::new(&config, seed),
            scorer: CollisionScorer::new(&config),
            backdrop: Backdrop::default(),
            queue: VecDeque::new(),
            pending: Vec::new(),
            config,
        })
    }

    /// Queue an input event; it is applied at the start of the next tick
    pub fn submit_event(&mut self, event: InputEvent) {
        self.queue.push_back(event);
    }

    /// Apply an event right now, between ticks. Returns the effects applied
    /// (empty when the event means nothing in the current phase).
    pub fn handle_event(&mut self, event: InputEvent) -> Vec<Effect> {
        let from = self.phase;
        let t = transition(from, event);
        if t.effects.is_empty() && t.next == from {
            log::trace!("Ignored {:?} in {:?}", event, from);
            return t.effects;
        }

        for effect in &t.effects {
            self.apply_effect(*effect);
        }
        if t.next != from {
            self.set_phase(t.next);
        }
        t.effects
    }

    fn apply_effect(&mut self, effect: Effect) {
        match effect {
            Effect::ResetWorld => {
                self.body.reset();
                self.pool.reset();
                self.score = 0;
                log::info!("Game restarted with seed: {}", self.seed);
            }
            Effect::EnableGravity => self.body.gravity_enabled = true,
            Effect::Launch => self.body.launch(),
            Effect::Flap => {
                self.body.flap();
                self.pending.push(Occurrence::Flapped);
            }
            Effect::StartSpawnTimer => self.pool.restart_timer(),
        }
    }

    fn set_phase(&mut self, to: GamePhase) {
        let from = self.phase;
        self.phase = to;
        log::info!("Phase {:?} -> {:?}", from, to);
        self.pending.push(Occurrence::StateChanged { from, to });
    }

    /// Advance the simulation by a frame delta.
    ///
    /// Queued events are applied first, then as many fixed steps as the clock
    /// releases. A non-positive or non-finite `dt` is rejected before anything
    /// is touched, queued events included.
    pub fn tick(&mut self, dt: f32) -> Result<Snapshot, SimError> {
        if !dt.is_finite() || dt <= 0.0 {
            return Err(SimError::InvalidDt(dt));
        }

        while let Some(event) = self.queue.pop_front() {
            self.handle_event(event);
        }

        let steps = self.clock.advance(dt);
        let step_dt = self.clock.step_dt();
        for _ in 0..steps {
            self.step(step_dt);
        }

        Ok(self.take_snapshot())
    }

    /// One fixed step
    fn step(&mut self, dt: f32) {
        self.backdrop.advance(
            dt,
            self.config.background_scroll_speed,
            self.config.ground_scroll_speed,
            self.config.viewport_width,
        );

        if self.phase != GamePhase::Playing {
            return;
        }

        if self.body.integrate(dt) {
            log::trace!("Agent clamped at y={:.1}", self.body.pos.y);
        }

        for event in self.pool.step(dt) {
            self.pending.push(match event {
                PoolEvent::Spawned(id) => Occurrence::Spawned(id),
                PoolEvent::Evicted { id, reason } => Occurrence::Evicted { id, reason },
            });
        }

        match self.scorer.evaluate(&self.body, &mut self.pool) {
            Verdict::None => {}
            Verdict::Collision(kind) => self.game_over(kind),
            Verdict::Scored(ids) => {
                for id in ids {
                    self.score += 1;
                    self.pending.push(Occurrence::Scored(id));
                    log::debug!("Passed pair {}, score {}", id.0, self.score);
                }
                self.best_score = self.best_score.max(self.score);
            }
        }
    }

    fn game_over(&mut self, kind: CollisionKind) {
        self.body.mark_hit();
        self.pending.push(Occurrence::Collision(kind));
        self.set_phase(GamePhase::GameOver);
        log::info!("Game over ({:?}) with score {}", kind, self.score);
    }

    fn build_snapshot(&self, events: Vec<Occurrence>) -> Snapshot {
        let width = self.pool.obstacle_width();
        let ground_y = self.pool.ground_y();
        Snapshot {
            phase: self.phase,
            score: self.score,
            best_score: self.best_score,
            agent_position: self.body.pos,
            agent_angle: self.body.tilt_degrees(),
            agent_hit: self.body.hit,
            obstacles: self
                .pool
                .pairs()
                .map(|p| ObstacleView {
                    id: p.id,
                    upper: p.upper_rect(width),
                    lower: p.lower_rect(width, ground_y),
                    scored: p.scored,
                })
                .collect(),
            backdrop: self.backdrop,
            step: self.clock.steps(),
            events,
        }
    }

    /// Current view, including occurrences not yet handed out
    pub fn snapshot(&self) -> Snapshot {
        self.build_snapshot(self.pending.clone())
    }

    fn take_snapshot(&mut self) -> Snapshot {
        let events = std::mem::take(&mut self.pending);
        self.build_snapshot(events)
    }

    pub fn phase(&self) -> GamePhase {
        self.phase
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn best_score(&self) -> u32 {
        self.best_score
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn body(&self) -> &FlightBody {
        &self.body
    }

    pub fn pool(&self) -> &ObstaclePool {
        &self.pool
    }

    pub fn clock(&self) -> &Clock {
        &self.clock
    }

    /// Events submitted but not yet applied
    pub fn queued_events(&self) -> usize {
        self.queue.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::obstacles::PairId;
    use proptest::prelude::*;

    const FRAME: f32 = 1.0 / 60.0;

    fn machine(config: GameConfig) -> GameStateMachine {
        GameStateMachine::new(config, 12345).unwrap()
    }

    /// Ground far below, so a falling agent survives a few seconds
    fn tall_config() -> GameConfig {
        GameConfig {
            viewport_height: 5000.0,
            ..Default::default()
        }
    }

    /// No gravity and a fixed gap around the start height
    fn hover_config() -> GameConfig {
        GameConfig {
            gravity: 0.0,
            gap_min_y: 200.0,
            gap_max_y: 200.0,
            ..Default::default()
        }
    }

    fn run_frames(m: &mut GameStateMachine, frames: usize) -> Vec<Occurrence> {
        let mut events = Vec::new();
        for _ in 0..frames {
            events.extend(m.tick(FRAME).unwrap().events);
        }
        events
    }

    #[test]
    fn test_starts_ready_and_floats() {
        let mut m = machine(GameConfig::default());
        assert_eq!(m.phase(), GamePhase::Ready);
        let start = m.body().pos;
        let snap = m.tick(1.0).unwrap();
        assert_eq!(snap.phase, GamePhase::Ready);
        assert_eq!(snap.agent_position, start);
        assert!(m.pool().is_empty());
        // Backdrop scrolls even on the title screen
        assert!(snap.backdrop.ground_offset > 0.0);
    }

    #[test]
    fn test_flap_ignored_in_ready() {
        let mut m = machine(GameConfig::default());
        assert!(m.handle_event(InputEvent::Flap).is_empty());
        assert_eq!(m.phase(), GamePhase::Ready);
        assert_eq!(m.body().velocity_y, 0.0);
    }

    #[test]
    fn test_start_then_one_spawn_interval() {
        let mut m = machine(tall_config());
        m.submit_event(InputEvent::Start);
        let first = m.tick(FRAME).unwrap();
        assert_eq!(first.phase, GamePhase::Playing);
        assert_eq!(first.score, 0);
        assert!(first.has(|e| matches!(
            e,
            Occurrence::StateChanged { from: GamePhase::Ready, to: GamePhase::Playing }
        )));
        assert!(m.pool().steps_until_spawn() < 180);

        run_frames(&mut m, 89);
        assert_eq!(m.pool().len(), 1);
        // v = -250 + 900 * 1.5
        assert!((m.body().velocity_y - 1100.0).abs() < 0.5);
        assert_eq!(m.phase(), GamePhase::Playing);
    }

    #[test]
    fn test_flap_resets_velocity_while_playing() {
        let mut m = machine(tall_config());
        m.handle_event(InputEvent::Start);
        run_frames(&mut m, 30);
        assert!(m.body().velocity_y > 0.0);
        m.submit_event(InputEvent::Flap);
        let snap = m.tick(FRAME).unwrap();
        assert!(snap.has(|e| *e == Occurrence::Flapped));
        // Two steps of gravity after the flap
        let expected = -250.0 + 900.0 * 2.0 / 120.0;
        assert!((m.body().velocity_y - expected).abs() < 0.01);
    }

    #[test]
    fn test_collision_ends_run_and_pauses_world() {
        let mut m = machine(GameConfig::default());
        m.handle_event(InputEvent::Start);
        m.tick(FRAME).unwrap();

        let id = m.pool.spawn();
        {
            let agent_x = m.body.pos.x;
            let agent_y = m.body.pos.y;
            let pair = m.pool.pairs_mut().next().unwrap();
            pair.x = agent_x - 10.0;
            pair.top_bottom_edge = agent_y + 20.0;
            pair.gap_top_edge = agent_y + 145.0;
        }

        let snap = m.tick(FRAME).unwrap();
        assert_eq!(snap.phase, GamePhase::GameOver);
        assert_eq!(snap.score, 0);
        assert!(snap.agent_hit);
        assert!(snap.has(|e| *e == Occurrence::Collision(CollisionKind::Obstacle(id))));

        // Physics and spawn timer are frozen
        let pos = m.body().pos;
        let until_spawn = m.pool().steps_until_spawn();
        let pair_x = m.pool().pairs().next().unwrap().x;
        run_frames(&mut m, 300);
        assert_eq!(m.body().pos, pos);
        assert_eq!(m.pool().steps_until_spawn(), until_spawn);
        assert_eq!(m.pool().pairs().next().unwrap().x, pair_x);
        assert_eq!(m.pool().len(), 1);
    }

    #[test]
    fn test_falling_to_ground_is_game_over() {
        let mut m = machine(GameConfig::default());
        m.submit_event(InputEvent::Start);
        let events = run_frames(&mut m, 120);
        assert_eq!(m.phase(), GamePhase::GameOver);
        assert!(events.contains(&Occurrence::Collision(CollisionKind::Ground)));
        // Collision is reported exactly once
        let hits = events
            .iter()
            .filter(|e| matches!(e, Occurrence::Collision(_)))
            .count();
        assert_eq!(hits, 1);
    }

    #[test]
    fn test_restart_resets_world() {
        let mut m = machine(GameConfig::default());
        m.submit_event(InputEvent::Start);
        run_frames(&mut m, 120);
        assert_eq!(m.phase(), GamePhase::GameOver);

        // Flap and Start do nothing after the run ends
        assert!(m.handle_event(InputEvent::Flap).is_empty());
        assert!(m.handle_event(InputEvent::Start).is_empty());

        let effects = m.handle_event(InputEvent::Restart);
        assert_eq!(effects[0], Effect::ResetWorld);
        assert_eq!(m.phase(), GamePhase::Playing);
        assert_eq!(m.score(), 0);
        assert!(m.pool().is_empty());
        assert_eq!(m.body().pos, m.body().start_position());
        assert_eq!(m.body().velocity_y, m.config().flap_impulse);
        assert!(m.body().gravity_enabled);
        assert!(!m.body().hit);
        assert_eq!(m.pool().steps_until_spawn(), 180);
    }

    #[test]
    fn test_queued_restart_applies_at_tick() {
        let mut m = machine(GameConfig::default());
        m.submit_event(InputEvent::Start);
        run_frames(&mut m, 120);
        m.submit_event(InputEvent::Restart);
        assert_eq!(m.phase(), GamePhase::GameOver);
        let snap = m.tick(FRAME).unwrap();
        assert_eq!(snap.phase, GamePhase::Playing);
        assert!(!snap.agent_hit);
        assert!(snap.obstacles.is_empty());
    }

    #[test]
    fn test_passing_pairs_scores() {
        let mut m = machine(hover_config());
        m.handle_event(InputEvent::Start);
        m.body.velocity_y = 0.0;

        // Pair 1 spawns at 1.5 s and clears the agent about 2.33 s later
        let events = run_frames(&mut m, 360);
        assert_eq!(m.phase(), GamePhase::Playing);
        assert_eq!(m.score(), 2);
        assert_eq!(m.best_score(), 2);
        let scored: Vec<_> = events
            .iter()
            .filter_map(|e| match e {
                Occurrence::Scored(id) => Some(*id),
                _ => None,
            })
            .collect();
        assert_eq!(scored, vec![PairId(1), PairId(2)]);
    }

    #[test]
    fn test_best_score_survives_restart() {
        let mut m = machine(hover_config());
        m.handle_event(InputEvent::Start);
        m.body.velocity_y = 0.0;
        run_frames(&mut m, 300);
        assert_eq!(m.score(), 1);

        m.body.pos.y = 1000.0;
        m.tick(FRAME).unwrap();
        assert_eq!(m.phase(), GamePhase::GameOver);

        m.handle_event(InputEvent::Restart);
        assert_eq!(m.score(), 0);
        assert_eq!(m.best_score(), 1);
    }

    #[test]
    fn test_invalid_dt_is_rejected_without_mutation() {
        let mut m = machine(GameConfig::default());
        m.submit_event(InputEvent::Start);
        for dt in [0.0, -0.016, f32::NAN, f32::INFINITY] {
            assert!(matches!(m.tick(dt), Err(SimError::InvalidDt(_))));
        }
        assert_eq!(m.phase(), GamePhase::Ready);
        assert_eq!(m.queued_events(), 1);
        assert_eq!(m.clock().steps(), 0);

        m.tick(FRAME).unwrap();
        assert_eq!(m.phase(), GamePhase::Playing);
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let config = GameConfig {
            sim_hz: 0,
            ..Default::default()
        };
        assert!(matches!(
            GameStateMachine::new(config, 1),
            Err(SimError::Config(_))
        ));
    }

    #[test]
    fn test_events_are_handed_out_once() {
        let mut m = machine(GameConfig::default());
        m.submit_event(InputEvent::Start);
        let first = m.tick(FRAME).unwrap();
        assert!(!first.events.is_empty());
        let second = m.tick(FRAME).unwrap();
        assert!(second.events.is_empty());
    }

    #[test]
    fn test_same_seed_same_run() {
        let script = |m: &mut GameStateMachine| -> Vec<Snapshot> {
            let mut out = Vec::new();
            m.submit_event(InputEvent::Start);
            for frame in 0..900 {
                if frame % 22 == 0 {
                    m.submit_event(InputEvent::Flap);
                }
                if m.phase() == GamePhase::GameOver {
                    m.submit_event(InputEvent::Restart);
                }
                out.push(m.tick(FRAME).unwrap());
            }
            out
        };
        let mut a = machine(GameConfig::default());
        let mut b = machine(GameConfig::default());
        assert_eq!(script(&mut a), script(&mut b));
    }

    #[test]
    fn test_different_seed_different_gaps() {
        let mut a = GameStateMachine::new(hover_config_with_range(), 1).unwrap();
        let mut b = GameStateMachine::new(hover_config_with_range(), 2).unwrap();
        for m in [&mut a, &mut b] {
            m.handle_event(InputEvent::Start);
            m.body.velocity_y = 0.0;
            run_frames(m, 95);
        }
        let gap_a = a.pool().pairs().next().unwrap().top_bottom_edge;
        let gap_b = b.pool().pairs().next().unwrap().top_bottom_edge;
        assert_ne!(gap_a, gap_b);
    }

    fn hover_config_with_range() -> GameConfig {
        GameConfig {
            gravity: 0.0,
            ..Default::default()
        }
    }

    fn event() -> impl Strategy<Value = Option<InputEvent>> {
        prop_oneof![
            4 => Just(None),
            2 => Just(Some(InputEvent::Flap)),
            1 => Just(Some(InputEvent::Start)),
            1 => Just(Some(InputEvent::Restart)),
        ]
    }

    proptest! {
        #[test]
        fn invariants_hold_under_random_input(
            inputs in proptest::collection::vec((event(), 0.001f32..0.1), 1..400),
        ) {
            let mut m = machine(GameConfig::default());
            let mut last_score = 0;
            for (event, dt) in inputs {
                let restarting = event == Some(InputEvent::Restart)
                    && m.phase() == GamePhase::GameOver;
                if let Some(event) = event {
                    m.submit_event(event);
                }
                let snap = m.tick(dt).unwrap();
                prop_assert!(m.pool().len() <= m.config().max_pairs);
                prop_assert!(snap.obstacles.len() * 2 <= 2 * m.config().max_pairs);
                if !restarting {
                    prop_assert!(snap.score >= last_score);
                }
                prop_assert!(snap.best_score >= snap.score);
                if snap.phase == GamePhase::Ready {
                    prop_assert!(snap.obstacles.is_empty());
                }
                last_score = snap.score;
            }
        }

        #[test]
        fn replay_is_deterministic(
            seed in any::<u64>(),
            inputs in proptest::collection::vec((event(), 0.001f32..0.1), 1..200),
        ) {
            let mut a = GameStateMachine::new(GameConfig::default(), seed).unwrap();
            let mut b = GameStateMachine::new(GameConfig::default(), seed).unwrap();
            for (event, dt) in inputs {
                if let Some(event) = event {
                    a.submit_event(event);
                    b.submit_event(event);
                }
                prop_assert_eq!(a.tick(dt).unwrap(), b.tick(dt).unwrap());
            }
        }
    }
}
