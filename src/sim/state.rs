//! Lifecycle types, the transition table and the snapshot handed to the
//! presentation layer.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::collision::CollisionKind;
use super::geometry::Rect;
use super::obstacles::{EvictReason, PairId};

/// Current phase of the run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GamePhase {
    /// Title screen, agent floating, no obstacles
    Ready,
    /// Active gameplay
    Playing,
    /// Run ended on a collision; waits for Restart
    GameOver,
}

impl GamePhase {
    pub const ALL: [GamePhase; 3] = [GamePhase::Ready, GamePhase::Playing, GamePhase::GameOver];
}

/// Input from the player, already mapped from devices by the host
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InputEvent {
    Flap,
    Start,
    Restart,
}

impl InputEvent {
    pub const ALL: [InputEvent; 3] = [InputEvent::Flap, InputEvent::Start, InputEvent::Restart];
}

/// Side effect requested by a transition, applied by the state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Effect {
    /// Clear obstacles, score and hit marker; put the agent back at the start
    ResetWorld,
    EnableGravity,
    /// Initial upward kick when a run begins
    Launch,
    /// Upward impulse during play
    Flap,
    StartSpawnTimer,
}

/// Outcome of feeding one event to the transition table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    pub next: GamePhase,
    pub effects: Vec<Effect>,
}

impl Transition {
    fn stay(phase: GamePhase) -> Self {
        Self {
            next: phase,
            effects: Vec::new(),
        }
    }
}

/// The input transition table.
///
/// Pure and total: every (phase, event) pair maps to a phase and a list of
/// effects. Pairs with no meaning keep the phase and request nothing.
pub fn transition(phase: GamePhase, event: InputEvent) -> Transition {
    use Effect::*;
    match (phase, event) {
        (GamePhase::Ready, InputEvent::Start) => Transition {
            next: GamePhase::Playing,
            effects: vec![EnableGravity, Launch, StartSpawnTimer],
        },
        (GamePhase::Playing, InputEvent::Flap) => Transition {
            next: GamePhase::Playing,
            effects: vec![Flap],
        },
        (GamePhase::GameOver, InputEvent::Restart) => Transition {
            next: GamePhase::Playing,
            effects: vec![ResetWorld, EnableGravity, Launch, StartSpawnTimer],
        },
        (GamePhase::Ready, InputEvent::Flap | InputEvent::Restart)
        | (GamePhase::Playing, InputEvent::Start | InputEvent::Restart)
        | (GamePhase::GameOver, InputEvent::Flap | InputEvent::Start) => Transition::stay(phase),
    }
}

/// Something that happened during a tick, for sound and visual cues
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Occurrence {
    StateChanged { from: GamePhase, to: GamePhase },
    Flapped,
    Spawned(PairId),
    Evicted { id: PairId, reason: EvictReason },
    Scored(PairId),
    Collision(CollisionKind),
}

/// Cosmetic scroll offsets. Advanced in every phase so the title screen
/// still animates.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Backdrop {
    pub background_offset: f32,
    pub ground_offset: f32,
}

impl Backdrop {
    /// Scroll by the given speeds; offsets wrap at `wrap` pixels
    pub fn advance(&mut self, dt: f32, background_speed: f32, ground_speed: f32, wrap: f32) {
        self.background_offset = (self.background_offset + background_speed * dt).rem_euclid(wrap);
        self.ground_offset = (self.ground_offset + ground_speed * dt).rem_euclid(wrap);
    }
}

/// One obstacle pair as the presentation layer sees it
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ObstacleView {
    pub id: PairId,
    pub upper: Rect,
    pub lower: Rect,
    pub scored: bool,
}

/// Everything a renderer needs for one frame
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub phase: GamePhase,
    pub score: u32,
    pub best_score: u32,
    /// Agent centre
    pub agent_position: Vec2,
    /// Presentation tilt in degrees
    pub agent_angle: f32,
    pub agent_hit: bool,
    pub obstacles: Vec<ObstacleView>,
    pub backdrop: Backdrop,
    /// Fixed steps simulated since construction
    pub step: u64,
    /// Occurrences since the previous snapshot, in order
    pub events: Vec<Occurrence>,
}

impl Snapshot {
    /// Did anything of this kind happen in the tick?
    pub fn has(&self, pred: impl Fn(&Occurrence) -> bool) -> bool {
        self.events.iter().any(pred)
    }
}
