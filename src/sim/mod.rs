//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Seeded RNG only
//! - Stable iteration order (by pair ID)
//! - No rendering, audio or platform dependencies

pub mod autopilot;
pub mod body;
pub mod clock;
pub mod collision;
pub mod geometry;
pub mod obstacles;
pub mod state;
pub mod tick;

pub use autopilot::Autopilot;
pub use body::FlightBody;
pub use clock::Clock;
pub use collision::{CollisionKind, CollisionScorer, Verdict, WorldBounds};
pub use geometry::Rect;
pub use obstacles::{EvictReason, ObstaclePair, ObstaclePool, PairId, PoolEvent};
pub use state::{
    Backdrop, Effect, GamePhase, InputEvent, ObstacleView, Occurrence, Snapshot, Transition,
    transition,
};
pub use tick::GameStateMachine;
