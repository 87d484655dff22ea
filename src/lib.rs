//! Flappy Core - simulation core of a side-scrolling flap-through-the-pipes game
//!
//! Core modules:
//! - `sim`: Deterministic simulation (flight physics, obstacle pool, collisions, lifecycle)
//! - `config`: Immutable game configuration with JSON loading
//! - `error`: Contract-violation errors
//! - `hud`: Score digit layout for the presentation layer
//!
//! Rendering, audio, assets and input polling live outside this crate. The
//! presentation layer feeds [`sim::InputEvent`]s and frame deltas in and reads
//! [`sim::Snapshot`]s back out.

pub mod config;
pub mod error;
pub mod hud;
pub mod sim;

pub use config::{ConfigError, GameConfig};
pub use error::SimError;
pub use sim::{GamePhase, GameStateMachine, InputEvent, Occurrence, Snapshot};

/// Game configuration constants (defaults for [`GameConfig`])
pub mod consts {
    /// Fixed simulation rate (steps per second)
    pub const SIM_HZ: u32 = 120;
    /// Largest frame delta accepted in one tick (seconds)
    pub const MAX_FRAME_DT: f32 = 2.0;

    /// Viewport dimensions
    pub const VIEWPORT_WIDTH: f32 = 288.0;
    pub const VIEWPORT_HEIGHT: f32 = 512.0;
    /// Ground strip at the bottom of the viewport
    pub const GROUND_HEIGHT: f32 = 112.0;

    /// Downward acceleration (pixels/s²)
    pub const GRAVITY: f32 = 900.0;
    /// Velocity set by a flap (pixels/s, negative is up)
    pub const FLAP_IMPULSE: f32 = -250.0;

    /// Agent defaults
    pub const AGENT_X: f32 = 60.0;
    pub const AGENT_WIDTH: f32 = 34.0;
    pub const AGENT_HEIGHT: f32 = 24.0;
    /// Presentation tilt: degrees = velocity / TILT_DIVISOR, clamped to ±MAX_TILT_DEG
    pub const TILT_DIVISOR: f32 = 8.0;
    pub const MAX_TILT_DEG: f32 = 30.0;

    /// Obstacle defaults
    pub const SPAWN_INTERVAL: f32 = 1.5; // seconds
    pub const OBSTACLE_SPEED: f32 = 120.0; // pixels/s, leftward
    pub const OBSTACLE_WIDTH: f32 = 52.0;
    pub const GAP: f32 = 125.0;
    /// Range for the bottom edge of the upper obstacle
    pub const GAP_MIN_Y: f32 = 60.0;
    pub const GAP_MAX_Y: f32 = 280.0;
    /// Lowest allowed top edge of the lower obstacle
    pub const GAP_MAX_ALLOWED: f32 = 380.0;
    /// Minimum distance between an obstacle edge and the ceiling/ground line
    pub const OBSTACLE_MARGIN: f32 = 20.0;
    /// Obstacle pairs alive at once
    pub const MAX_PAIRS: usize = 6;

    /// Backdrop scroll speeds (pixels/s)
    pub const BACKGROUND_SCROLL_SPEED: f32 = 18.0;
    pub const GROUND_SCROLL_SPEED: f32 = 120.0;

    /// Score digit geometry
    pub const SCORE_DIGIT_WIDTH: f32 = 14.0;
    pub const SCORE_Y: f32 = 60.0;
}

/// Map a vertical velocity to a presentation tilt in degrees
#[inline]
pub fn tilt_for_velocity(velocity_y: f32, divisor: f32, max_deg: f32) -> f32 {
    (velocity_y / divisor).clamp(-max_deg, max_deg)
}
