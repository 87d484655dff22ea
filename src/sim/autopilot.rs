//! Demo controller
//!
//! Reads a snapshot and decides which input to send next. Deterministic, so a
//! seeded demo run replays identically. Starts runs, restarts them, and flaps
//! to hold the agent just above the lower edge of the next gap.

use super::state::{GamePhase, InputEvent, Snapshot};
use crate::config::GameConfig;

#[derive(Debug, Clone, Copy)]
pub struct Autopilot {
    agent_half_width: f32,
    agent_half_height: f32,
    /// Hover height when no obstacle is ahead
    idle_y: f32,
    /// Extra clearance above the lower obstacle
    clearance: f32,
    /// Restart automatically after a game over
    pub auto_restart: bool,
}

impl Autopilot {
    pub fn new(config: &GameConfig) -> Self {
        Self {
            agent_half_width: config.agent_width / 2.0,
            agent_half_height: config.agent_height / 2.0,
            idle_y: config.viewport_height / 2.0,
            clearance: 12.0,
            auto_restart: true,
        }
    }

    /// Height the agent should not sink below
    pub fn target_y(&self, snapshot: &Snapshot) -> f32 {
        let agent_left = snapshot.agent_position.x - self.agent_half_width;
        snapshot
            .obstacles
            .iter()
            .find(|o| o.upper.max.x >= agent_left)
            .map(|o| o.lower.min.y - self.agent_half_height - self.clearance)
            .unwrap_or(self.idle_y)
    }

    pub fn decide(&self, snapshot: &Snapshot) -> Option<InputEvent> {
        match snapshot.phase {
            GamePhase::Ready => Some(InputEvent::Start),
            GamePhase::GameOver if self.auto_restart => Some(InputEvent::Restart),
            GamePhase::GameOver => None,
            GamePhase::Playing => {
                // Non-negative tilt means level or falling
                let sinking = snapshot.agent_angle >= 0.0;
                (sinking && snapshot.agent_position.y > self.target_y(snapshot))
                    .then_some(InputEvent::Flap)
            }
        }
    }
}
