//! The flying agent
//!
//! One degree of freedom: only the vertical position and velocity change.
//! The horizontal position is fixed for the life of the run.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::geometry::Rect;
use crate::config::GameConfig;
use crate::tilt_for_velocity;

/// Physics parameters copied out of [`GameConfig`]
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
struct BodyParams {
    gravity: f32,
    flap_impulse: f32,
    size: Vec2,
    start: Vec2,
    ceiling: f32,
    floor: f32,
    tilt_divisor: f32,
    max_tilt_deg: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FlightBody {
    /// Centre of the agent
    pub pos: Vec2,
    pub velocity_y: f32,
    pub gravity_enabled: bool,
    /// Set when the run ended on a collision (presentation tints the sprite)
    pub hit: bool,
    params: BodyParams,
}

impl FlightBody {
    pub fn new(config: &GameConfig) -> Self {
        let params = BodyParams {
            gravity: config.gravity,
            flap_impulse: config.flap_impulse,
            size: Vec2::new(config.agent_width, config.agent_height),
            start: Vec2::new(config.agent_x, config.viewport_height / 2.0),
            ceiling: 0.0,
            floor: config.viewport_height,
            tilt_divisor: config.tilt_divisor,
            max_tilt_deg: config.max_tilt_deg,
        };
        Self {
            pos: params.start,
            velocity_y: 0.0,
            gravity_enabled: false,
            hit: false,
            params,
        }
    }

    /// Advance one step (semi-implicit Euler).
    ///
    /// Returns true if the position had to be clamped into the viewport. The
    /// clamp is reported so the caller can treat it as a bounds collision.
    pub fn integrate(&mut self, dt: f32) -> bool {
        if self.gravity_enabled {
            self.velocity_y += self.params.gravity * dt;
        }
        self.pos.y += self.velocity_y * dt;

        let clamped = self.pos.y.clamp(self.params.ceiling, self.params.floor);
        let out_of_bounds = clamped != self.pos.y;
        self.pos.y = clamped;
        out_of_bounds
    }

    /// Replace the current velocity with the flap impulse
    pub fn flap(&mut self) {
        self.velocity_y = self.params.flap_impulse;
    }

    /// Enable gravity and kick off with an initial flap
    pub fn launch(&mut self) {
        self.gravity_enabled = true;
        self.flap();
    }

    pub fn mark_hit(&mut self) {
        self.hit = true;
    }

    /// Back to the floating start pose
    pub fn reset(&mut self) {
        self.pos = self.params.start;
        self.velocity_y = 0.0;
        self.gravity_enabled = false;
        self.hit = false;
    }

    pub fn bounds(&self) -> Rect {
        Rect::from_center(self.pos, self.params.size)
    }

    /// Presentation rotation in degrees (nose down is positive)
    pub fn tilt_degrees(&self) -> f32 {
        tilt_for_velocity(
            self.velocity_y,
            self.params.tilt_divisor,
            self.params.max_tilt_deg,
        )
    }

    #[inline]
    pub fn start_position(&self) -> Vec2 {
        self.params.start
    }

    #[inline]
    pub fn flap_impulse(&self) -> f32 {
        self.params.flap_impulse
    }
}
