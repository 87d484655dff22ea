//! Game configuration
//!
//! Built once (defaults or JSON), validated, then treated as immutable. Each
//! subsystem copies the values it needs when it is constructed.

use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::consts::*;

/// Errors from building or loading a [`GameConfig`]
#[derive(Debug)]
pub enum ConfigError {
    /// A field holds a value the simulation cannot run with.
    Invalid {
        field: &'static str,
        reason: String,
    },
    /// The JSON document could not be parsed.
    Parse(serde_json::Error),
    /// The config file could not be read.
    Io(std::io::Error),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Invalid { field, reason } => write!(f, "invalid config field '{field}': {reason}"),
            Self::Parse(e) => write!(f, "config parse error: {e}"),
            Self::Io(e) => write!(f, "config read error: {e}"),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Parse(e) => Some(e),
            Self::Io(e) => Some(e),
            Self::Invalid { .. } => None,
        }
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(e: serde_json::Error) -> Self {
        Self::Parse(e)
    }
}

impl From<std::io::Error> for ConfigError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}

/// Simulation configuration
///
/// Geometry is in pixels with the origin at the top-left of the viewport and
/// y growing downward. Times are in seconds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    // === Viewport ===
    pub viewport_width: f32,
    pub viewport_height: f32,
    /// Height of the ground strip; its top edge is the lethal ground line
    pub ground_height: f32,
    /// Touching the top of the viewport ends the run
    pub lethal_ceiling: bool,

    // === Agent ===
    pub gravity: f32,
    /// Velocity assigned by each flap (negative is up)
    pub flap_impulse: f32,
    pub agent_x: f32,
    pub agent_width: f32,
    pub agent_height: f32,
    pub tilt_divisor: f32,
    pub max_tilt_deg: f32,

    // === Obstacles ===
    pub spawn_interval: f32,
    pub obstacle_speed: f32,
    pub obstacle_width: f32,
    pub gap: f32,
    pub gap_min_y: f32,
    pub gap_max_y: f32,
    pub gap_max_allowed: f32,
    pub obstacle_margin: f32,
    pub max_pairs: usize,

    // === Backdrop ===
    pub background_scroll_speed: f32,
    pub ground_scroll_speed: f32,

    // === HUD ===
    pub score_digit_width: f32,
    pub score_y: f32,

    // === Timing ===
    pub sim_hz: u32,
    pub max_frame_dt: f32,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            viewport_width: VIEWPORT_WIDTH,
            viewport_height: VIEWPORT_HEIGHT,
            ground_height: GROUND_HEIGHT,
            lethal_ceiling: true,

            gravity: GRAVITY,
            flap_impulse: FLAP_IMPULSE,
            agent_x: AGENT_X,
            agent_width: AGENT_WIDTH,
            agent_height: AGENT_HEIGHT,
            tilt_divisor: TILT_DIVISOR,
            max_tilt_deg: MAX_TILT_DEG,

            spawn_interval: SPAWN_INTERVAL,
            obstacle_speed: OBSTACLE_SPEED,
            obstacle_width: OBSTACLE_WIDTH,
            gap: GAP,
            gap_min_y: GAP_MIN_Y,
            gap_max_y: GAP_MAX_Y,
            gap_max_allowed: GAP_MAX_ALLOWED,
            obstacle_margin: OBSTACLE_MARGIN,
            max_pairs: MAX_PAIRS,

            background_scroll_speed: BACKGROUND_SCROLL_SPEED,
            ground_scroll_speed: GROUND_SCROLL_SPEED,

            score_digit_width: SCORE_DIGIT_WIDTH,
            score_y: SCORE_Y,

            sim_hz: SIM_HZ,
            max_frame_dt: MAX_FRAME_DT,
        }
    }
}

fn invalid(field: &'static str, reason: impl Into<String>) -> ConfigError {
    ConfigError::Invalid {
        field,
        reason: reason.into(),
    }
}

impl GameConfig {
    /// Parse and validate a JSON document; missing fields take their defaults
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a JSON config file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)?;
        let config = Self::from_json_str(&json)?;
        log::info!("Loaded config from {}", path.display());
        Ok(config)
    }

    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// y of the ground line (top edge of the ground strip)
    #[inline]
    pub fn ground_y(&self) -> f32 {
        self.viewport_height - self.ground_height
    }

    /// Length of one fixed simulation step
    #[inline]
    pub fn step_dt(&self) -> f32 {
        1.0 / self.sim_hz as f32
    }

    /// Spawn interval rounded to whole fixed steps
    pub fn spawn_interval_steps(&self) -> u64 {
        ((self.spawn_interval * self.sim_hz as f32).round() as u64).max(1)
    }

    /// Check every constraint the simulation relies on
    pub fn validate(&self) -> Result<(), ConfigError> {
        let positive = [
            ("viewport_width", self.viewport_width),
            ("viewport_height", self.viewport_height),
            ("agent_width", self.agent_width),
            ("agent_height", self.agent_height),
            ("tilt_divisor", self.tilt_divisor),
            ("spawn_interval", self.spawn_interval),
            ("obstacle_width", self.obstacle_width),
            ("gap", self.gap),
            ("max_frame_dt", self.max_frame_dt),
        ];
        for (field, value) in positive {
            if !value.is_finite() || value <= 0.0 {
                return Err(invalid(field, format!("must be positive, got {value}")));
            }
        }

        let non_negative = [
            ("ground_height", self.ground_height),
            ("gravity", self.gravity),
            ("obstacle_speed", self.obstacle_speed),
            ("obstacle_margin", self.obstacle_margin),
            ("max_tilt_deg", self.max_tilt_deg),
            ("background_scroll_speed", self.background_scroll_speed),
            ("ground_scroll_speed", self.ground_scroll_speed),
            ("score_digit_width", self.score_digit_width),
        ];
        for (field, value) in non_negative {
            if !value.is_finite() || value < 0.0 {
                return Err(invalid(field, format!("must be non-negative, got {value}")));
            }
        }

        if !self.flap_impulse.is_finite() || self.flap_impulse >= 0.0 {
            return Err(invalid("flap_impulse", "must be negative (upward)"));
        }
        if self.ground_height >= self.viewport_height {
            return Err(invalid("ground_height", "must leave room above the ground"));
        }
        if self.sim_hz == 0 {
            return Err(invalid("sim_hz", "must be at least 1"));
        }
        if self.max_pairs == 0 {
            return Err(invalid("max_pairs", "must be at least 1"));
        }
        if self.agent_x < 0.0 || self.agent_x > self.viewport_width {
            return Err(invalid("agent_x", "must lie inside the viewport"));
        }

        // Gap placement must keep every obstacle edge inside the margins
        if self.gap_min_y > self.gap_max_y {
            return Err(invalid("gap_min_y", "must not exceed gap_max_y"));
        }
        if self.gap_min_y < self.obstacle_margin {
            return Err(invalid(
                "gap_min_y",
                format!("upper obstacle edge closer than {} to the ceiling", self.obstacle_margin),
            ));
        }
        if self.gap_max_allowed > self.ground_y() - self.obstacle_margin {
            return Err(invalid(
                "gap_max_allowed",
                format!("lower obstacle edge closer than {} to the ground", self.obstacle_margin),
            ));
        }
        if self.gap_max_allowed <= self.gap_max_y {
            return Err(invalid("gap_max_allowed", "must lie below gap_max_y"));
        }

        Ok(())
    }
}
