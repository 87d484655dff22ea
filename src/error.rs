//! Simulation errors
//!
//! The core is a closed simulation, so the only failures are contract
//! violations by the caller. Collisions and pool overflow are gameplay, not
//! errors.

use std::error::Error;
use std::fmt;

use crate::config::ConfigError;

/// Errors returned by [`crate::sim::GameStateMachine`]
#[derive(Debug)]
pub enum SimError {
    /// `tick` was called with a zero, negative or non-finite delta.
    /// No state was mutated.
    InvalidDt(f32),
    /// The machine was built from an invalid configuration.
    Config(ConfigError),
}

impl fmt::Display for SimError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidDt(dt) => write!(f, "tick dt must be positive and finite, got {dt}"),
            Self::Config(e) => write!(f, "invalid configuration: {e}"),
        }
    }
}

impl Error for SimError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Config(e) => Some(e),
            Self::InvalidDt(_) => None,
        }
    }
}

impl From<ConfigError> for SimError {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}
