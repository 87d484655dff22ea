//! Fixed-step clock
//!
//! Turns variable frame deltas into a whole number of fixed simulation steps.
//! The unconsumed remainder carries over to the next frame, so the same total
//! elapsed time always yields the same number of steps.

use serde::{Deserialize, Serialize};

/// Slack when comparing accumulated time against one step, so that e.g. 90
/// frames of 1/60 s release exactly 180 steps of 1/120 s.
const STEP_EPSILON: f64 = 1e-9;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Clock {
    step_dt: f64,
    max_frame_dt: f64,
    accumulator: f64,
    /// Total fixed steps released since construction
    steps: u64,
    /// Total frame time fed in (after clamping)
    elapsed: f64,
}

impl Clock {
    pub fn new(sim_hz: u32, max_frame_dt: f32) -> Self {
        Self {
            step_dt: 1.0 / sim_hz as f64,
            max_frame_dt: max_frame_dt as f64,
            accumulator: 0.0,
            steps: 0,
            elapsed: 0.0,
        }
    }

    /// Length of one fixed step in seconds
    #[inline]
    pub fn step_dt(&self) -> f32 {
        self.step_dt as f32
    }

    /// Accumulate a frame delta and return how many fixed steps are due.
    ///
    /// `dt` must already be validated as positive and finite.
    pub fn advance(&mut self, dt: f32) -> u32 {
        let mut dt = dt as f64;
        if dt > self.max_frame_dt {
            log::debug!("Frame dt {:.3}s clamped to {:.3}s", dt, self.max_frame_dt);
            dt = self.max_frame_dt;
        }
        self.elapsed += dt;
        self.accumulator += dt;

        let mut due = 0;
        while self.accumulator + STEP_EPSILON >= self.step_dt {
            self.accumulator -= self.step_dt;
            due += 1;
        }
        if self.accumulator < 0.0 {
            self.accumulator = 0.0;
        }
        self.steps += due as u64;
        due
    }

    #[inline]
    pub fn steps(&self) -> u64 {
        self.steps
    }

    #[inline]
    pub fn elapsed(&self) -> f64 {
        self.elapsed
    }

    /// Fraction of a step waiting in the accumulator (0..1), for interpolation
    #[inline]
    pub fn alpha(&self) -> f32 {
        (self.accumulator / self.step_dt) as f32
    }
}
