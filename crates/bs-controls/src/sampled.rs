//! Sample timing for digital controllers.
//!
//! Controllers operate in sampled/digital mode with a fixed update period.
//! Between samples, controller outputs are held constant (zero-order hold).

use serde::{Deserialize, Serialize};

/// Relative slack on the period comparison. Simulation time is built from
/// `k * dt`, so `7.000000000000001 + 1.0` must still count as reached at `8.0`.
const PERIOD_REL_TOL: f64 = 1e-9;

/// Sample clock tracks when a controller should execute.
///
/// A sample is due once `period` has elapsed since the last executed sample.
/// The clock starts one period in the past so the first query always samples.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SampleClock {
    /// Sample period in seconds.
    pub period: f64,
    /// Time of the last executed sample.
    pub last_sample: f64,
}

impl SampleClock {
    /// Create a new sample clock. `period` must be positive; callers validate.
    pub fn new(period: f64) -> Self {
        Self {
            period,
            last_sample: -period,
        }
    }

    /// Check if a sample should occur at the given time.
    pub fn should_sample(&self, current_time: f64) -> bool {
        current_time - self.last_sample >= self.period * (1.0 - PERIOD_REL_TOL)
    }

    /// Record that a sample was executed at `current_time`.
    pub fn mark(&mut self, current_time: f64) {
        self.last_sample = current_time;
    }

    /// Forget all executed samples.
    pub fn reset(&mut self) {
        self.last_sample = -self.period;
    }
}
