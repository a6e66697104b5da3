//! Shot disturbance: window, phases and temperature draw.
//!
//! A shot extracts hot water and refills with cold, which the plant sees as a
//! steady temperature draw. After the shot a shorter flush keeps drawing at a
//! lower rate while the boiler is still above target.

use crate::error::{SimError, SimResult, require_non_negative};
use bs_controls::{Gains, OutputOverride};
use bs_core::ensure_finite;
use serde::{Deserialize, Serialize};

/// Shot interval `[start_s, end_s)` in simulation time.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ShotWindow {
    pub start_s: f64,
    pub end_s: f64,
}

impl ShotWindow {
    pub fn new(start_s: f64, end_s: f64) -> Self {
        Self { start_s, end_s }
    }

    pub fn validate(&self) -> SimResult<()> {
        ensure_finite(self.start_s, "shot start")?;
        ensure_finite(self.end_s, "shot end")?;
        if self.start_s > self.end_s {
            return Err(SimError::InvalidArg {
                what: "shot start must not be after shot end",
            });
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Phase {
    Idle,
    Shot,
    PostShot,
    Recovered,
}

impl Phase {
    pub fn at(t: f64, window: Option<&ShotWindow>, flush_window_s: f64) -> Phase {
        let Some(w) = window else {
            return Phase::Idle;
        };
        if t < w.start_s {
            Phase::Idle
        } else if t < w.end_s {
            Phase::Shot
        } else if t < w.end_s + flush_window_s {
            Phase::PostShot
        } else {
            Phase::Recovered
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShotProfile {
    /// Temperature draw during the shot, degrees per second.
    pub draw_rate_c_per_s: f64,
    /// Length of the flush after the shot, seconds.
    pub flush_window_s: f64,
    /// Draw during the flush while above target, degrees per second.
    pub flush_rate_c_per_s: f64,
    /// Gains used while the shot runs; restored once recovered.
    pub gains: Option<Gains>,
    /// Output forced at shot start, as the machine does when the pump starts.
    pub start_override: Option<OutputOverride>,
}

impl Default for ShotProfile {
    fn default() -> Self {
        Self {
            draw_rate_c_per_s: 0.4,
            flush_window_s: 30.0,
            flush_rate_c_per_s: 0.15,
            gains: None,
            start_override: None,
        }
    }
}

impl ShotProfile {
    pub fn validate(&self) -> SimResult<()> {
        require_non_negative(self.draw_rate_c_per_s, "shot draw rate")?;
        require_non_negative(self.flush_window_s, "flush window")?;
        require_non_negative(self.flush_rate_c_per_s, "flush draw rate")?;
        if let Some(g) = &self.gains {
            ensure_finite(g.kp, "shot kp")?;
            ensure_finite(g.ki, "shot ki")?;
            ensure_finite(g.kd, "shot kd")?;
        }
        if let Some(ov) = &self.start_override {
            ensure_finite(ov.value, "shot start override")?;
        }
        Ok(())
    }

    /// Temperature to remove this step.
    pub fn draw(&self, phase: Phase, temperature: f64, target: f64, dt: f64) -> f64 {
        match phase {
            Phase::Shot => self.draw_rate_c_per_s * dt,
            Phase::PostShot if temperature > target => self.flush_rate_c_per_s * dt,
            _ => 0.0,
        }
    }
}
