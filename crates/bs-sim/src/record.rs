//! Per-step trajectory record.

use std::io::Write;

use crate::error::{SimError, SimResult};
use crate::shot::Phase;
use bs_core::ensure_finite;
use serde::{Deserialize, Serialize};

/// One simulation step.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StepRecord {
    pub time_s: f64,
    /// Plant temperature after the step.
    pub temperature_c: f64,
    pub heater_on: bool,
    pub heater_fraction: f64,
    /// Duty command in effect, percent.
    pub duty: f64,
    pub p_term: f64,
    pub i_term: f64,
    pub d_term: f64,
    /// PID output before saturation.
    pub pid_output: f64,
    pub phase: Phase,
}

/// Half-open time range `[start_s, end_s)` used for scoring.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoreWindow {
    pub start_s: f64,
    pub end_s: f64,
}

impl ScoreWindow {
    pub fn new(start_s: f64, end_s: f64) -> Self {
        Self { start_s, end_s }
    }

    pub fn validate(&self) -> SimResult<()> {
        ensure_finite(self.start_s, "score window start")?;
        ensure_finite(self.end_s, "score window end")?;
        if self.start_s >= self.end_s {
            return Err(SimError::InvalidArg {
                what: "score window must have positive length",
            });
        }
        Ok(())
    }

    pub fn contains(&self, t: f64) -> bool {
        t >= self.start_s && t < self.end_s
    }
}

/// Trajectory of one run, sized for the whole run up front.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunRecord {
    pub target_c: f64,
    pub step_s: f64,
    steps: Vec<StepRecord>,
}

impl RunRecord {
    pub fn with_capacity(steps: usize, target_c: f64, step_s: f64) -> Self {
        Self {
            target_c,
            step_s,
            steps: Vec::with_capacity(steps),
        }
    }

    pub(crate) fn push(&mut self, step: StepRecord) {
        self.steps.push(step);
    }

    pub fn steps(&self) -> &[StepRecord] {
        &self.steps
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn last(&self) -> Option<&StepRecord> {
        self.steps.last()
    }

    pub fn temperatures(&self) -> Vec<f64> {
        self.steps.iter().map(|s| s.temperature_c).collect()
    }

    pub fn max_temperature(&self) -> f64 {
        self.steps
            .iter()
            .map(|s| s.temperature_c)
            .fold(f64::NEG_INFINITY, f64::max)
    }

    /// Sum of squared deviation from target over the samples inside `window`.
    pub fn squared_error(&self, window: &ScoreWindow) -> f64 {
        self.steps
            .iter()
            .filter(|s| window.contains(s.time_s))
            .map(|s| (s.temperature_c - self.target_c).powi(2))
            .sum()
    }

    /// Dump one JSON object per step.
    pub fn write_jsonl<W: Write>(&self, mut writer: W) -> SimResult<()> {
        for step in &self.steps {
            serde_json::to_writer(&mut writer, step)?;
            writer.write_all(b"\n")?;
        }
        writer.flush()?;
        Ok(())
    }
}
