//! Duty-cycle quantization for slow PWM heater control.
//!
//! A control period is split into `control_period / step` sub-steps and the
//! duty command decides how many of them switch the heater on. The quantizer
//! does not clamp the duty; callers pass an already saturated command.

use serde::{Deserialize, Serialize};

/// Heater switch decision for one sub-step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PwmState {
    On,
    Off,
}

impl PwmState {
    pub fn is_on(self) -> bool {
        self == PwmState::On
    }
}

impl From<bool> for PwmState {
    fn from(on: bool) -> Self {
        if on { PwmState::On } else { PwmState::Off }
    }
}

/// Placement of the on sub-steps inside a period.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PwmPattern {
    /// All on sub-steps at the start of the period.
    #[default]
    LeadingEdge,
    /// On sub-steps spread as evenly as possible over the period.
    Distributed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PwmQuantizer {
    pub pattern: PwmPattern,
}

impl PwmQuantizer {
    pub fn new(pattern: PwmPattern) -> Self {
        Self { pattern }
    }

    /// Number of on sub-steps for `duty_percent`: `floor(total * duty / 100)`.
    pub fn on_substeps(duty_percent: f64, total: usize) -> usize {
        if duty_percent == 0.0 {
            return 0;
        }
        // Negative duty saturates to zero on the cast.
        (total as f64 * duty_percent / 100.0).floor() as usize
    }

    /// Decision for sub-step `index` of a period with `total` sub-steps.
    pub fn decide_substep(&self, duty_percent: f64, total: usize, index: usize) -> PwmState {
        let on = Self::on_substeps(duty_percent, total);
        if on == 0 || total == 0 {
            return PwmState::Off;
        }
        let index = index % total;
        match self.pattern {
            PwmPattern::LeadingEdge => PwmState::from(index < on),
            PwmPattern::Distributed => {
                PwmState::from((index + 1) * on / total > index * on / total)
            }
        }
    }

    /// Time-based entry point: `elapsed_in_period` is the time since the start
    /// of the current control period.
    pub fn decide(
        &self,
        duty_percent: f64,
        control_period: f64,
        step_size: f64,
        elapsed_in_period: f64,
    ) -> PwmState {
        let total = (control_period / step_size).round() as usize;
        let index = (elapsed_in_period / step_size).round() as usize;
        self.decide_substep(duty_percent, total, index)
    }
}
