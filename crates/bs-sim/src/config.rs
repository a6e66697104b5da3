//! Simulation configuration and scenario files.
//!
//! Everything the engine needs is carried in [`SimConfig`] (the machine) and
//! [`RunOptions`] (one run). Both deserialize from YAML with defaults for
//! every omitted field.

use std::path::Path;

use crate::boiler::PlantConfig;
use crate::error::{SimError, SimResult};
use crate::heater::HeaterConfig;
use crate::noise::NoiseConfig;
use crate::shot::{ShotProfile, ShotWindow};
use bs_controls::{PidConfig, PwmPattern, ThermostatConfig};
use bs_core::{ensure_finite, exact_steps};
use serde::{Deserialize, Serialize};

/// Law deciding the heater switch each step.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum ControlMode {
    /// PID duty command quantized by PWM.
    #[default]
    Pid,
    /// Hysteresis on/off.
    Thermostat(ThermostatConfig),
    /// Open loop: heater on for `on_from_s <= t < on_until_s`.
    StepTest { on_from_s: f64, on_until_s: f64 },
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    pub plant: PlantConfig,
    pub heater: HeaterConfig,
    pub controller: PidConfig,
    pub pwm: PwmPattern,
    pub mode: ControlMode,
    pub shot: ShotProfile,
    pub noise: Option<NoiseConfig>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunOptions {
    pub duration_s: f64,
    pub step_s: f64,
    pub target_c: f64,
    pub shot: Option<ShotWindow>,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            duration_s: 600.0,
            step_s: 0.1,
            target_c: 100.0,
            shot: None,
        }
    }
}

/// Step counts derived from validated [`RunOptions`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunPlan {
    pub steps: usize,
    pub substeps_per_period: usize,
}

impl RunOptions {
    pub fn with_shot(mut self, start_s: f64, end_s: f64) -> Self {
        self.shot = Some(ShotWindow::new(start_s, end_s));
        self
    }

    /// Check step ratios and bounds against the controller period `ts`.
    pub fn plan(&self, ts: f64) -> SimResult<RunPlan> {
        let steps = exact_steps(self.duration_s, self.step_s, "duration / step size")?;
        let substeps_per_period = exact_steps(ts, self.step_s, "control period / step size")?;
        ensure_finite(self.target_c, "target temperature")?;
        if let Some(window) = &self.shot {
            window.validate()?;
        }
        Ok(RunPlan {
            steps,
            substeps_per_period,
        })
    }
}

/// Scenario file: a machine plus one run.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Scenario {
    pub config: SimConfig,
    pub run: RunOptions,
}

impl Scenario {
    pub fn from_yaml_str(content: &str) -> SimResult<Self> {
        Ok(serde_yaml::from_str(content)?)
    }

    pub fn from_yaml_file(path: &Path) -> SimResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&content)
    }

    pub fn to_yaml_string(&self) -> SimResult<String> {
        Ok(serde_yaml::to_string(self)?)
    }
}

impl SimConfig {
    /// Checks that do not need a component instance.
    pub fn validate(&self) -> SimResult<()> {
        self.controller.validate()?;
        self.shot.validate()?;
        if let ControlMode::StepTest {
            on_from_s,
            on_until_s,
        } = self.mode
        {
            ensure_finite(on_from_s, "step test start")?;
            ensure_finite(on_until_s, "step test end")?;
            if on_from_s > on_until_s {
                return Err(SimError::InvalidArg {
                    what: "step test start must not be after its end",
                });
            }
        }
        Ok(())
    }
}
