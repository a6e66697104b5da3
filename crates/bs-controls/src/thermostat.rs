//! Hysteresis on/off heater control.
//!
//! Heater switches on below `low`, off above `high`, and keeps its previous
//! state in between.

use crate::error::{ControlError, ControlResult};
use bs_core::ensure_finite;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ThermostatConfig {
    pub low: f64,
    pub high: f64,
}

impl Default for ThermostatConfig {
    fn default() -> Self {
        Self {
            low: 90.0,
            high: 105.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Thermostat {
    config: ThermostatConfig,
    on: bool,
}

impl Thermostat {
    pub fn new(config: ThermostatConfig) -> ControlResult<Self> {
        ensure_finite(config.low, "thermostat low")?;
        ensure_finite(config.high, "thermostat high")?;
        if config.low > config.high {
            return Err(ControlError::InvalidBounds {
                what: "thermostat hysteresis",
                min: config.low,
                max: config.high,
            });
        }
        Ok(Self { config, on: false })
    }

    pub fn update(&mut self, measured: f64) -> bool {
        if measured > self.config.high {
            self.on = false;
        } else if measured < self.config.low {
            self.on = true;
        }
        self.on
    }

    pub fn reset(&mut self) {
        self.on = false;
    }
}
