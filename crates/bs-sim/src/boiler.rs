//! Lumped thermal model of the boiler.
//!
//! One well-mixed water volume. Heat input raises the temperature by
//! `Q / C`; ambient loss follows an empirical law
//! `dT = -r * (T^n - T_amb^n) * T * dt` whose exponent depends on the unit
//! being calibrated. Temperature is not clamped at ambient.

use crate::error::{SimResult, require_non_negative, require_positive};
use bs_core::ensure_finite;
use serde::{Deserialize, Serialize};

/// Specific heat of water in J/(kg K); one liter is taken as one kilogram.
pub const WATER_SPECIFIC_HEAT: f64 = 4182.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlantConfig {
    /// Water volume in liters.
    pub volume_l: f64,
    pub initial_temp_c: f64,
    pub ambient_temp_c: f64,
    /// Loss coefficient `r`.
    pub loss_coefficient: f64,
    /// Loss exponent `n`.
    pub loss_exponent: f64,
}

impl Default for PlantConfig {
    fn default() -> Self {
        Self {
            volume_l: 0.3,
            initial_temp_c: 30.0,
            ambient_temp_c: 23.0,
            loss_coefficient: 8.0e-12,
            loss_exponent: 4.0,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ThermalPlant {
    config: PlantConfig,
    /// Heat capacity in J/K.
    capacity: f64,
    temperature: f64,
}

impl ThermalPlant {
    pub fn new(config: PlantConfig) -> SimResult<Self> {
        let volume = require_positive(config.volume_l, "boiler volume")?;
        let capacity = require_positive(WATER_SPECIFIC_HEAT * volume, "thermal capacity")?;
        ensure_finite(config.initial_temp_c, "initial temperature")?;
        ensure_finite(config.ambient_temp_c, "ambient temperature")?;
        require_non_negative(config.loss_coefficient, "loss coefficient")?;
        ensure_finite(config.loss_exponent, "loss exponent")?;
        Ok(Self {
            temperature: config.initial_temp_c,
            capacity,
            config,
        })
    }

    pub fn temperature(&self) -> f64 {
        self.temperature
    }

    pub fn capacity(&self) -> f64 {
        self.capacity
    }

    pub fn ambient(&self) -> f64 {
        self.config.ambient_temp_c
    }

    /// Add `q_joules` of heat.
    pub fn apply_heat(&mut self, q_joules: f64) {
        self.temperature += q_joules / self.capacity;
    }

    /// Apply ambient loss over `dt` seconds.
    pub fn apply_loss(&mut self, dt: f64) {
        let n = self.config.loss_exponent;
        let t = self.temperature;
        let ambient = self.config.ambient_temp_c;
        self.temperature += -self.config.loss_coefficient * (t.powf(n) - ambient.powf(n)) * t * dt;
    }

    /// Remove `delta` degrees, e.g. fresh water replacing an extracted shot.
    pub fn apply_draw(&mut self, delta: f64) {
        self.temperature -= delta;
    }

    /// Heat then loss for one step. Returns the new temperature.
    pub fn integrate(&mut self, q_joules: f64, dt: f64) -> f64 {
        self.apply_heat(q_joules);
        self.apply_loss(dt);
        self.temperature
    }

    pub fn reset(&mut self) {
        self.temperature = self.config.initial_temp_c;
    }
}
