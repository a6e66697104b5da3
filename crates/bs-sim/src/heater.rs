//! Heater element with first-order lag.
//!
//! The switched element does not deliver full power the instant it is
//! turned on. Its effective output fraction `f` charges toward 1 with time
//! constant `dead_time` when on and discharges proportionally when off:
//!
//! - on:  `f += dt / dead_time`, clamped at 1
//! - off: `f -= f * dt / dead_time * decay_multiplier`, clamped at 0
//!
//! `decay_multiplier` is a calibration constant.

use crate::error::{SimResult, require_non_negative, require_positive};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HeaterConfig {
    pub rated_power_w: f64,
    /// Lag time constant in seconds, must be positive.
    pub dead_time_s: f64,
    pub decay_multiplier: f64,
}

impl Default for HeaterConfig {
    fn default() -> Self {
        Self {
            rated_power_w: 1000.0,
            dead_time_s: 5.0,
            decay_multiplier: 0.5,
        }
    }
}

#[derive(Debug, Clone)]
pub struct HeaterActuator {
    config: HeaterConfig,
    /// Effective output fraction in [0, 1].
    fraction: f64,
}

impl HeaterActuator {
    /// # Errors
    ///
    /// Returns a numeric domain error if `dead_time_s` is not positive or the
    /// power or decay multiplier is negative.
    pub fn new(config: HeaterConfig) -> SimResult<Self> {
        require_non_negative(config.rated_power_w, "heater rated power")?;
        require_positive(config.dead_time_s, "heater dead time")?;
        require_non_negative(config.decay_multiplier, "heater decay multiplier")?;
        Ok(Self {
            config,
            fraction: 0.0,
        })
    }

    pub fn fraction(&self) -> f64 {
        self.fraction
    }

    pub fn rated_power(&self) -> f64 {
        self.config.rated_power_w
    }

    /// Advance the lag by `dt` with the element switched `on`.
    pub fn step(&mut self, on: bool, dt: f64) -> f64 {
        let rate = dt / self.config.dead_time_s;
        let next = if on {
            self.fraction + rate
        } else {
            self.fraction - self.fraction * rate * self.config.decay_multiplier
        };
        self.fraction = next.clamp(0.0, 1.0);
        self.fraction
    }

    /// Heat delivered over `dt` at the current fraction, in joules.
    pub fn heat(&self, dt: f64) -> f64 {
        self.config.rated_power_w * dt * self.fraction
    }

    pub fn reset(&mut self) {
        self.fraction = 0.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn charges_linearly_and_saturates() {
        let mut heater = HeaterActuator::new(HeaterConfig::default()).unwrap();
        assert!((heater.step(true, 0.1) - 0.02).abs() < 1e-12);
        for _ in 0..100 {
            heater.step(true, 0.1);
        }
        assert_eq!(heater.fraction(), 1.0);
        assert!((heater.heat(0.1) - 100.0).abs() < 1e-12);
    }

    #[test]
    fn decays_proportionally_when_off() {
        let mut heater = HeaterActuator::new(HeaterConfig::default()).unwrap();
        for _ in 0..50 {
            heater.step(true, 0.1);
        }
        // 1.0 - 1.0 * 0.02 * 0.5
        assert!((heater.step(false, 0.1) - 0.99).abs() < 1e-12);
    }

    #[test]
    fn large_decay_step_clamps_at_zero() {
        let mut heater = HeaterActuator::new(HeaterConfig {
            dead_time_s: 0.1,
            decay_multiplier: 5.0,
            ..HeaterConfig::default()
        })
        .unwrap();
        heater.step(true, 0.05);
        assert_eq!(heater.step(false, 0.1), 0.0);
    }

    #[test]
    fn invalid_parameters() {
        let zero_dead = HeaterConfig {
            dead_time_s: 0.0,
            ..HeaterConfig::default()
        };
        assert!(HeaterActuator::new(zero_dead).is_err());
        let negative_power = HeaterConfig {
            rated_power_w: -1.0,
            ..HeaterConfig::default()
        };
        assert!(HeaterActuator::new(negative_power).is_err());
    }
}
