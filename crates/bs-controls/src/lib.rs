//! Heater control primitives for boilersim.
//!
//! This crate holds the digital side of the boiler loop: the sampled PID
//! controller that produces a duty-cycle command, the PWM quantizer that turns
//! that command into a per-sub-step on/off decision, and a hysteresis
//! thermostat used as a reference law.
//!
//! # Architecture
//!
//! - Controllers run in sampled mode: between samples the output is held
//!   constant (zero-order hold)
//! - PID computation variants are a closed set of term laws, resolved once
//!   when the controller is built
//! - The quantizer is a pure function of duty and phase within the period

pub mod error;
pub mod pid;
pub mod pwm;
pub mod sampled;
pub mod thermostat;

pub use error::{ControlError, ControlResult};
pub use pid::{
    AsymmetricMeasurement, ErrorState, Gains, IdleCap, IncrementalError, MeasurementDerivative,
    OutputOverride, PidConfig, PidController, PidLaw, PidTerms, PidVariant, TermLaw, Terms,
};
pub use pwm::{PwmPattern, PwmQuantizer, PwmState};
pub use sampled::SampleClock;
pub use thermostat::{Thermostat, ThermostatConfig};
