//! Boiler temperature simulation.
//!
//! Provides:
//! - Lumped thermal plant with empirical ambient loss
//! - Heater element lag model
//! - Fixed-step engine closing the PID/PWM loop, with a shot disturbance
//! - Injectable sensor noise
//! - Gain sweep with a shared trial cache

pub mod boiler;
pub mod cache;
pub mod config;
pub mod engine;
pub mod error;
pub mod heater;
pub mod noise;
pub mod record;
pub mod shot;
pub mod sweep;

pub use boiler::{PlantConfig, ThermalPlant, WATER_SPECIFIC_HEAT};
pub use cache::{TrialCache, TrialKey, scope_fingerprint};
pub use config::{ControlMode, RunOptions, RunPlan, Scenario, SimConfig};
pub use engine::Engine;
pub use error::{ErrorKind, SimError, SimResult};
pub use heater::{HeaterActuator, HeaterConfig};
pub use noise::{ConstantOffset, MeasurementNoise, NoNoise, NoiseConfig, UniformJitter};
pub use record::{RunRecord, ScoreWindow, StepRecord};
pub use shot::{Phase, ShotProfile, ShotWindow};
pub use sweep::{
    SweepGrid, SweepOptions, SweepReport, SweepSummary, TrialResult, TrialScore, run_sweep,
    score_trial,
};
