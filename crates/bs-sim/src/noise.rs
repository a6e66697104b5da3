//! Injectable measurement noise.
//!
//! The simulated sensor reads the plant temperature plus a sample from a
//! [`MeasurementNoise`] source. Sources are reset at the start of each run so
//! repeated runs see the same sequence.

use std::fmt;

use crate::error::{SimResult, require_non_negative};
use rand::{Rng, SeedableRng, rngs::StdRng};
use serde::{Deserialize, Serialize};

pub trait MeasurementNoise: Send + fmt::Debug {
    /// Offset to add to the next temperature reading.
    fn sample(&mut self) -> f64;

    /// Rewind to the start of the sequence.
    fn reset(&mut self) {}
}

/// Perfect sensor.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoNoise;

impl MeasurementNoise for NoNoise {
    fn sample(&mut self) -> f64 {
        0.0
    }
}

/// Fixed calibration offset.
#[derive(Debug, Clone, Copy)]
pub struct ConstantOffset(pub f64);

impl MeasurementNoise for ConstantOffset {
    fn sample(&mut self) -> f64 {
        self.0
    }
}

/// Uniform jitter in `[-amplitude, amplitude]` from a seeded generator.
#[derive(Debug, Clone)]
pub struct UniformJitter {
    amplitude: f64,
    seed: u64,
    rng: StdRng,
}

impl UniformJitter {
    pub fn new(amplitude: f64, seed: u64) -> SimResult<Self> {
        require_non_negative(amplitude, "noise amplitude")?;
        Ok(Self {
            amplitude,
            seed,
            rng: StdRng::seed_from_u64(seed),
        })
    }
}

impl MeasurementNoise for UniformJitter {
    fn sample(&mut self) -> f64 {
        if self.amplitude == 0.0 {
            return 0.0;
        }
        self.rng.random_range(-self.amplitude..=self.amplitude)
    }

    fn reset(&mut self) {
        self.rng = StdRng::seed_from_u64(self.seed);
    }
}

/// Scenario-file description of the sensor jitter.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NoiseConfig {
    pub amplitude_c: f64,
    #[serde(default)]
    pub seed: u64,
}

impl NoiseConfig {
    pub fn build(&self) -> SimResult<Box<dyn MeasurementNoise>> {
        Ok(Box::new(UniformJitter::new(self.amplitude_c, self.seed)?))
    }
}
