//! Error types for simulation operations.

use bs_controls::ControlError;
use bs_core::CoreError;
use thiserror::Error;

/// Broad classification of a [`SimError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Rejected configuration: bad ratios, bounds or variant tags.
    Configuration,
    /// A physical parameter outside its domain (zero capacity, zero dead time).
    NumericDomain,
    /// Reading or writing scenario and record files.
    Io,
}

/// Errors encountered while building or running a simulation.
///
/// None of these are raised from inside the step loop: everything is checked
/// before the first step.
#[derive(Error, Debug)]
pub enum SimError {
    #[error("Invalid argument: {what}")]
    InvalidArg { what: &'static str },

    #[error("Non-physical parameter {what}: {value}")]
    NumericDomain { what: &'static str, value: f64 },

    #[error(transparent)]
    Control(#[from] ControlError),

    #[error(transparent)]
    Core(#[from] CoreError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type SimResult<T> = Result<T, SimError>;

impl SimError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            SimError::NumericDomain { .. } => ErrorKind::NumericDomain,
            SimError::Core(CoreError::NonFinite { .. })
            | SimError::Control(ControlError::Core(CoreError::NonFinite { .. })) => {
                ErrorKind::NumericDomain
            }
            SimError::Io(_) | SimError::Json(_) => ErrorKind::Io,
            SimError::InvalidArg { .. }
            | SimError::Control(_)
            | SimError::Core(_)
            | SimError::Yaml(_) => ErrorKind::Configuration,
        }
    }
}

/// Reject non-finite or non-positive physical parameters.
pub(crate) fn require_positive(value: f64, what: &'static str) -> SimResult<f64> {
    if !value.is_finite() || value <= 0.0 {
        return Err(SimError::NumericDomain { what, value });
    }
    Ok(value)
}

/// Reject non-finite or negative physical parameters.
pub(crate) fn require_non_negative(value: f64, what: &'static str) -> SimResult<f64> {
    if !value.is_finite() || value < 0.0 {
        return Err(SimError::NumericDomain { what, value });
    }
    Ok(value)
}
