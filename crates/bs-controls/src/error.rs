//! Error types for control operations.

use bs_core::CoreError;
use thiserror::Error;

/// Result type for control operations.
pub type ControlResult<T> = Result<T, ControlError>;

/// Errors raised while configuring a controller.
///
/// All of these are configuration errors: they are reported when a controller
/// is built, never from inside an update.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ControlError {
    /// Invalid argument provided to a control function.
    #[error("Invalid argument: {what}")]
    InvalidArg { what: &'static str },

    /// Output or hysteresis bounds in the wrong order.
    #[error("Invalid bounds for {what}: min {min} > max {max}")]
    InvalidBounds {
        what: &'static str,
        min: f64,
        max: f64,
    },

    /// Controller variant tag that names no known term law.
    #[error("Unknown PID variant: {tag:?}")]
    UnknownVariant { tag: String },

    #[error(transparent)]
    Core(#[from] CoreError),
}
