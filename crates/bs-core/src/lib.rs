//! bs-core: shared foundation for boilersim.
//!
//! Contains:
//! - numeric (Real + tolerances + float helpers + step ratio checks)
//! - error (shared error types)

pub mod error;
pub mod numeric;

pub use error::{CoreError, CoreResult};
pub use numeric::*;
