use crate::{CoreError, CoreResult};

/// Floating point type used throughout system
pub type Real = f64;

/// One tolerance for everything
#[derive(Clone, Copy, Debug)]
pub struct Tolerances {
    pub abs: Real,
    pub rel: Real,
}

impl Default for Tolerances {
    fn default() -> Self {
        Self {
            abs: 1e-12,
            rel: 1e-9,
        }
    }
}

pub fn nearly_equal(a: Real, b: Real, tol: Tolerances) -> bool {
    let diff = (a - b).abs();
    if diff <= tol.abs {
        return true;
    }
    diff <= tol.rel * a.abs().max(b.abs())
}

pub fn ensure_finite(v: Real, what: &'static str) -> CoreResult<Real> {
    if v.is_finite() {
        Ok(v)
    } else {
        Err(CoreError::NonFinite { what, value: v })
    }
}

/// Number of whole `step`s in `span`.
///
/// Fails unless `span / step` is a positive integer within the default
/// tolerance, so `600.0 / 0.1` is accepted while `1.0 / 0.3` is not.
pub fn exact_steps(span: Real, step: Real, what: &'static str) -> CoreResult<usize> {
    ensure_finite(span, what)?;
    ensure_finite(step, what)?;
    if step <= 0.0 {
        return Err(CoreError::InvalidArg {
            what: "step size must be positive",
        });
    }
    let ratio = span / step;
    let rounded = ratio.round();
    if rounded < 1.0 || !nearly_equal(ratio, rounded, Tolerances::default()) {
        return Err(CoreError::NonIntegerRatio { what, ratio });
    }
    Ok(rounded as usize)
}
