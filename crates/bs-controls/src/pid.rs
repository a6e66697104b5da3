//! Sampled PID controller for the boiler heater.
//!
//! The controller works in velocity (incremental) form: every sample adds the
//! P, I and D increments to the previous output, rounds to a whole percent and
//! saturates. Because the stored previous output is the saturated one, the
//! integral cannot wind up past the bounds.
//!
//! Three term laws are available:
//! - **incremental-error-form**: textbook discrete PID on the error signal
//! - **measurement-derivative-form**: P and D act on the measurement, with a
//!   steep large-error regime for recovery after a disturbance
//! - **asymmetric-measurement-form**: P on the measurement with separate gains
//!   for falling and rising temperature

use std::fmt;
use std::str::FromStr;

use crate::error::{ControlError, ControlResult};
use crate::sampled::SampleClock;
use bs_core::ensure_finite;
use serde::{Deserialize, Serialize};

/// Error band (degrees) separating the two regimes of the measurement form.
pub const DEFAULT_ERROR_BAND: f64 = 3.0;
/// Proportional gain of the measurement form outside the error band.
pub const DEFAULT_LARGE_ERROR_KP: f64 = 250.0;

/// Controller gains. May be swapped between updates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Gains {
    pub kp: f64,
    pub ki: f64,
    pub kd: f64,
}

impl Gains {
    pub fn new(kp: f64, ki: f64, kd: f64) -> Self {
        Self { kp, ki, kd }
    }

    fn validate(&self) -> ControlResult<()> {
        ensure_finite(self.kp, "kp")?;
        ensure_finite(self.ki, "ki")?;
        ensure_finite(self.kd, "kd")?;
        Ok(())
    }
}

impl Default for Gains {
    fn default() -> Self {
        Self {
            kp: 25.0,
            ki: 1.0,
            kd: 10.0,
        }
    }
}

/// Tag selecting the PID computation formula.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PidVariant {
    #[default]
    IncrementalErrorForm,
    MeasurementDerivativeForm,
    AsymmetricMeasurementForm,
}

impl PidVariant {
    pub const ALL: [PidVariant; 3] = [
        PidVariant::IncrementalErrorForm,
        PidVariant::MeasurementDerivativeForm,
        PidVariant::AsymmetricMeasurementForm,
    ];

    pub fn tag(self) -> &'static str {
        match self {
            PidVariant::IncrementalErrorForm => "incremental-error-form",
            PidVariant::MeasurementDerivativeForm => "measurement-derivative-form",
            PidVariant::AsymmetricMeasurementForm => "asymmetric-measurement-form",
        }
    }
}

impl fmt::Display for PidVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

impl FromStr for PidVariant {
    type Err = ControlError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PidVariant::ALL
            .into_iter()
            .find(|v| v.tag() == s)
            .ok_or_else(|| ControlError::UnknownVariant { tag: s.to_string() })
    }
}

/// Force the controller output to `value` for the next `cycles` samples.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OutputOverride {
    pub value: f64,
    pub cycles: u32,
}

/// Output cap while the boiler is idle and already above target.
///
/// When the measurement is at least `margin` above the setpoint the command
/// is limited to `max_output`, which keeps the lagging element from pushing
/// the idle boiler further past target.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IdleCap {
    pub margin: f64,
    pub max_output: f64,
}

impl Default for IdleCap {
    fn default() -> Self {
        Self {
            margin: 0.5,
            max_output: 5.0,
        }
    }
}

/// PID controller configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PidConfig {
    pub gains: Gains,
    /// Control period in seconds.
    pub ts: f64,
    /// Minimum output (percent duty).
    pub out_min: f64,
    /// Maximum output (percent duty).
    pub out_max: f64,
    pub variant: PidVariant,
    /// Measurement form: |e| below this uses the configured gains.
    pub error_band: f64,
    /// Measurement form: proportional gain outside the error band.
    pub large_error_kp: f64,
    /// Asymmetric form: proportional gain while the temperature is rising.
    /// Falls back to `gains.kp` when unset.
    pub kp_rising: Option<f64>,
    /// Saturate to `out_max` whenever the error exceeds this many degrees.
    pub boost_error: Option<f64>,
    /// Cap applied while no water is being drawn.
    pub idle_cap: Option<IdleCap>,
}

impl Default for PidConfig {
    fn default() -> Self {
        Self {
            gains: Gains::default(),
            ts: 1.0,
            out_min: 0.0,
            out_max: 100.0,
            variant: PidVariant::default(),
            error_band: DEFAULT_ERROR_BAND,
            large_error_kp: DEFAULT_LARGE_ERROR_KP,
            kp_rising: None,
            boost_error: None,
            idle_cap: None,
        }
    }
}

impl PidConfig {
    pub fn with_gains(mut self, gains: Gains) -> Self {
        self.gains = gains;
        self
    }

    pub fn with_variant(mut self, variant: PidVariant) -> Self {
        self.variant = variant;
        self
    }

    pub fn validate(&self) -> ControlResult<()> {
        self.gains.validate()?;
        ensure_finite(self.ts, "ts")?;
        if self.ts <= 0.0 {
            return Err(ControlError::InvalidArg {
                what: "ts must be positive",
            });
        }
        ensure_finite(self.out_min, "out_min")?;
        ensure_finite(self.out_max, "out_max")?;
        if self.out_min > self.out_max {
            return Err(ControlError::InvalidBounds {
                what: "controller output",
                min: self.out_min,
                max: self.out_max,
            });
        }
        ensure_finite(self.error_band, "error_band")?;
        if self.error_band < 0.0 {
            return Err(ControlError::InvalidArg {
                what: "error_band must be non-negative",
            });
        }
        ensure_finite(self.large_error_kp, "large_error_kp")?;
        if let Some(kp) = self.kp_rising {
            ensure_finite(kp, "kp_rising")?;
        }
        if let Some(threshold) = self.boost_error {
            ensure_finite(threshold, "boost_error")?;
        }
        if let Some(cap) = &self.idle_cap {
            ensure_finite(cap.margin, "idle cap margin")?;
            ensure_finite(cap.max_output, "idle cap output")?;
        }
        Ok(())
    }
}

/// Inputs of one term computation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ErrorState {
    pub setpoint: f64,
    pub measured: f64,
    /// Measurement of the previous sample.
    pub prev_1: f64,
    /// Measurement two samples back.
    pub prev_2: f64,
    pub ts: f64,
}

impl ErrorState {
    pub fn error(&self) -> f64 {
        self.setpoint - self.measured
    }

    /// Second difference of the measurement, `pv - 2 pv1 + pv2`.
    fn curvature(&self) -> f64 {
        self.measured - 2.0 * self.prev_1 + self.prev_2
    }
}

/// P, I and D increments of one sample.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Terms {
    pub p: f64,
    pub i: f64,
    pub d: f64,
}

/// A PID computation formula.
pub trait TermLaw {
    fn compute_terms(&self, gains: &Gains, state: &ErrorState) -> Terms;
}

/// Discrete PID on the error signal.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct IncrementalError;

impl TermLaw for IncrementalError {
    fn compute_terms(&self, gains: &Gains, state: &ErrorState) -> Terms {
        let e = state.error();
        let e1 = state.setpoint - state.prev_1;
        let e2 = state.setpoint - state.prev_2;
        Terms {
            p: gains.kp * (e - e1),
            i: gains.ki * state.ts * e,
            d: gains.kd * (e - 2.0 * e1 + e2) / state.ts,
        }
    }
}

/// P and D on the measurement, with a second regime for large errors.
///
/// Outside the error band the integral grows with `e * |e|`. The formula is
/// empirically tuned and kept exactly as calibrated.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MeasurementDerivative {
    pub error_band: f64,
    pub large_error_kp: f64,
}

impl Default for MeasurementDerivative {
    fn default() -> Self {
        Self {
            error_band: DEFAULT_ERROR_BAND,
            large_error_kp: DEFAULT_LARGE_ERROR_KP,
        }
    }
}

impl TermLaw for MeasurementDerivative {
    fn compute_terms(&self, gains: &Gains, state: &ErrorState) -> Terms {
        let e = state.error();
        let slope = state.measured - state.prev_1;
        let (p, i) = if e.abs() < self.error_band {
            (-gains.kp * slope, gains.ki * state.ts * e)
        } else {
            (-self.large_error_kp * slope, state.ts * e * e.abs())
        };
        Terms {
            p,
            i,
            d: -gains.kd * state.curvature() / state.ts,
        }
    }
}

/// P on the measurement with a separate gain while the temperature rises.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct AsymmetricMeasurement {
    pub kp_rising: Option<f64>,
}

impl TermLaw for AsymmetricMeasurement {
    fn compute_terms(&self, gains: &Gains, state: &ErrorState) -> Terms {
        let drop = state.prev_1 - state.measured;
        let kp = if drop > 0.0 {
            gains.kp
        } else {
            self.kp_rising.unwrap_or(gains.kp)
        };
        Terms {
            p: kp * drop,
            i: gains.ki * state.ts * state.error(),
            d: -gains.kd * state.curvature() / state.ts,
        }
    }
}

/// Term law resolved from a [`PidVariant`] and its parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PidLaw {
    IncrementalError(IncrementalError),
    MeasurementDerivative(MeasurementDerivative),
    AsymmetricMeasurement(AsymmetricMeasurement),
}

impl PidLaw {
    pub fn resolve(config: &PidConfig) -> Self {
        match config.variant {
            PidVariant::IncrementalErrorForm => PidLaw::IncrementalError(IncrementalError),
            PidVariant::MeasurementDerivativeForm => {
                PidLaw::MeasurementDerivative(MeasurementDerivative {
                    error_band: config.error_band,
                    large_error_kp: config.large_error_kp,
                })
            }
            PidVariant::AsymmetricMeasurementForm => {
                PidLaw::AsymmetricMeasurement(AsymmetricMeasurement {
                    kp_rising: config.kp_rising,
                })
            }
        }
    }
}

impl TermLaw for PidLaw {
    fn compute_terms(&self, gains: &Gains, state: &ErrorState) -> Terms {
        match self {
            PidLaw::IncrementalError(law) => law.compute_terms(gains, state),
            PidLaw::MeasurementDerivative(law) => law.compute_terms(gains, state),
            PidLaw::AsymmetricMeasurement(law) => law.compute_terms(gains, state),
        }
    }
}

/// Term breakdown of the most recent executed sample.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PidTerms {
    pub p: f64,
    pub i: f64,
    pub d: f64,
    /// Rounded `u_prev + P + I + D` before boost, override and saturation.
    pub raw: f64,
    /// Saturated output.
    pub output: f64,
}

/// Sampled PID controller producing a duty-cycle percentage.
#[derive(Debug, Clone)]
pub struct PidController {
    config: PidConfig,
    gains: Gains,
    law: PidLaw,
    clock: SampleClock,
    /// `(pv1, pv2)`; `None` until the first sample.
    history: Option<(f64, f64)>,
    u_prev: f64,
    pending_override: Option<OutputOverride>,
    idle_cap_active: bool,
    terms: PidTerms,
}

impl PidController {
    /// Build a controller, rejecting invalid bounds or periods up front.
    pub fn new(config: PidConfig) -> ControlResult<Self> {
        config.validate()?;
        let u0 = 0.0_f64.clamp(config.out_min, config.out_max);
        Ok(Self {
            gains: config.gains,
            law: PidLaw::resolve(&config),
            clock: SampleClock::new(config.ts),
            history: None,
            u_prev: u0,
            pending_override: None,
            idle_cap_active: true,
            terms: PidTerms {
                output: u0,
                ..PidTerms::default()
            },
            config,
        })
    }

    pub fn config(&self) -> &PidConfig {
        &self.config
    }

    pub fn gains(&self) -> Gains {
        self.gains
    }

    /// Replace the gains. History and previous output are kept.
    pub fn set_gains(&mut self, gains: Gains) {
        self.gains = gains;
    }

    /// Replace the configured gains, which [`reset`](Self::reset) restores.
    pub fn set_base_gains(&mut self, gains: Gains) -> ControlResult<()> {
        gains.validate()?;
        self.config.gains = gains;
        self.gains = gains;
        Ok(())
    }

    /// Arm or disarm the configured [`IdleCap`]. Armed after construction
    /// and reset.
    pub fn set_idle_cap_active(&mut self, active: bool) {
        self.idle_cap_active = active;
    }

    pub fn idle_cap_active(&self) -> bool {
        self.idle_cap_active
    }

    /// Use `value` as output for the next `cycles` executed samples.
    pub fn override_output(&mut self, value: f64, cycles: u32) {
        self.pending_override = (cycles > 0).then_some(OutputOverride { value, cycles });
    }

    pub fn output(&self) -> f64 {
        self.u_prev
    }

    pub fn last_terms(&self) -> PidTerms {
        self.terms
    }

    /// Back to the freshly constructed state, including the configured gains.
    pub fn reset(&mut self) {
        let u0 = 0.0_f64.clamp(self.config.out_min, self.config.out_max);
        self.gains = self.config.gains;
        self.clock.reset();
        self.history = None;
        self.u_prev = u0;
        self.pending_override = None;
        self.idle_cap_active = true;
        self.terms = PidTerms {
            output: u0,
            ..PidTerms::default()
        };
    }

    /// Compute the duty command for `time`.
    ///
    /// Returns the held output unchanged if less than one control period has
    /// passed since the last executed sample.
    pub fn update(&mut self, time: f64, setpoint: f64, measured: f64) -> f64 {
        if !self.clock.should_sample(time) {
            return self.u_prev;
        }
        self.clock.mark(time);

        let (prev_1, prev_2) = self.history.unwrap_or((measured, measured));
        let state = ErrorState {
            setpoint,
            measured,
            prev_1,
            prev_2,
            ts: self.config.ts,
        };
        let terms = self.law.compute_terms(&self.gains, &state);
        let raw = (self.u_prev + terms.p + terms.i + terms.d).round();

        let mut commanded = raw;
        if let Some(threshold) = self.config.boost_error
            && state.error() > threshold
        {
            commanded = self.config.out_max;
        }
        if let Some(cap) = self.config.idle_cap
            && self.idle_cap_active
            && commanded > cap.max_output
            && measured >= setpoint + cap.margin
        {
            commanded = cap.max_output;
        }
        if let Some(ov) = self.pending_override.as_mut() {
            commanded = ov.value;
            ov.cycles -= 1;
            if ov.cycles == 0 {
                self.pending_override = None;
            }
        }

        let output = if commanded.is_nan() {
            self.u_prev
        } else {
            commanded.clamp(self.config.out_min, self.config.out_max)
        };

        self.history = Some((measured, prev_1));
        self.u_prev = output;
        self.terms = PidTerms {
            p: terms.p,
            i: terms.i,
            d: terms.d,
            raw,
            output,
        };
        output
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn controller(variant: PidVariant, gains: Gains) -> PidController {
        PidController::new(
            PidConfig::default()
                .with_variant(variant)
                .with_gains(gains),
        )
        .unwrap()
    }

    #[test]
    fn variant_tags_parse() {
        for v in PidVariant::ALL {
            assert_eq!(v.tag().parse::<PidVariant>().unwrap(), v);
        }
        let err = "B".parse::<PidVariant>().unwrap_err();
        assert_eq!(err, ControlError::UnknownVariant { tag: "B".into() });
    }

    #[test]
    fn invalid_controller_params() {
        let inverted = PidConfig {
            out_min: 100.0,
            out_max: 0.0,
            ..PidConfig::default()
        };
        assert!(matches!(
            PidController::new(inverted),
            Err(ControlError::InvalidBounds { .. })
        ));
        let no_period = PidConfig {
            ts: 0.0,
            ..PidConfig::default()
        };
        assert!(PidController::new(no_period).is_err());
        let nan_gain = PidConfig::default().with_gains(Gains::new(f64::NAN, 0.0, 0.0));
        assert!(PidController::new(nan_gain).is_err());
    }

    #[test]
    fn equal_bounds_are_accepted() {
        let pinned = PidConfig {
            out_min: 40.0,
            out_max: 40.0,
            ..PidConfig::default()
        };
        let mut pid = PidController::new(pinned).unwrap();
        assert_eq!(pid.update(0.0, 100.0, 20.0), 40.0);
    }

    #[test]
    fn first_sample_is_integral_only() {
        let mut pid = controller(
            PidVariant::IncrementalErrorForm,
            Gains::new(30.0, 0.7, 5.0),
        );
        // History primed with the first measurement: no P or D kick.
        let u = pid.update(0.0, 100.0, 80.0);
        let terms = pid.last_terms();
        assert_eq!(terms.p, 0.0);
        assert_eq!(terms.d, 0.0);
        assert!((terms.i - 14.0).abs() < 1e-12);
        assert_eq!(u, 14.0);
    }

    #[test]
    fn incremental_error_terms() {
        let mut pid = controller(
            PidVariant::IncrementalErrorForm,
            Gains::new(2.0, 0.5, 1.0),
        );
        pid.update(0.0, 100.0, 90.0);
        pid.update(1.0, 100.0, 92.0);
        pid.update(2.0, 100.0, 95.0);
        let t = pid.last_terms();
        // e = 5, e1 = 8, e2 = 10
        assert!((t.p - 2.0 * (5.0 - 8.0)).abs() < 1e-12);
        assert!((t.i - 0.5 * 5.0).abs() < 1e-12);
        assert!((t.d - (5.0 - 16.0 + 10.0)).abs() < 1e-12);
    }

    #[test]
    fn measurement_form_switches_regime_outside_band() {
        let law = MeasurementDerivative::default();
        let gains = Gains::new(10.0, 0.5, 0.0);
        let small = ErrorState {
            setpoint: 100.0,
            measured: 99.0,
            prev_1: 98.5,
            prev_2: 98.0,
            ts: 1.0,
        };
        let t = law.compute_terms(&gains, &small);
        assert!((t.p - (-5.0)).abs() < 1e-12);
        assert!((t.i - 0.5).abs() < 1e-12);

        let large = ErrorState {
            measured: 90.0,
            prev_1: 91.0,
            prev_2: 92.0,
            ..small
        };
        let t = law.compute_terms(&gains, &large);
        assert!((t.p - 250.0).abs() < 1e-12);
        // superlinear integral: Ts * e * |e|
        assert!((t.i - 100.0).abs() < 1e-12);

        let hot = ErrorState {
            measured: 105.0,
            prev_1: 105.0,
            prev_2: 105.0,
            ..small
        };
        assert!((law.compute_terms(&gains, &hot).i - (-25.0)).abs() < 1e-12);
    }

    #[test]
    fn measurement_form_derivative_sign() {
        let law = MeasurementDerivative::default();
        let gains = Gains::new(0.0, 0.0, 4.0);
        let state = ErrorState {
            setpoint: 100.0,
            measured: 99.0,
            prev_1: 98.0,
            prev_2: 98.0,
            ts: 2.0,
        };
        // -Kd * (99 - 196 + 98) / 2 = -2
        assert!((law.compute_terms(&gains, &state).d - (-2.0)).abs() < 1e-12);
    }

    #[test]
    fn asymmetric_form_uses_rising_gain() {
        let law = AsymmetricMeasurement {
            kp_rising: Some(90.0),
        };
        let gains = Gains::new(32.0, 1.2, 0.0);
        let falling = ErrorState {
            setpoint: 96.0,
            measured: 95.0,
            prev_1: 95.5,
            prev_2: 95.5,
            ts: 1.0,
        };
        assert!((law.compute_terms(&gains, &falling).p - 16.0).abs() < 1e-12);
        let rising = ErrorState {
            measured: 96.0,
            prev_1: 95.5,
            ..falling
        };
        assert!((law.compute_terms(&gains, &rising).p - (-45.0)).abs() < 1e-12);
    }

    #[test]
    fn zero_order_hold_between_samples() {
        let mut pid = controller(PidVariant::IncrementalErrorForm, Gains::default());
        let first = pid.update(0.0, 100.0, 80.0);
        let held = pid.update(0.5, 100.0, 20.0);
        assert_eq!(first, held);
        let next = pid.update(1.0, 100.0, 20.0);
        assert_ne!(first, next);
    }

    #[test]
    fn output_is_rounded() {
        let mut pid = controller(PidVariant::IncrementalErrorForm, Gains::new(0.0, 0.7, 0.0));
        // I = 0.7 * 3.3 = 2.31 -> 2
        assert_eq!(pid.update(0.0, 100.0, 96.7), 2.0);
        assert!((pid.last_terms().i - 2.31).abs() < 1e-9);
    }

    #[test]
    fn gain_hot_swap_keeps_history() {
        let mut pid = controller(PidVariant::IncrementalErrorForm, Gains::new(1.0, 1.0, 0.0));
        pid.update(0.0, 100.0, 90.0);
        let before = pid.output();
        pid.set_gains(Gains::new(1.0, 2.0, 0.0));
        pid.update(1.0, 100.0, 90.0);
        // P = 0 (same measurement), I = 2 * 10
        assert_eq!(pid.output(), before + 20.0);
    }

    #[test]
    fn override_applies_for_given_cycles() {
        let mut pid = controller(PidVariant::IncrementalErrorForm, Gains::new(0.0, 0.0, 0.0));
        pid.override_output(100.0, 2);
        assert_eq!(pid.update(0.0, 100.0, 100.0), 100.0);
        assert_eq!(pid.update(1.0, 100.0, 100.0), 100.0);
        // Override expired, controller continues from the held output.
        assert_eq!(pid.update(2.0, 100.0, 100.0), 100.0);
        assert_eq!(pid.last_terms().raw, 100.0);
    }

    #[test]
    fn boost_saturates_far_below_target() {
        let config = PidConfig {
            boost_error: Some(15.0),
            ..PidConfig::default().with_gains(Gains::new(0.0, 0.1, 0.0))
        };
        let mut pid = PidController::new(config).unwrap();
        assert_eq!(pid.update(0.0, 100.0, 50.0), 100.0);
        let mut pid = PidController::new(pid.config().clone()).unwrap();
        assert_eq!(pid.update(0.0, 100.0, 90.0), 1.0);
    }

    fn capped_controller() -> PidController {
        let config = PidConfig {
            idle_cap: Some(IdleCap::default()),
            ..PidConfig::default().with_gains(Gains::new(0.0, 0.0, 0.0))
        };
        PidController::new(config).unwrap()
    }

    #[test]
    fn idle_cap_limits_output_above_target() {
        let mut pid = capped_controller();
        pid.override_output(60.0, 1);
        assert_eq!(pid.update(0.0, 100.0, 99.0), 60.0);
        // Held 60 plus zero terms, capped once 0.5 degrees over target.
        assert_eq!(pid.update(1.0, 100.0, 100.4), 60.0);
        assert_eq!(pid.update(2.0, 100.0, 100.5), 5.0);
        assert_eq!(pid.last_terms().raw, 60.0);
        // Below the cap the command passes through.
        assert_eq!(pid.update(3.0, 100.0, 101.0), 5.0);
    }

    #[test]
    fn disarmed_idle_cap_and_override_precedence() {
        let mut pid = capped_controller();
        pid.override_output(60.0, 1);
        pid.update(0.0, 100.0, 99.0);
        pid.set_idle_cap_active(false);
        assert_eq!(pid.update(1.0, 100.0, 103.0), 60.0);
        pid.set_idle_cap_active(true);
        pid.override_output(80.0, 1);
        assert_eq!(pid.update(2.0, 100.0, 103.0), 80.0);
        pid.reset();
        assert!(pid.idle_cap_active());
    }

    #[test]
    fn base_gains_survive_reset() {
        let mut pid = controller(PidVariant::IncrementalErrorForm, Gains::new(1.0, 1.0, 0.0));
        pid.set_base_gains(Gains::new(5.0, 0.1, 0.0)).unwrap();
        pid.reset();
        assert_eq!(pid.gains(), Gains::new(5.0, 0.1, 0.0));
        assert_eq!(pid.config().gains, Gains::new(5.0, 0.1, 0.0));
        assert!(pid.set_base_gains(Gains::new(f64::NAN, 0.0, 0.0)).is_err());
    }

    #[test]
    fn reset_restores_configured_gains() {
        let mut pid = controller(PidVariant::IncrementalErrorForm, Gains::new(1.0, 1.0, 0.0));
        pid.set_gains(Gains::new(9.0, 9.0, 9.0));
        pid.update(0.0, 100.0, 50.0);
        pid.reset();
        assert_eq!(pid.gains(), Gains::new(1.0, 1.0, 0.0));
        assert_eq!(pid.output(), 0.0);
    }

    #[test]
    fn nan_measurement_holds_previous_output() {
        let mut pid = controller(PidVariant::IncrementalErrorForm, Gains::new(1.0, 1.0, 0.0));
        let u = pid.update(0.0, 100.0, 90.0);
        assert_eq!(pid.update(1.0, 100.0, f64::NAN), u);
    }
}
