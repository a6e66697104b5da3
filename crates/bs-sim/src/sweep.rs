//! Brute-force gain sweep.
//!
//! Every `(kp, ki, kd)` triple of a [`SweepGrid`] is simulated from scratch and
//! scored by squared tracking error over a [`ScoreWindow`]. Trials share
//! nothing mutable except the [`TrialCache`], so they may run on the rayon
//! pool.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::cache::{TrialCache, TrialKey, scope_fingerprint};
use crate::config::{RunOptions, SimConfig};
use crate::engine::Engine;
use crate::error::{SimError, SimResult};
use crate::record::ScoreWindow;
use bs_controls::Gains;
use bs_core::ensure_finite;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Cartesian grid of candidate gains.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SweepGrid {
    kp: Vec<f64>,
    ki: Vec<f64>,
    kd: Vec<f64>,
}

impl SweepGrid {
    /// # Errors
    ///
    /// Every axis needs at least one value and every value must be finite.
    pub fn new(kp: Vec<f64>, ki: Vec<f64>, kd: Vec<f64>) -> SimResult<Self> {
        for (axis, what) in [(&kp, "kp"), (&ki, "ki"), (&kd, "kd")] {
            if axis.is_empty() {
                return Err(SimError::InvalidArg {
                    what: "sweep axis must not be empty",
                });
            }
            for v in axis {
                ensure_finite(*v, what)?;
            }
        }
        Ok(Self { kp, ki, kd })
    }

    pub fn len(&self) -> usize {
        self.kp.len() * self.ki.len() * self.kd.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// All triples, kp varying slowest.
    pub fn triples(&self) -> Vec<Gains> {
        let mut out = Vec::with_capacity(self.len());
        for &kp in &self.kp {
            for &ki in &self.ki {
                for &kd in &self.kd {
                    out.push(Gains::new(kp, ki, kd));
                }
            }
        }
        out
    }
}

#[derive(Debug, Clone, Default)]
pub struct SweepOptions {
    /// Run trials on the rayon pool.
    pub parallel: bool,
    /// Checked before each trial starts.
    pub cancel: Option<Arc<AtomicBool>>,
}

impl SweepOptions {
    fn cancelled(&self) -> bool {
        self.cancel
            .as_ref()
            .is_some_and(|flag| flag.load(Ordering::Relaxed))
    }
}

/// Outcome of one trial.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrialResult {
    pub gains: Gains,
    /// Squared tracking error inside the score window.
    pub score: f64,
    pub temperatures: Vec<f64>,
}

impl TrialResult {
    /// Whether this result could have come from a run of `expected_len` steps.
    pub fn is_consistent(&self, expected_len: usize) -> bool {
        self.temperatures.len() == expected_len && self.score.is_finite() && self.score >= 0.0
    }
}

/// Simulate one gain triple on a fresh engine.
pub fn score_trial(
    config: &SimConfig,
    opts: &RunOptions,
    gains: Gains,
    window: &ScoreWindow,
) -> SimResult<TrialResult> {
    let mut trial_config = config.clone();
    trial_config.controller.gains = gains;
    let mut engine = Engine::new(trial_config)?;
    let record = engine.run(opts)?;
    let score = record.squared_error(window);
    debug!(?gains, score, "trial scored");
    Ok(TrialResult {
        gains,
        score,
        temperatures: record.temperatures(),
    })
}

#[derive(Debug, Clone, PartialEq)]
pub struct SweepReport {
    /// Completed trials in grid order.
    pub trials: Vec<TrialResult>,
    /// Index into `trials` of the lowest finite score, first in grid order on
    /// ties.
    pub best: Option<usize>,
    /// Set when cancellation skipped at least one trial.
    pub interrupted: bool,
    pub cache_hits: usize,
}

/// Gains and score without the trajectory.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrialScore {
    pub gains: Gains,
    pub score: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SweepSummary {
    pub trials: Vec<TrialScore>,
    pub best: Option<TrialScore>,
    pub interrupted: bool,
    pub cache_hits: usize,
}

impl SweepReport {
    pub fn best_trial(&self) -> Option<&TrialResult> {
        self.best.and_then(|i| self.trials.get(i))
    }

    pub fn summary(&self) -> SweepSummary {
        let score = |t: &TrialResult| TrialScore {
            gains: t.gains,
            score: t.score,
        };
        SweepSummary {
            trials: self.trials.iter().map(score).collect(),
            best: self.best_trial().map(score),
            interrupted: self.interrupted,
            cache_hits: self.cache_hits,
        }
    }
}

/// Lowest finite score; non-finite scores never win.
fn best_index(trials: &[TrialResult]) -> Option<usize> {
    let mut best: Option<usize> = None;
    for (i, t) in trials.iter().enumerate() {
        if !t.score.is_finite() {
            continue;
        }
        if best.is_none_or(|b| t.score < trials[b].score) {
            best = Some(i);
        }
    }
    best
}

/// Score every triple of `grid` against `config` and `opts`.
///
/// # Errors
///
/// Configuration errors are reported before any trial runs. A trial that
/// fails anyway aborts the sweep with its error.
pub fn run_sweep(
    config: &SimConfig,
    opts: &RunOptions,
    grid: &SweepGrid,
    window: &ScoreWindow,
    cache: &TrialCache,
    sweep_opts: &SweepOptions,
) -> SimResult<SweepReport> {
    Engine::new(config.clone())?;
    let plan = opts.plan(config.controller.ts)?;
    window.validate()?;
    cache.bind_scope(&scope_fingerprint(config, opts, window)?);

    let triples = grid.triples();
    info!(
        trials = triples.len(),
        parallel = sweep_opts.parallel,
        "starting sweep"
    );

    let trial = |gains: &Gains| -> SimResult<Option<(Arc<TrialResult>, bool)>> {
        if sweep_opts.cancelled() {
            return Ok(None);
        }
        cache
            .get_or_compute(TrialKey::new(*gains), plan.steps, || {
                score_trial(config, opts, *gains, window)
            })
            .map(Some)
    };

    let outcomes: Vec<_> = if sweep_opts.parallel {
        triples.par_iter().map(trial).collect()
    } else {
        triples.iter().map(trial).collect()
    };

    let mut trials = Vec::with_capacity(outcomes.len());
    let mut interrupted = false;
    let mut cache_hits = 0;
    for outcome in outcomes {
        match outcome? {
            Some((result, hit)) => {
                cache_hits += usize::from(hit);
                trials.push(TrialResult::clone(&result));
            }
            None => interrupted = true,
        }
    }

    let best = best_index(&trials);
    let report = SweepReport {
        trials,
        best,
        interrupted,
        cache_hits,
    };
    info!(
        completed = report.trials.len(),
        cache_hits,
        interrupted,
        best = ?report.best_trial().map(|t| t.gains),
        "sweep complete"
    );
    Ok(report)
}
