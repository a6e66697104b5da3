//! Memo of sweep trials keyed by gain triple.
//!
//! Entries are only meaningful for one base configuration, so the cache is
//! bound to a scope fingerprint; binding a different scope drops everything.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::config::{RunOptions, SimConfig};
use crate::error::SimResult;
use crate::record::ScoreWindow;
use crate::sweep::TrialResult;
use bs_controls::Gains;
use sha2::{Digest, Sha256};
use tracing::{debug, warn};

/// Exact bit pattern of a gain triple.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TrialKey([u64; 3]);

impl TrialKey {
    pub fn new(gains: Gains) -> Self {
        // `+ 0.0` folds -0.0 onto 0.0 so equal gains share a key.
        let bits = |v: f64| (v + 0.0).to_bits();
        Self([bits(gains.kp), bits(gains.ki), bits(gains.kd)])
    }

    pub fn gains(&self) -> Gains {
        Gains::new(
            f64::from_bits(self.0[0]),
            f64::from_bits(self.0[1]),
            f64::from_bits(self.0[2]),
        )
    }
}

impl From<Gains> for TrialKey {
    fn from(gains: Gains) -> Self {
        Self::new(gains)
    }
}

/// Hash of everything except the swept gains that determines a trial.
pub fn scope_fingerprint(
    config: &SimConfig,
    opts: &RunOptions,
    window: &ScoreWindow,
) -> SimResult<String> {
    let mut base = config.clone();
    base.controller.gains = Gains::new(0.0, 0.0, 0.0);

    let mut hasher = Sha256::new();
    hasher.update(serde_json::to_string(&base)?.as_bytes());
    hasher.update(serde_json::to_string(opts)?.as_bytes());
    hasher.update(serde_json::to_string(window)?.as_bytes());
    Ok(format!("{:x}", hasher.finalize()))
}

#[derive(Debug, Default)]
struct CacheInner {
    scope: Option<String>,
    entries: HashMap<TrialKey, Arc<TrialResult>>,
}

/// Thread-safe trial memo shared by sweep workers.
///
/// Two workers may compute the same key concurrently; the first insert wins
/// and both observe that entry.
#[derive(Debug, Default)]
pub struct TrialCache {
    inner: Mutex<CacheInner>,
}

impl TrialCache {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, CacheInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Bind the cache to `scope`, clearing it if the scope changed.
    /// Returns `true` when entries were dropped.
    pub fn bind_scope(&self, scope: &str) -> bool {
        let mut inner = self.lock();
        if inner.scope.as_deref() == Some(scope) {
            return false;
        }
        let dropped = !inner.entries.is_empty();
        if dropped {
            debug!(entries = inner.entries.len(), "trial cache scope changed");
        }
        inner.entries.clear();
        inner.scope = Some(scope.to_owned());
        dropped
    }

    pub fn scope(&self) -> Option<String> {
        self.lock().scope.clone()
    }

    pub fn get(&self, key: &TrialKey) -> Option<Arc<TrialResult>> {
        self.lock().entries.get(key).cloned()
    }

    /// Insert unless an entry exists; returns the entry now stored.
    pub fn insert(&self, key: TrialKey, result: TrialResult) -> Arc<TrialResult> {
        self.lock()
            .entries
            .entry(key)
            .or_insert_with(|| Arc::new(result))
            .clone()
    }

    /// Cached result for `key`, computing it on a miss.
    ///
    /// An entry whose trajectory does not have `expected_len` samples, or
    /// whose score is not a finite non-negative number, is treated as a miss
    /// and overwritten. The flag is `true` on a cache hit.
    pub fn get_or_compute<F>(
        &self,
        key: TrialKey,
        expected_len: usize,
        compute: F,
    ) -> SimResult<(Arc<TrialResult>, bool)>
    where
        F: FnOnce() -> SimResult<TrialResult>,
    {
        if let Some(hit) = self.get(&key) {
            if hit.is_consistent(expected_len) {
                return Ok((hit, true));
            }
            warn!(gains = ?key.gains(), "inconsistent cached trial, recomputing");
        }

        let fresh = Arc::new(compute()?);
        let mut inner = self.lock();
        match inner.entries.get(&key) {
            Some(existing) if existing.is_consistent(expected_len) => Ok((existing.clone(), false)),
            _ => {
                inner.entries.insert(key, fresh.clone());
                Ok((fresh, false))
            }
        }
    }

    pub fn len(&self) -> usize {
        self.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().entries.is_empty()
    }

    pub fn clear(&self) {
        self.lock().entries.clear();
    }
}
