//! CPU usage check over a time span.
//!
//! CPU counters are cumulative, so usage is computed as the delta between
//! the current sample and a stored one taken roughly `span` seconds ago.
//! Every run stores its own sample, prunes anything older than three spans,
//! and picks the stored sample whose age is closest to the span.
//!
//! The store is shared between runs without locking. A missing, stale or
//! unreadable sample only means there is not enough history yet.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

use hostcheck_core::{CheckResult, Probe, Status, ValidationError};
use hostcheck_state::{SnapshotStore, StateError, StateResult};
use tracing::{debug, warn};

use crate::sampler::{CpuTimes, Sampler};

/// Default span in seconds.
pub const DEFAULT_SPAN: u64 = 300;

/// Default warning percentages per CPU state.
pub const DEFAULT_WARN: [(&str, f64); 2] = [("user", 80.0), ("system", 50.0)];

/// Default critical percentages per CPU state.
pub const DEFAULT_CRITICAL: [(&str, f64); 2] = [("user", 90.0), ("system", 75.0)];

const NOT_ENOUGH_DATA: &str = "Not enough data points yet..";

/// Where the sample history lives.
enum History {
    File(PathBuf),
    Open(SnapshotStore),
}

/// Per-state CPU percentage limits.
pub type CpuLimits = Vec<(String, f64)>;

pub struct CpuCheck<S> {
    sampler: S,
    history: History,
    span: u64,
    warn: CpuLimits,
    critical: CpuLimits,
}

impl<S: Sampler> CpuCheck<S> {
    /// Check keeping its history in the redb file at `state_file`.
    pub fn new(sampler: S, state_file: impl Into<PathBuf>, span: u64) -> Self {
        Self::with_history(sampler, History::File(state_file.into()), span)
    }

    /// Check keeping its history in an already open store.
    pub fn with_store(sampler: S, store: SnapshotStore, span: u64) -> Self {
        Self::with_history(sampler, History::Open(store), span)
    }

    fn with_history(sampler: S, history: History, span: u64) -> Self {
        let limits = |defaults: [(&str, f64); 2]| -> CpuLimits {
            defaults
                .iter()
                .map(|(state, pct)| (state.to_string(), *pct))
                .collect()
        };
        Self {
            sampler,
            history,
            span,
            warn: limits(DEFAULT_WARN),
            critical: limits(DEFAULT_CRITICAL),
        }
    }

    /// Replace the default limits.
    pub fn with_limits(mut self, warn: CpuLimits, critical: CpuLimits) -> Self {
        self.warn = warn;
        self.critical = critical;
        self
    }

    fn open_store(&self) -> StateResult<SnapshotStore> {
        match &self.history {
            History::File(path) => SnapshotStore::open(path),
            History::Open(store) => Ok(store.clone()),
        }
    }

    /// Evaluate as if the current unix time were `now`.
    pub fn evaluate_at(&self, now: u64) -> Result<CheckResult, ValidationError> {
        let mut result = CheckResult::new();
        let current = match self.sampler.cpu_times() {
            Ok(current) => current,
            Err(err) => {
                warn!(error = %err, "cpu sampling failed");
                result.fail(format!("Error gathering CPU times: {err}"))?;
                return Ok(result);
            }
        };

        for (state, _) in self.warn.iter().chain(&self.critical) {
            if current.get(state).is_none() {
                let valid: Vec<&str> = current.states().collect();
                result.fail(format!(
                    "Invalid CPU state: [{state}]. Valid values are [{}]",
                    valid.join(", ")
                ))?;
                return Ok(result);
            }
        }

        let store = match self.open_store() {
            Ok(store) => store,
            Err(StateError::Busy(path)) => {
                debug!(%path, "cpu state store held by a concurrent run");
                result.set_message(NOT_ENOUGH_DATA)?;
                return Ok(result);
            }
            Err(err) => {
                warn!(error = %err, "failed to open cpu state store");
                result.fail(format!("Failed to open state db: {err}"))?;
                return Ok(result);
            }
        };

        let previous = match self.record_and_find(&store, &current, now) {
            Ok(previous) => previous,
            Err(err) => {
                warn!(error = %err, "cpu state store failure");
                result.fail(format!("State db error: {err}"))?;
                return Ok(result);
            }
        };
        let Some((taken_at, previous)) = previous else {
            result.set_message(NOT_ENOUGH_DATA)?;
            return Ok(result);
        };

        let total = current.total() - previous.total();
        if total <= 0.0 {
            debug!(total, "no cpu ticks elapsed since stored sample");
            result.set_message(NOT_ENOUGH_DATA)?;
            return Ok(result);
        }

        let mut stats = BTreeMap::new();
        let mut busy = 0.0;
        for (state, ticks) in &current.buckets {
            let delta = ticks - previous.get(state).unwrap_or(*ticks);
            if state != "idle" {
                busy += delta;
            }
            stats.insert(state.as_str(), delta * 100.0 / total);
        }
        let age = now.abs_diff(taken_at);

        let mut warnings = Vec::new();
        for (state, limit) in &self.warn {
            let pct = stats[state.as_str()];
            if pct > *limit {
                warnings.push(format!(
                    "WARNING: {state} CPU is {pct:.0}% for the last {age} seconds"
                ));
                result.escalate(Status::Warn);
            }
        }
        let mut criticals = Vec::new();
        for (state, limit) in &self.critical {
            let pct = stats[state.as_str()];
            if pct > *limit {
                criticals.push(format!(
                    "CRITICAL: {state} CPU is {pct:.0}% for the last {age} seconds"
                ));
                result.escalate(Status::Critical);
            }
        }

        let mut lines = if !criticals.is_empty() {
            criticals
        } else if !warnings.is_empty() {
            warnings
        } else {
            vec![format!("CPU Usage OK at {:.2}%", busy * 100.0 / total)]
        };
        for (state, pct) in &stats {
            lines.push(format!("{state} CPU usage: {pct:.2}%"));
        }

        result.set_message(lines.join("\n"))?;
        result.add_metrics(stats.iter().map(|(state, pct)| (format!("cpu_{state}"), *pct)))?;
        Ok(result)
    }

    /// Store `current` under `now`, prune old samples, and return the stored
    /// sample closest to one span ago.
    fn record_and_find(
        &self,
        store: &SnapshotStore,
        current: &CpuTimes,
        now: u64,
    ) -> StateResult<Option<(u64, CpuTimes)>> {
        let encoded = serde_json::to_string(current).unwrap_or_default();
        store.set(&now.to_string(), &encoded)?;

        let oldest = now.saturating_sub(self.span.saturating_mul(3));
        let mut stale = Vec::new();
        let mut closest: Option<u64> = None;
        for key in store.keys()? {
            let Ok(ts) = key.parse::<u64>() else {
                debug!(%key, "ignoring non-timestamp key");
                continue;
            };
            if ts < oldest {
                stale.push(key);
                continue;
            }
            if ts == now {
                continue;
            }
            let distance = |t: u64| self.span.abs_diff(now.abs_diff(t));
            if closest.is_none_or(|best| distance(ts) < distance(best)) {
                closest = Some(ts);
            }
        }

        if !stale.is_empty() {
            let pruned = store.delete_many(stale.iter().map(String::as_str))?;
            debug!(pruned, "pruned stale cpu samples");
        }

        let Some(ts) = closest else {
            return Ok(None);
        };
        // Another run may have pruned it in the meantime.
        let Some(raw) = store.get(&ts.to_string())? else {
            return Ok(None);
        };
        match serde_json::from_str::<CpuTimes>(&raw) {
            Ok(sample) => Ok(Some((ts, sample))),
            Err(err) => {
                debug!(error = %err, ts, "unreadable cpu sample");
                Ok(None)
            }
        }
    }
}

impl<S: Sampler> Probe for CpuCheck<S> {
    fn name(&self) -> &'static str {
        "cpu"
    }

    fn evaluate(&self) -> Result<CheckResult, ValidationError> {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or_default();
        self.evaluate_at(now)
    }
}
