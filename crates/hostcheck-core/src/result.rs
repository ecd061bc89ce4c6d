//! Check result accumulator.
//!
//! A [`CheckResult`] starts as OK with no message and no perfdata. Probe logic
//! sets the message, escalates the status and records metrics; the driver
//! then finalizes it with the reserved metrics and hands it to the formatter.

use std::fmt;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use tracing::debug;

use crate::error::ValidationError;
use crate::status::Status;

/// Metric keys written by the driver after the probe finishes.
pub const RESERVED_KEYS: [&str; 3] = ["epoch", "runtime", "state"];

/// Message emitted for a check that never set one.
pub const MISSING_MESSAGE: &str = "CRITICAL hostcheck: check message undefined....";

/// A single perfdata value.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum PerfValue {
    Text(String),
    Integer(i64),
    Real(f64),
}

impl fmt::Display for PerfValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PerfValue::Text(s) => f.write_str(s),
            PerfValue::Integer(i) => write!(f, "{i}"),
            // Debug keeps the trailing ".0" on whole numbers.
            PerfValue::Real(r) => write!(f, "{r:?}"),
        }
    }
}

impl From<String> for PerfValue {
    fn from(v: String) -> Self {
        PerfValue::Text(v)
    }
}

impl From<&str> for PerfValue {
    fn from(v: &str) -> Self {
        PerfValue::Text(v.to_string())
    }
}

impl From<i64> for PerfValue {
    fn from(v: i64) -> Self {
        PerfValue::Integer(v)
    }
}

impl From<i32> for PerfValue {
    fn from(v: i32) -> Self {
        PerfValue::Integer(v.into())
    }
}

impl From<u32> for PerfValue {
    fn from(v: u32) -> Self {
        PerfValue::Integer(v.into())
    }
}

impl From<f64> for PerfValue {
    fn from(v: f64) -> Self {
        PerfValue::Real(v)
    }
}

/// Ordered metric map. Keys keep their first insertion position; writing an
/// existing key replaces the value in place.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Perfdata {
    entries: Vec<(String, PerfValue)>,
}

impl Perfdata {
    /// Insert or replace, returning the previous value.
    pub fn insert(&mut self, key: String, value: PerfValue) -> Option<PerfValue> {
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some((_, slot)) => Some(std::mem::replace(slot, value)),
            None => {
                self.entries.push((key, value));
                None
            }
        }
    }

    pub fn get(&self, key: &str) -> Option<&PerfValue> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &PerfValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }
}

impl Serialize for Perfdata {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (key, value) in &self.entries {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

/// Accumulated outcome of one probe evaluation.
#[derive(Debug, Clone, PartialEq)]
pub struct CheckResult {
    message: String,
    status: Status,
    perfdata: Perfdata,
}

impl Default for CheckResult {
    fn default() -> Self {
        Self {
            message: String::new(),
            status: Status::Ok,
            perfdata: Perfdata::default(),
        }
    }
}

impl CheckResult {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn status(&self) -> Status {
        self.status
    }

    pub fn perfdata(&self) -> &Perfdata {
        &self.perfdata
    }

    /// Whether an operational failure has been recorded. Probe logic must
    /// stop evaluating once this is true.
    pub fn is_unknown(&self) -> bool {
        self.status.is_unknown()
    }

    /// Set the message. The first line is the summary shown by the
    /// monitoring host; later lines form the detail body.
    pub fn set_message(&mut self, text: impl AsRef<str>) -> Result<(), ValidationError> {
        let text = text.as_ref();
        if text.contains('|') {
            return Err(ValidationError::PipeInMessage);
        }
        self.message = text.trim().to_string();
        Ok(())
    }

    /// Raise the status towards `candidate`; never lowers it.
    pub fn escalate(&mut self, candidate: Status) -> Status {
        let next = self.status.escalate(candidate);
        if next != self.status {
            debug!(from = %self.status, to = %next, "status escalated");
        }
        self.status = next;
        next
    }

    /// Record an operational failure: UNKNOWN plus an explanatory message.
    pub fn fail(&mut self, message: impl AsRef<str>) -> Result<(), ValidationError> {
        self.set_message(message)?;
        self.escalate(Status::Unknown);
        Ok(())
    }

    /// Add or replace a metric.
    pub fn add_metric(
        &mut self,
        key: impl Into<String>,
        value: impl Into<PerfValue>,
    ) -> Result<(), ValidationError> {
        let key = key.into();
        let value = value.into();
        if key.is_empty() {
            return Err(ValidationError::EmptyKey);
        }
        if key.contains(['=', '|']) {
            return Err(ValidationError::InvalidKey(key));
        }
        match &value {
            PerfValue::Real(r) if !r.is_finite() => {
                return Err(ValidationError::NonFiniteValue(key));
            }
            PerfValue::Text(text) if text.contains(['\n', '\r']) => {
                return Err(ValidationError::MultilineValue(key));
            }
            _ => {}
        }
        debug!(%key, %value, "perfdata");
        self.perfdata.insert(key, value);
        Ok(())
    }

    pub fn add_metrics<K, V>(
        &mut self,
        metrics: impl IntoIterator<Item = (K, V)>,
    ) -> Result<(), ValidationError>
    where
        K: Into<String>,
        V: Into<PerfValue>,
    {
        for (key, value) in metrics {
            self.add_metric(key, value)?;
        }
        Ok(())
    }

    /// Replace an empty message with the fixed placeholder and force
    /// CRITICAL. A check that said nothing is treated as broken.
    pub(crate) fn apply_missing_message(&mut self) {
        if self.message.is_empty() {
            self.message = MISSING_MESSAGE.to_string();
            self.status = Status::Critical;
        }
    }

    /// Write the reserved metrics for a run that started at `started`.
    pub fn finalize(&mut self, started: SystemTime) {
        let epoch = started
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs_f64())
            .unwrap_or_default();
        let elapsed = started.elapsed().unwrap_or_default();
        self.finalize_with(epoch, elapsed);
    }

    /// Write the reserved metrics from an explicit epoch and runtime.
    pub fn finalize_with(&mut self, epoch: f64, elapsed: Duration) {
        self.apply_missing_message();
        let [epoch_key, runtime_key, state_key] = RESERVED_KEYS;
        self.perfdata
            .insert(epoch_key.to_string(), PerfValue::Real(epoch));
        self.perfdata.insert(
            runtime_key.to_string(),
            PerfValue::Text(format!("{:.2}", elapsed.as_secs_f64())),
        );
        self.perfdata
            .insert(state_key.to_string(), PerfValue::Text(self.status.name().to_string()));
    }
}
