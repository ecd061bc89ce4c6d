//! Process census check.

use hostcheck_core::{CheckResult, IntRange, Probe, Status, Thresholds, ValidationError};
use tracing::{debug, warn};

use crate::sampler::{ProcessRecord, Sampler};

/// Default range for both thresholds: at least one matching process.
pub const DEFAULT_RANGE: &str = "@1:";

/// Which processes are counted. Unset fields match everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProcessFilter {
    /// Exact command name.
    pub name: Option<String>,
    /// Owner login.
    pub user: Option<String>,
    /// Minimum resident set size in bytes.
    pub min_rss_bytes: Option<u64>,
}

impl ProcessFilter {
    pub fn matches(&self, process: &ProcessRecord) -> bool {
        self.name.as_ref().is_none_or(|name| process.name == *name)
            && self
                .user
                .as_ref()
                .is_none_or(|user| process.owner.as_ref() == Some(user))
            && self
                .min_rss_bytes
                .is_none_or(|min| process.rss_bytes >= min)
    }

    fn describe(&self) -> String {
        let mut parts = Vec::new();
        if let Some(name) = &self.name {
            parts.push(format!("name={name}"));
        }
        if let Some(user) = &self.user {
            parts.push(format!("user={user}"));
        }
        if let Some(min) = self.min_rss_bytes {
            parts.push(format!("rss>={min}"));
        }
        if parts.is_empty() {
            "(all)".to_string()
        } else {
            format!("({})", parts.join(", "))
        }
    }
}

/// Counts matching processes and checks the count against integer ranges.
pub struct ProcsCheck<S> {
    sampler: S,
    filter: ProcessFilter,
    thresholds: Thresholds<i64>,
}

impl<S: Sampler> ProcsCheck<S> {
    pub fn new(sampler: S, filter: ProcessFilter, warn: IntRange, critical: IntRange) -> Self {
        Self {
            sampler,
            filter,
            thresholds: Thresholds::new(warn, critical),
        }
    }
}

impl<S: Sampler> Probe for ProcsCheck<S> {
    fn name(&self) -> &'static str {
        "procs"
    }

    fn evaluate(&self) -> Result<CheckResult, ValidationError> {
        let mut result = CheckResult::new();

        if let Some(user) = &self.filter.user {
            match self.sampler.user_exists(user) {
                Ok(true) => {}
                Ok(false) => {
                    result.fail(format!("Unknown user: {user}"))?;
                    return Ok(result);
                }
                Err(err) => {
                    warn!(error = %err, %user, "user lookup failed");
                    result.fail(format!("Error resolving user {user}: {err}"))?;
                    return Ok(result);
                }
            }
        }

        let processes = match self.sampler.processes() {
            Ok(processes) => processes,
            Err(err) => {
                warn!(error = %err, "process listing failed");
                result.fail(format!("Error listing processes: {err}"))?;
                return Ok(result);
            }
        };

        let count = processes.iter().filter(|p| self.filter.matches(p)).count();
        let count = i64::try_from(count).unwrap_or(i64::MAX);
        debug!(count, total = processes.len(), "processes matched");
        result.add_metric("procs", count)?;

        let Thresholds { warn, critical } = &self.thresholds;
        let mut detail = None;
        if !warn.contains(count) {
            result.escalate(Status::Warn);
            detail = Some(format!("WARNING: {count} processes outside {warn}"));
        }
        if !critical.contains(count) {
            result.escalate(Status::Critical);
            detail = Some(format!("CRITICAL: {count} processes outside {critical}"));
        }

        let mut message = format!(
            "Processes {} :: {count} matching {}",
            result.status(),
            self.filter.describe()
        );
        if let Some(detail) = detail {
            message.push('\n');
            message.push_str(&detail);
        }
        result.set_message(message)?;
        Ok(result)
    }
}
