//! Free disk space check.

use std::path::PathBuf;

use hostcheck_core::{CheckResult, Probe, Status, ValidationError};
use tracing::warn;

use crate::sampler::Sampler;

const MIB: f64 = 1024.0 * 1024.0;
const GIB: f64 = 1024.0 * 1024.0 * 1024.0;

/// Unit the free-space thresholds are expressed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DiskUnit {
    #[default]
    Percent,
    Megabytes,
    Gigabytes,
}

/// Alerts when free space on the filesystem holding `path` drops below
/// the warning or critical floor.
pub struct DiskCheck<S> {
    sampler: S,
    path: PathBuf,
    unit: DiskUnit,
    warn: f64,
    critical: f64,
}

impl<S: Sampler> DiskCheck<S> {
    pub fn new(sampler: S, path: impl Into<PathBuf>, unit: DiskUnit, warn: f64, critical: f64) -> Self {
        Self {
            sampler,
            path: path.into(),
            unit,
            warn,
            critical,
        }
    }
}

impl<S: Sampler> Probe for DiskCheck<S> {
    fn name(&self) -> &'static str {
        "disk"
    }

    fn evaluate(&self) -> Result<CheckResult, ValidationError> {
        let mut result = CheckResult::new();
        let usage = match self.sampler.disk_usage(&self.path) {
            Ok(usage) => usage,
            Err(err) => {
                warn!(error = %err, path = %self.path.display(), "disk usage sampling failed");
                result.fail(format!("Error gathering disk usage: {err}"))?;
                return Ok(result);
            }
        };
        if usage.total_bytes == 0 {
            result.fail(format!(
                "Disk {} reports zero capacity",
                self.path.display()
            ))?;
            return Ok(result);
        }

        let free_bytes = usage.free_bytes as f64;
        let free_pct = free_bytes / usage.total_bytes as f64 * 100.0;
        let free = match self.unit {
            DiskUnit::Percent => free_pct,
            DiskUnit::Megabytes => free_bytes / MIB,
            DiskUnit::Gigabytes => free_bytes / GIB,
        };

        let status = if free < self.critical {
            Status::Critical
        } else if free < self.warn {
            Status::Warn
        } else {
            Status::Ok
        };
        result.escalate(status);

        result.set_message(format!(
            "Disk space for {}: {:.3}GB Free ({:.2}%)",
            self.path.display(),
            free_bytes / GIB,
            free_pct
        ))?;
        result.add_metric("disk_free_bytes", saturating_i64(usage.free_bytes))?;
        result.add_metric("disk_total_bytes", saturating_i64(usage.total_bytes))?;
        result.add_metric("disk_free_pct", free_pct)?;
        Ok(result)
    }
}

fn saturating_i64(v: u64) -> i64 {
    i64::try_from(v).unwrap_or(i64::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sampler::MockSampler;
    use hostcheck_core::PerfValue;

    const GB: u64 = 1024 * 1024 * 1024;

    fn percent_check(free: u64, total: u64) -> CheckResult {
        DiskCheck::new(
            MockSampler::new().with_disk(free, total),
            "/data",
            DiskUnit::Percent,
            20.0,
            10.0,
        )
        .evaluate()
        .unwrap()
    }

    #[test]
    fn plenty_of_space_is_ok() {
        let result = percent_check(50 * GB, 100 * GB);
        assert_eq!(result.status(), Status::Ok);
        assert_eq!(
            result.message(),
            "Disk space for /data: 50.000GB Free (50.00%)"
        );
        assert_eq!(
            result.perfdata().get("disk_free_pct"),
            Some(&PerfValue::Real(50.0))
        );
    }

    #[test]
    fn percent_floors() {
        assert_eq!(percent_check(15 * GB, 100 * GB).status(), Status::Warn);
        assert_eq!(percent_check(5 * GB, 100 * GB).status(), Status::Critical);
        assert_eq!(percent_check(20 * GB, 100 * GB).status(), Status::Ok);
    }

    #[test]
    fn gigabyte_floors() {
        let check = DiskCheck::new(
            MockSampler::new().with_disk(3 * GB, 1000 * GB),
            "/",
            DiskUnit::Gigabytes,
            5.0,
            2.0,
        );
        assert_eq!(check.evaluate().unwrap().status(), Status::Warn);
    }

    #[test]
    fn megabyte_floors() {
        let check = DiskCheck::new(
            MockSampler::new().with_disk(100 * 1024 * 1024, GB),
            "/",
            DiskUnit::Megabytes,
            500.0,
            200.0,
        );
        assert_eq!(check.evaluate().unwrap().status(), Status::Critical);
    }

    #[test]
    fn zero_capacity_is_unknown() {
        assert_eq!(percent_check(0, 0).status(), Status::Unknown);
    }

    #[test]
    fn sampling_failure_is_unknown() {
        let check = DiskCheck::new(MockSampler::new(), "/missing", DiskUnit::Percent, 20.0, 10.0);
        let result = check.evaluate().unwrap();
        assert_eq!(result.status(), Status::Unknown);
        assert!(result.message().starts_with("Error gathering disk usage"));
    }
}
