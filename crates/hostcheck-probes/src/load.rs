//! Load average check.

use hostcheck_core::{CheckResult, Probe, RealRange, Status, ValidationError};
use tracing::warn;

use crate::sampler::Sampler;

/// Label and perfdata suffix for each averaging window.
const WINDOWS: [(&str, &str); 3] = [("1 min", "one"), ("5 min", "five"), ("15 min", "fifteen")];

/// Default warning ranges for the 1, 5 and 15 minute averages.
pub const DEFAULT_WARN: [&str; 3] = ["10", "8", "7"];

/// Default critical ranges for the 1, 5 and 15 minute averages.
pub const DEFAULT_CRITICAL: [&str; 3] = ["12", "10", "9"];

/// Compares each load average against its own warning and critical range.
pub struct LoadCheck<S> {
    sampler: S,
    warn: [RealRange; 3],
    critical: [RealRange; 3],
}

impl<S: Sampler> LoadCheck<S> {
    pub fn new(sampler: S, warn: [RealRange; 3], critical: [RealRange; 3]) -> Self {
        Self {
            sampler,
            warn,
            critical,
        }
    }
}

impl<S: Sampler> Probe for LoadCheck<S> {
    fn name(&self) -> &'static str {
        "load"
    }

    fn evaluate(&self) -> Result<CheckResult, ValidationError> {
        let mut result = CheckResult::new();
        let load = match self.sampler.load_average() {
            Ok(load) => load,
            Err(err) => {
                warn!(error = %err, "load average sampling failed");
                result.fail(format!("Error gathering load average: {err}"))?;
                return Ok(result);
            }
        };
        let values = [load.one, load.five, load.fifteen];

        result.add_metrics(
            WINDOWS
                .iter()
                .zip(values)
                .map(|((_, key), value)| (format!("loadavg_{key}"), value)),
        )?;

        // Highest status last so its breaches become the summary.
        let mut summary = format!("{:.1}, {:.1}, {:.1}", load.one, load.five, load.fifteen);
        for (status, ranges) in [(Status::Warn, &self.warn), (Status::Critical, &self.critical)] {
            let mut breaches = Vec::new();
            for (((label, _), value), range) in WINDOWS.iter().zip(values).zip(ranges) {
                if !range.contains(value) {
                    breaches.push(format!("{label}: {value:.1} outside {range}"));
                }
            }
            if !breaches.is_empty() {
                result.escalate(status);
                summary = breaches.join(" :: ");
            }
        }

        result.set_message(format!(
            "Load {status} :: {summary}\n\
             One minute:      {one:.1}\n\
             Five minute:     {five:.1}\n\
             Fifteen minute:  {fifteen:.1}",
            status = result.status(),
            one = load.one,
            five = load.five,
            fifteen = load.fifteen,
        ))?;
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sampler::MockSampler;

    fn ranges(specs: [&str; 3]) -> [RealRange; 3] {
        specs.map(|s| RealRange::parse(s).unwrap())
    }

    fn check(sampler: MockSampler) -> LoadCheck<MockSampler> {
        LoadCheck::new(sampler, ranges(DEFAULT_WARN), ranges(DEFAULT_CRITICAL))
    }

    #[test]
    fn quiet_host_is_ok() {
        let result = check(MockSampler::new().with_load(0.5, 0.4, 0.3))
            .evaluate()
            .unwrap();
        assert_eq!(result.status(), Status::Ok);
        assert!(result.message().starts_with("Load OK :: 0.5, 0.4, 0.3\n"));
        assert!(result.message().contains("Fifteen minute:  0.3"));
        let keys: Vec<&str> = result.perfdata().keys().collect();
        assert_eq!(keys, vec!["loadavg_one", "loadavg_five", "loadavg_fifteen"]);
    }

    #[test]
    fn warning_breach() {
        let result = check(MockSampler::new().with_load(11.0, 2.0, 1.0))
            .evaluate()
            .unwrap();
        assert_eq!(result.status(), Status::Warn);
        assert!(result
            .message()
            .starts_with("Load WARN :: 1 min: 11.0 outside 10"));
    }

    #[test]
    fn critical_breaches_replace_warning_summary() {
        let result = check(MockSampler::new().with_load(13.0, 9.0, 1.0))
            .evaluate()
            .unwrap();
        assert_eq!(result.status(), Status::Critical);
        let summary = result.message().lines().next().unwrap();
        assert_eq!(summary, "Load CRITICAL :: 1 min: 13.0 outside 12");
    }

    #[test]
    fn sampling_failure_is_unknown() {
        let result = check(MockSampler::new()).evaluate().unwrap();
        assert_eq!(result.status(), Status::Unknown);
        assert!(result.message().starts_with("Error gathering load average"));
        assert!(result.perfdata().is_empty());
    }
}
