//! Probe driver: evaluate, stamp reserved metrics, format.

use std::time::SystemTime;

use tracing::{debug, info};

use crate::error::ValidationError;
use crate::output::{self, Output, OutputOptions};
use crate::result::CheckResult;

/// One host check.
///
/// `evaluate` owns the whole comparison logic and returns the accumulated
/// result. Operational failures are folded into an UNKNOWN result by the
/// implementation; only contract violations surface as errors.
pub trait Probe {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    fn evaluate(&self) -> Result<CheckResult, ValidationError>;
}

/// Run a probe to completion and serialize its result.
pub fn run(probe: &dyn Probe, options: &OutputOptions) -> Result<Output, ValidationError> {
    let started = SystemTime::now();
    debug!(probe = probe.name(), "evaluating");

    let mut result = probe.evaluate()?;
    result.finalize(started);

    let output = output::format(result, options);
    info!(
        probe = probe.name(),
        status = %output.status,
        bytes = output.text.len(),
        "check finished"
    );
    Ok(output)
}
