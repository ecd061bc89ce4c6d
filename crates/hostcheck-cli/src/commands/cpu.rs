use std::path::PathBuf;

use anyhow::Context;
use clap::{ArgAction, Args};
use hostcheck_core::Probe;
use hostcheck_probes::cpu::{CpuLimits, DEFAULT_CRITICAL, DEFAULT_WARN};
use hostcheck_probes::{CpuCheck, SystemSampler};

use crate::config::Config;

#[derive(Args, Debug)]
pub struct CpuArgs {
    /// Seconds of history to compare against
    #[arg(short = 't', long = "time-span", value_name = "SECONDS")]
    pub time_span: Option<u64>,
    /// Where CPU samples are kept between runs
    #[arg(short, long = "state-file", value_name = "PATH")]
    pub state_file: Option<PathBuf>,
    /// Warning limit for a CPU state, e.g. `-w user 80`. Repeatable.
    #[arg(
        short,
        long,
        num_args = 2,
        value_names = ["STATE", "PERCENT"],
        action = ArgAction::Append
    )]
    pub warn: Vec<String>,
    /// Critical limit for a CPU state, e.g. `-c system 75`. Repeatable.
    #[arg(
        short,
        long,
        num_args = 2,
        value_names = ["STATE", "PERCENT"],
        action = ArgAction::Append
    )]
    pub critical: Vec<String>,
}

pub fn probe(args: CpuArgs, config: &Config) -> anyhow::Result<Box<dyn Probe>> {
    let warn = limits(&args.warn, DEFAULT_WARN)?;
    let critical = limits(&args.critical, DEFAULT_CRITICAL)?;
    let span = args.time_span.unwrap_or(config.cpu.time_span);
    let state_file = args.state_file.unwrap_or_else(|| config.cpu_state_file());

    let check = CpuCheck::new(SystemSampler::new(), state_file, span).with_limits(warn, critical);
    Ok(Box::new(check))
}

/// Pair up `STATE PERCENT` values; no values means the defaults.
fn limits(values: &[String], defaults: [(&str, f64); 2]) -> anyhow::Result<CpuLimits> {
    if values.is_empty() {
        return Ok(defaults
            .iter()
            .map(|(state, pct)| (state.to_string(), *pct))
            .collect());
    }
    values
        .chunks(2)
        .map(|pair| match pair {
            [state, pct] => {
                let pct: f64 = pct
                    .parse()
                    .with_context(|| format!("CPU limit for {state} is not a number: {pct}"))?;
                Ok((state.clone(), pct))
            }
            _ => anyhow::bail!("CPU limits come in STATE PERCENT pairs"),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn defaults_when_unset() {
        let parsed = limits(&[], DEFAULT_WARN).unwrap();
        assert_eq!(
            parsed,
            vec![("user".to_string(), 80.0), ("system".to_string(), 50.0)]
        );
    }

    #[test]
    fn explicit_pairs_replace_defaults() {
        let parsed = limits(&strings(&["iowait", "20", "user", "95.5"]), DEFAULT_WARN).unwrap();
        assert_eq!(
            parsed,
            vec![("iowait".to_string(), 20.0), ("user".to_string(), 95.5)]
        );
    }

    #[test]
    fn non_numeric_percent_is_an_error() {
        let err = limits(&strings(&["user", "lots"]), DEFAULT_WARN).unwrap_err();
        assert!(err.to_string().contains("not a number"));
    }
}
