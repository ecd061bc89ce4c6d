use anyhow::bail;
use clap::Args;
use hostcheck_core::{Probe, RealRange};
use hostcheck_probes::load::{DEFAULT_CRITICAL, DEFAULT_WARN};
use hostcheck_probes::{LoadCheck, SystemSampler};

#[derive(Args, Debug)]
pub struct LoadArgs {
    /// Warning ranges for the 1, 5 and 15 minute averages
    #[arg(
        short,
        long,
        num_args = 3,
        value_names = ["ONE", "FIVE", "FIFTEEN"],
        default_values = DEFAULT_WARN,
        allow_negative_numbers = true
    )]
    pub warn: Vec<RealRange>,
    /// Critical ranges for the 1, 5 and 15 minute averages
    #[arg(
        short,
        long,
        num_args = 3,
        value_names = ["ONE", "FIVE", "FIFTEEN"],
        default_values = DEFAULT_CRITICAL,
        allow_negative_numbers = true
    )]
    pub critical: Vec<RealRange>,
}

pub fn probe(args: LoadArgs) -> anyhow::Result<Box<dyn Probe>> {
    let warn = three(args.warn, "--warn")?;
    let critical = three(args.critical, "--critical")?;
    Ok(Box::new(LoadCheck::new(SystemSampler::new(), warn, critical)))
}

fn three(ranges: Vec<RealRange>, flag: &str) -> anyhow::Result<[RealRange; 3]> {
    match <[RealRange; 3]>::try_from(ranges) {
        Ok(ranges) => Ok(ranges),
        Err(ranges) => bail!("{flag} takes exactly three ranges, got {}", ranges.len()),
    }
}
