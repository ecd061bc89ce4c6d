use std::path::PathBuf;

use clap::{ArgGroup, Args};
use hostcheck_core::Probe;
use hostcheck_probes::{DiskCheck, DiskUnit, SystemSampler};

#[derive(Args, Debug)]
#[command(group(ArgGroup::new("unit").args(["percent", "mega_bytes", "giga_bytes"])))]
pub struct DiskArgs {
    /// Thresholds are percent free (default)
    #[arg(short, long)]
    pub percent: bool,
    /// Thresholds are megabytes free
    #[arg(short, long = "mega-bytes")]
    pub mega_bytes: bool,
    /// Thresholds are gigabytes free
    #[arg(short, long = "giga-bytes")]
    pub giga_bytes: bool,
    /// Warn when free space drops below this amount
    #[arg(short, long, default_value_t = 20.0)]
    pub warn: f64,
    /// Go critical when free space drops below this amount
    #[arg(short, long, default_value_t = 10.0)]
    pub critical: f64,
    /// Any path on the filesystem to check
    pub disk: PathBuf,
}

impl DiskArgs {
    pub fn unit(&self) -> DiskUnit {
        if self.giga_bytes {
            DiskUnit::Gigabytes
        } else if self.mega_bytes {
            DiskUnit::Megabytes
        } else {
            DiskUnit::Percent
        }
    }
}

pub fn probe(args: DiskArgs) -> anyhow::Result<Box<dyn Probe>> {
    let unit = args.unit();
    Ok(Box::new(DiskCheck::new(
        SystemSampler::new(),
        args.disk,
        unit,
        args.warn,
        args.critical,
    )))
}
