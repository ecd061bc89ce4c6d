use clap::Args;
use hostcheck_core::{IntRange, Probe};
use hostcheck_probes::procs::DEFAULT_RANGE;
use hostcheck_probes::{ProcessFilter, ProcsCheck, SystemSampler};

#[derive(Args, Debug)]
pub struct ProcsArgs {
    /// Only count processes with this command name
    #[arg(short, long)]
    pub name: Option<String>,
    /// Only count processes owned by this user
    #[arg(short, long)]
    pub user: Option<String>,
    /// Only count processes using at least this many resident bytes
    #[arg(short = 'r', long = "min-rss", value_name = "BYTES")]
    pub min_rss: Option<u64>,
    /// Range of acceptable process counts before warning
    #[arg(short, long, default_value = DEFAULT_RANGE, allow_negative_numbers = true)]
    pub warn: IntRange,
    /// Range of acceptable process counts before going critical
    #[arg(short, long, default_value = DEFAULT_RANGE, allow_negative_numbers = true)]
    pub critical: IntRange,
}

pub fn probe(args: ProcsArgs) -> anyhow::Result<Box<dyn Probe>> {
    let filter = ProcessFilter {
        name: args.name,
        user: args.user,
        min_rss_bytes: args.min_rss,
    };
    Ok(Box::new(ProcsCheck::new(
        SystemSampler::new(),
        filter,
        args.warn,
        args.critical,
    )))
}
