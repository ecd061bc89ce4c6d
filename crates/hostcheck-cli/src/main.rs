use std::path::PathBuf;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use hostcheck_core::Status;
use tracing::{error, info_span};

mod commands;
mod config;
mod logging;

use config::Config;

#[derive(Parser, Debug)]
#[command(
    name = "hostcheck",
    about = "Host health checks for Nagios-compatible monitoring",
    version,
    propagate_version = true
)]
struct Cli {
    #[command(flatten)]
    common: CommonArgs,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Args, Debug)]
struct CommonArgs {
    /// Turn on debug output
    #[arg(long, global = true)]
    debug: bool,
    /// Append JSON debug logs to this file. Implies --debug
    #[arg(long = "log", value_name = "PATH", global = true)]
    log: Option<PathBuf>,
    /// Turn on informational output
    #[arg(long, global = true)]
    verbose: bool,
    /// Session id attached to every log line
    #[arg(long, value_name = "ID", global = true)]
    session_id: Option<String>,
    /// Emit perfdata as a JSON object
    #[arg(long, global = true)]
    json: bool,
    /// Maximum output size in bytes
    #[arg(long, value_name = "BYTES", global = true)]
    limit: Option<usize>,
    /// Config file (default: $HOSTCHECK_CONFIG)
    #[arg(long, value_name = "PATH", global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Check the 1, 5 and 15 minute load averages
    Load(commands::load::LoadArgs),
    /// Check free space on the filesystem holding a path
    Disk(commands::disk::DiskArgs),
    /// Check CPU time per state over a time span.
    ///
    /// Each run records a sample. Until a comparable earlier sample exists
    /// the check reports OK with "Not enough data points yet..".
    Cpu(commands::cpu::CpuArgs),
    /// Count processes matching a filter
    Procs(commands::procs::ProcsArgs),
}

fn main() {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            // Help and version go to stdout and exit 0; usage errors are UNKNOWN.
            if !err.use_stderr() {
                err.exit();
            }
            err.print().ok();
            std::process::exit(Status::Unknown.exit_code());
        }
    };

    match execute(cli) {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            error!(error = %format!("{err:#}"), "check aborted");
            eprintln!("hostcheck: {err:#}");
            std::process::exit(Status::Unknown.exit_code());
        }
    }
}

fn execute(cli: Cli) -> anyhow::Result<i32> {
    let common = cli.common;
    logging::init(common.debug, common.verbose, common.log.as_deref())?;
    let session_id = logging::session_id(common.session_id);

    let config = Config::load(common.config.as_deref())?;
    let options = config.output_options(common.json, common.limit);

    let probe = match cli.command {
        Commands::Load(args) => commands::load::probe(args)?,
        Commands::Disk(args) => commands::disk::probe(args)?,
        Commands::Cpu(args) => commands::cpu::probe(args, &config)?,
        Commands::Procs(args) => commands::procs::probe(args)?,
    };

    let span = info_span!("probe", session_id = %session_id, probe = probe.name());
    let _guard = span.enter();

    let output = hostcheck_core::run(probe.as_ref(), &options)
        .with_context(|| format!("{} check violated the result contract", probe.name()))?;
    output
        .write_to(std::io::stdout().lock())
        .context("failed to write check output")?;
    Ok(output.exit_code)
}
