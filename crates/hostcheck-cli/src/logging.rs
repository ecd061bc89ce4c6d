//! Log setup. Stdout belongs to the check output, so logs go to stderr or
//! to the `--log` file as JSON lines.

use std::fs::OpenOptions;
use std::path::Path;
use std::sync::Mutex;

use anyhow::Context;
use tracing_subscriber::EnvFilter;

/// Default filter directive for the requested verbosity.
pub fn default_directive(debug: bool, verbose: bool) -> &'static str {
    if debug {
        "debug"
    } else if verbose {
        "info"
    } else {
        "error"
    }
}

/// Install the global subscriber. `RUST_LOG` overrides the verbosity flags.
pub fn init(debug: bool, verbose: bool, log_file: Option<&Path>) -> anyhow::Result<()> {
    // A log file implies debug output.
    let directive = default_directive(debug || log_file.is_some(), verbose);
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(directive));

    let installed = match log_file {
        Some(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("failed to open log file {}", path.display()))?;
            tracing_subscriber::fmt()
                .json()
                .with_env_filter(filter)
                .with_writer(Mutex::new(file))
                .try_init()
        }
        None => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .try_init(),
    };
    installed.map_err(|e| anyhow::anyhow!("failed to install log subscriber: {e}"))
}

/// Session id for log correlation: explicit, then `$SESSION_ID`, then random.
pub fn session_id(explicit: Option<String>) -> String {
    explicit
        .or_else(|| std::env::var("SESSION_ID").ok())
        .unwrap_or_else(random_session_id)
}

fn random_session_id() -> String {
    let mut buf = [0u8; 9];
    match getrandom::getrandom(&mut buf) {
        Ok(()) => hex::encode(buf),
        Err(_) => format!("pid-{}", std::process::id()),
    }
}
