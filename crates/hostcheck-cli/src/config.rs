//! hostcheck.toml configuration.
//!
//! Every section is optional; command-line flags override file values.

use std::path::{Path, PathBuf};

use anyhow::Context;
use hostcheck_core::{OutputOptions, DEFAULT_LIMIT};
use hostcheck_probes::cpu::DEFAULT_SPAN;
use serde::{Deserialize, Serialize};

/// Environment variable naming a config file when `--config` is absent.
pub const CONFIG_ENV: &str = "HOSTCHECK_CONFIG";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub output: OutputConfig,
    pub cpu: CpuConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub json: bool,
    pub limit: usize,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            json: false,
            limit: DEFAULT_LIMIT,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CpuConfig {
    pub state_file: Option<PathBuf>,
    pub time_span: u64,
}

impl Default for CpuConfig {
    fn default() -> Self {
        Self {
            state_file: None,
            time_span: DEFAULT_SPAN,
        }
    }
}

impl Config {
    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        let config: Config = toml::from_str(&content)
            .with_context(|| format!("failed to parse config {}", path.display()))?;
        Ok(config)
    }

    /// Load from `explicit`, else from `$HOSTCHECK_CONFIG`, else defaults.
    pub fn load(explicit: Option<&Path>) -> anyhow::Result<Self> {
        let path = explicit
            .map(Path::to_path_buf)
            .or_else(|| std::env::var_os(CONFIG_ENV).map(PathBuf::from));
        match path {
            Some(path) => Self::from_file(&path),
            None => Ok(Self::default()),
        }
    }

    /// Output options with command-line overrides applied.
    pub fn output_options(&self, json: bool, limit: Option<usize>) -> OutputOptions {
        OutputOptions {
            json: json || self.output.json,
            limit: limit.unwrap_or(self.output.limit),
        }
    }

    /// CPU sample store location: configured path or `~/.hostcheck_cpu.redb`.
    pub fn cpu_state_file(&self) -> PathBuf {
        self.cpu.state_file.clone().unwrap_or_else(|| {
            let home = std::env::var_os("HOME")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("."));
            home.join(".hostcheck_cpu.redb")
        })
    }
}
