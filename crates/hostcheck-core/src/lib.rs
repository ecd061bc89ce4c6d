//! The contract shared by every hostcheck probe.
//!
//! # Architecture
//!
//! ```text
//! CLI strings ──► RangeSpec ──► probe logic ──► CheckResult
//!                                                   │
//!                        driver::run ◄──────────────┘
//!                          ├── finalize (epoch, runtime, state)
//!                          └── output::format ──► stdout + exit code
//! ```
//!
//! Exit codes are fixed: OK=0, WARN=1, CRITICAL=2, UNKNOWN=3.

pub mod driver;
pub mod error;
pub mod output;
pub mod range;
pub mod result;
pub mod status;

pub use driver::{run, Probe};
pub use error::{RangeParseError, ValidationError};
pub use output::{format, Output, OutputOptions, DEFAULT_LIMIT};
pub use range::{Domain, IntRange, RangeSpec, RangeValue, RealRange, Thresholds};
pub use result::{CheckResult, PerfValue, Perfdata, RESERVED_KEYS};
pub use status::Status;
