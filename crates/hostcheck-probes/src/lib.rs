//! Host checks built on the hostcheck-core contract.
//!
//! # Architecture
//!
//! ```text
//! Probe (LoadCheck | DiskCheck | CpuCheck | ProcsCheck)
//!   ├── Sampler (SystemSampler on a live host, MockSampler in tests)
//!   ├── RangeSpec / float limits → Status escalation
//!   └── CheckResult → hostcheck_core::run
//! ```
//!
//! Sampling failures never escape a probe: they become an UNKNOWN result
//! with an explanatory message. Only the CPU check keeps state between
//! runs, in a `hostcheck_state::SnapshotStore`.

pub mod cpu;
pub mod disk;
pub mod load;
pub mod procs;
pub mod sampler;

pub use cpu::CpuCheck;
pub use disk::{DiskCheck, DiskUnit};
pub use load::LoadCheck;
pub use procs::{ProcessFilter, ProcsCheck};
pub use sampler::{
    CpuTimes, DiskUsage, LoadAverage, MockSampler, ProcessRecord, SampleError, Sampler,
    SystemSampler,
};
