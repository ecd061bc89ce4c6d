//! Sampling layer.
//!
//! Probes never touch the OS directly; they ask a [`Sampler`]. The
//! [`SystemSampler`] reads the live host, [`MockSampler`] returns scripted
//! values for tests.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Failure of a sampling call. Probes report it as UNKNOWN.
#[derive(Debug, Error)]
pub enum SampleError {
    #[error("{0}")]
    Io(#[from] std::io::Error),

    #[error("malformed sample: {0}")]
    Malformed(String),

    #[error("{0} is not supported on this platform")]
    Unsupported(&'static str),
}

/// 1, 5 and 15 minute load averages.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LoadAverage {
    pub one: f64,
    pub five: f64,
    pub fifteen: f64,
}

/// Cumulative CPU time counters by state (`user`, `system`, `idle`, ...).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CpuTimes {
    pub buckets: BTreeMap<String, f64>,
}

impl CpuTimes {
    pub fn total(&self) -> f64 {
        self.buckets.values().sum()
    }

    pub fn get(&self, state: &str) -> Option<f64> {
        self.buckets.get(state).copied()
    }

    pub fn states(&self) -> impl Iterator<Item = &str> {
        self.buckets.keys().map(String::as_str)
    }
}

impl<K: Into<String>> FromIterator<(K, f64)> for CpuTimes {
    fn from_iter<I: IntoIterator<Item = (K, f64)>>(iter: I) -> Self {
        Self {
            buckets: iter.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }
}

/// Space on the filesystem holding a path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DiskUsage {
    /// Bytes available to unprivileged users.
    pub free_bytes: u64,
    pub total_bytes: u64,
}

/// One running process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessRecord {
    pub pid: u32,
    pub name: String,
    /// Owner login, if it could be resolved.
    pub owner: Option<String>,
    pub rss_bytes: u64,
}

/// Source of host measurements.
pub trait Sampler {
    fn load_average(&self) -> Result<LoadAverage, SampleError>;

    fn cpu_times(&self) -> Result<CpuTimes, SampleError>;

    fn disk_usage(&self, path: &Path) -> Result<DiskUsage, SampleError>;

    fn processes(&self) -> Result<Vec<ProcessRecord>, SampleError>;

    /// Whether a login with this name exists on the host.
    fn user_exists(&self, name: &str) -> Result<bool, SampleError>;
}

// ── Live host ──────────────────────────────────────────────────────

/// Reads the running host through `sysinfo`, `statvfs` and `/proc`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemSampler;

impl SystemSampler {
    pub fn new() -> Self {
        Self
    }
}

impl Sampler for SystemSampler {
    fn load_average(&self) -> Result<LoadAverage, SampleError> {
        if !sysinfo::IS_SUPPORTED_SYSTEM {
            return Err(SampleError::Unsupported("load average"));
        }
        let avg = sysinfo::System::load_average();
        Ok(LoadAverage {
            one: avg.one,
            five: avg.five,
            fifteen: avg.fifteen,
        })
    }

    #[cfg(target_os = "linux")]
    fn cpu_times(&self) -> Result<CpuTimes, SampleError> {
        let content = std::fs::read_to_string("/proc/stat")?;
        parse_proc_stat(&content)
    }

    #[cfg(not(target_os = "linux"))]
    fn cpu_times(&self) -> Result<CpuTimes, SampleError> {
        Err(SampleError::Unsupported("CPU time counters"))
    }

    #[cfg(unix)]
    fn disk_usage(&self, path: &Path) -> Result<DiskUsage, SampleError> {
        statvfs(path)
    }

    #[cfg(not(unix))]
    fn disk_usage(&self, _path: &Path) -> Result<DiskUsage, SampleError> {
        Err(SampleError::Unsupported("disk usage"))
    }

    fn processes(&self) -> Result<Vec<ProcessRecord>, SampleError> {
        use sysinfo::{ProcessRefreshKind, ProcessesToUpdate, System, Users};

        if !sysinfo::IS_SUPPORTED_SYSTEM {
            return Err(SampleError::Unsupported("process listing"));
        }
        let mut system = System::new();
        system.refresh_processes_specifics(
            ProcessesToUpdate::All,
            true,
            ProcessRefreshKind::everything(),
        );
        let users = Users::new_with_refreshed_list();

        let records = system
            .processes()
            .values()
            .map(|process| ProcessRecord {
                pid: process.pid().as_u32(),
                name: process.name().to_string_lossy().into_owned(),
                owner: process
                    .user_id()
                    .and_then(|uid| users.get_user_by_id(uid))
                    .map(|user| user.name().to_string()),
                rss_bytes: process.memory(),
            })
            .collect();
        Ok(records)
    }

    fn user_exists(&self, name: &str) -> Result<bool, SampleError> {
        if !sysinfo::IS_SUPPORTED_SYSTEM {
            return Err(SampleError::Unsupported("user lookup"));
        }
        let users = sysinfo::Users::new_with_refreshed_list();
        Ok(users.list().iter().any(|user| user.name() == name))
    }
}

/// Field order of the aggregate `cpu` line in `/proc/stat`.
const PROC_STAT_FIELDS: [&str; 10] = [
    "user", "nice", "system", "idle", "iowait", "irq", "softirq", "steal", "guest", "guest_nice",
];

/// Parse the aggregate `cpu` line of `/proc/stat`.
///
/// `guest` time is already counted in `user` (and `guest_nice` in `nice`),
/// so it is subtracted to keep the buckets disjoint.
pub fn parse_proc_stat(content: &str) -> Result<CpuTimes, SampleError> {
    let line = content
        .lines()
        .find(|line| line.split_whitespace().next() == Some("cpu"))
        .ok_or_else(|| SampleError::Malformed("no aggregate cpu line".into()))?;

    let mut buckets = BTreeMap::new();
    for (name, raw) in PROC_STAT_FIELDS.iter().zip(line.split_whitespace().skip(1)) {
        let ticks: u64 = raw
            .parse()
            .map_err(|_| SampleError::Malformed(format!("{name} counter {raw:?}")))?;
        buckets.insert(name.to_string(), ticks as f64);
    }
    if buckets.len() < 4 {
        return Err(SampleError::Malformed(format!(
            "expected at least 4 cpu counters, found {}",
            buckets.len()
        )));
    }

    for (total, guest) in [("user", "guest"), ("nice", "guest_nice")] {
        if let Some(g) = buckets.get(guest).copied() {
            if let Some(t) = buckets.get_mut(total) {
                *t = (*t - g).max(0.0);
            }
        }
    }
    Ok(CpuTimes { buckets })
}

#[cfg(unix)]
fn statvfs(path: &Path) -> Result<DiskUsage, SampleError> {
    use std::ffi::CString;
    use std::os::unix::ffi::OsStrExt;

    let c_path = CString::new(path.as_os_str().as_bytes())
        .map_err(|_| SampleError::Malformed(format!("{} contains a NUL byte", path.display())))?;

    // SAFETY: `statvfs` is plain old data; an all-zero value is valid.
    let mut stat: libc::statvfs = unsafe { std::mem::zeroed() };
    // SAFETY: `c_path` is NUL-terminated and `stat` is a valid out-pointer.
    let rc = unsafe { libc::statvfs(c_path.as_ptr(), &mut stat) };
    if rc != 0 {
        return Err(std::io::Error::last_os_error().into());
    }

    let fragment = stat.f_frsize as u64;
    Ok(DiskUsage {
        free_bytes: stat.f_bavail as u64 * fragment,
        total_bytes: stat.f_blocks as u64 * fragment,
    })
}

// ── Scripted ───────────────────────────────────────────────────────

/// Sampler returning fixed values. Unset measurements fail with
/// `NotFound`, which lets tests drive the UNKNOWN paths.
#[derive(Debug, Clone, Default)]
pub struct MockSampler {
    pub load: Option<LoadAverage>,
    pub cpu: Option<CpuTimes>,
    pub disk: Option<DiskUsage>,
    pub processes: Option<Vec<ProcessRecord>>,
    pub users: Vec<String>,
}

impl MockSampler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_load(mut self, one: f64, five: f64, fifteen: f64) -> Self {
        self.load = Some(LoadAverage { one, five, fifteen });
        self
    }

    pub fn with_cpu(mut self, cpu: CpuTimes) -> Self {
        self.cpu = Some(cpu);
        self
    }

    pub fn with_disk(mut self, free_bytes: u64, total_bytes: u64) -> Self {
        self.disk = Some(DiskUsage {
            free_bytes,
            total_bytes,
        });
        self
    }

    pub fn with_processes(mut self, processes: Vec<ProcessRecord>) -> Self {
        self.processes = Some(processes);
        self
    }

    pub fn with_user(mut self, name: &str) -> Self {
        self.users.push(name.to_string());
        self
    }

    fn missing(what: &str) -> SampleError {
        SampleError::Io(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            format!("{what} not available"),
        ))
    }
}

impl Sampler for MockSampler {
    fn load_average(&self) -> Result<LoadAverage, SampleError> {
        self.load.ok_or_else(|| Self::missing("load average"))
    }

    fn cpu_times(&self) -> Result<CpuTimes, SampleError> {
        self.cpu.clone().ok_or_else(|| Self::missing("cpu times"))
    }

    fn disk_usage(&self, _path: &Path) -> Result<DiskUsage, SampleError> {
        self.disk.ok_or_else(|| Self::missing("disk usage"))
    }

    fn processes(&self) -> Result<Vec<ProcessRecord>, SampleError> {
        self.processes
            .clone()
            .ok_or_else(|| Self::missing("process list"))
    }

    fn user_exists(&self, name: &str) -> Result<bool, SampleError> {
        Ok(self.users.iter().any(|user| user == name))
    }
}
