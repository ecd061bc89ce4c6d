//! Check status and its two mappings: severity order and exit code.

use std::fmt;

/// Outcome of a check as understood by the monitoring host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Status {
    Ok,
    Warn,
    Critical,
    /// The check itself could not run. Not part of the severity ladder.
    Unknown,
}

impl Status {
    /// Rank used for escalation. UNKNOWN is handled separately by
    /// [`Status::escalate`].
    fn severity(self) -> u8 {
        match self {
            Status::Ok => 0,
            Status::Warn => 1,
            Status::Critical => 2,
            Status::Unknown => 3,
        }
    }

    /// Process exit code reported to the monitoring host.
    pub fn exit_code(self) -> i32 {
        match self {
            Status::Ok => 0,
            Status::Warn => 1,
            Status::Critical => 2,
            Status::Unknown => 3,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Status::Ok => "OK",
            Status::Warn => "WARN",
            Status::Critical => "CRITICAL",
            Status::Unknown => "UNKNOWN",
        }
    }

    /// Combine the current status with a candidate, never downgrading.
    /// UNKNOWN absorbs everything once reached.
    pub fn escalate(self, candidate: Status) -> Status {
        if self == Status::Unknown || candidate == Status::Unknown {
            return Status::Unknown;
        }
        if candidate.severity() > self.severity() {
            candidate
        } else {
            self
        }
    }

    pub fn is_unknown(self) -> bool {
        self == Status::Unknown
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
