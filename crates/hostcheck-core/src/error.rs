//! Error types for range parsing and result validation.

use thiserror::Error;

/// A threshold string that does not follow the range grammar.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid range specification {input:?}: {reason}")]
pub struct RangeParseError {
    pub input: String,
    pub reason: String,
}

impl RangeParseError {
    pub(crate) fn new(input: &str, reason: impl Into<String>) -> Self {
        Self {
            input: input.to_string(),
            reason: reason.into(),
        }
    }
}

/// A mutation of a [`CheckResult`](crate::CheckResult) that would break the
/// output contract.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("message must not contain the pipe '|' character")]
    PipeInMessage,

    #[error("perfdata key must not be empty")]
    EmptyKey,

    #[error("perfdata key {0:?} must not contain '=' or '|'")]
    InvalidKey(String),

    #[error("perfdata value for {0:?} must be a finite number")]
    NonFiniteValue(String),

    #[error("perfdata text for {0:?} must be a single line")]
    MultilineValue(String),
}
