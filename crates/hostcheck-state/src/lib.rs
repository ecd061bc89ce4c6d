//! On-disk memory for probes that compare against earlier
//! samples.
//!
//! Backed by [redb](https://docs.rs/redb). A single string-keyed table holds
//! serialized samples. The store takes no cross-process lock beyond what
//! redb itself does, so callers treat a missing or unreadable entry as "no
//! history yet" rather than as a failure.

pub mod error;
pub mod store;
pub mod tables;

pub use error::{StateError, StateResult};
pub use store::SnapshotStore;
