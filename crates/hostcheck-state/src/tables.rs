//! redb table definitions.

use redb::TableDefinition;

/// Serialized samples keyed by unix timestamp in seconds.
pub const SNAPSHOTS: TableDefinition<&str, &str> = TableDefinition::new("snapshots");
