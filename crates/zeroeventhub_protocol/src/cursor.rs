//! Per-partition resume positions.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Cursor value meaning "the beginning of the partition".
pub const FIRST_CURSOR: &str = "_first";

/// Cursor value meaning "the end of the partition".
pub const LAST_CURSOR: &str = "_last";

/// A resume position within one partition.
///
/// The value is opaque to the protocol: the server hands it out in a
/// checkpoint and the client sends it back unchanged on the next fetch.
/// Only [`FIRST_CURSOR`] and [`LAST_CURSOR`] carry meaning of their own.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Cursor {
    partition_id: u32,
    value: String,
}

impl Cursor {
    /// Creates a cursor for a partition.
    pub fn new(partition_id: u32, value: impl Into<String>) -> Self {
        Self {
            partition_id,
            value: value.into(),
        }
    }

    /// Creates a cursor pointing at the beginning of a partition.
    pub fn first(partition_id: u32) -> Self {
        Self::new(partition_id, FIRST_CURSOR)
    }

    /// Creates a cursor pointing at the end of a partition.
    pub fn last(partition_id: u32) -> Self {
        Self::new(partition_id, LAST_CURSOR)
    }

    /// Returns the partition this cursor belongs to.
    pub fn partition_id(&self) -> u32 {
        self.partition_id
    }

    /// Returns the opaque cursor value.
    pub fn value(&self) -> &str {
        &self.value
    }

    /// Returns true if this is the `_first` sentinel.
    pub fn is_first(&self) -> bool {
        self.value == FIRST_CURSOR
    }

    /// Returns true if this is the `_last` sentinel.
    pub fn is_last(&self) -> bool {
        self.value == LAST_CURSOR
    }

    /// Returns the query parameter name carrying this cursor.
    pub fn query_key(&self) -> String {
        cursor_key(self.partition_id)
    }
}

impl fmt::Display for Cursor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.partition_id, self.value)
    }
}

/// Returns the query parameter name for a partition's cursor.
pub(crate) fn cursor_key(partition_id: u32) -> String {
    format!("cursor{}", partition_id)
}
