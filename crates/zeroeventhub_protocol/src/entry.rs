//! Server-side feed entries.

use crate::line::Headers;
use serde::Serialize;

/// One element of a feed response, as produced by a server.
///
/// Serializes according to its variant: an event emits
/// `{"partition", "headers"?, "data"}` and a checkpoint emits
/// `{"partition", "cursor"}`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FeedEntry<E> {
    /// An event in a partition.
    Event {
        /// Partition ID.
        partition: u32,
        /// Event headers, omitted when `None`.
        #[serde(skip_serializing_if = "Option::is_none")]
        headers: Option<Headers>,
        /// Event payload.
        data: E,
    },
    /// Marks that every preceding event of the partition has been delivered.
    Checkpoint {
        /// Partition ID.
        partition: u32,
        /// New cursor value for the partition.
        cursor: String,
    },
}

impl<E> FeedEntry<E> {
    /// Creates an event entry without headers.
    pub fn event(partition: u32, data: E) -> Self {
        Self::Event {
            partition,
            headers: None,
            data,
        }
    }

    /// Creates a checkpoint entry.
    pub fn checkpoint(partition: u32, cursor: impl Into<String>) -> Self {
        Self::Checkpoint {
            partition,
            cursor: cursor.into(),
        }
    }

    /// Returns the partition this entry belongs to.
    pub fn partition(&self) -> u32 {
        match self {
            FeedEntry::Event { partition, .. } | FeedEntry::Checkpoint { partition, .. } => {
                *partition
            }
        }
    }

    /// Returns true if this is a checkpoint entry.
    pub fn is_checkpoint(&self) -> bool {
        matches!(self, FeedEntry::Checkpoint { .. })
    }
}
