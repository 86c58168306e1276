//! The wire line schema shared by clients and servers.
//!
//! Every element of a feed response, whether it arrives as one line of
//! NDJSON or as one element of a JSON array, has the shape
//!
//! ```text
//! {"partition": int, "cursor"?: string, "headers"?: {string: string}, "data"?: any}
//! ```
//!
//! A non-empty `cursor` makes the element a checkpoint; otherwise it must
//! carry non-null `data` and is an event.

use crate::error::{ProtocolError, ProtocolResult};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Event headers as carried on the wire.
pub type Headers = BTreeMap<String, String>;

/// The raw serde shape of a feed element.
///
/// `null` and absent fields are equivalent. A missing `partition` reads
/// as partition 0.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WireLine {
    /// Partition the element belongs to.
    #[serde(default)]
    pub partition: u32,
    /// New cursor value, present on checkpoints.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cursor: Option<String>,
    /// Event headers, if requested and available.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub headers: Option<Headers>,
    /// Event payload, present on events.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

/// A classified feed element.
#[derive(Debug, Clone, PartialEq)]
pub enum FeedLine {
    /// An event in a partition.
    Event {
        /// Partition ID.
        partition_id: u32,
        /// Event headers, if any.
        headers: Option<Headers>,
        /// Opaque event payload.
        data: Value,
    },
    /// The partition's cursor advanced past every event before it.
    Checkpoint {
        /// Partition ID.
        partition_id: u32,
        /// The new cursor value.
        cursor: String,
    },
}

impl FeedLine {
    /// Creates an event line.
    pub fn event(partition_id: u32, headers: Option<Headers>, data: Value) -> Self {
        Self::Event {
            partition_id,
            headers,
            data,
        }
    }

    /// Creates a checkpoint line.
    pub fn checkpoint(partition_id: u32, cursor: impl Into<String>) -> Self {
        Self::Checkpoint {
            partition_id,
            cursor: cursor.into(),
        }
    }

    /// Parses one line of NDJSON text.
    ///
    /// `line` is the 1-based position used in error messages. Returns
    /// `Ok(None)` when the line is the JSON literal `null`.
    pub fn parse(line: usize, text: &str) -> ProtocolResult<Option<Self>> {
        let value: Value = serde_json::from_str(text)
            .map_err(|e| ProtocolError::malformed_line(line, e.to_string()))?;
        Self::from_value(line, value)
    }

    /// Interprets an already-parsed JSON value, such as an array element.
    ///
    /// Returns `Ok(None)` when the value is `null`. Anything other than an
    /// object or `null` is malformed.
    pub fn from_value(line: usize, value: Value) -> ProtocolResult<Option<Self>> {
        if value.is_null() {
            return Ok(None);
        }
        if !value.is_object() {
            return Err(ProtocolError::malformed_line(line, "expected a JSON object"));
        }
        let wire: WireLine = serde_json::from_value(value)
            .map_err(|e| ProtocolError::malformed_line(line, e.to_string()))?;
        Self::classify(line, wire).map(Some)
    }

    /// Classifies a wire element as an event or a checkpoint.
    pub fn classify(line: usize, wire: WireLine) -> ProtocolResult<Self> {
        match wire.cursor {
            Some(cursor) if !cursor.is_empty() => Ok(Self::Checkpoint {
                partition_id: wire.partition,
                cursor,
            }),
            _ => match wire.data {
                Some(data) if !data.is_null() => Ok(Self::Event {
                    partition_id: wire.partition,
                    headers: wire.headers,
                    data,
                }),
                _ => Err(ProtocolError::EmptyLine { line }),
            },
        }
    }

    /// Returns the partition this line belongs to.
    pub fn partition_id(&self) -> u32 {
        match self {
            FeedLine::Event { partition_id, .. } | FeedLine::Checkpoint { partition_id, .. } => {
                *partition_id
            }
        }
    }

    /// Returns true if this is a checkpoint.
    pub fn is_checkpoint(&self) -> bool {
        matches!(self, FeedLine::Checkpoint { .. })
    }

    /// Converts back to the wire shape.
    pub fn to_wire(&self) -> WireLine {
        match self {
            FeedLine::Event {
                partition_id,
                headers,
                data,
            } => WireLine {
                partition: *partition_id,
                cursor: None,
                headers: headers.clone(),
                data: Some(data.clone()),
            },
            FeedLine::Checkpoint {
                partition_id,
                cursor,
            } => WireLine {
                partition: *partition_id,
                cursor: Some(cursor.clone()),
                headers: None,
                data: None,
            },
        }
    }

    /// Serializes to a single NDJSON line, without the trailing newline.
    pub fn to_json_line(&self) -> ProtocolResult<String> {
        Ok(serde_json::to_string(&self.to_wire())?)
    }
}
