//! Error types for the feed server.

use thiserror::Error;
use zeroeventhub_protocol::ProtocolError;

/// Result type for server operations.
pub type ServerResult<T> = Result<T, ServerError>;

/// Errors that can occur while serving a feed request.
#[derive(Error, Debug)]
pub enum ServerError {
    /// Invalid request format.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// A cursor does not denote a position in its partition.
    #[error("invalid cursor {cursor:?} for partition {partition_id}")]
    InvalidCursor {
        /// Partition ID.
        partition_id: u32,
        /// The rejected cursor value.
        cursor: String,
    },

    /// None of the requested media types can be produced.
    #[error("not acceptable: {0}")]
    NotAcceptable(String),

    /// An event's payload serialized to `null`, which the wire cannot
    /// tell apart from a missing payload.
    #[error("event in partition {partition_id} has a null payload")]
    NullPayload {
        /// Partition ID.
        partition_id: u32,
    },

    /// The feed source failed to produce events.
    #[error("feed source error: {0}")]
    Source(String),

    /// Serialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// I/O error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl ServerError {
    /// Returns true if this is a client error (4xx).
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            ServerError::InvalidRequest(_)
                | ServerError::InvalidCursor { .. }
                | ServerError::NotAcceptable(_)
        )
    }

    /// Returns true if this is a server error (5xx).
    pub fn is_server_error(&self) -> bool {
        matches!(
            self,
            ServerError::NullPayload { .. }
                | ServerError::Source(_)
                | ServerError::Serialization(_)
                | ServerError::Io(_)
        )
    }

    /// Returns the HTTP status code for this error.
    pub fn status_code(&self) -> u16 {
        match self {
            ServerError::InvalidRequest(_) | ServerError::InvalidCursor { .. } => 400,
            ServerError::NotAcceptable(_) => 406,
            ServerError::NullPayload { .. }
            | ServerError::Source(_)
            | ServerError::Serialization(_)
            | ServerError::Io(_) => 500,
        }
    }
}

impl From<ProtocolError> for ServerError {
    fn from(err: ProtocolError) -> Self {
        match err {
            ProtocolError::Json(e) => ServerError::Serialization(e),
            other => ServerError::InvalidRequest(other.to_string()),
        }
    }
}
