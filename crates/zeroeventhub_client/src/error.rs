//! Error types for the feed client.

use thiserror::Error;
use zeroeventhub_protocol::ProtocolError;

/// Result type for client operations.
pub type ClientResult<T> = Result<T, ClientError>;

/// Errors that can occur while fetching a feed.
///
/// None of these are retried internally. A `MalformedResponse` or
/// `Cancelled` raised during decoding leaves every line before the failure
/// applied to the sink.
#[derive(Error, Debug)]
pub enum ClientError {
    /// The request was rejected before any I/O.
    #[error("invalid request: {0}")]
    Validation(String),

    /// Network failure or non-success status.
    #[error("transport error: {message}")]
    Transport {
        /// Error message.
        message: String,
        /// HTTP status, when a response was received.
        status: Option<u16>,
    },

    /// The response body could not be decoded.
    #[error("malformed response: {0}")]
    MalformedResponse(String),

    /// The request hook failed; nothing was sent.
    #[error("request hook failed: {0}")]
    RequestHook(String),

    /// The fetch was cancelled.
    #[error("fetch cancelled")]
    Cancelled,
}

impl ClientError {
    /// Creates a transport error for a network-level failure.
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
            status: None,
        }
    }

    /// Creates a transport error for a non-success status.
    pub fn status(status: u16) -> Self {
        Self::Transport {
            message: format!("response status code does not indicate success: {status}"),
            status: Some(status),
        }
    }

    /// Creates a malformed response error.
    pub fn malformed(message: impl Into<String>) -> Self {
        Self::MalformedResponse(message.into())
    }

    /// Returns true if retrying the same fetch later may succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            ClientError::Transport { status: None, .. } => true,
            ClientError::Transport {
                status: Some(status),
                ..
            } => *status == 429 || *status >= 500,
            _ => false,
        }
    }
}

impl From<ProtocolError> for ClientError {
    fn from(err: ProtocolError) -> Self {
        match err {
            ProtocolError::NoCursors => ClientError::Validation(err.to_string()),
            other => ClientError::MalformedResponse(other.to_string()),
        }
    }
}
