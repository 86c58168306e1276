//! Error types for the protocol crate.

use thiserror::Error;

/// Result type for protocol operations.
pub type ProtocolResult<T> = Result<T, ProtocolError>;

/// Errors that can occur while encoding or decoding protocol units.
#[derive(Error, Debug)]
pub enum ProtocolError {
    /// A fetch was requested without any cursor.
    #[error("need at least one cursor")]
    NoCursors,

    /// A feed line could not be parsed as JSON of the expected shape.
    #[error("malformed feed line {line}: {message}")]
    MalformedLine {
        /// 1-based line (or array element) number.
        line: usize,
        /// Description of the parse failure.
        message: String,
    },

    /// A feed line carried neither a cursor nor data.
    #[error("feed line {line}: cursor and data are both empty")]
    EmptyLine {
        /// 1-based line (or array element) number.
        line: usize,
    },

    /// A query string could not be interpreted as a feed request.
    #[error("invalid query: {0}")]
    InvalidQuery(String),

    /// JSON serialization error.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

impl ProtocolError {
    /// Creates a malformed line error.
    pub fn malformed_line(line: usize, message: impl Into<String>) -> Self {
        Self::MalformedLine {
            line,
            message: message.into(),
        }
    }

    /// Returns true if the error describes a bad response body.
    pub fn is_malformed(&self) -> bool {
        matches!(
            self,
            ProtocolError::MalformedLine { .. } | ProtocolError::EmptyLine { .. }
        )
    }
}
