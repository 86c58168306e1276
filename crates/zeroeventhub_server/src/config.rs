//! Server configuration.

use zeroeventhub_protocol::FeedFormat;

/// Configuration for a feed server.
///
/// The partition count is not configured here; it always comes from the
/// handler's feed source.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Maximum events returned per partition in one response.
    /// Also the page size used when the client gives no hint.
    pub max_page_size: u32,
    /// Format used when the client accepts anything.
    pub default_format: FeedFormat,
}

impl ServerConfig {
    /// Creates a new server configuration.
    pub fn new() -> Self {
        Self {
            max_page_size: 100,
            default_format: FeedFormat::Ndjson,
        }
    }

    /// Sets the maximum page size.
    pub fn with_max_page_size(mut self, size: u32) -> Self {
        self.max_page_size = size;
        self
    }

    /// Sets the default response format.
    pub fn with_default_format(mut self, format: FeedFormat) -> Self {
        self.default_format = format;
        self
    }

    /// Returns the page size to use for a client hint.
    pub fn page_size(&self, hint: Option<u32>) -> u32 {
        match hint {
            Some(hint) => hint.min(self.max_page_size),
            None => self.max_page_size,
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self::new()
    }
}
