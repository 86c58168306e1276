//! Configuration for the feed client.

use std::time::Duration;
use zeroeventhub_protocol::{FeedFormat, DEFAULT_PAGE_SIZE_HINT};

/// Configuration for a feed client.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Full URL of the feed endpoint.
    pub url: String,
    /// Number of partitions the server has.
    pub partition_count: u32,
    /// Page size hint used when a fetch does not pass one. 0 lets the
    /// server decide.
    pub default_page_size_hint: u32,
    /// Request timeout, applied by transports that support one.
    pub timeout: Duration,
    /// Preferred response format, sent as the `Accept` header.
    pub accept: FeedFormat,
}

impl ClientConfig {
    /// Creates a new client configuration.
    pub fn new(url: impl Into<String>, partition_count: u32) -> Self {
        Self {
            url: url.into(),
            partition_count,
            default_page_size_hint: DEFAULT_PAGE_SIZE_HINT,
            timeout: Duration::from_secs(30),
            accept: FeedFormat::Ndjson,
        }
    }

    /// Sets the default page size hint.
    pub fn with_default_page_size_hint(mut self, hint: u32) -> Self {
        self.default_page_size_hint = hint;
        self
    }

    /// Sets the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Sets the preferred response format.
    pub fn with_accept(mut self, accept: FeedFormat) -> Self {
        self.accept = accept;
        self
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::new("", 1)
    }
}
