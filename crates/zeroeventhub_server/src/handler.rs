//! Request handling for the feed endpoint.

use crate::config::ServerConfig;
use crate::encoder::encode_feed;
use crate::error::{ServerError, ServerResult};
use crate::format::render;
use crate::source::{FeedSource, FetchRequest};
use std::sync::Arc;
use tracing::{debug, warn};
use zeroeventhub_protocol::{FeedEntry, FeedFormat, FeedQuery};

/// A rendered feed response, ready to hand to an HTTP layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedResponse {
    /// HTTP status code.
    pub status: u16,
    /// Media type of the body, if there is one.
    pub content_type: Option<&'static str>,
    /// Response body.
    pub body: Vec<u8>,
}

impl FeedResponse {
    fn ok(format: FeedFormat, body: Vec<u8>) -> Self {
        Self {
            status: 200,
            content_type: Some(format.content_type()),
            body,
        }
    }

    fn from_error(err: &ServerError) -> Self {
        match err {
            // 406 carries no body.
            ServerError::NotAcceptable(_) => Self {
                status: 406,
                content_type: None,
                body: Vec::new(),
            },
            other => Self {
                status: other.status_code(),
                content_type: Some("text/plain; charset=utf-8"),
                body: other.to_string().into_bytes(),
            },
        }
    }

    /// Returns true for 2xx responses.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Returns the body as text, if it is valid UTF-8.
    pub fn body_text(&self) -> Option<&str> {
        std::str::from_utf8(&self.body).ok()
    }
}

/// Handles feed requests against a [`FeedSource`].
pub struct FeedHandler<S: FeedSource> {
    config: ServerConfig,
    source: Arc<S>,
}

impl<S: FeedSource> FeedHandler<S> {
    /// Creates a new handler.
    pub fn new(config: ServerConfig, source: Arc<S>) -> Self {
        Self { config, source }
    }

    /// Returns the handler configuration.
    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Returns the feed source.
    pub fn source(&self) -> &Arc<S> {
        &self.source
    }

    /// Checks a parsed query against the source's partitioning.
    pub fn validate(&self, query: &FeedQuery) -> ServerResult<()> {
        let partition_count = self.source.partition_count();
        if query.partition_count != partition_count {
            return Err(ServerError::InvalidRequest(format!(
                "partition count mismatch: server has {}, client sent n={}",
                partition_count, query.partition_count
            )));
        }
        if let Some(cursor) = query
            .cursors
            .iter()
            .find(|c| c.partition_id() >= partition_count)
        {
            return Err(ServerError::InvalidRequest(format!(
                "cursor for partition {} but n={}",
                cursor.partition_id(),
                partition_count
            )));
        }
        Ok(())
    }

    /// Fetches every requested partition and encodes the result.
    pub fn fetch_entries(&self, query: &FeedQuery) -> ServerResult<Vec<FeedEntry<S::Event>>> {
        self.validate(query)?;
        let page_size = self.config.page_size(query.page_size_hint);

        let mut results = Vec::with_capacity(query.cursors.len());
        for cursor in &query.cursors {
            let result = self.source.fetch(&FetchRequest {
                cursor,
                page_size,
                headers: &query.headers,
            })?;
            results.push((cursor.partition_id(), result));
        }
        Ok(encode_feed(results))
    }

    /// Handles one request from its decoded query pairs and `Accept` header.
    pub fn handle<I, K, V>(&self, pairs: I, accept: Option<&str>) -> FeedResponse
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        match self.try_handle(pairs, accept) {
            Ok((format, body)) => FeedResponse::ok(format, body),
            Err(err) => {
                warn!(status = err.status_code(), error = %err, "feed request rejected");
                FeedResponse::from_error(&err)
            }
        }
    }

    fn try_handle<I, K, V>(
        &self,
        pairs: I,
        accept: Option<&str>,
    ) -> ServerResult<(FeedFormat, Vec<u8>)>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let query = FeedQuery::parse(pairs)?;
        let format = FeedFormat::negotiate(accept, self.config.default_format)
            .ok_or_else(|| ServerError::NotAcceptable(accept.unwrap_or_default().to_string()))?;

        let entries = self.fetch_entries(&query)?;
        debug!(
            partitions = query.cursors.len(),
            entries = entries.len(),
            format = %format,
            "serving feed"
        );
        Ok((format, render(format, &entries)?))
    }
}
