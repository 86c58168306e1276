//! The feed client.

use crate::cancel::CancellationToken;
use crate::config::ClientConfig;
use crate::decoder::{decode_into, FetchSummary};
use crate::error::{ClientError, ClientResult};
use crate::sink::EventSink;
use crate::transport::{FeedRequest, HttpClient, RequestHook};
use std::fmt;
use tracing::debug;
use zeroeventhub_protocol::{encode_query, Cursor, HeaderSelection};

/// Header carrying the preferred response format.
const ACCEPT_HEADER: &str = "Accept";

/// Fetches pages of a ZeroEventHub feed.
///
/// Each fetch is one request/response exchange: the cursors are encoded
/// into a query, the request hook runs, the transport sends the request,
/// and the body is decoded line by line into an [`EventSink`].
///
/// The client keeps no state between fetches. Resuming is done by passing
/// the sink's latest checkpoints back in as cursors.
pub struct Client<C: HttpClient> {
    config: ClientConfig,
    http: C,
    request_hook: Option<RequestHook>,
}

impl<C: HttpClient> Client<C> {
    /// Creates a client over the given transport.
    pub fn new(config: ClientConfig, http: C) -> Self {
        Self {
            config,
            http,
            request_hook: None,
        }
    }

    /// Installs a hook run on every request just before it is sent.
    pub fn with_request_hook<F>(mut self, hook: F) -> Self
    where
        F: Fn(&mut FeedRequest) -> Result<(), String> + Send + Sync + 'static,
    {
        self.request_hook = Some(Box::new(hook));
        self
    }

    /// Returns the configuration.
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Returns the transport.
    pub fn http(&self) -> &C {
        &self.http
    }

    /// Fetches events for `cursors` without headers.
    ///
    /// A `page_size_hint` of 0 falls back to the configured default.
    pub fn fetch_events<S>(
        &self,
        cursors: &[Cursor],
        page_size_hint: u32,
        sink: &mut S,
    ) -> ClientResult<FetchSummary>
    where
        S: EventSink + ?Sized,
    {
        self.fetch_events_with(
            cursors,
            page_size_hint,
            &HeaderSelection::None,
            sink,
            &CancellationToken::new(),
        )
    }

    /// Fetches events for a single partition.
    pub fn fetch_partition<S>(
        &self,
        cursor: &Cursor,
        page_size_hint: u32,
        sink: &mut S,
    ) -> ClientResult<FetchSummary>
    where
        S: EventSink + ?Sized,
    {
        self.fetch_events(std::slice::from_ref(cursor), page_size_hint, sink)
    }

    /// Fetches events, requesting `headers` and observing `cancel`.
    ///
    /// # Errors
    ///
    /// - [`ClientError::Validation`] if `cursors` is empty.
    /// - [`ClientError::RequestHook`] if the hook fails; nothing is sent.
    /// - [`ClientError::Transport`] on a network failure or non-2xx status;
    ///   the sink is untouched.
    /// - [`ClientError::MalformedResponse`] or [`ClientError::Cancelled`]
    ///   during decoding; lines before the failure stay applied.
    pub fn fetch_events_with<S>(
        &self,
        cursors: &[Cursor],
        page_size_hint: u32,
        headers: &HeaderSelection,
        sink: &mut S,
        cancel: &CancellationToken,
    ) -> ClientResult<FetchSummary>
    where
        S: EventSink + ?Sized,
    {
        let request = self.build_request(cursors, page_size_hint, headers)?;
        cancel.check()?;
        let request = self.prepare(request)?;
        cancel.check()?;

        debug!(
            url = %request.url,
            query = %request.query.to_query_string(),
            "fetching feed"
        );
        let response = self
            .http
            .get(&request)
            .map_err(ClientError::transport)?;
        cancel.check()?;

        debug!(status = response.status, "feed response");
        if !response.is_success() {
            return Err(ClientError::status(response.status));
        }

        let summary = decode_into(&response.body, sink, cancel)?;
        debug!(
            events = summary.events,
            checkpoints = summary.checkpoints,
            "feed fetched"
        );
        Ok(summary)
    }

    fn build_request(
        &self,
        cursors: &[Cursor],
        page_size_hint: u32,
        headers: &HeaderSelection,
    ) -> ClientResult<FeedRequest> {
        let hint = if page_size_hint == 0 {
            self.config.default_page_size_hint
        } else {
            page_size_hint
        };
        let query = encode_query(cursors, self.config.partition_count, hint, headers)?;

        let mut request = FeedRequest::new(self.config.url.clone(), query);
        request.set_header(ACCEPT_HEADER, self.config.accept.content_type());
        Ok(request)
    }

    fn prepare(&self, mut request: FeedRequest) -> ClientResult<FeedRequest> {
        if let Some(hook) = &self.request_hook {
            hook(&mut request).map_err(ClientError::RequestHook)?;
        }
        Ok(request)
    }
}

impl<C: HttpClient + fmt::Debug> fmt::Debug for Client<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Client")
            .field("config", &self.config)
            .field("http", &self.http)
            .field("request_hook", &self.request_hook.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sink::EventLog;
    use crate::transport::{HttpResponse, MockHttpClient};
    use serde::Deserialize;
    use serde_json::Value;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use zeroeventhub_protocol::FeedFormat;

    #[derive(Debug, Clone, PartialEq, Deserialize)]
    struct EventData {
        x: u32,
    }

    fn client(mock: MockHttpClient) -> Client<MockHttpClient> {
        Client::new(ClientConfig::new("https://example.invalid/feed/v1", 1), mock)
    }

    #[test]
    fn sends_encoded_query_and_accept_header() {
        let client = client(MockHttpClient::with_response(HttpResponse::ok("")));
        let mut log: EventLog<Value> = EventLog::new();

        client
            .fetch_events_with(
                &[Cursor::first(0)],
                1,
                &HeaderSelection::named(["test1", "test2"]),
                &mut log,
                &CancellationToken::new(),
            )
            .unwrap();

        let requests = client.http().requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(
            requests[0].full_url(),
            "https://example.invalid/feed/v1?n=1&cursor0=_first&pagesizehint=1&headers=test1%2Ctest2"
        );
        assert_eq!(requests[0].header("accept"), Some("application/x-ndjson"));
    }

    #[test]
    fn zero_hint_uses_configured_default() {
        let config = ClientConfig::new("u", 1)
            .with_default_page_size_hint(25)
            .with_accept(FeedFormat::Json);
        let client = Client::new(config, MockHttpClient::with_response(HttpResponse::ok("")));
        let mut log: EventLog<Value> = EventLog::new();

        client.fetch_events(&[Cursor::first(0)], 0, &mut log).unwrap();
        client.fetch_events(&[Cursor::first(0)], 7, &mut log).unwrap();

        let requests = client.http().requests();
        assert_eq!(requests[0].query.get("pagesizehint"), Some("25"));
        assert_eq!(requests[1].query.get("pagesizehint"), Some("7"));
        assert_eq!(requests[0].header("Accept"), Some("application/json"));
    }

    #[test]
    fn no_cursors_is_validation_error_without_io() {
        let client = client(MockHttpClient::with_response(HttpResponse::ok("")));
        let mut log: EventLog<Value> = EventLog::new();

        let err = client.fetch_events(&[], 0, &mut log).unwrap_err();
        assert!(matches!(err, ClientError::Validation(_)));
        assert_eq!(client.http().request_count(), 0);
    }

    #[test]
    fn decodes_checkpoint_and_event() {
        let body = "{\"partition\":0,\"cursor\":\"abc\"}\n\
                    {\"partition\":0,\"headers\":{\"h\":\"v\"},\"data\":{\"x\":1}}";
        let client = client(MockHttpClient::with_response(HttpResponse::ok(body)));
        let mut log: EventLog<EventData> = EventLog::new();

        let summary = client
            .fetch_partition(&Cursor::first(0), 0, &mut log)
            .unwrap();

        assert_eq!(summary.events, 1);
        assert_eq!(summary.checkpoints, 1);
        assert_eq!(log.checkpoints(), &[Cursor::new(0, "abc")]);
        assert_eq!(log.events()[0].data, EventData { x: 1 });
        assert_eq!(
            log.events()[0].headers.as_ref().and_then(|h| h.get("h")),
            Some(&"v".to_string())
        );
        assert_eq!(log.latest_checkpoint(0), Some(&Cursor::new(0, "abc")));
    }

    #[test]
    fn non_success_status_leaves_sink_untouched() {
        let response = HttpResponse::new(404, "{\"partition\":0,\"cursor\":\"x\"}");
        let client = client(MockHttpClient::with_response(response));
        let mut log: EventLog<Value> = EventLog::new();

        let err = client
            .fetch_events(&[Cursor::first(0)], 0, &mut log)
            .unwrap_err();
        match err {
            ClientError::Transport { status, .. } => assert_eq!(status, Some(404)),
            other => panic!("unexpected: {other:?}"),
        }
        assert!(log.checkpoints().is_empty());
        assert!(log.events().is_empty());
    }

    #[test]
    fn network_failure_is_transport_error() {
        let mock = MockHttpClient::new();
        mock.set_error("connection refused");
        let client = client(mock);
        let mut log: EventLog<Value> = EventLog::new();

        let err = client
            .fetch_events(&[Cursor::first(0)], 0, &mut log)
            .unwrap_err();
        assert!(err.is_retryable());
        assert!(err.to_string().contains("connection refused"));
    }

    #[test]
    fn request_hook_runs_once_per_fetch() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let client = client(MockHttpClient::with_response(HttpResponse::ok(""))).with_request_hook(
            move |request| {
                counter.fetch_add(1, Ordering::SeqCst);
                request.set_header("Authorization", "Bearer token");
                Ok(())
            },
        );
        let mut log: EventLog<Value> = EventLog::new();

        client.fetch_events(&[Cursor::first(0)], 0, &mut log).unwrap();
        client.fetch_events(&[Cursor::first(0)], 0, &mut log).unwrap();

        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert_eq!(
            client.http().requests()[0].header("authorization"),
            Some("Bearer token")
        );
    }

    #[test]
    fn failing_hook_aborts_before_send() {
        let client = client(MockHttpClient::with_response(HttpResponse::ok("")))
            .with_request_hook(|_| Err("no credentials".into()));
        let mut log: EventLog<Value> = EventLog::new();

        let err = client
            .fetch_events(&[Cursor::first(0)], 0, &mut log)
            .unwrap_err();
        assert!(matches!(err, ClientError::RequestHook(ref m) if m == "no credentials"));
        assert_eq!(client.http().request_count(), 0);
    }

    #[test]
    fn cancelled_before_send() {
        let client = client(MockHttpClient::with_response(HttpResponse::ok(
            "{\"partition\":0,\"cursor\":\"x\"}",
        )));
        let mut log: EventLog<Value> = EventLog::new();
        let token = CancellationToken::new();
        token.cancel();

        let err = client
            .fetch_events_with(
                &[Cursor::first(0)],
                0,
                &HeaderSelection::None,
                &mut log,
                &token,
            )
            .unwrap_err();
        assert!(matches!(err, ClientError::Cancelled));
        assert_eq!(client.http().request_count(), 0);
        assert!(log.checkpoints().is_empty());
    }
}
