//! Transport layer abstraction for feed requests.

use parking_lot::Mutex;
use zeroeventhub_protocol::{is_feed_param, QueryParams};

/// An outgoing feed request.
///
/// The request hook receives this before it is sent and may add headers
/// (for example credentials) or adjust the URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedRequest {
    /// Feed endpoint URL, without the feed query.
    pub url: String,
    /// Feed query parameters.
    pub query: QueryParams,
    /// Request headers.
    pub headers: Vec<(String, String)>,
}

impl FeedRequest {
    /// Creates a request without headers.
    pub fn new(url: impl Into<String>, query: QueryParams) -> Self {
        Self {
            url: url.into(),
            query,
            headers: Vec::new(),
        }
    }

    /// Sets a header, replacing any header with the same name
    /// (names compare case-insensitively).
    pub fn set_header(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self
            .headers
            .iter_mut()
            .find(|(n, _)| n.eq_ignore_ascii_case(&name))
        {
            Some(header) => header.1 = value,
            None => self.headers.push((name, value)),
        }
    }

    /// Returns the value of a header.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Returns the URL with the feed query merged in.
    ///
    /// Parameters already on `url` are kept unless they are feed
    /// parameters (`n`, `pagesizehint`, `headers`, `cursor<id>`), which the
    /// feed query replaces.
    pub fn full_url(&self) -> String {
        if self.query.is_empty() {
            return self.url.clone();
        }
        let (base, existing) = match self.url.split_once('?') {
            Some((base, existing)) => (base, existing),
            None => (self.url.as_str(), ""),
        };
        let feed = self.query.to_query_string();
        let merged: Vec<&str> = existing
            .split('&')
            .filter(|pair| !pair.is_empty())
            .filter(|pair| {
                let name = pair.split_once('=').map_or(*pair, |(name, _)| name);
                !is_feed_param(name)
            })
            .chain(std::iter::once(feed.as_str()))
            .collect();
        format!("{}?{}", base, merged.join("&"))
    }
}

/// A response as seen by the client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    /// HTTP status code.
    pub status: u16,
    /// Response body. Transports may leave this empty for non-success
    /// statuses, since the client never reads it.
    pub body: String,
}

impl HttpResponse {
    /// Creates a response.
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// Creates a 200 response.
    pub fn ok(body: impl Into<String>) -> Self {
        Self::new(200, body)
    }

    /// Returns true for 2xx statuses.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// HTTP client abstraction.
///
/// Implement this trait to provide the actual HTTP transport. Connection
/// pooling, TLS and retries belong to the implementation.
pub trait HttpClient: Send + Sync {
    /// Sends a GET request and returns the response.
    ///
    /// `Err` means no response was received.
    fn get(&self, request: &FeedRequest) -> Result<HttpResponse, String>;
}

impl<C: HttpClient + ?Sized> HttpClient for &C {
    fn get(&self, request: &FeedRequest) -> Result<HttpResponse, String> {
        (**self).get(request)
    }
}

impl<C: HttpClient + ?Sized> HttpClient for Box<C> {
    fn get(&self, request: &FeedRequest) -> Result<HttpResponse, String> {
        (**self).get(request)
    }
}

/// A one-shot hook run on every request before it is sent.
///
/// An error aborts the fetch before any network I/O.
pub type RequestHook = Box<dyn Fn(&mut FeedRequest) -> Result<(), String> + Send + Sync>;

/// A mock HTTP client for testing.
///
/// Returns a canned response (or error) and records every request.
#[derive(Debug, Default)]
pub struct MockHttpClient {
    response: Mutex<Option<Result<HttpResponse, String>>>,
    requests: Mutex<Vec<FeedRequest>>,
}

impl MockHttpClient {
    /// Creates a mock with no response set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a mock answering every request with `response`.
    pub fn with_response(response: HttpResponse) -> Self {
        let mock = Self::new();
        mock.set_response(response);
        mock
    }

    /// Sets the response.
    pub fn set_response(&self, response: HttpResponse) {
        *self.response.lock() = Some(Ok(response));
    }

    /// Makes every request fail at the network level.
    pub fn set_error(&self, message: impl Into<String>) {
        *self.response.lock() = Some(Err(message.into()));
    }

    /// Returns the requests received so far.
    pub fn requests(&self) -> Vec<FeedRequest> {
        self.requests.lock().clone()
    }

    /// Returns the number of requests received so far.
    pub fn request_count(&self) -> usize {
        self.requests.lock().len()
    }
}

impl HttpClient for MockHttpClient {
    fn get(&self, request: &FeedRequest) -> Result<HttpResponse, String> {
        self.requests.lock().push(request.clone());
        self.response
            .lock()
            .clone()
            .unwrap_or_else(|| Err("No mock response set".into()))
    }
}
