//! HTTP transport implementations.
//!
//! The client itself is transport-agnostic (see [`HttpClient`]). This
//! module provides a loopback transport for in-process servers and, with
//! the `reqwest` feature, a blocking HTTP transport.

use crate::transport::{FeedRequest, HttpClient, HttpResponse};

/// Trait for servers that can handle loopback requests.
pub trait LoopbackServer {
    /// Handles a GET request and returns the response.
    fn handle_get(&self, request: &FeedRequest) -> HttpResponse;
}

/// A loopback HTTP client that routes requests directly to a feed server.
///
/// Useful for testing without actual network overhead.
pub struct LoopbackClient<S: LoopbackServer> {
    server: S,
}

impl<S: LoopbackServer + Send + Sync> LoopbackClient<S> {
    /// Creates a new loopback client connected to the given server.
    pub fn new(server: S) -> Self {
        Self { server }
    }

    /// Returns the server.
    pub fn server(&self) -> &S {
        &self.server
    }
}

impl<S: LoopbackServer + Send + Sync> HttpClient for LoopbackClient<S> {
    fn get(&self, request: &FeedRequest) -> Result<HttpResponse, String> {
        Ok(self.server.handle_get(request))
    }
}

#[cfg(feature = "reqwest")]
pub use self::blocking::ReqwestClient;

#[cfg(feature = "reqwest")]
mod blocking {
    use crate::config::ClientConfig;
    use crate::error::{ClientError, ClientResult};
    use crate::transport::{FeedRequest, HttpClient, HttpResponse};
    use reqwest::blocking::Client;

    /// Blocking HTTP transport backed by `reqwest`.
    ///
    /// The body of a non-success response is not read.
    #[derive(Debug, Clone)]
    pub struct ReqwestClient {
        client: Client,
    }

    impl ReqwestClient {
        /// Creates a transport using the timeout from `config`.
        pub fn new(config: &ClientConfig) -> ClientResult<Self> {
            let client = Client::builder()
                .timeout(config.timeout)
                .build()
                .map_err(|err| {
                    ClientError::transport(format!("http client build failed: {err}"))
                })?;
            Ok(Self { client })
        }

        /// Wraps an existing `reqwest` client.
        pub fn from_client(client: Client) -> Self {
            Self { client }
        }
    }

    impl HttpClient for ReqwestClient {
        fn get(&self, request: &FeedRequest) -> Result<HttpResponse, String> {
            let mut builder = self.client.get(request.full_url());
            for (name, value) in &request.headers {
                builder = builder.header(name.as_str(), value.as_str());
            }

            let response = builder
                .send()
                .map_err(|err| format!("feed request failed: {err}"))?;
            let status = response.status();
            if !status.is_success() {
                return Ok(HttpResponse::new(status.as_u16(), String::new()));
            }

            let body = response
                .text()
                .map_err(|err| format!("feed body read failed: {err}"))?;
            Ok(HttpResponse::new(status.as_u16(), body))
        }
    }
}
