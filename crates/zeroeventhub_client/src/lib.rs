//! # ZeroEventHub Client
//!
//! Pull-based client for the ZeroEventHub partitioned event feed.
//!
//! This crate provides:
//! - `Client`, which encodes cursors into a feed query, sends it through an
//!   `HttpClient` transport and decodes the response
//! - `FeedLineDecoder` for NDJSON and JSON array bodies
//! - The `EventSink` trait and the `EventLog` sink with latest-checkpoint
//!   tracking
//! - Cooperative cancellation via `CancellationToken`
//! - A loopback transport for in-process servers, and a blocking `reqwest`
//!   transport behind the `reqwest` feature
//!
//! ## Resuming
//!
//! Events of a partition always arrive before the checkpoint that covers
//! them. A caller that handles lines in order and persists
//! `EventLog::latest_checkpoints` only after handling the events before
//! them never skips an event on resume.
//!
//! ```
//! use zeroeventhub_client::{
//!     Client, ClientConfig, Cursor, EventLog, HttpResponse, MockHttpClient,
//! };
//!
//! let body = "{\"partition\":0,\"data\":{\"id\":1}}\n{\"partition\":0,\"cursor\":\"1\"}\n";
//! let http = MockHttpClient::with_response(HttpResponse::ok(body));
//! let client = Client::new(ClientConfig::new("https://example.invalid/feed/v1", 1), http);
//!
//! let mut log: EventLog<serde_json::Value> = EventLog::new();
//! client.fetch_events(&[Cursor::first(0)], 0, &mut log).unwrap();
//!
//! assert_eq!(log.events().len(), 1);
//! assert_eq!(log.latest_checkpoints(), vec![Cursor::new(0, "1")]);
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod cancel;
mod client;
mod config;
mod decoder;
mod error;
mod http;
mod sink;
mod transport;

pub use cancel::CancellationToken;
pub use client::Client;
pub use config::ClientConfig;
pub use decoder::{decode_into, FeedLineDecoder, FetchSummary};
pub use error::{ClientError, ClientResult};
#[cfg(feature = "reqwest")]
pub use http::ReqwestClient;
pub use http::{LoopbackClient, LoopbackServer};
pub use sink::{Event, EventLog, EventSink, FnSink, PayloadDecoder, SerdePayload};
pub use transport::{FeedRequest, HttpClient, HttpResponse, MockHttpClient, RequestHook};
pub use zeroeventhub_protocol::{Cursor, FeedFormat, HeaderSelection, Headers};
