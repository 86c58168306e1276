//! # ZeroEventHub Server
//!
//! Server side of the ZeroEventHub feed protocol.
//!
//! This crate provides:
//! - The feed encoder (`encode_partition`, `encode_feed`)
//! - NDJSON and JSON rendering (`write_ndjson`, `write_json`, `render`)
//! - The `FeedSource` trait and an in-memory `MemoryFeedSource`
//! - `FeedHandler`, which turns a query and an `Accept` header into a response
//!
//! # Ordering
//!
//! Within a response, each partition's events are followed by exactly one
//! checkpoint for that partition. Nothing is promised about how segments
//! of different partitions are ordered relative to each other.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use serde_json::json;
//! use zeroeventhub_server::{FeedHandler, MemoryFeedSource, ServerConfig};
//!
//! let source = Arc::new(MemoryFeedSource::new(1));
//! source.append(0, json!({"id": 1})).unwrap();
//!
//! let handler = FeedHandler::new(ServerConfig::new(), source);
//! let response = handler.handle([("n", "1"), ("cursor0", "_first")], None);
//! assert_eq!(response.status, 200);
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]
// Production code MUST NOT use panic!/unwrap()/expect()
#![warn(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

mod config;
mod encoder;
mod error;
mod format;
mod handler;
mod source;

pub use config::ServerConfig;
pub use encoder::{encode_feed, encode_partition, FeedEvent, FeedResult};
pub use error::{ServerError, ServerResult};
pub use format::{render, write_feed, write_json, write_ndjson};
pub use handler::{FeedHandler, FeedResponse};
pub use source::{FeedSource, FetchRequest, MemoryFeedSource};
