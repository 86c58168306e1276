//! # ZeroEventHub Protocol
//!
//! Wire types and query encoding for the ZeroEventHub feed protocol.
//!
//! This crate provides:
//! - `Cursor` resume positions with the `_first` / `_last` sentinels
//! - The feed line schema (`WireLine`, `FeedLine`) shared by both sides
//! - Server-side `FeedEntry` values and their serialization shape
//! - Query encoding (`encode_query`) and parsing (`FeedQuery`)
//! - Media types and `Accept` negotiation (`FeedFormat`)
//!
//! This is a pure protocol crate with no I/O operations.

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod cursor;
mod entry;
mod error;
mod line;
mod media;
mod query;

pub use cursor::{Cursor, FIRST_CURSOR, LAST_CURSOR};
pub use entry::FeedEntry;
pub use error::{ProtocolError, ProtocolResult};
pub use line::{FeedLine, Headers, WireLine};
pub use media::{FeedFormat, JSON_CONTENT_TYPE, NDJSON_CONTENT_TYPE};
pub use query::{
    encode_query, is_feed_param, FeedQuery, HeaderSelection, QueryParams, ALL_HEADERS,
    CURSOR_PARAM_PREFIX, DEFAULT_PAGE_SIZE_HINT, HEADERS_PARAM, PAGE_SIZE_HINT_PARAM,
    PARTITION_COUNT_PARAM,
};
