//! Feed encoding: fetch results to ordered feed entries.
//!
//! Every partition segment is emitted as its events followed by exactly one
//! checkpoint. A client that handles entries in order and persists a
//! checkpoint only after handling what came before it can never skip an
//! event on resume.

use zeroeventhub_protocol::{FeedEntry, Headers};

/// One event produced by a feed source.
#[derive(Debug, Clone, PartialEq)]
pub struct FeedEvent<E> {
    /// Event headers, if any were selected.
    pub headers: Option<Headers>,
    /// Event payload.
    pub data: E,
}

impl<E> FeedEvent<E> {
    /// Creates an event without headers.
    pub fn new(data: E) -> Self {
        Self {
            headers: None,
            data,
        }
    }

    /// Attaches headers.
    pub fn with_headers(mut self, headers: Headers) -> Self {
        self.headers = Some(headers);
        self
    }
}

impl<E> From<E> for FeedEvent<E> {
    fn from(data: E) -> Self {
        Self::new(data)
    }
}

/// The result of fetching one partition: its next events and the cursor
/// that follows them.
#[derive(Debug, Clone, PartialEq)]
pub struct FeedResult<E> {
    /// Events in partition order.
    pub events: Vec<FeedEvent<E>>,
    /// Cursor positioned after the last event.
    pub cursor: String,
}

impl<E> FeedResult<E> {
    /// Creates a fetch result.
    pub fn new(events: Vec<FeedEvent<E>>, cursor: impl Into<String>) -> Self {
        Self {
            events,
            cursor: cursor.into(),
        }
    }

    /// Creates a fetch result from bare payloads.
    pub fn from_data<I>(data: I, cursor: impl Into<String>) -> Self
    where
        I: IntoIterator<Item = E>,
    {
        Self::new(data.into_iter().map(FeedEvent::new).collect(), cursor)
    }

    /// Returns the number of events.
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Returns true if there are no events.
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

/// Encodes one partition's fetch result.
///
/// The events come first, in order, followed by the checkpoint.
pub fn encode_partition<E>(partition: u32, result: FeedResult<E>) -> Vec<FeedEntry<E>> {
    let mut entries = Vec::with_capacity(result.events.len() + 1);
    entries.extend(result.events.into_iter().map(|event| FeedEntry::Event {
        partition,
        headers: event.headers,
        data: event.data,
    }));
    entries.push(FeedEntry::checkpoint(partition, result.cursor));
    entries
}

/// Encodes several partitions into one multiplexed response.
///
/// Segments are concatenated in the order given. Each segment keeps its
/// events before its checkpoint; nothing is promised across partitions.
pub fn encode_feed<E, I>(results: I) -> Vec<FeedEntry<E>>
where
    I: IntoIterator<Item = (u32, FeedResult<E>)>,
{
    results
        .into_iter()
        .flat_map(|(partition, result)| encode_partition(partition, result))
        .collect()
}
