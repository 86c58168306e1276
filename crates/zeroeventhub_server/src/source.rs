//! Feed sources: where a server's events come from.

use crate::encoder::{FeedEvent, FeedResult};
use crate::error::{ServerError, ServerResult};
use parking_lot::RwLock;
use serde::Serialize;
use serde_json::Value;
use zeroeventhub_protocol::{Cursor, HeaderSelection, Headers};

/// Parameters for fetching one partition.
#[derive(Debug, Clone)]
pub struct FetchRequest<'a> {
    /// Position to read from; its partition is the one being fetched.
    pub cursor: &'a Cursor,
    /// Maximum number of events to return.
    pub page_size: u32,
    /// Headers the client asked for.
    pub headers: &'a HeaderSelection,
}

/// A partitioned event store a feed server reads from.
///
/// Implementations return the events following the request cursor, in
/// partition order, and the cursor that follows the last returned event.
pub trait FeedSource: Send + Sync {
    /// The payload type of the events.
    type Event: Serialize;

    /// Returns the number of partitions.
    fn partition_count(&self) -> u32;

    /// Fetches the next page of one partition.
    fn fetch(&self, request: &FetchRequest<'_>) -> ServerResult<FeedResult<Self::Event>>;
}

#[derive(Debug, Clone)]
struct StoredEvent {
    headers: Headers,
    data: Value,
}

/// In-memory partitioned event log.
///
/// Cursors are decimal offsets into a partition: `"0"` is the beginning
/// and `"<len>"` the end. `_first` and `_last` map to those two.
pub struct MemoryFeedSource {
    partitions: RwLock<Vec<Vec<StoredEvent>>>,
}

impl MemoryFeedSource {
    /// Creates an empty source with the given number of partitions.
    pub fn new(partition_count: u32) -> Self {
        Self {
            partitions: RwLock::new(vec![Vec::new(); partition_count as usize]),
        }
    }

    /// Appends an event to a partition. Returns the event's offset.
    pub fn append(&self, partition_id: u32, data: Value) -> ServerResult<u64> {
        self.append_with_headers(partition_id, Headers::new(), data)
    }

    /// Appends an event with headers to a partition. Returns the event's offset.
    ///
    /// A `null` payload is rejected: it would render as a line with neither
    /// cursor nor data.
    pub fn append_with_headers(
        &self,
        partition_id: u32,
        headers: Headers,
        data: Value,
    ) -> ServerResult<u64> {
        if data.is_null() {
            return Err(ServerError::InvalidRequest(format!(
                "event data for partition {partition_id} must not be null"
            )));
        }
        let mut partitions = self.partitions.write();
        let partition = partitions
            .get_mut(partition_id as usize)
            .ok_or_else(|| unknown_partition(partition_id))?;
        partition.push(StoredEvent { headers, data });
        Ok(partition.len() as u64 - 1)
    }

    /// Returns the number of events in a partition.
    pub fn len(&self, partition_id: u32) -> usize {
        self.partitions
            .read()
            .get(partition_id as usize)
            .map_or(0, Vec::len)
    }

    /// Returns true if every partition is empty.
    pub fn is_empty(&self) -> bool {
        self.partitions.read().iter().all(Vec::is_empty)
    }

    fn resolve_offset(cursor: &Cursor, len: usize) -> ServerResult<usize> {
        if cursor.is_first() {
            return Ok(0);
        }
        if cursor.is_last() {
            return Ok(len);
        }
        cursor
            .value()
            .parse::<usize>()
            .ok()
            .filter(|offset| *offset <= len)
            .ok_or_else(|| ServerError::InvalidCursor {
                partition_id: cursor.partition_id(),
                cursor: cursor.value().to_string(),
            })
    }
}

fn unknown_partition(partition_id: u32) -> ServerError {
    ServerError::InvalidRequest(format!("unknown partition {partition_id}"))
}

fn select_headers(stored: &Headers, selection: &HeaderSelection) -> Option<Headers> {
    if selection.is_empty() {
        return None;
    }
    let selected: Headers = stored
        .iter()
        .filter(|(name, _)| selection.includes(name))
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect();
    (!selected.is_empty()).then_some(selected)
}

impl FeedSource for MemoryFeedSource {
    type Event = Value;

    fn partition_count(&self) -> u32 {
        self.partitions.read().len() as u32
    }

    fn fetch(&self, request: &FetchRequest<'_>) -> ServerResult<FeedResult<Value>> {
        let partition_id = request.cursor.partition_id();
        let partitions = self.partitions.read();
        let partition = partitions
            .get(partition_id as usize)
            .ok_or_else(|| unknown_partition(partition_id))?;

        let start = Self::resolve_offset(request.cursor, partition.len())?;
        let events: Vec<FeedEvent<Value>> = partition[start..]
            .iter()
            .take(request.page_size as usize)
            .map(|stored| FeedEvent {
                headers: select_headers(&stored.headers, request.headers),
                data: stored.data.clone(),
            })
            .collect();

        let next = start + events.len();
        Ok(FeedResult::new(events, next.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn fetch(source: &MemoryFeedSource, cursor: Cursor, page_size: u32) -> FeedResult<Value> {
        source
            .fetch(&FetchRequest {
                cursor: &cursor,
                page_size,
                headers: &HeaderSelection::None,
            })
            .unwrap()
    }

    fn source_with(count: u64) -> MemoryFeedSource {
        let source = MemoryFeedSource::new(2);
        for i in 0..count {
            source.append(0, json!(i)).unwrap();
        }
        source
    }

    #[test]
    fn fetch_from_first() {
        let source = source_with(3);
        let result = fetch(&source, Cursor::first(0), 10);
        assert_eq!(result.len(), 3);
        assert_eq!(result.cursor, "3");
        assert_eq!(result.events[0].data, json!(0));
    }

    #[test]
    fn fetch_pages() {
        let source = source_with(5);
        let page = fetch(&source, Cursor::first(0), 2);
        assert_eq!(page.cursor, "2");

        let page = fetch(&source, Cursor::new(0, page.cursor), 2);
        assert_eq!(page.events[0].data, json!(2));
        assert_eq!(page.cursor, "4");

        let page = fetch(&source, Cursor::new(0, page.cursor), 2);
        assert_eq!(page.len(), 1);
        assert_eq!(page.cursor, "5");

        let page = fetch(&source, Cursor::new(0, page.cursor), 2);
        assert!(page.is_empty());
        assert_eq!(page.cursor, "5");
    }

    #[test]
    fn fetch_from_last() {
        let source = source_with(4);
        let result = fetch(&source, Cursor::last(0), 10);
        assert!(result.is_empty());
        assert_eq!(result.cursor, "4");
    }

    #[test]
    fn invalid_cursors() {
        let source = source_with(2);
        for value in ["abc", "3", "-1"] {
            let cursor = Cursor::new(0, value);
            let err = source
                .fetch(&FetchRequest {
                    cursor: &cursor,
                    page_size: 10,
                    headers: &HeaderSelection::None,
                })
                .unwrap_err();
            assert!(matches!(err, ServerError::InvalidCursor { .. }), "{value}");
        }
    }

    #[test]
    fn unknown_partition_rejected() {
        let source = MemoryFeedSource::new(1);
        assert!(source.append(1, json!(1)).is_err());
        let cursor = Cursor::first(5);
        let err = source
            .fetch(&FetchRequest {
                cursor: &cursor,
                page_size: 1,
                headers: &HeaderSelection::None,
            })
            .unwrap_err();
        assert!(matches!(err, ServerError::InvalidRequest(_)));
    }

    #[test]
    fn null_payload_rejected() {
        let source = MemoryFeedSource::new(1);
        let err = source.append(0, Value::Null).unwrap_err();
        assert!(matches!(err, ServerError::InvalidRequest(_)));
        assert!(source
            .append_with_headers(0, Headers::new(), Value::Null)
            .is_err());
        assert!(source.is_empty());

        source.append(0, json!(false)).unwrap();
        assert_eq!(source.len(0), 1);
    }

    #[test]
    fn header_selection() {
        let source = MemoryFeedSource::new(1);
        let mut headers = Headers::new();
        headers.insert("a".into(), "1".into());
        headers.insert("b".into(), "2".into());
        source.append_with_headers(0, headers, json!("x")).unwrap();

        let cursor = Cursor::first(0);
        let fetch_with = |selection: HeaderSelection| {
            source
                .fetch(&FetchRequest {
                    cursor: &cursor,
                    page_size: 1,
                    headers: &selection,
                })
                .unwrap()
                .events
                .remove(0)
                .headers
        };

        assert_eq!(fetch_with(HeaderSelection::None), None);
        assert_eq!(fetch_with(HeaderSelection::All).unwrap().len(), 2);
        let only_b = fetch_with(HeaderSelection::named(["b"])).unwrap();
        assert_eq!(only_b.keys().collect::<Vec<_>>(), vec!["b"]);
        assert_eq!(fetch_with(HeaderSelection::named(["zzz"])), None);
    }

    #[test]
    fn partitions_are_independent() {
        let source = MemoryFeedSource::new(2);
        source.append(0, json!("p0")).unwrap();
        source.append(1, json!("p1a")).unwrap();
        source.append(1, json!("p1b")).unwrap();

        assert_eq!(source.len(0), 1);
        assert_eq!(source.len(1), 2);
        assert_eq!(source.partition_count(), 2);
        assert!(!source.is_empty());
        assert_eq!(fetch(&source, Cursor::first(1), 10).cursor, "2");
    }
}
