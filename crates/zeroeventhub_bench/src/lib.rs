//! Benchmark workloads.

use serde_json::Value;
use zeroeventhub_protocol::{Cursor, FeedFormat};
use zeroeventhub_server::{encode_feed, render, FeedResult};
use zeroeventhub_testkit::order_event;

/// Builds `partitions` fetch results of `events_per_partition` order events each.
pub fn fetch_results(partitions: u32, events_per_partition: u64) -> Vec<(u32, FeedResult<Value>)> {
    (0..partitions)
        .map(|p| {
            let start = u64::from(p) * events_per_partition;
            let events = (start..start + events_per_partition).map(order_event);
            (p, FeedResult::from_data(events, events_per_partition.to_string()))
        })
        .collect()
}

/// Renders a feed body for the given workload.
pub fn feed_body(partitions: u32, events_per_partition: u64, format: FeedFormat) -> String {
    let entries = encode_feed(fetch_results(partitions, events_per_partition));
    let body = render(format, &entries).unwrap_or_default();
    String::from_utf8(body).unwrap_or_default()
}

/// One cursor per partition, all at `value`.
pub fn cursors(partitions: u32, value: &str) -> Vec<Cursor> {
    (0..partitions).map(|p| Cursor::new(p, value)).collect()
}
