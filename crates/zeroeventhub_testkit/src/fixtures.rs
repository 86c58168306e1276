//! Feed body fixtures.
//!
//! Builders for response bodies in both wire formats, plus a few canned
//! scenarios used across the client and server test suites.

use serde_json::{json, Value};
use zeroeventhub_protocol::{FeedLine, Headers};

/// Renders lines as an NDJSON body, one line per element with a trailing newline.
pub fn ndjson_body(lines: &[FeedLine]) -> String {
    let mut body = String::new();
    for line in lines {
        body.push_str(&line.to_json_line().expect("Failed to serialize feed line"));
        body.push('\n');
    }
    body
}

/// Renders lines as a single JSON array body.
pub fn json_array_body(lines: &[FeedLine]) -> String {
    let wire: Vec<_> = lines.iter().map(FeedLine::to_wire).collect();
    serde_json::to_string(&wire).expect("Failed to serialize feed lines")
}

/// Builds a headers map from pairs.
pub fn headers<const N: usize>(pairs: [(&str, &str); N]) -> Headers {
    pairs
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

/// A simple order event payload.
pub fn order_event(id: u64) -> Value {
    json!({ "id": id, "kind": "order", "amount": id * 100 })
}

/// A body with a checkpoint followed by one event with headers.
pub fn checkpoint_then_event_body() -> &'static str {
    "{\"partition\":0,\"cursor\":\"abc\"}\n{\"partition\":0,\"headers\":{\"h\":\"v\"},\"data\":{\"x\":1}}"
}

/// Lines for `events` on `partition` followed by a checkpoint at `cursor`.
pub fn partition_segment(partition: u32, events: &[Value], cursor: &str) -> Vec<FeedLine> {
    let mut lines: Vec<FeedLine> = events
        .iter()
        .map(|data| FeedLine::event(partition, None, data.clone()))
        .collect();
    lines.push(FeedLine::checkpoint(partition, cursor));
    lines
}
