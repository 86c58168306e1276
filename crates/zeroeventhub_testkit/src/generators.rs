//! Property-based test generators using proptest.
//!
//! Provides strategies for generating random feed data that maintains
//! the protocol's invariants (every event line carries non-null data,
//! every checkpoint a non-empty cursor).

use proptest::prelude::*;
use serde_json::{json, Value};
use zeroeventhub_protocol::{Cursor, FeedLine, Headers};

/// Strategy for generating opaque cursor values, sentinels included.
pub fn cursor_value_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        1 => Just("_first".to_string()),
        1 => Just("_last".to_string()),
        6 => prop::string::string_regex("[A-Za-z0-9_.:-]{1,24}").expect("Invalid regex"),
    ]
}

/// Strategy for generating a cursor on one of `partitions` partitions.
pub fn cursor_strategy(partitions: u32) -> impl Strategy<Value = Cursor> {
    (0..partitions.max(1), cursor_value_strategy())
        .prop_map(|(partition_id, value)| Cursor::new(partition_id, value))
}

/// Strategy for generating a non-empty list of cursors, repeats allowed.
pub fn cursors_strategy(partitions: u32, max_len: usize) -> impl Strategy<Value = Vec<Cursor>> {
    prop::collection::vec(cursor_strategy(partitions), 1..=max_len.max(1))
}

/// Strategy for generating non-null event payloads.
pub fn payload_strategy() -> impl Strategy<Value = Value> {
    prop_oneof![
        any::<i64>().prop_map(|n| json!(n)),
        "[a-z ]{0,16}".prop_map(|s| json!(s)),
        (any::<u32>(), "[a-z]{1,8}").prop_map(|(id, kind)| json!({ "id": id, "kind": kind })),
        prop::collection::vec(any::<u16>(), 0..4).prop_map(|v| json!(v)),
    ]
}

/// Strategy for generating optional event headers.
pub fn headers_strategy() -> impl Strategy<Value = Option<Headers>> {
    prop::option::of(prop::collection::btree_map(
        "[a-z-]{1,12}",
        "[ -~]{0,16}",
        0..4,
    ))
}

/// Strategy for generating one valid feed line.
pub fn feed_line_strategy(partitions: u32) -> impl Strategy<Value = FeedLine> {
    let partitions = partitions.max(1);
    prop_oneof![
        3 => (0..partitions, headers_strategy(), payload_strategy())
            .prop_map(|(p, h, d)| FeedLine::event(p, h, d)),
        1 => (0..partitions, "[A-Za-z0-9]{1,16}")
            .prop_map(|(p, c)| FeedLine::checkpoint(p, c)),
    ]
}

/// Strategy for generating a sequence of feed lines in arbitrary order.
pub fn feed_lines_strategy(
    partitions: u32,
    max_len: usize,
) -> impl Strategy<Value = Vec<FeedLine>> {
    prop::collection::vec(feed_line_strategy(partitions), 0..=max_len)
}
