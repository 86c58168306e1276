//! Streaming decoder for feed response bodies.
//!
//! A body is either newline-delimited JSON (one element per line) or a
//! single JSON array of elements. Lines are decoded and handed to the sink
//! one at a time; nothing is buffered past the current line.

use crate::cancel::CancellationToken;
use crate::error::ClientResult;
use crate::sink::EventSink;
use serde_json::Value;
use std::str::Lines;
use std::vec::IntoIter;
use tracing::trace;
use zeroeventhub_protocol::{FeedLine, ProtocolError, ProtocolResult};

/// Counts of what a fetch delivered to its sink.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FetchSummary {
    /// Number of event lines delivered.
    pub events: usize,
    /// Number of checkpoint lines delivered.
    pub checkpoints: usize,
}

impl FetchSummary {
    /// Returns true if nothing was delivered.
    pub fn is_empty(&self) -> bool {
        self.events == 0 && self.checkpoints == 0
    }
}

/// Iterator over the feed lines of a response body.
///
/// Blank lines and `null` elements are skipped. Line numbers in errors are
/// 1-based and count blank lines.
pub struct FeedLineDecoder<'a> {
    state: State<'a>,
}

enum State<'a> {
    Lines { lines: Lines<'a>, line: usize },
    Array { items: IntoIter<Value>, index: usize },
    Failed(Option<ProtocolError>),
}

impl<'a> FeedLineDecoder<'a> {
    /// Creates a decoder over `body`.
    ///
    /// A body whose first non-whitespace character is `[` is decoded as a
    /// JSON array.
    pub fn new(body: &'a str) -> Self {
        let state = if body.trim_start().starts_with('[') {
            match serde_json::from_str::<Vec<Value>>(body) {
                Ok(items) => State::Array {
                    items: items.into_iter(),
                    index: 0,
                },
                Err(e) => State::Failed(Some(ProtocolError::malformed_line(
                    e.line(),
                    e.to_string(),
                ))),
            }
        } else {
            State::Lines {
                lines: body.lines(),
                line: 0,
            }
        };
        Self { state }
    }
}

impl Iterator for FeedLineDecoder<'_> {
    type Item = ProtocolResult<FeedLine>;

    fn next(&mut self) -> Option<Self::Item> {
        match &mut self.state {
            State::Lines { lines, line } => loop {
                let text = lines.next()?;
                *line += 1;
                let text = text.trim();
                if text.is_empty() {
                    continue;
                }
                match FeedLine::parse(*line, text) {
                    Ok(Some(parsed)) => return Some(Ok(parsed)),
                    Ok(None) => continue,
                    Err(e) => return Some(Err(e)),
                }
            },
            State::Array { items, index } => loop {
                let value = items.next()?;
                *index += 1;
                match FeedLine::from_value(*index, value) {
                    Ok(Some(parsed)) => return Some(Ok(parsed)),
                    Ok(None) => continue,
                    Err(e) => return Some(Err(e)),
                }
            },
            State::Failed(err) => err.take().map(Err),
        }
    }
}

/// Decodes `body` and dispatches every line to `sink` in document order.
///
/// Stops at the first malformed line, sink error or cancellation. Lines
/// before the failure have already been dispatched.
pub fn decode_into<S>(
    body: &str,
    sink: &mut S,
    cancel: &CancellationToken,
) -> ClientResult<FetchSummary>
where
    S: EventSink + ?Sized,
{
    let mut summary = FetchSummary::default();
    for line in FeedLineDecoder::new(body) {
        cancel.check()?;
        match line? {
            FeedLine::Event {
                partition_id,
                headers,
                data,
            } => {
                trace!(partition_id, "feed event");
                sink.event(partition_id, headers, data)?;
                summary.events += 1;
            }
            FeedLine::Checkpoint {
                partition_id,
                cursor,
            } => {
                trace!(partition_id, cursor = %cursor, "feed checkpoint");
                sink.checkpoint(partition_id, cursor)?;
                summary.checkpoints += 1;
            }
        }
    }
    Ok(summary)
}
