//! Render command implementation.
//!
//! Turns a JSON fixture describing fetch results into a feed body, exactly
//! as a server would serve it. A fixture is one segment or an array of
//! segments:
//!
//! ```json
//! {"partition": 3, "cursor": "c9", "events": [{"data": {"id": 1}, "headers": {"h": "v"}}]}
//! ```

use serde::Deserialize;
use serde_json::Value;
use std::fs;
use std::io::Write;
use std::path::Path;
use tracing::info;
use zeroeventhub_protocol::{FeedFormat, Headers};
use zeroeventhub_server::{encode_feed, render, FeedEvent, FeedResult};

/// One partition's fetch result.
#[derive(Debug, Deserialize)]
pub struct Segment {
    /// Partition ID.
    pub partition: u32,
    /// New cursor for the partition.
    pub cursor: String,
    /// Events before the checkpoint.
    #[serde(default)]
    pub events: Vec<FixtureEvent>,
}

/// One event in a fixture.
#[derive(Debug, Deserialize)]
pub struct FixtureEvent {
    /// Event headers.
    #[serde(default)]
    pub headers: Option<Headers>,
    /// Event payload.
    pub data: Value,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Fixture {
    Many(Vec<Segment>),
    One(Segment),
}

/// Parses a fixture document into segments.
pub fn parse_fixture(text: &str) -> Result<Vec<Segment>, Box<dyn std::error::Error>> {
    let segments = match serde_json::from_str::<Fixture>(text)? {
        Fixture::Many(segments) => segments,
        Fixture::One(segment) => vec![segment],
    };
    if let Some(event) = segments
        .iter()
        .flat_map(|s| s.events.iter())
        .find(|e| e.data.is_null())
    {
        return Err(format!("event data must not be null: {event:?}").into());
    }
    Ok(segments)
}

/// Renders segments as a feed body.
pub fn render_segments(
    segments: Vec<Segment>,
    format: FeedFormat,
) -> Result<Vec<u8>, Box<dyn std::error::Error>> {
    let results = segments.into_iter().map(|segment| {
        let events = segment
            .events
            .into_iter()
            .map(|e| FeedEvent {
                headers: e.headers,
                data: e.data,
            })
            .collect();
        (segment.partition, FeedResult::new(events, segment.cursor))
    });
    Ok(render(format, &encode_feed(results))?)
}

/// Parses a `--format` value.
pub fn parse_format(value: &str) -> Result<FeedFormat, String> {
    match value {
        "ndjson" => Ok(FeedFormat::Ndjson),
        "json" => Ok(FeedFormat::Json),
        other => FeedFormat::from_media_type(other)
            .ok_or_else(|| format!("unknown feed format '{other}' (expected ndjson or json)")),
    }
}

/// Runs the render command.
pub fn run(input: &Path, format: FeedFormat) -> Result<(), Box<dyn std::error::Error>> {
    info!("Rendering fixture {:?} as {}", input, format);
    let text = fs::read_to_string(input)?;
    let body = render_segments(parse_fixture(&text)?, format)?;

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    out.write_all(&body)?;
    out.flush()?;
    Ok(())
}
