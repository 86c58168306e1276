//! Rendering feed entries as response bodies.

use crate::error::{ServerError, ServerResult};
use serde::Serialize;
use std::io::Write;
use zeroeventhub_protocol::{FeedEntry, FeedFormat};

/// Fails on the first event whose payload serializes to `null`.
fn check_payloads<E: Serialize>(entries: &[FeedEntry<E>]) -> ServerResult<()> {
    for entry in entries {
        if let FeedEntry::Event {
            partition, data, ..
        } = entry
        {
            if serde_json::to_value(data)?.is_null() {
                return Err(ServerError::NullPayload {
                    partition_id: *partition,
                });
            }
        }
    }
    Ok(())
}

/// Writes entries as NDJSON: one object per line, flushed after each entry
/// so a streaming writer can forward it immediately.
///
/// Nothing is written if any event has a `null` payload.
pub fn write_ndjson<W, E>(writer: &mut W, entries: &[FeedEntry<E>]) -> ServerResult<()>
where
    W: Write,
    E: Serialize,
{
    check_payloads(entries)?;
    for entry in entries {
        serde_json::to_writer(&mut *writer, entry)?;
        writer.write_all(b"\n")?;
        writer.flush()?;
    }
    Ok(())
}

/// Writes entries as a single JSON array.
pub fn write_json<W, E>(writer: &mut W, entries: &[FeedEntry<E>]) -> ServerResult<()>
where
    W: Write,
    E: Serialize,
{
    check_payloads(entries)?;
    serde_json::to_writer(&mut *writer, entries)?;
    writer.flush()?;
    Ok(())
}

/// Writes entries in the given format.
pub fn write_feed<W, E>(
    writer: &mut W,
    format: FeedFormat,
    entries: &[FeedEntry<E>],
) -> ServerResult<()>
where
    W: Write,
    E: Serialize,
{
    match format {
        FeedFormat::Ndjson => write_ndjson(writer, entries),
        FeedFormat::Json => write_json(writer, entries),
    }
}

/// Renders entries into an in-memory body.
pub fn render<E: Serialize>(format: FeedFormat, entries: &[FeedEntry<E>]) -> ServerResult<Vec<u8>> {
    let mut body = Vec::new();
    write_feed(&mut body, format, entries)?;
    Ok(body)
}
