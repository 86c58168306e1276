//! Event sinks: where decoded feed lines go.

use crate::error::{ClientError, ClientResult};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use zeroeventhub_protocol::{Cursor, Headers};

/// Receives decoded feed lines, strictly in document order.
///
/// An error returned from either method aborts the fetch; lines already
/// delivered stay delivered.
pub trait EventSink {
    /// Handles an event line.
    fn event(
        &mut self,
        partition_id: u32,
        headers: Option<Headers>,
        data: Value,
    ) -> ClientResult<()>;

    /// Handles a checkpoint line.
    fn checkpoint(&mut self, partition_id: u32, cursor: String) -> ClientResult<()>;
}

impl<S: EventSink + ?Sized> EventSink for &mut S {
    fn event(
        &mut self,
        partition_id: u32,
        headers: Option<Headers>,
        data: Value,
    ) -> ClientResult<()> {
        (**self).event(partition_id, headers, data)
    }

    fn checkpoint(&mut self, partition_id: u32, cursor: String) -> ClientResult<()> {
        (**self).checkpoint(partition_id, cursor)
    }
}

/// Turns an opaque event payload into the caller's event type.
///
/// Implemented by [`SerdePayload`] and by any closure
/// `Fn(Value) -> Result<T, E>` where `E: Display`.
pub trait PayloadDecoder<T> {
    /// Decodes one payload.
    fn decode(&self, data: Value) -> Result<T, String>;
}

/// Decodes payloads with `serde`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SerdePayload;

impl<T: DeserializeOwned> PayloadDecoder<T> for SerdePayload {
    fn decode(&self, data: Value) -> Result<T, String> {
        serde_json::from_value(data).map_err(|e| e.to_string())
    }
}

impl<T, E, F> PayloadDecoder<T> for F
where
    F: Fn(Value) -> Result<T, E>,
    E: fmt::Display,
{
    fn decode(&self, data: Value) -> Result<T, String> {
        self(data).map_err(|e| e.to_string())
    }
}

/// A received event.
#[derive(Debug, Clone, PartialEq)]
pub struct Event<T> {
    /// Partition ID.
    pub partition_id: u32,
    /// Event headers, if any.
    pub headers: Option<Headers>,
    /// Decoded payload.
    pub data: T,
}

/// An [`EventSink`] that keeps everything it receives.
///
/// Holds the event log in arrival order, the checkpoint audit trail, and
/// the latest checkpoint of every partition. The latest checkpoints are
/// what a caller persists to resume later, after it has handled the
/// events.
pub struct EventLog<T, D = SerdePayload> {
    decoder: D,
    events: Vec<Event<T>>,
    checkpoints: Vec<Cursor>,
    latest: BTreeMap<u32, Cursor>,
}

impl<T: DeserializeOwned> EventLog<T, SerdePayload> {
    /// Creates an empty log decoding payloads with `serde`.
    pub fn new() -> Self {
        Self::with_decoder(SerdePayload)
    }
}

impl<T: DeserializeOwned> Default for EventLog<T, SerdePayload> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T, D: PayloadDecoder<T>> EventLog<T, D> {
    /// Creates an empty log with a custom payload decoder.
    pub fn with_decoder(decoder: D) -> Self {
        Self {
            decoder,
            events: Vec::new(),
            checkpoints: Vec::new(),
            latest: BTreeMap::new(),
        }
    }

    /// Returns every event received, in arrival order.
    pub fn events(&self) -> &[Event<T>] {
        &self.events
    }

    /// Returns every checkpoint received, in arrival order.
    pub fn checkpoints(&self) -> &[Cursor] {
        &self.checkpoints
    }

    /// Returns the latest checkpoint of each partition, ordered by partition.
    pub fn latest_checkpoints(&self) -> Vec<Cursor> {
        self.latest.values().cloned().collect()
    }

    /// Returns the latest checkpoint of one partition.
    pub fn latest_checkpoint(&self, partition_id: u32) -> Option<&Cursor> {
        self.latest.get(&partition_id)
    }

    /// Consumes the log, returning its events and latest checkpoints.
    pub fn into_parts(self) -> (Vec<Event<T>>, Vec<Cursor>) {
        (self.events, self.latest.into_values().collect())
    }
}

impl<T, D: PayloadDecoder<T>> EventSink for EventLog<T, D> {
    fn event(
        &mut self,
        partition_id: u32,
        headers: Option<Headers>,
        data: Value,
    ) -> ClientResult<()> {
        if data.is_null() {
            return Err(ClientError::malformed("event data is null"));
        }
        let data = self
            .decoder
            .decode(data)
            .map_err(|e| {
                ClientError::malformed(format!("failed to deserialize event data: {e}"))
            })?;
        self.events.push(Event {
            partition_id,
            headers,
            data,
        });
        Ok(())
    }

    fn checkpoint(&mut self, partition_id: u32, cursor: String) -> ClientResult<()> {
        let cursor = Cursor::new(partition_id, cursor);
        self.checkpoints.push(cursor.clone());
        self.latest.insert(partition_id, cursor);
        Ok(())
    }
}

impl<T: fmt::Debug, D> fmt::Debug for EventLog<T, D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventLog")
            .field("events", &self.events)
            .field("checkpoints", &self.checkpoints)
            .field("latest", &self.latest)
            .finish()
    }
}

/// An [`EventSink`] that forwards to two closures.
pub struct FnSink<E, C> {
    on_event: E,
    on_checkpoint: C,
}

impl<E, C> FnSink<E, C>
where
    E: FnMut(u32, Option<Headers>, Value) -> ClientResult<()>,
    C: FnMut(u32, String) -> ClientResult<()>,
{
    /// Creates a sink from an event handler and a checkpoint handler.
    pub fn new(on_event: E, on_checkpoint: C) -> Self {
        Self {
            on_event,
            on_checkpoint,
        }
    }
}

impl<E, C> EventSink for FnSink<E, C>
where
    E: FnMut(u32, Option<Headers>, Value) -> ClientResult<()>,
    C: FnMut(u32, String) -> ClientResult<()>,
{
    fn event(
        &mut self,
        partition_id: u32,
        headers: Option<Headers>,
        data: Value,
    ) -> ClientResult<()> {
        (self.on_event)(partition_id, headers, data)
    }

    fn checkpoint(&mut self, partition_id: u32, cursor: String) -> ClientResult<()> {
        (self.on_checkpoint)(partition_id, cursor)
    }
}
