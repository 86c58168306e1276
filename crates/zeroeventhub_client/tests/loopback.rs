//! Client against an in-process feed server.

use proptest::prelude::*;
use serde_json::{json, Value};
use std::collections::BTreeMap;
use std::sync::Arc;
use zeroeventhub_client::{
    CancellationToken, Client, ClientConfig, ClientError, Cursor, EventLog, FeedFormat,
    FeedRequest, HeaderSelection, HttpResponse, LoopbackClient, LoopbackServer, MockHttpClient,
};
use zeroeventhub_protocol::FeedLine;
use zeroeventhub_server::{FeedHandler, FeedSource, MemoryFeedSource, ServerConfig};
use zeroeventhub_testkit::prelude::*;

/// Routes loopback requests into a `FeedHandler`.
struct InProcess {
    handler: FeedHandler<MemoryFeedSource>,
}

impl LoopbackServer for InProcess {
    fn handle_get(&self, request: &FeedRequest) -> HttpResponse {
        let response = self
            .handler
            .handle(request.query.iter(), request.header("Accept"));
        HttpResponse::new(response.status, response.body_text().unwrap_or_default())
    }
}

fn create_source(partitions: u32) -> Arc<MemoryFeedSource> {
    Arc::new(MemoryFeedSource::new(partitions))
}

fn create_client(
    source: Arc<MemoryFeedSource>,
    accept: FeedFormat,
) -> Client<LoopbackClient<InProcess>> {
    let partitions = source.partition_count();
    let handler = FeedHandler::new(ServerConfig::new(), source);
    let config = ClientConfig::new("memory://feed", partitions).with_accept(accept);
    Client::new(config, LoopbackClient::new(InProcess { handler }))
}

fn round_trip(events: &[Value], accept: FeedFormat) -> EventLog<Value> {
    let source = create_source(1);
    for data in events {
        source.append(0, data.clone()).unwrap();
    }
    let client = create_client(source, accept);

    let mut log = EventLog::new();
    client
        .fetch_events(&[Cursor::first(0)], 1000, &mut log)
        .unwrap();
    log
}

proptest! {
    #[test]
    fn round_trip_preserves_events_and_cursor(
        events in prop::collection::vec(payload_strategy(), 0..20),
    ) {
        for accept in [FeedFormat::Ndjson, FeedFormat::Json] {
            let log = round_trip(&events, accept);
            let received: Vec<Value> = log.events().iter().map(|e| e.data.clone()).collect();
            prop_assert_eq!(&received, &events);
            prop_assert_eq!(
                log.latest_checkpoint(0),
                Some(&Cursor::new(0, events.len().to_string()))
            );
        }
    }

    #[test]
    fn latest_checkpoint_is_last_seen(lines in feed_lines_strategy(3, 40)) {
        let http = MockHttpClient::with_response(HttpResponse::ok(ndjson_body(&lines)));
        let client = Client::new(ClientConfig::new("memory://feed", 3), http);

        let mut log: EventLog<Value> = EventLog::new();
        let cursors = [Cursor::first(0), Cursor::first(1), Cursor::first(2)];
        client.fetch_events(&cursors, 0, &mut log).unwrap();

        let mut expected_latest = BTreeMap::new();
        let mut expected_events = 0;
        for line in &lines {
            match line {
                FeedLine::Checkpoint { partition_id, cursor } => {
                    let latest = Cursor::new(*partition_id, cursor.clone());
                    expected_latest.insert(*partition_id, latest);
                }
                FeedLine::Event { .. } => expected_events += 1,
            }
        }
        prop_assert_eq!(log.events().len(), expected_events);
        let expected_latest: Vec<Cursor> = expected_latest.into_values().collect();
        prop_assert_eq!(log.latest_checkpoints(), expected_latest);
    }
}

#[test]
fn checkpoint_then_event_scenario() {
    let http = MockHttpClient::with_response(HttpResponse::ok(checkpoint_then_event_body()));
    let client = Client::new(ClientConfig::new("memory://feed", 1), http);

    let mut log: EventLog<Value> = EventLog::new();
    client
        .fetch_events(&[Cursor::first(0)], 0, &mut log)
        .unwrap();

    assert_eq!(log.checkpoints(), &[Cursor::new(0, "abc")]);
    assert_eq!(log.events().len(), 1);
    assert_eq!(log.events()[0].partition_id, 0);
    assert_eq!(log.events()[0].headers, Some(headers([("h", "v")])));
    assert_eq!(log.events()[0].data, json!({"x": 1}));
    assert_eq!(log.latest_checkpoints(), vec![Cursor::new(0, "abc")]);
}

#[test]
fn empty_line_fails_after_prior_lines_applied() {
    let body = "{\"partition\":0,\"data\":{\"x\":1}}\n{\"partition\":0,\"cursor\":\"1\"}\n{\"partition\":0}\n";
    let http = MockHttpClient::with_response(HttpResponse::ok(body));
    let client = Client::new(ClientConfig::new("memory://feed", 1), http);

    let mut log: EventLog<Value> = EventLog::new();
    let err = client
        .fetch_events(&[Cursor::first(0)], 0, &mut log)
        .unwrap_err();

    assert!(matches!(err, ClientError::MalformedResponse(_)));
    assert_eq!(log.events().len(), 1);
    assert_eq!(log.latest_checkpoint(0), Some(&Cursor::new(0, "1")));
}

#[test]
fn non_object_line_is_malformed() {
    let body = "{\"partition\":0,\"data\":1}\n[0,\"abc\"]\n";
    let http = MockHttpClient::with_response(HttpResponse::ok(body));
    let client = Client::new(ClientConfig::new("memory://feed", 1), http);

    let mut log: EventLog<Value> = EventLog::new();
    let err = client
        .fetch_events(&[Cursor::first(0)], 0, &mut log)
        .unwrap_err();

    assert!(matches!(err, ClientError::MalformedResponse(_)));
    assert_eq!(log.events().len(), 1);
    assert!(log.checkpoints().is_empty());
}

#[derive(Debug, PartialEq, serde::Deserialize)]
struct EventData {
    value: String,
}

#[test]
fn payload_type_mismatch_keeps_earlier_lines() {
    let body = "{\"partition\":0,\"data\":{\"value\":\"a\"}}\n\
                {\"partition\":0,\"cursor\":\"1\"}\n\
                {\"partition\":0,\"data\":\"wrong-type\"}\n\
                {\"partition\":0,\"cursor\":\"2\"}\n";
    let http = MockHttpClient::with_response(HttpResponse::ok(body));
    let client = Client::new(ClientConfig::new("memory://feed", 1), http);

    let mut log: EventLog<EventData> = EventLog::new();
    let err = client
        .fetch_events(&[Cursor::first(0)], 0, &mut log)
        .unwrap_err();

    assert!(matches!(err, ClientError::MalformedResponse(_)));
    assert!(err.to_string().contains("deserialize"));
    assert_eq!(
        log.events()[0].data,
        EventData {
            value: "a".into()
        }
    );
    assert_eq!(log.events().len(), 1);
    assert_eq!(log.latest_checkpoint(0), Some(&Cursor::new(0, "1")));
}

#[test]
fn server_never_serves_null_payloads() {
    let source = create_source(1);
    source.append(0, json!("kept")).unwrap();
    assert!(source.append(0, Value::Null).is_err());
    let client = create_client(source, FeedFormat::Ndjson);

    let mut log: EventLog<Value> = EventLog::new();
    let summary = client
        .fetch_events(&[Cursor::first(0)], 0, &mut log)
        .unwrap();
    assert_eq!(summary.events, 1);
    assert_eq!(log.latest_checkpoint(0), Some(&Cursor::new(0, "1")));

    let mut log: EventLog<Value> = EventLog::new();
    client
        .fetch_events(&[Cursor::new(0, "1")], 0, &mut log)
        .unwrap();
    assert!(log.events().is_empty());
}

#[test]
fn paging_delivers_every_event_once() {
    let source = create_source(2);
    for i in 0..11 {
        source.append(0, json!({"p": 0, "i": i})).unwrap();
    }
    for i in 0..4 {
        source.append(1, json!({"p": 1, "i": i})).unwrap();
    }
    let client = create_client(Arc::clone(&source), FeedFormat::Ndjson);

    let mut cursors = vec![Cursor::first(0), Cursor::first(1)];
    let mut received = Vec::new();
    loop {
        let mut log: EventLog<Value> = EventLog::new();
        let summary = client.fetch_events(&cursors, 3, &mut log).unwrap();
        // One checkpoint per partition on every page.
        assert_eq!(summary.checkpoints, 2);
        if summary.events == 0 {
            break;
        }
        let (events, latest) = log.into_parts();
        received.extend(events.into_iter().map(|e| e.data));
        cursors = latest;
    }

    assert_eq!(received.len(), 15);
    for partition in 0..2 {
        let seen: Vec<i64> = received
            .iter()
            .filter(|e| e["p"] == partition)
            .map(|e| e["i"].as_i64().unwrap())
            .collect();
        let expected: Vec<i64> = (0..if partition == 0 { 11 } else { 4 }).collect();
        assert_eq!(seen, expected);
    }
}

#[test]
fn requested_headers_are_delivered() {
    let source = create_source(1);
    source
        .append_with_headers(0, headers([("trace", "t1"), ("tenant", "a")]), json!(1))
        .unwrap();
    let client = create_client(source, FeedFormat::Ndjson);

    let mut log: EventLog<u32> = EventLog::new();
    client
        .fetch_events_with(
            &[Cursor::first(0)],
            0,
            &HeaderSelection::named(["trace"]),
            &mut log,
            &CancellationToken::new(),
        )
        .unwrap();
    assert_eq!(log.events()[0].headers, Some(headers([("trace", "t1")])));

    let mut log: EventLog<u32> = EventLog::new();
    client
        .fetch_events(&[Cursor::first(0)], 0, &mut log)
        .unwrap();
    assert_eq!(log.events()[0].headers, None);
}

#[test]
fn invalid_cursor_is_transport_error() {
    let client = create_client(create_source(1), FeedFormat::Ndjson);
    let mut log: EventLog<Value> = EventLog::new();

    let err = client
        .fetch_events(&[Cursor::new(0, "not-an-offset")], 0, &mut log)
        .unwrap_err();
    match err {
        ClientError::Transport { status, .. } => assert_eq!(status, Some(400)),
        other => panic!("unexpected: {other:?}"),
    }
}

#[test]
fn unsupported_accept_is_not_acceptable() {
    let source = create_source(1);
    source.append(0, json!(1)).unwrap();
    let client = create_client(source, FeedFormat::Ndjson).with_request_hook(|request| {
        request.set_header("Accept", "text/csv");
        Ok(())
    });

    let mut log: EventLog<Value> = EventLog::new();
    let err = client
        .fetch_events(&[Cursor::first(0)], 0, &mut log)
        .unwrap_err();
    assert!(matches!(
        err,
        ClientError::Transport {
            status: Some(406),
            ..
        }
    ));
    assert!(log.events().is_empty());
}

#[test]
fn last_cursor_returns_no_events() {
    let source = create_source(1);
    source.append(0, json!(1)).unwrap();
    source.append(0, json!(2)).unwrap();
    let client = create_client(source, FeedFormat::Json);

    let mut log: EventLog<Value> = EventLog::new();
    let summary = client
        .fetch_events(&[Cursor::last(0)], 0, &mut log)
        .unwrap();
    assert_eq!(summary.events, 0);
    assert_eq!(log.latest_checkpoint(0), Some(&Cursor::new(0, "2")));
}

#[test]
fn cancellation_during_decode_keeps_prefix() {
    let source = create_source(1);
    for i in 0..5 {
        source.append(0, json!(i)).unwrap();
    }
    let client = create_client(source, FeedFormat::Ndjson);
    let token = CancellationToken::new();

    struct CancelAfterFirst {
        token: CancellationToken,
        events: Vec<Value>,
    }

    impl zeroeventhub_client::EventSink for CancelAfterFirst {
        fn event(
            &mut self,
            _partition_id: u32,
            _headers: Option<zeroeventhub_client::Headers>,
            data: Value,
        ) -> zeroeventhub_client::ClientResult<()> {
            self.events.push(data);
            self.token.cancel();
            Ok(())
        }

        fn checkpoint(
            &mut self,
            _partition_id: u32,
            _cursor: String,
        ) -> zeroeventhub_client::ClientResult<()> {
            panic!("checkpoint after cancellation");
        }
    }

    let mut sink = CancelAfterFirst {
        token: token.clone(),
        events: Vec::new(),
    };
    let err = client
        .fetch_events_with(
            &[Cursor::first(0)],
            0,
            &HeaderSelection::None,
            &mut sink,
            &token,
        )
        .unwrap_err();

    assert!(matches!(err, ClientError::Cancelled));
    assert_eq!(sink.events, vec![json!(0)]);
}
