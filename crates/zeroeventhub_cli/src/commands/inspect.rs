//! Inspect command implementation.

use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use tracing::info;
use zeroeventhub_client::{decode_into, CancellationToken, EventLog};

/// Feed body inspection result.
#[derive(Debug, Serialize)]
pub struct InspectResult {
    /// Path of the inspected body.
    pub path: String,
    /// Body size in bytes.
    pub size: u64,
    /// Detected body layout (`ndjson` or `json`).
    pub layout: &'static str,
    /// Number of event lines.
    pub event_count: usize,
    /// Number of checkpoint lines.
    pub checkpoint_count: usize,
    /// Per-partition statistics, ordered by partition.
    pub partitions: Vec<PartitionStats>,
    /// Every event, if requested.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub events: Option<Vec<EventRecord>>,
}

/// Statistics for a single partition.
#[derive(Debug, Default, Serialize, PartialEq, Eq)]
pub struct PartitionStats {
    /// Partition ID.
    pub partition: u32,
    /// Number of events.
    pub events: usize,
    /// Number of checkpoints.
    pub checkpoints: usize,
    /// Cursor to resume from, if the body checkpointed this partition.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latest_cursor: Option<String>,
}

/// One event as printed by `--events`.
#[derive(Debug, Serialize)]
pub struct EventRecord {
    /// Partition ID.
    pub partition: u32,
    /// Event headers.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub headers: Option<BTreeMap<String, String>>,
    /// Event payload.
    pub data: Value,
}

/// Decodes the feed body at `path`.
pub fn inspect(
    path: &Path,
    show_events: bool,
) -> Result<InspectResult, Box<dyn std::error::Error>> {
    info!("Inspecting feed body {:?}", path);
    let body = fs::read_to_string(path)?;
    let layout = if body.trim_start().starts_with('[') {
        "json"
    } else {
        "ndjson"
    };

    let mut log: EventLog<Value> = EventLog::new();
    let summary = decode_into(&body, &mut log, &CancellationToken::new())?;

    let mut partitions: BTreeMap<u32, PartitionStats> = BTreeMap::new();
    for event in log.events() {
        stats_for(&mut partitions, event.partition_id).events += 1;
    }
    for cursor in log.checkpoints() {
        stats_for(&mut partitions, cursor.partition_id()).checkpoints += 1;
    }
    for cursor in log.latest_checkpoints() {
        stats_for(&mut partitions, cursor.partition_id()).latest_cursor =
            Some(cursor.value().to_string());
    }

    let events = show_events.then(|| {
        log.events()
            .iter()
            .map(|e| EventRecord {
                partition: e.partition_id,
                headers: e.headers.clone(),
                data: e.data.clone(),
            })
            .collect()
    });

    Ok(InspectResult {
        path: path.display().to_string(),
        size: body.len() as u64,
        layout,
        event_count: summary.events,
        checkpoint_count: summary.checkpoints,
        partitions: partitions.into_values().collect(),
        events,
    })
}

fn stats_for(
    partitions: &mut BTreeMap<u32, PartitionStats>,
    partition: u32,
) -> &mut PartitionStats {
    partitions.entry(partition).or_insert_with(|| PartitionStats {
        partition,
        ..PartitionStats::default()
    })
}

/// Runs the inspect command.
pub fn run(path: &Path, show_events: bool, format: &str) -> Result<(), Box<dyn std::error::Error>> {
    let result = inspect(path, show_events)?;

    match format {
        "json" => {
            println!("{}", serde_json::to_string_pretty(&result)?);
        }
        _ => {
            print_text_output(&result);
        }
    }

    Ok(())
}

fn print_text_output(result: &InspectResult) {
    println!("ZeroEventHub Feed Inspection");
    println!("============================");
    println!();
    println!("Path:   {}", result.path);
    println!("Size:   {} bytes", result.size);
    println!("Layout: {}", result.layout);
    println!();
    println!("Lines:");
    println!("  Events:      {}", result.event_count);
    println!("  Checkpoints: {}", result.checkpoint_count);

    if !result.partitions.is_empty() {
        println!();
        println!("Partitions:");
        for p in &result.partitions {
            println!(
                "  [{}] {} events, {} checkpoints, resume from {}",
                p.partition,
                p.events,
                p.checkpoints,
                p.latest_cursor.as_deref().unwrap_or("-")
            );
        }
    }

    if let Some(events) = &result.events {
        println!();
        println!("Events:");
        for event in events {
            println!("  [{}] {}", event.partition, event.data);
        }
    }
}
