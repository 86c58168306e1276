//! Query command implementation.

use zeroeventhub_protocol::{encode_query, Cursor, HeaderSelection, QueryParams};

/// Parses a `PARTITION=VALUE` cursor argument.
///
/// `PARTITION` alone means the start of that partition.
pub fn parse_cursor(arg: &str) -> Result<Cursor, String> {
    let (partition, value) = match arg.split_once('=') {
        Some((partition, value)) => (partition, value),
        None => (arg, zeroeventhub_protocol::FIRST_CURSOR),
    };
    let partition_id = partition
        .trim()
        .parse::<u32>()
        .map_err(|_| format!("invalid partition id in cursor '{arg}'"))?;
    if value.is_empty() {
        return Err(format!("empty cursor value in '{arg}'"));
    }
    Ok(Cursor::new(partition_id, value))
}

/// Builds the header selection from the command-line flags.
pub fn header_selection(headers: &[String], all_headers: bool) -> HeaderSelection {
    if all_headers {
        HeaderSelection::All
    } else {
        HeaderSelection::named(headers.iter().map(String::as_str))
    }
}

/// Encodes the feed query for the given arguments.
pub fn build(
    cursors: &[Cursor],
    partitions: u32,
    page_size_hint: u32,
    headers: &HeaderSelection,
) -> Result<QueryParams, Box<dyn std::error::Error>> {
    Ok(encode_query(cursors, partitions, page_size_hint, headers)?)
}

/// Runs the query command.
pub fn run(
    url: Option<&str>,
    cursors: &[Cursor],
    partitions: u32,
    page_size_hint: u32,
    headers: &HeaderSelection,
) -> Result<(), Box<dyn std::error::Error>> {
    let query = build(cursors, partitions, page_size_hint, headers)?;
    match url {
        Some(url) => {
            let separator = if url.contains('?') { '&' } else { '?' };
            println!("{url}{separator}{}", query.to_query_string());
        }
        None => println!("{}", query.to_query_string()),
    }
    Ok(())
}
