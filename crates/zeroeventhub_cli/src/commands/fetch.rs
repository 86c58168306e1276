//! Fetch command implementation.

use std::time::Duration;
use tracing::info;
use zeroeventhub_client::{
    CancellationToken, Client, ClientConfig, ClientResult, Cursor, FeedFormat, FnSink,
    HeaderSelection, ReqwestClient,
};
use zeroeventhub_protocol::FeedLine;

/// Options for a single fetch.
#[derive(Debug)]
pub struct FetchOptions {
    /// Feed endpoint URL.
    pub url: String,
    /// Number of partitions the server has.
    pub partitions: u32,
    /// Cursors to resume from.
    pub cursors: Vec<Cursor>,
    /// Page size hint; 0 lets the server decide.
    pub page_size_hint: u32,
    /// Headers to request.
    pub headers: HeaderSelection,
    /// Preferred response format.
    pub accept: FeedFormat,
    /// Request timeout.
    pub timeout: Duration,
    /// Extra request headers as `(name, value)`.
    pub request_headers: Vec<(String, String)>,
}

/// Parses a `NAME: VALUE` request header argument.
pub fn parse_request_header(arg: &str) -> Result<(String, String), String> {
    let (name, value) = arg
        .split_once(':')
        .ok_or_else(|| format!("expected NAME: VALUE, got '{arg}'"))?;
    let name = name.trim();
    if name.is_empty() {
        return Err(format!("empty header name in '{arg}'"));
    }
    Ok((name.to_string(), value.trim().to_string()))
}

/// Formats one received line the way `fetch` prints it: the wire shape.
pub fn format_line(line: &FeedLine) -> ClientResult<String> {
    Ok(line.to_json_line()?)
}

fn print_line(line: &FeedLine) -> ClientResult<()> {
    println!("{}", format_line(line)?);
    Ok(())
}

/// Runs the fetch command, printing every received line as NDJSON.
pub fn run(options: FetchOptions) -> Result<(), Box<dyn std::error::Error>> {
    info!("Fetching {} partition(s) from {}", options.cursors.len(), options.url);

    let config = ClientConfig::new(options.url, options.partitions)
        .with_timeout(options.timeout)
        .with_accept(options.accept);
    let http = ReqwestClient::new(&config)?;
    let request_headers = options.request_headers;
    let client = Client::new(config, http).with_request_hook(move |request| {
        for (name, value) in &request_headers {
            request.set_header(name.clone(), value.clone());
        }
        Ok(())
    });

    let mut sink = FnSink::new(
        |partition, headers, data| print_line(&FeedLine::event(partition, headers, data)),
        |partition, cursor| print_line(&FeedLine::checkpoint(partition, cursor)),
    );

    let summary = client.fetch_events_with(
        &options.cursors,
        options.page_size_hint,
        &options.headers,
        &mut sink,
        &CancellationToken::new(),
    )?;
    info!(
        "Fetched {} event(s) and {} checkpoint(s)",
        summary.events, summary.checkpoints
    );
    Ok(())
}
