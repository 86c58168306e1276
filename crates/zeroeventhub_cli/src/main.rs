//! ZeroEventHub CLI
//!
//! Command-line tools for ZeroEventHub feeds.
//!
//! # Commands
//!
//! - `query` - Encode the feed query for a set of cursors
//! - `fetch` - Fetch one page of a feed over HTTP and print its lines
//! - `inspect` - Decode a saved feed body and summarize it
//! - `render` - Render a JSON fixture as a feed body

mod commands;

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::time::Duration;
use tracing_subscriber::EnvFilter;
use zeroeventhub_protocol::Cursor;

/// ZeroEventHub feed tools.
#[derive(Parser)]
#[command(name = "zeh")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(global = true, short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Encode the feed query for a set of cursors
    Query {
        /// Feed endpoint URL to prefix the query with
        #[arg(short, long)]
        url: Option<String>,

        /// Number of partitions the server has
        #[arg(short = 'n', long, default_value = "1")]
        partitions: u32,

        /// Cursor as PARTITION=VALUE (repeatable)
        #[arg(
            short,
            long = "cursor",
            required = true,
            value_parser = commands::query::parse_cursor
        )]
        cursors: Vec<Cursor>,

        /// Page size hint (0 lets the server decide)
        #[arg(short, long, default_value = "0")]
        page_size_hint: u32,

        /// Event header to request (repeatable)
        #[arg(long = "header")]
        headers: Vec<String>,

        /// Request every header
        #[arg(long)]
        all_headers: bool,
    },

    /// Fetch one page of a feed over HTTP and print its lines
    Fetch {
        /// Feed endpoint URL
        url: String,

        /// Number of partitions the server has
        #[arg(short = 'n', long, default_value = "1")]
        partitions: u32,

        /// Cursor as PARTITION=VALUE (repeatable)
        #[arg(
            short,
            long = "cursor",
            required = true,
            value_parser = commands::query::parse_cursor
        )]
        cursors: Vec<Cursor>,

        /// Page size hint (0 lets the server decide)
        #[arg(short, long, default_value = "0")]
        page_size_hint: u32,

        /// Event header to request (repeatable)
        #[arg(long = "header")]
        headers: Vec<String>,

        /// Request every header
        #[arg(long)]
        all_headers: bool,

        /// Extra request header as "NAME: VALUE" (repeatable)
        #[arg(
            short = 'H',
            long = "request-header",
            value_parser = commands::fetch::parse_request_header
        )]
        request_headers: Vec<(String, String)>,

        /// Preferred response format (ndjson, json)
        #[arg(short, long, default_value = "ndjson", value_parser = commands::render::parse_format)]
        format: zeroeventhub_protocol::FeedFormat,

        /// Request timeout in seconds
        #[arg(short, long, default_value = "30")]
        timeout: u64,
    },

    /// Decode a saved feed body and summarize it
    Inspect {
        /// Path to the feed body (NDJSON or JSON array)
        path: PathBuf,

        /// List every event
        #[arg(short, long)]
        events: bool,

        /// Output format (text, json)
        #[arg(short, long, default_value = "text")]
        format: String,
    },

    /// Render a JSON fixture as a feed body
    Render {
        /// Path to the fixture
        path: PathBuf,

        /// Feed format (ndjson, json)
        #[arg(short, long, default_value = "ndjson", value_parser = commands::render::parse_format)]
        format: zeroeventhub_protocol::FeedFormat,
    },

    /// Show version information
    Version,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Query {
            url,
            partitions,
            cursors,
            page_size_hint,
            headers,
            all_headers,
        } => {
            let headers = commands::query::header_selection(&headers, all_headers);
            commands::query::run(url.as_deref(), &cursors, partitions, page_size_hint, &headers)?;
        }
        Commands::Fetch {
            url,
            partitions,
            cursors,
            page_size_hint,
            headers,
            all_headers,
            request_headers,
            format,
            timeout,
        } => {
            commands::fetch::run(commands::fetch::FetchOptions {
                url,
                partitions,
                cursors,
                page_size_hint,
                headers: commands::query::header_selection(&headers, all_headers),
                accept: format,
                timeout: Duration::from_secs(timeout),
                request_headers,
            })?;
        }
        Commands::Inspect {
            path,
            events,
            format,
        } => {
            commands::inspect::run(&path, events, &format)?;
        }
        Commands::Render { path, format } => {
            commands::render::run(&path, format)?;
        }
        Commands::Version => {
            println!("ZeroEventHub CLI v{}", env!("CARGO_PKG_VERSION"));
        }
    }

    Ok(())
}
