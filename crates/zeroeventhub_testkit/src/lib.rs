//! # ZeroEventHub Testkit
//!
//! Test utilities for ZeroEventHub.
//!
//! This crate provides:
//! - Feed body fixtures (NDJSON and JSON array builders)
//! - Property-based test generators using proptest
//!
//! ## Usage
//!
//! ```rust,ignore
//! use zeroeventhub_testkit::prelude::*;
//!
//! proptest! {
//!     #[test]
//!     fn decodes(lines in feed_lines_strategy(4, 32)) {
//!         let body = ndjson_body(&lines);
//!         // ... decode and assert
//!     }
//! }
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod fixtures;
pub mod generators;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::fixtures::*;
    pub use crate::generators::*;
}

pub use fixtures::*;
pub use generators::*;
