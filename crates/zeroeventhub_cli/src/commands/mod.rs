//! CLI command implementations.

pub mod fetch;
pub mod inspect;
pub mod query;
pub mod render;
