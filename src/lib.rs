//! nerium-contrib - plugins for file-based SQL query services.
//!
//! - [`formatter`]: wraps query results with request metadata.
//! - [`queryable`]: resolves a query file's backend code to a configured
//!   connection string and runs SQL against it.
//! - [`schema`]: serialized shape of a named result payload.

pub mod cli;
pub mod config;
pub mod db;
pub mod error;
pub mod formatter;
pub mod logging;
pub mod queryable;
pub mod schema;

pub use error::{NeriumError, Result};
