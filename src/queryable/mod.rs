//! Queryable backends.
//!
//! A queryable resolves a query file's name to a configured backend and runs
//! SQL against it. The query file name follows `<name>.<backend>.<ext>`; every
//! segment after the first is part of the backend code.

mod takei;

pub use takei::TakeiQueryable;

use crate::db::{QueryParams, Record};
use crate::error::Result;
use async_trait::async_trait;
use std::path::Path;

/// Capability for executing queries against a resolved backend.
#[async_trait]
pub trait Queryable: Send + Sync {
    /// Runs `sql` against the backend named by `query_file` and returns every
    /// row as a record.
    async fn results(&self, query_file: &str, sql: &str, params: &QueryParams)
        -> Result<Vec<Record>>;

    /// Lists the tables of the backend named by `query_file`.
    async fn get_table_list(&self, query_file: &str) -> Result<Vec<String>>;
}

/// Derives the backend code from a query file path.
///
/// Takes the last path segment, drops everything up to the first `.`, and
/// joins the remaining dot-separated pieces with no separator:
/// `reports/monthly.pg.sql` gives `pgsql`, `report.mysql` gives `mysql`.
pub fn parse_backend_code(query_file: &str) -> String {
    let file_name = query_file
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or(query_file);

    file_name.split('.').skip(1).collect()
}

/// Reads the SQL text of a query file.
pub fn load_query(path: &Path) -> Result<String> {
    Ok(std::fs::read_to_string(path)?)
}
