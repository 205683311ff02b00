//! Mock connection provider for testing.
//!
//! Hands out in-memory connections that return predefined rows and record
//! what they were asked to do.

use super::{Connection, ConnectionProvider, QueryParams, Record};
use crate::config::NO_BACKEND;
use crate::error::{NeriumError, Result};
use async_trait::async_trait;
use std::sync::{Arc, Mutex};

/// A statement executed against a mock connection.
#[derive(Debug, Clone, PartialEq)]
pub struct ExecutedQuery {
    pub connection_string: String,
    pub sql: String,
    pub params: QueryParams,
}

#[derive(Debug, Default)]
struct MockLog {
    acquired: Vec<String>,
    executed: Vec<ExecutedQuery>,
}

/// A provider whose connections return fixed rows and tables.
#[derive(Debug, Clone, Default)]
pub struct MockConnectionProvider {
    rows: Vec<Record>,
    tables: Vec<String>,
    fail_query: bool,
    fail_close: bool,
    log: Arc<Mutex<MockLog>>,
}

impl MockConnectionProvider {
    /// Creates a provider whose connections return no rows and no tables.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the rows every query returns.
    pub fn with_rows(mut self, rows: Vec<Record>) -> Self {
        self.rows = rows;
        self
    }

    /// Sets the table names every connection reports.
    pub fn with_tables<I, S>(mut self, tables: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tables = tables.into_iter().map(Into::into).collect();
        self
    }

    /// Makes every query and table listing fail with a database error.
    pub fn with_failing_query(mut self) -> Self {
        self.fail_query = true;
        self
    }

    /// Makes `close` fail with a connection error.
    pub fn with_failing_close(mut self) -> Self {
        self.fail_close = true;
        self
    }

    /// Connection strings passed to `acquire`, in call order.
    pub fn acquired(&self) -> Vec<String> {
        self.log.lock().map(|log| log.acquired.clone()).unwrap_or_default()
    }

    /// Queries executed on any connection from this provider, in call order.
    pub fn executed(&self) -> Vec<ExecutedQuery> {
        self.log.lock().map(|log| log.executed.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl ConnectionProvider for MockConnectionProvider {
    async fn acquire(&self, connection_string: &str) -> Result<Box<dyn Connection>> {
        if let Ok(mut log) = self.log.lock() {
            log.acquired.push(connection_string.to_string());
        }

        if connection_string == NO_BACKEND {
            return Err(NeriumError::connection(format!(
                "Invalid connection string '{connection_string}'"
            )));
        }

        Ok(Box::new(MockConnection {
            connection_string: connection_string.to_string(),
            rows: self.rows.clone(),
            tables: self.tables.clone(),
            fail_query: self.fail_query,
            fail_close: self.fail_close,
            log: Arc::clone(&self.log),
            closed: false,
        }))
    }
}

/// Connection handed out by [`MockConnectionProvider`].
#[derive(Debug)]
pub struct MockConnection {
    connection_string: String,
    rows: Vec<Record>,
    tables: Vec<String>,
    fail_query: bool,
    fail_close: bool,
    log: Arc<Mutex<MockLog>>,
    closed: bool,
}

impl MockConnection {
    fn ensure_open(&self) -> Result<()> {
        if self.closed {
            return Err(NeriumError::connection("Mock connection is closed"));
        }
        if self.fail_query {
            return Err(NeriumError::Database(sqlx::Error::RowNotFound));
        }
        Ok(())
    }
}

#[async_trait]
impl Connection for MockConnection {
    async fn fetch_records(&mut self, sql: &str, params: &QueryParams) -> Result<Vec<Record>> {
        self.ensure_open()?;
        if let Ok(mut log) = self.log.lock() {
            log.executed.push(ExecutedQuery {
                connection_string: self.connection_string.clone(),
                sql: sql.to_string(),
                params: params.clone(),
            });
        }
        Ok(self.rows.clone())
    }

    async fn table_names(&mut self) -> Result<Vec<String>> {
        self.ensure_open()?;
        let mut tables = self.tables.clone();
        tables.sort();
        Ok(tables)
    }

    async fn close(&mut self) -> Result<()> {
        self.closed = true;
        if self.fail_close {
            return Err(NeriumError::connection("Mock connection failed to close"));
        }
        Ok(())
    }
}
