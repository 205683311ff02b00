//! Environment-configured queryable.
//!
//! Resolves the backend code of a query file through [`BackendConfig`] and
//! runs the query on a connection from the injected provider. One connection
//! is acquired per call and closed before returning.

use super::{parse_backend_code, Queryable};
use crate::config::{BackendConfig, NO_BACKEND};
use crate::db::{Connection, ConnectionProvider, QueryParams, Record, SqlxConnectionProvider};
use crate::error::Result;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, warn};

/// Queryable backed by `<CODE>_BACKEND` connection strings.
#[derive(Clone)]
pub struct TakeiQueryable {
    config: Arc<BackendConfig>,
    provider: Arc<dyn ConnectionProvider>,
}

impl TakeiQueryable {
    /// Creates a queryable that opens sqlx connections.
    pub fn new(config: Arc<BackendConfig>) -> Self {
        Self::with_provider(config, Arc::new(SqlxConnectionProvider::new()))
    }

    /// Creates a queryable with a custom connection provider.
    pub fn with_provider(config: Arc<BackendConfig>, provider: Arc<dyn ConnectionProvider>) -> Self {
        Self { config, provider }
    }

    /// Derives the backend code of a query file.
    pub fn parse(&self, query_file: &str) -> String {
        parse_backend_code(query_file)
    }

    /// Resolves a backend code to its connection string, or the
    /// `NO BACKEND` sentinel.
    pub fn backend_lookup(&self, backend_code: &str) -> String {
        let backend = self.config.backend_lookup(backend_code);
        if backend == NO_BACKEND {
            warn!("No backend configured for code '{}'", backend_code);
        }
        backend
    }

    async fn connect(&self, query_file: &str) -> Result<Box<dyn Connection>> {
        let backend_code = self.parse(query_file);
        debug!("Query file {} uses backend code '{}'", query_file, backend_code);
        let connection_string = self.backend_lookup(&backend_code);
        self.provider.acquire(&connection_string).await
    }
}

impl std::fmt::Debug for TakeiQueryable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TakeiQueryable")
            .field("backends", &self.config.backend_count())
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl Queryable for TakeiQueryable {
    async fn results(
        &self,
        query_file: &str,
        sql: &str,
        params: &QueryParams,
    ) -> Result<Vec<Record>> {
        let mut conn = self.connect(query_file).await?;
        let records = conn.fetch_records(sql, params).await;
        finish(conn, records).await
    }

    async fn get_table_list(&self, query_file: &str) -> Result<Vec<String>> {
        let mut conn = self.connect(query_file).await?;
        let tables = conn.table_names().await;
        finish(conn, tables).await
    }
}

/// Closes the connection and returns the operation's outcome. A failed close
/// is logged and never replaces that outcome.
async fn finish<T>(mut conn: Box<dyn Connection>, outcome: Result<T>) -> Result<T> {
    if let Err(e) = conn.close().await {
        warn!("Failed to close connection: {}", e);
    }
    outcome
}
