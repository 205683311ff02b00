//! Database client layer for nerium-contrib.
//!
//! Provides the connection-provider seam used by the queryable adapter,
//! allowing sqlx-backed, pooled or mocked connections to be swapped in
//! without touching adapter logic.

mod mock;
mod params;
mod postgres;
mod sqlite;
mod types;

pub use mock::{ExecutedQuery, MockConnection, MockConnectionProvider};
pub use params::{bind_named, BoundQuery, PlaceholderStyle};
pub use postgres::PostgresClient;
pub use sqlite::SqliteClient;
pub use types::{QueryParams, Record};

use crate::error::{NeriumError, Result};
use async_trait::async_trait;
use tracing::debug;
use url::Url;

/// Supported database backends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DatabaseBackend {
    Postgres,
    Sqlite,
}

impl DatabaseBackend {
    /// Returns the backend as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Postgres => "postgres",
            Self::Sqlite => "sqlite",
        }
    }

    /// Parses a backend from a URL scheme.
    ///
    /// Driver suffixes (`postgresql+psycopg2`) are ignored.
    pub fn parse(scheme: &str) -> Option<Self> {
        let base = scheme.split('+').next().unwrap_or(scheme);
        match base.to_lowercase().as_str() {
            "postgres" | "postgresql" => Some(Self::Postgres),
            "sqlite" | "sqlite3" => Some(Self::Sqlite),
            _ => None,
        }
    }

    /// Determines the backend a connection string points at.
    pub fn from_connection_string(connection_string: &str) -> Result<Self> {
        let url = Url::parse(connection_string).map_err(|e| {
            NeriumError::connection(format!(
                "Invalid connection string '{connection_string}': {e}"
            ))
        })?;

        Self::parse(url.scheme()).ok_or_else(|| {
            NeriumError::connection(format!(
                "Unsupported database scheme '{}'. Expected 'postgres' or 'sqlite'",
                url.scheme()
            ))
        })
    }

    /// Placeholder style used for bound parameters.
    pub fn placeholder_style(&self) -> PlaceholderStyle {
        match self {
            Self::Postgres => PlaceholderStyle::Dollar,
            Self::Sqlite => PlaceholderStyle::Question,
        }
    }
}

/// A single open database connection.
#[async_trait]
pub trait Connection: Send {
    /// Executes a query with named parameters and materializes every row.
    async fn fetch_records(&mut self, sql: &str, params: &QueryParams) -> Result<Vec<Record>>;

    /// Lists the user tables of the database, sorted by name.
    async fn table_names(&mut self) -> Result<Vec<String>>;

    /// Closes the connection. Further calls fail with a connection error.
    async fn close(&mut self) -> Result<()>;
}

/// Hands out connections for connection strings.
#[async_trait]
pub trait ConnectionProvider: Send + Sync {
    /// Opens (or borrows) a connection for the given connection string.
    async fn acquire(&self, connection_string: &str) -> Result<Box<dyn Connection>>;
}

/// Provider that opens a fresh sqlx connection on every call.
#[derive(Debug, Clone, Copy, Default)]
pub struct SqlxConnectionProvider;

impl SqlxConnectionProvider {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl ConnectionProvider for SqlxConnectionProvider {
    async fn acquire(&self, connection_string: &str) -> Result<Box<dyn Connection>> {
        let backend = DatabaseBackend::from_connection_string(connection_string)?;
        debug!("Opening {} connection", backend.as_str());

        match backend {
            DatabaseBackend::Postgres => {
                let client = PostgresClient::connect(connection_string).await?;
                Ok(Box::new(client))
            }
            DatabaseBackend::Sqlite => {
                let client = SqliteClient::connect(connection_string).await?;
                Ok(Box::new(client))
            }
        }
    }
}
