//! Error types for nerium-contrib.
//!
//! Defines the error enum shared by the plugins. Errors raised by sqlx pass
//! through unchanged in the `Database` variant.

use thiserror::Error;

/// Main error type for plugin operations.
#[derive(Error, Debug)]
pub enum NeriumError {
    /// Connection string could not be turned into a connection.
    #[error("Connection error: {0}")]
    Connection(String),

    /// Query could not be prepared (unbound parameter, bad placeholder, etc.)
    #[error("Query error: {0}")]
    Query(String),

    /// Configuration errors (unreadable dotenv file, malformed entries, etc.)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Payload did not match the result schema.
    #[error("Schema error: {0}")]
    Schema(#[from] serde_json::Error),

    /// Errors raised by the database client, propagated as-is.
    #[error(transparent)]
    Database(#[from] sqlx::Error),

    /// Filesystem errors while reading query files.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl NeriumError {
    /// Creates a connection error with the given message.
    pub fn connection(msg: impl Into<String>) -> Self {
        Self::Connection(msg.into())
    }

    /// Creates a query error with the given message.
    pub fn query(msg: impl Into<String>) -> Self {
        Self::Query(msg.into())
    }

    /// Creates a configuration error with the given message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Returns the error category as a string for display purposes.
    pub fn category(&self) -> &'static str {
        match self {
            Self::Connection(_) => "Connection Error",
            Self::Query(_) => "Query Error",
            Self::Config(_) => "Configuration Error",
            Self::Schema(_) => "Schema Error",
            Self::Database(_) => "Database Error",
            Self::Io(_) => "I/O Error",
        }
    }
}

/// Result type alias using NeriumError.
pub type Result<T> = std::result::Result<T, NeriumError>;
