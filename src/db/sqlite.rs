//! SQLite database client implementation.
//!
//! Provides the `SqliteClient` struct that implements the `Connection` trait
//! for SQLite databases using sqlx.

use super::types::{bind_json, bytes_value, float_value};
use super::{bind_named, Connection, DatabaseBackend, QueryParams, Record};
use crate::error::{NeriumError, Result};
use async_trait::async_trait;
use serde_json::Value as JsonValue;
use sqlx::sqlite::{SqliteConnectOptions, SqliteConnection, SqliteRow};
use sqlx::{Column as SqlxColumn, ConnectOptions, Connection as SqlxConnection, Row as SqlxRow};
use sqlx::{TypeInfo, ValueRef};
use std::str::FromStr;
use tracing::debug;

/// SQLite database client holding a single connection.
#[derive(Debug)]
pub struct SqliteClient {
    conn: Option<SqliteConnection>,
}

impl SqliteClient {
    /// Opens a connection.
    ///
    /// SQLAlchemy-style file URLs create a missing database file. sqlx-style
    /// URLs keep sqlx's behavior and need `?mode=rwc` for that.
    pub async fn connect(connection_string: &str) -> Result<Self> {
        let options = connect_options(connection_string)?;
        let conn = options.connect().await?;
        debug!("Opened SQLite connection");
        Ok(Self { conn: Some(conn) })
    }

    fn conn(&mut self) -> Result<&mut SqliteConnection> {
        self.conn
            .as_mut()
            .ok_or_else(|| NeriumError::connection("SQLite connection is closed"))
    }
}

#[async_trait]
impl Connection for SqliteClient {
    async fn fetch_records(&mut self, sql: &str, params: &QueryParams) -> Result<Vec<Record>> {
        let bound = bind_named(sql, params, DatabaseBackend::Sqlite.placeholder_style())?;
        let query = bind_json(sqlx::query(&bound.sql), bound.values);

        let rows = query.fetch_all(self.conn()?).await?;
        debug!("Query returned {} rows", rows.len());

        Ok(rows.iter().map(convert_row).collect())
    }

    async fn table_names(&mut self) -> Result<Vec<String>> {
        let names: Vec<String> = sqlx::query_scalar(
            r#"
            SELECT name
            FROM sqlite_master
            WHERE type = 'table' AND name NOT LIKE 'sqlite_%'
            ORDER BY name
            "#,
        )
        .fetch_all(self.conn()?)
        .await?;

        Ok(names)
    }

    async fn close(&mut self) -> Result<()> {
        if let Some(conn) = self.conn.take() {
            conn.close().await?;
        }
        Ok(())
    }
}

/// Builds connect options, accepting both sqlx URLs (`sqlite:data.db`,
/// `sqlite://data.db`) and SQLAlchemy URLs (`sqlite:///data.db` relative,
/// `sqlite:////abs/data.db` absolute, `sqlite://` in-memory).
pub(crate) fn connect_options(connection_string: &str) -> Result<SqliteConnectOptions> {
    let rest = connection_string
        .split_once(':')
        .map(|(_, rest)| rest)
        .unwrap_or(connection_string);

    match rest.strip_prefix("//") {
        Some(path) if path.is_empty() || path.starts_with(['/', '?']) => sqlalchemy_options(path),
        _ => Ok(SqliteConnectOptions::from_str(connection_string)?),
    }
}

/// Options for the part of a SQLAlchemy URL after `sqlite://`. Query options
/// are driver arguments there, not part of the file name.
fn sqlalchemy_options(path: &str) -> Result<SqliteConnectOptions> {
    let path = match path.split_once('?') {
        Some((path, query)) => {
            debug!("Ignoring SQLite URL options '{}'", query);
            path
        }
        None => path,
    };

    match path.strip_prefix('/') {
        None | Some("") | Some(":memory:") => Ok(SqliteConnectOptions::from_str("sqlite::memory:")?),
        Some(file) => Ok(SqliteConnectOptions::new()
            .filename(file)
            .create_if_missing(true)),
    }
}

/// Converts a sqlx SqliteRow to a record.
fn convert_row(row: &SqliteRow) -> Record {
    row.columns()
        .iter()
        .map(|col| (col.name().to_string(), convert_value(row, col.ordinal())))
        .collect()
}

/// Converts a single column value using the storage class of the value itself.
fn convert_value(row: &SqliteRow, index: usize) -> JsonValue {
    let type_name = match row.try_get_raw(index) {
        Ok(raw) if raw.is_null() => return JsonValue::Null,
        Ok(raw) => raw.type_info().name().to_uppercase(),
        Err(_) => return JsonValue::Null,
    };

    match type_name.as_str() {
        "BOOLEAN" => row
            .try_get::<Option<bool>, _>(index)
            .ok()
            .flatten()
            .map(JsonValue::Bool)
            .unwrap_or(JsonValue::Null),

        "INTEGER" | "INT8" | "BIGINT" => row
            .try_get::<Option<i64>, _>(index)
            .ok()
            .flatten()
            .map(JsonValue::from)
            .unwrap_or(JsonValue::Null),

        "REAL" | "FLOAT" | "DOUBLE" | "NUMERIC" => row
            .try_get::<Option<f64>, _>(index)
            .ok()
            .flatten()
            .map(float_value)
            .unwrap_or(JsonValue::Null),

        "BLOB" => row
            .try_get::<Option<Vec<u8>>, _>(index)
            .ok()
            .flatten()
            .map(bytes_value)
            .unwrap_or(JsonValue::Null),

        // TEXT, DATE, DATETIME and anything else come back as text
        _ => row
            .try_get::<Option<String>, _>(index)
            .ok()
            .flatten()
            .map(JsonValue::String)
            .unwrap_or(JsonValue::Null),
    }
}
