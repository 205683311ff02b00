//! PostgreSQL database client implementation.
//!
//! Provides the `PostgresClient` struct that implements the `Connection`
//! trait for PostgreSQL databases using sqlx.

use super::types::{bind_json, bytes_value, float_value, numeric_value};
use super::{bind_named, Connection, DatabaseBackend, QueryParams, Record};
use crate::error::{NeriumError, Result};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use serde_json::Value as JsonValue;
use sqlx::postgres::{PgConnectOptions, PgConnection, PgRow};
use sqlx::{Column as SqlxColumn, ConnectOptions, Connection as SqlxConnection, Row as SqlxRow};
use sqlx::types::{Decimal, Uuid};
use sqlx::TypeInfo;
use std::str::FromStr;
use tracing::debug;

/// PostgreSQL database client holding a single connection.
#[derive(Debug)]
pub struct PostgresClient {
    conn: Option<PgConnection>,
}

impl PostgresClient {
    /// Opens a connection.
    ///
    /// SQLAlchemy driver suffixes in the scheme (`postgresql+psycopg2://`)
    /// are stripped first.
    pub async fn connect(connection_string: &str) -> Result<Self> {
        let options = PgConnectOptions::from_str(&strip_driver(connection_string))?;
        let conn = options.connect().await?;
        debug!("Opened PostgreSQL connection");
        Ok(Self { conn: Some(conn) })
    }

    fn conn(&mut self) -> Result<&mut PgConnection> {
        self.conn
            .as_mut()
            .ok_or_else(|| NeriumError::connection("PostgreSQL connection is closed"))
    }
}

#[async_trait]
impl Connection for PostgresClient {
    async fn fetch_records(&mut self, sql: &str, params: &QueryParams) -> Result<Vec<Record>> {
        let bound = bind_named(sql, params, DatabaseBackend::Postgres.placeholder_style())?;
        let query = bind_json(sqlx::query(&bound.sql), bound.values);

        let rows = query.fetch_all(self.conn()?).await?;
        debug!("Query returned {} rows", rows.len());

        Ok(rows.iter().map(convert_row).collect())
    }

    async fn table_names(&mut self) -> Result<Vec<String>> {
        let names: Vec<String> = sqlx::query_scalar(
            r#"
            SELECT table_name::text
            FROM information_schema.tables
            WHERE table_schema = 'public' AND table_type = 'BASE TABLE'
            ORDER BY table_name
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

/// Removes a `+driver` suffix from the URL scheme.
fn strip_driver(connection_string: &str) -> String {
    match connection_string.split_once("://") {
        Some((scheme, rest)) => {
            let base = scheme.split('+').next().unwrap_or(scheme);
            format!("{base}://{rest}")
        }
        None => connection_string.to_string(),
    }
}

/// Converts a sqlx PgRow to a record.
fn convert_row(row: &PgRow) -> Record {
    row.columns()
        .iter()
        .map(|col| {
            let value = convert_value(row, col.ordinal(), col.type_info().name());
            (col.name().to_string(), value)
        })
        .collect()
}

/// Converts a single column value from a PgRow to JSON.
fn convert_value(row: &PgRow, index: usize, type_name: &str) -> JsonValue {
    match type_name.to_uppercase().as_str() {
        "BOOL" | "BOOLEAN" => row
            .try_get::<Option<bool>, _>(index)
            .ok()
            .flatten()
            .map(JsonValue::Bool)
            .unwrap_or(JsonValue::Null),

        "INT2" | "SMALLINT" => row
            .try_get::<Option<i16>, _>(index)
            .ok()
            .flatten()
            .map(JsonValue::from)
            .unwrap_or(JsonValue::Null),

        "INT4" | "INT" | "INTEGER" => row
            .try_get::<Option<i32>, _>(index)
            .ok()
            .flatten()
            .map(JsonValue::from)
            .unwrap_or(JsonValue::Null),

        "INT8" | "BIGINT" => row
            .try_get::<Option<i64>, _>(index)
            .ok()
            .flatten()
            .map(JsonValue::from)
            .unwrap_or(JsonValue::Null),

        "FLOAT4" | "REAL" => row
            .try_get::<Option<f32>, _>(index)
            .ok()
            .flatten()
            .map(|v| float_value(v as f64))
            .unwrap_or(JsonValue::Null),

        "FLOAT8" | "DOUBLE PRECISION" => row
            .try_get::<Option<f64>, _>(index)
            .ok()
            .flatten()
            .map(float_value)
            .unwrap_or(JsonValue::Null),

        "NUMERIC" | "DECIMAL" => row
            .try_get::<Option<Decimal>, _>(index)
            .ok()
            .flatten()
            .map(|v| numeric_value(&v.normalize().to_string()))
            .unwrap_or(JsonValue::Null),

        "UUID" => row
            .try_get::<Option<Uuid>, _>(index)
            .ok()
            .flatten()
            .map(|v| JsonValue::String(v.to_string()))
            .unwrap_or(JsonValue::Null),

        "JSON" | "JSONB" => row
            .try_get::<Option<JsonValue>, _>(index)
            .ok()
            .flatten()
            .unwrap_or(JsonValue::Null),

        "TIMESTAMP" => row
            .try_get::<Option<NaiveDateTime>, _>(index)
            .ok()
            .flatten()
            .map(|v| JsonValue::String(v.format("%Y-%m-%dT%H:%M:%S%.f").to_string()))
            .unwrap_or(JsonValue::Null),

        "TIMESTAMPTZ" => row
            .try_get::<Option<DateTime<Utc>>, _>(index)
            .ok()
            .flatten()
            .map(|v| JsonValue::String(v.to_rfc3339()))
            .unwrap_or(JsonValue::Null),

        "DATE" => row
            .try_get::<Option<NaiveDate>, _>(index)
            .ok()
            .flatten()
            .map(|v| JsonValue::String(v.to_string()))
            .unwrap_or(JsonValue::Null),

        "TIME" => row
            .try_get::<Option<NaiveTime>, _>(index)
            .ok()
            .flatten()
            .map(|v| JsonValue::String(v.to_string()))
            .unwrap_or(JsonValue::Null),

        "BYTEA" => row
            .try_get::<Option<Vec<u8>>, _>(index)
            .ok()
            .flatten()
            .map(bytes_value)
            .unwrap_or(JsonValue::Null),

        // Text-like types (VARCHAR, NAME, CITEXT, enums) decode as strings
        _ => match row
            .try_get::<Option<String>, _>(index)
            .or_else(|_| row.try_get_unchecked::<Option<String>, _>(index))
        {
            Ok(value) => value.map(JsonValue::String).unwrap_or(JsonValue::Null),
            Err(e) => {
                debug!("Cannot decode column {} of type {}: {}", index, type_name, e);
                JsonValue::Null
            }
        },
    }
}
