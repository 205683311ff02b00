//! Row and parameter types shared by the database clients.

use serde_json::{Map, Value as JsonValue};
use sqlx::query::Query;
use sqlx::{Database, Encode, Type};

/// A result row: column name to value, in column order.
pub type Record = Map<String, JsonValue>;

/// Named execution parameters, bound to `:name` placeholders.
pub type QueryParams = Map<String, JsonValue>;

/// Binds JSON values to a query in order.
///
/// Integers that fit in `i64` bind as integers, other numbers as floats.
/// Arrays and objects bind as their JSON text.
pub(crate) fn bind_json<'q, DB>(
    mut query: Query<'q, DB, <DB as Database>::Arguments<'q>>,
    values: Vec<JsonValue>,
) -> Query<'q, DB, <DB as Database>::Arguments<'q>>
where
    DB: Database,
    bool: Encode<'q, DB> + Type<DB>,
    i64: Encode<'q, DB> + Type<DB>,
    f64: Encode<'q, DB> + Type<DB>,
    String: Encode<'q, DB> + Type<DB>,
    Option<String>: Encode<'q, DB> + Type<DB>,
{
    for value in values {
        query = match value {
            JsonValue::Null => query.bind(None::<String>),
            JsonValue::Bool(b) => query.bind(b),
            JsonValue::Number(n) => match n.as_i64() {
                Some(i) => query.bind(i),
                None => query.bind(n.as_f64().unwrap_or(f64::NAN)),
            },
            JsonValue::String(s) => query.bind(s),
            other => query.bind(other.to_string()),
        };
    }
    query
}

/// Converts a float into a JSON value, mapping NaN and infinities to null.
pub(crate) fn float_value(v: f64) -> JsonValue {
    serde_json::Number::from_f64(v)
        .map(JsonValue::Number)
        .unwrap_or(JsonValue::Null)
}

/// Converts exact numeric text into a JSON number: an integer when it fits
/// in `i64`, otherwise a float. Unparseable text stays a string.
pub(crate) fn numeric_value(text: &str) -> JsonValue {
    if let Ok(i) = text.parse::<i64>() {
        return JsonValue::from(i);
    }
    match text.parse::<f64>() {
        Ok(f) if f.is_finite() => float_value(f),
        _ => JsonValue::String(text.to_string()),
    }
}

/// Converts binary data into a JSON array of bytes.
pub(crate) fn bytes_value(v: Vec<u8>) -> JsonValue {
    JsonValue::Array(v.into_iter().map(JsonValue::from).collect())
}
