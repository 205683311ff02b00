//! Result payload schema.
//!
//! Declares the serialized shape of a named query result:
//! `{name, data, metadata, params}`. The rows live in `result` and are
//! written under the `data` key.

use crate::db::Record;
use crate::error::Result;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};

/// A named query result with its metadata and request parameters.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ResultPayload {
    #[serde(default)]
    pub name: String,

    #[serde(rename = "data", default)]
    pub result: Vec<Record>,

    #[serde(default)]
    pub metadata: Map<String, JsonValue>,

    #[serde(default)]
    pub params: Map<String, JsonValue>,
}

impl ResultPayload {
    /// Creates a payload with empty metadata and params.
    pub fn new(name: impl Into<String>, result: Vec<Record>) -> Self {
        Self {
            name: name.into(),
            result,
            ..Default::default()
        }
    }

    /// Adds a metadata entry.
    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<JsonValue>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    /// Replaces the params.
    pub fn with_params(mut self, params: Map<String, JsonValue>) -> Self {
        self.params = params;
        self
    }
}

/// Serializer/validator for [`ResultPayload`].
pub struct ResultSchema;

impl ResultSchema {
    /// Serializes a payload to a JSON value.
    pub fn dump(payload: &ResultPayload) -> Result<JsonValue> {
        Ok(serde_json::to_value(payload)?)
    }

    /// Serializes a payload to a JSON string.
    pub fn dumps(payload: &ResultPayload) -> Result<String> {
        Ok(serde_json::to_string(payload)?)
    }

    /// Validates and deserializes a JSON value. Missing fields default to
    /// empty values; wrong types and unknown fields are schema errors.
    pub fn load(value: JsonValue) -> Result<ResultPayload> {
        Ok(serde_json::from_value(value)?)
    }

    /// Validates and deserializes a JSON string.
    pub fn loads(s: &str) -> Result<ResultPayload> {
        Ok(serde_json::from_str(s)?)
    }
}
