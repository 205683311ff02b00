//! Result formatters.
//!
//! A formatter turns the rows of a query into the payload handed back to the
//! caller. Request parameters and the clock are passed in explicitly so
//! formatting does not depend on ambient request state.

mod affix;

pub use affix::{AffixFormatter, Envelope, EnvelopeMetadata};

use crate::db::Record;
use chrono::{Local, NaiveDateTime, Timelike};
use serde::Serialize;
use std::collections::BTreeMap;

/// Turns a held query result into a serializable payload.
pub trait ResultFormatter {
    type Output: Serialize;

    /// Formats the held result for the given request.
    fn format_results(&self, request: &RequestContext) -> Self::Output;
}

/// Read-only view of the request being served.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestContext {
    /// Query-string parameters, one value per key.
    pub params: BTreeMap<String, String>,
}

impl RequestContext {
    /// Creates a context from already-decoded parameters.
    pub fn new(params: BTreeMap<String, String>) -> Self {
        Self { params }
    }

    /// Parses a raw query string (`a=1&b=two+words`). A leading `?` is
    /// allowed; when a key repeats, its first value is kept.
    pub fn from_query_string(query: &str) -> Self {
        let query = query.strip_prefix('?').unwrap_or(query);
        let mut params = BTreeMap::new();
        for (key, value) in url::form_urlencoded::parse(query.as_bytes()) {
            params
                .entry(key.into_owned())
                .or_insert_with(|| value.into_owned());
        }
        Self { params }
    }
}

/// Source of the "executed" timestamp.
pub trait Clock: Send + Sync {
    fn now(&self) -> NaiveDateTime;
}

/// Local wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        Local::now().naive_local()
    }
}

/// Clock that always returns the same instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub NaiveDateTime);

impl Clock for FixedClock {
    fn now(&self) -> NaiveDateTime {
        self.0
    }
}

/// Formats a timestamp as ISO-8601 without offset. Microseconds are included
/// only when non-zero.
pub fn isoformat(ts: &NaiveDateTime) -> String {
    if ts.nanosecond() / 1_000 == 0 {
        ts.format("%Y-%m-%dT%H:%M:%S").to_string()
    } else {
        ts.format("%Y-%m-%dT%H:%M:%S%.6f").to_string()
    }
}

/// Formatter that returns the rows unchanged.
#[derive(Debug, Clone, Default)]
pub struct DefaultFormatter {
    result: Vec<Record>,
}

impl DefaultFormatter {
    pub fn new(result: Vec<Record>) -> Self {
        Self { result }
    }
}

impl ResultFormatter for DefaultFormatter {
    type Output = Vec<Record>;

    fn format_results(&self, _request: &RequestContext) -> Self::Output {
        self.result.clone()
    }
}
