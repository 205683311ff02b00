//! Affix formatter: wraps rows with an error flag and request metadata.

use super::{isoformat, Clock, RequestContext, ResultFormatter, SystemClock};
use crate::db::Record;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;

/// Rows plus error flag and metadata, as returned to the caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    /// Always false; this formatter does not look at error state.
    pub error: bool,
    pub response: Vec<Record>,
    pub metadata: EnvelopeMetadata,
}

/// Metadata attached by [`AffixFormatter`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnvelopeMetadata {
    /// ISO-8601 local time the result was formatted.
    pub executed: String,
    /// Query-string parameters of the request.
    pub params: BTreeMap<String, String>,
}

/// Wraps a result array with error and metadata details.
#[derive(Clone)]
pub struct AffixFormatter {
    result: Vec<Record>,
    clock: Arc<dyn Clock>,
}

impl AffixFormatter {
    /// Creates a formatter for the given rows using the system clock.
    pub fn new(result: Vec<Record>) -> Self {
        Self {
            result,
            clock: Arc::new(SystemClock),
        }
    }

    /// Replaces the timestamp source.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }
}

impl std::fmt::Debug for AffixFormatter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AffixFormatter")
            .field("result", &self.result)
            .finish_non_exhaustive()
    }
}

impl ResultFormatter for AffixFormatter {
    type Output = Envelope;

    fn format_results(&self, request: &RequestContext) -> Envelope {
        Envelope {
            error: false,
            response: self.result.clone(),
            metadata: EnvelopeMetadata {
                executed: isoformat(&self.clock.now()),
                params: request.params.clone(),
            },
        }
    }
}
