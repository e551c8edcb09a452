//! The per-request invalid record.

use crate::part::{FailureRecord, Part};
use crate::schema::SchemaError;
use serde::Serialize;

/// Aggregate of which request parts failed validation and why.
///
/// Exactly one record exists per validated request. It serializes as
/// `{"error": bool, "<part>": <SchemaError>, ...}` with absent parts omitted.
///
/// The `error` flag is true if and only if at least one part slot is set;
/// [`InvalidRecord::record`] is the only way to set a slot, and keeps the
/// flag in sync.
///
/// # Example
///
/// ```
/// use praetor_core::{InvalidRecord, Part, SchemaError};
///
/// let mut record = InvalidRecord::valid();
/// assert!(!record.has_errors());
///
/// record.record(Part::Query, SchemaError::single("required", "Required"));
/// assert!(record.has_errors());
/// assert!(record.get(Part::Query).is_some());
/// assert!(record.get(Part::Body).is_none());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct InvalidRecord {
    /// True iff at least one part failed.
    error: bool,
    /// Header validation error.
    #[serde(skip_serializing_if = "Option::is_none")]
    headers: Option<SchemaError>,
    /// Path parameter validation error.
    #[serde(skip_serializing_if = "Option::is_none")]
    params: Option<SchemaError>,
    /// Query validation error.
    #[serde(skip_serializing_if = "Option::is_none")]
    query: Option<SchemaError>,
    /// Body validation error.
    #[serde(skip_serializing_if = "Option::is_none")]
    body: Option<SchemaError>,
    /// File upload validation error.
    #[serde(skip_serializing_if = "Option::is_none")]
    files: Option<SchemaError>,
}

impl InvalidRecord {
    /// Creates a record with no failures.
    #[must_use]
    pub fn valid() -> Self {
        Self::default()
    }

    /// Builds a record from part failures.
    pub fn from_failures<'a>(failures: impl IntoIterator<Item = &'a FailureRecord>) -> Self {
        let mut record = Self::valid();
        for failure in failures {
            record.record(failure.part, failure.error.clone());
        }
        record
    }

    /// Stores the error for a part and marks the record as failed.
    pub fn record(&mut self, part: Part, error: SchemaError) {
        *self.slot_mut(part) = Some(error);
        self.error = true;
    }

    /// Returns the error recorded for a part.
    #[must_use]
    pub fn get(&self, part: Part) -> Option<&SchemaError> {
        match part {
            Part::Headers => self.headers.as_ref(),
            Part::Params => self.params.as_ref(),
            Part::Query => self.query.as_ref(),
            Part::Body => self.body.as_ref(),
            Part::Files => self.files.as_ref(),
        }
    }

    /// Returns the parts that failed, in [`Part::ALL`] order.
    #[must_use]
    pub fn failed_parts(&self) -> Vec<Part> {
        Part::ALL
            .into_iter()
            .filter(|part| self.get(*part).is_some())
            .collect()
    }

    /// Returns `true` if any part failed.
    #[must_use]
    pub fn has_errors(&self) -> bool {
        self.error
    }

    fn slot_mut(&mut self, part: Part) -> &mut Option<SchemaError> {
        match part {
            Part::Headers => &mut self.headers,
            Part::Params => &mut self.params,
            Part::Query => &mut self.query,
            Part::Body => &mut self.body,
            Part::Files => &mut self.files,
        }
    }
}
