//! Request parts and the part validator.
//!
//! A request is validated as five independent [`Part`]s. The part validator
//! is a leaf operation: it runs one schema over one value and tags a failure
//! with the part it came from, so the aggregator can route it into the right
//! [`InvalidRecord`](crate::InvalidRecord) slot.

use crate::schema::{Schema, SchemaError};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One of the five independently validated request facets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Part {
    /// Request headers.
    Headers,
    /// Path parameters.
    Params,
    /// Query string.
    Query,
    /// Request body.
    Body,
    /// Uploaded files.
    Files,
}

impl Part {
    /// Every part, in the order they are validated and reported.
    pub const ALL: [Part; 5] = [
        Self::Headers,
        Self::Params,
        Self::Query,
        Self::Body,
        Self::Files,
    ];

    /// Returns the part name used on the wire and in logs.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Headers => "headers",
            Self::Params => "params",
            Self::Query => "query",
            Self::Body => "body",
            Self::Files => "files",
        }
    }
}

impl std::fmt::Display for Part {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A failed part validation, tagged with its part.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailureRecord {
    /// The part that failed.
    pub part: Part,
    /// The structured error reported by the schema.
    pub error: SchemaError,
}

/// Outcome of validating one part.
#[derive(Debug, Clone, PartialEq)]
pub enum PartResult {
    /// No schema configured for the part; it is accepted and left untouched.
    Skipped,
    /// The schema accepted the part and produced this coerced value.
    Coerced(Value),
    /// The schema rejected the part.
    Failed(FailureRecord),
}

impl PartResult {
    /// Returns the failure, if any.
    #[must_use]
    pub fn failure(&self) -> Option<&FailureRecord> {
        match self {
            Self::Failed(failure) => Some(failure),
            _ => None,
        }
    }

    /// Consumes the result, returning the coerced value, if any.
    #[must_use]
    pub fn into_coerced(self) -> Option<Value> {
        match self {
            Self::Coerced(value) => Some(value),
            _ => None,
        }
    }
}

/// Runs an optional schema over a value.
///
/// Returns `None` when no schema is configured. Never mutates `data`.
pub async fn validate_value(
    data: &Value,
    schema: Option<&dyn Schema>,
) -> Option<Result<Value, SchemaError>> {
    match schema {
        Some(schema) => Some(schema.validate(data).await),
        None => None,
    }
}

/// Validates one request part against its optional schema.
///
/// # Example
///
/// ```
/// use praetor_core::{validate_part, Part, PartResult};
/// use praetor_core::schema::{FieldType, ObjectSchema};
/// use serde_json::json;
///
/// # tokio_test::block_on(async {
/// let schema = ObjectSchema::builder().required("bar", FieldType::String).build();
///
/// let skipped = validate_part(&json!({}), None, Part::Query).await;
/// assert_eq!(skipped, PartResult::Skipped);
///
/// let failed = validate_part(&json!({}), Some(&schema), Part::Query).await;
/// assert_eq!(failed.failure().unwrap().part, Part::Query);
/// # });
/// ```
pub async fn validate_part(data: &Value, schema: Option<&dyn Schema>, part: Part) -> PartResult {
    match validate_value(data, schema).await {
        None => PartResult::Skipped,
        Some(Ok(coerced)) => PartResult::Coerced(coerced),
        Some(Err(error)) => PartResult::Failed(FailureRecord { part, error }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{FieldType, ObjectSchema};
    use serde_json::json;

    #[test]
    fn test_part_names() {
        let names: Vec<&str> = Part::ALL.iter().map(|p| p.as_str()).collect();
        assert_eq!(names, vec!["headers", "params", "query", "body", "files"]);
        assert_eq!(Part::Body.to_string(), "body");
    }

    #[tokio::test]
    async fn test_no_schema_is_skipped() {
        let result = validate_part(&json!({"anything": "goes"}), None, Part::Body).await;
        assert_eq!(result, PartResult::Skipped);
        assert!(result.failure().is_none());
    }

    #[tokio::test]
    async fn test_success_returns_coerced_value() {
        let schema = ObjectSchema::builder()
            .required("id", FieldType::Integer)
            .coerce(true)
            .build();
        let result = validate_part(&json!({"id": "5"}), Some(&schema), Part::Params).await;
        assert_eq!(result.into_coerced(), Some(json!({"id": 5})));
    }

    #[tokio::test]
    async fn test_failure_is_tagged_with_part() {
        let schema = ObjectSchema::builder().required("id", FieldType::Integer).build();
        let result = validate_part(&json!({}), Some(&schema), Part::Files).await;
        let failure = result.failure().unwrap();
        assert_eq!(failure.part, Part::Files);
        assert!(failure.error.has_code("required"));
    }

    #[tokio::test]
    async fn test_validation_is_idempotent() {
        let schema = ObjectSchema::builder()
            .required("n", FieldType::Number)
            .coerce(true)
            .build();
        let input = json!({"n": "1.25", "dropped": 1});
        let first = validate_part(&input, Some(&schema), Part::Query).await;
        let second = validate_part(&input, Some(&schema), Part::Query).await;
        assert_eq!(first, second);
        assert_eq!(input, json!({"n": "1.25", "dropped": 1}));
    }
}
