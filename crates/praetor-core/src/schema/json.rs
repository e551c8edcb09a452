//! JSON Schema adapter.

use super::{BoxFuture, Issue, Schema, SchemaError};
use jsonschema::Validator;
use serde_json::Value;

/// A compiled JSON Schema document.
///
/// JSON Schema validates without transforming, so the coerced value is the
/// input unchanged.
///
/// # Example
///
/// ```
/// use praetor_core::schema::JsonSchema;
/// use serde_json::json;
///
/// let schema = JsonSchema::compile(&json!({
///     "type": "object",
///     "properties": {"bar": {"type": "string"}},
///     "required": ["bar"]
/// }))
/// .unwrap();
///
/// assert!(schema.check(&json!({"bar": "x"})).is_ok());
/// assert!(schema.check(&json!({"bar": 1})).is_err());
/// ```
pub struct JsonSchema {
    validator: Validator,
}

impl JsonSchema {
    /// Compiles a schema document.
    pub fn compile(schema: &Value) -> Result<Self, SchemaError> {
        let validator = jsonschema::validator_for(schema)
            .map_err(|err| SchemaError::single("invalid_schema", err.to_string()))?;
        Ok(Self { validator })
    }

    /// Compiles a schema document from a JSON string.
    pub fn parse(schema_json: &str) -> Result<Self, SchemaError> {
        let schema: Value = serde_json::from_str(schema_json)
            .map_err(|err| SchemaError::single("invalid_schema", err.to_string()))?;
        Self::compile(&schema)
    }

    /// Validates synchronously.
    pub fn check(&self, value: &Value) -> Result<Value, SchemaError> {
        let issues: Vec<Issue> = self
            .validator
            .iter_errors(value)
            .map(|err| {
                let issue = Issue::new("json_schema", err.to_string());
                let segments: Vec<String> = err
                    .instance_path()
                    .iter()
                    .map(|segment| segment.to_string())
                    .collect();
                segments
                    .into_iter()
                    .rev()
                    .fold(issue, |issue, segment| issue.under(segment))
            })
            .collect();

        if issues.is_empty() {
            Ok(value.clone())
        } else {
            Err(SchemaError::new(issues))
        }
    }
}

impl std::fmt::Debug for JsonSchema {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JsonSchema").finish_non_exhaustive()
    }
}

impl Schema for JsonSchema {
    fn validate<'a>(&'a self, value: &'a Value) -> BoxFuture<'a, Result<Value, SchemaError>> {
        let result = self.check(value);
        Box::pin(async move { result })
    }
}
