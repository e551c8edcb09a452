//! Field-typed object schemas.
//!
//! [`ObjectSchema`] covers the common shape of request parts: a flat record of
//! named fields, each with a type. Transport parts (query strings, path
//! parameters, headers) only ever carry strings, so the schema can coerce
//! strings into numbers and booleans when [`ObjectSchemaBuilder::coerce`] is on.
//!
//! The output is always a freshly built object, so the unknown-keys policy
//! decides what the caller sees:
//!
//! - [`UnknownKeys::Strip`] (default) drops undeclared fields
//! - [`UnknownKeys::Passthrough`] copies them unchanged
//! - [`UnknownKeys::Strict`] reports them as `unrecognized_keys` issues

use super::{BoxFuture, Issue, Schema, SchemaError};
use serde_json::{Map, Number, Value};
use std::sync::Arc;

/// Field type for object schema validation.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldType {
    /// String type.
    String,
    /// Integer type.
    Integer,
    /// Number type (float).
    Number,
    /// Boolean type.
    Boolean,
    /// Array type.
    Array,
    /// Object type, contents unchecked.
    Object,
    /// Object validated by a nested schema.
    Nested(Arc<ObjectSchema>),
    /// Any type (no validation).
    Any,
}

impl FieldType {
    fn name(&self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Integer => "integer",
            Self::Number => "number",
            Self::Boolean => "boolean",
            Self::Array => "array",
            Self::Object | Self::Nested(_) => "object",
            Self::Any => "any",
        }
    }
}

/// What to do with fields the schema does not declare.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UnknownKeys {
    /// Drop undeclared fields from the output.
    #[default]
    Strip,
    /// Copy undeclared fields into the output unchanged.
    Passthrough,
    /// Reject undeclared fields.
    Strict,
}

#[derive(Debug, Clone, PartialEq)]
struct FieldSpec {
    name: String,
    field_type: FieldType,
    required: bool,
    default: Option<Value>,
}

/// An object schema with typed fields.
///
/// # Example
///
/// ```
/// use praetor_core::schema::{FieldType, ObjectSchema};
/// use serde_json::json;
///
/// let schema = ObjectSchema::builder()
///     .required("foo", FieldType::Number)
///     .with_default("page", FieldType::Integer, json!(1))
///     .build();
///
/// let out = schema.check(&json!({"foo": 1.5, "extra": true})).unwrap();
/// assert_eq!(out, json!({"foo": 1.5, "page": 1}));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct ObjectSchema {
    fields: Vec<FieldSpec>,
    unknown_keys: UnknownKeys,
    coerce: bool,
}

impl ObjectSchema {
    /// Creates a new empty schema builder.
    #[must_use]
    pub fn builder() -> ObjectSchemaBuilder {
        ObjectSchemaBuilder::default()
    }

    /// Creates a schema that accepts any object and keeps all of its fields.
    #[must_use]
    pub fn any() -> Self {
        Self {
            fields: Vec::new(),
            unknown_keys: UnknownKeys::Passthrough,
            coerce: false,
        }
    }

    /// Validates synchronously, returning the coerced object.
    pub fn check(&self, value: &Value) -> Result<Value, SchemaError> {
        let Some(obj) = value.as_object() else {
            return Err(SchemaError::single(
                "invalid_type",
                format!("expected object, received {}", kind_of(value)),
            ));
        };

        let mut out = Map::new();
        let mut issues = Vec::new();

        for spec in &self.fields {
            match obj.get(&spec.name) {
                Some(found) => match self.check_field(found, &spec.field_type) {
                    Ok(coerced) => {
                        out.insert(spec.name.clone(), coerced);
                    }
                    Err(field_issues) => {
                        issues.extend(field_issues.into_iter().map(|i| i.under(spec.name.as_str())));
                    }
                },
                None => {
                    if let Some(default) = &spec.default {
                        out.insert(spec.name.clone(), default.clone());
                    } else if spec.required {
                        issues.push(Issue::new("required", "Required").under(spec.name.as_str()));
                    }
                }
            }
        }

        for (key, extra) in obj {
            if self.fields.iter().any(|spec| &spec.name == key) {
                continue;
            }
            match self.unknown_keys {
                UnknownKeys::Strip => {}
                UnknownKeys::Passthrough => {
                    out.insert(key.clone(), extra.clone());
                }
                UnknownKeys::Strict => {
                    issues.push(Issue::new(
                        "unrecognized_keys",
                        format!("Unrecognized key: '{key}'"),
                    ));
                }
            }
        }

        if issues.is_empty() {
            Ok(Value::Object(out))
        } else {
            Err(SchemaError::new(issues))
        }
    }

    fn check_field(&self, value: &Value, expected: &FieldType) -> Result<Value, Vec<Issue>> {
        if let FieldType::Nested(schema) = expected {
            return schema.check(value).map_err(|e| e.issues);
        }

        if check_type(value, expected) {
            return Ok(value.clone());
        }

        if self.coerce {
            if let Some(coerced) = coerce(value, expected) {
                return Ok(coerced);
            }
        }

        Err(vec![Issue::new(
            "invalid_type",
            format!("expected {}, received {}", expected.name(), kind_of(value)),
        )])
    }
}

impl Schema for ObjectSchema {
    fn validate<'a>(&'a self, value: &'a Value) -> BoxFuture<'a, Result<Value, SchemaError>> {
        let result = self.check(value);
        Box::pin(async move { result })
    }
}

/// Checks if a value matches the expected type.
fn check_type(value: &Value, expected: &FieldType) -> bool {
    match expected {
        FieldType::String => value.is_string(),
        FieldType::Integer => value.is_i64() || value.is_u64(),
        FieldType::Number => value.is_number(),
        FieldType::Boolean => value.is_boolean(),
        FieldType::Array => value.is_array(),
        FieldType::Object | FieldType::Nested(_) => value.is_object(),
        FieldType::Any => true,
    }
}

fn coerce(value: &Value, expected: &FieldType) -> Option<Value> {
    match (expected, value) {
        (FieldType::Integer, Value::String(s)) => s.trim().parse::<i64>().ok().map(Value::from),
        (FieldType::Number, Value::String(s)) => s
            .trim()
            .parse::<f64>()
            .ok()
            .and_then(Number::from_f64)
            .map(Value::Number),
        (FieldType::Boolean, Value::String(s)) => match s.as_str() {
            "true" => Some(Value::Bool(true)),
            "false" => Some(Value::Bool(false)),
            _ => None,
        },
        (FieldType::String, Value::Number(n)) => Some(Value::String(n.to_string())),
        (FieldType::String, Value::Bool(b)) => Some(Value::String(b.to_string())),
        _ => None,
    }
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Builder for [`ObjectSchema`].
#[derive(Debug, Default)]
pub struct ObjectSchemaBuilder {
    fields: Vec<FieldSpec>,
    unknown_keys: UnknownKeys,
    coerce: bool,
}

impl ObjectSchemaBuilder {
    /// Adds a required field.
    #[must_use]
    pub fn required(self, name: &str, field_type: FieldType) -> Self {
        self.field(name, field_type, true, None)
    }

    /// Adds an optional field.
    #[must_use]
    pub fn optional(self, name: &str, field_type: FieldType) -> Self {
        self.field(name, field_type, false, None)
    }

    /// Adds a field that takes `default` when absent.
    #[must_use]
    pub fn with_default(self, name: &str, field_type: FieldType, default: Value) -> Self {
        self.field(name, field_type, false, Some(default))
    }

    /// Adds a required field validated by a nested schema.
    #[must_use]
    pub fn nested(self, name: &str, schema: ObjectSchema) -> Self {
        self.field(name, FieldType::Nested(Arc::new(schema)), true, None)
    }

    fn field(mut self, name: &str, field_type: FieldType, required: bool, default: Option<Value>) -> Self {
        self.fields.retain(|spec| spec.name != name);
        self.fields.push(FieldSpec {
            name: name.to_string(),
            field_type,
            required,
            default,
        });
        self
    }

    /// Sets the unknown-keys policy.
    #[must_use]
    pub fn unknown_keys(mut self, policy: UnknownKeys) -> Self {
        self.unknown_keys = policy;
        self
    }

    /// Rejects undeclared fields.
    #[must_use]
    pub fn strict(self) -> Self {
        self.unknown_keys(UnknownKeys::Strict)
    }

    /// Keeps undeclared fields.
    #[must_use]
    pub fn passthrough(self) -> Self {
        self.unknown_keys(UnknownKeys::Passthrough)
    }

    /// Enables string to number/boolean coercion (and scalar to string).
    #[must_use]
    pub fn coerce(mut self, coerce: bool) -> Self {
        self.coerce = coerce;
        self
    }

    /// Builds the schema.
    #[must_use]
    pub fn build(self) -> ObjectSchema {
        ObjectSchema {
            fields: self.fields,
            unknown_keys: self.unknown_keys,
            coerce: self.coerce,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn user_schema() -> ObjectSchema {
        ObjectSchema::builder()
            .required("name", FieldType::String)
            .required("age", FieldType::Integer)
            .optional("email", FieldType::String)
            .build()
    }

    #[test]
    fn test_valid_object_passes() {
        let out = user_schema().check(&json!({"name": "Alice", "age": 30})).unwrap();
        assert_eq!(out, json!({"name": "Alice", "age": 30}));
    }

    #[test]
    fn test_missing_required_field() {
        let err = user_schema().check(&json!({"name": "Alice"})).unwrap_err();
        assert_eq!(err.issues.len(), 1);
        assert_eq!(err.issues[0].code, "required");
        assert_eq!(err.issues[0].path, vec!["age".to_string()]);
    }

    #[test]
    fn test_wrong_type_reports_path() {
        let err = user_schema().check(&json!({"name": "Alice", "age": "twenty"})).unwrap_err();
        assert_eq!(err.issues[0].code, "invalid_type");
        assert_eq!(err.issues[0].message, "expected integer, received string");
    }

    #[test]
    fn test_non_object_rejected() {
        let err = user_schema().check(&json!(["array", "not", "object"])).unwrap_err();
        assert!(err.has_code("invalid_type"));
        assert!(err.issues[0].path.is_empty());
    }

    #[test]
    fn test_unknown_keys_stripped_by_default() {
        let out = user_schema()
            .check(&json!({"name": "Alice", "age": 30, "admin": true}))
            .unwrap();
        assert_eq!(out, json!({"name": "Alice", "age": 30}));
    }

    #[test]
    fn test_unknown_keys_passthrough() {
        let schema = ObjectSchema::builder()
            .required("name", FieldType::String)
            .passthrough()
            .build();
        let out = schema.check(&json!({"name": "Alice", "admin": true})).unwrap();
        assert_eq!(out, json!({"name": "Alice", "admin": true}));
    }

    #[test]
    fn test_unknown_keys_strict() {
        let schema = ObjectSchema::builder()
            .required("name", FieldType::String)
            .strict()
            .build();
        let err = schema.check(&json!({"name": "Alice", "extra": "field"})).unwrap_err();
        assert!(err.has_code("unrecognized_keys"));
    }

    #[test]
    fn test_coercion_of_transport_strings() {
        let schema = ObjectSchema::builder()
            .required("id", FieldType::Integer)
            .required("ratio", FieldType::Number)
            .required("active", FieldType::Boolean)
            .coerce(true)
            .build();

        let out = schema
            .check(&json!({"id": "7", "ratio": "0.5", "active": "true"}))
            .unwrap();
        assert_eq!(out, json!({"id": 7, "ratio": 0.5, "active": true}));
    }

    #[test]
    fn test_no_coercion_without_flag() {
        let schema = ObjectSchema::builder().required("id", FieldType::Integer).build();
        assert!(schema.check(&json!({"id": "7"})).is_err());
    }

    #[test]
    fn test_defaults_fill_missing_fields() {
        let schema = ObjectSchema::builder()
            .with_default("page", FieldType::Integer, json!(1))
            .build();
        assert_eq!(schema.check(&json!({})).unwrap(), json!({"page": 1}));
        assert_eq!(schema.check(&json!({"page": 3})).unwrap(), json!({"page": 3}));
    }

    #[test]
    fn test_nested_issue_paths() {
        let schema = ObjectSchema::builder()
            .nested("user", user_schema())
            .build();
        let err = schema.check(&json!({"user": {"name": 1, "age": 2}})).unwrap_err();
        assert_eq!(err.issues[0].path, vec!["user".to_string(), "name".to_string()]);
    }

    #[test]
    fn test_field_type_validation() {
        assert!(check_type(&json!("test"), &FieldType::String));
        assert!(check_type(&json!(42), &FieldType::Integer));
        assert!(!check_type(&json!(3.5), &FieldType::Integer));
        assert!(check_type(&json!(3.5), &FieldType::Number));
        assert!(check_type(&json!(true), &FieldType::Boolean));
        assert!(check_type(&json!([1, 2, 3]), &FieldType::Array));
        assert!(check_type(&json!({"key": "value"}), &FieldType::Object));
        assert!(check_type(&json!(null), &FieldType::Any));
    }

    #[test]
    fn test_any_schema_keeps_everything() {
        let value = json!({"a": 1, "b": [true]});
        assert_eq!(ObjectSchema::any().check(&value).unwrap(), value);
    }

    #[test]
    fn test_redeclared_field_replaces_previous() {
        let schema = ObjectSchema::builder()
            .required("id", FieldType::String)
            .optional("id", FieldType::Integer)
            .build();
        assert_eq!(schema.check(&json!({})).unwrap(), json!({}));
    }
}
