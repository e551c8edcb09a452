//! The schema capability.
//!
//! Praetor does not define a schema language. Every schema engine is reached
//! through one narrow capability, [`Schema::validate`]: given a value, return
//! either the coerced value or a structured [`SchemaError`]. The capability is
//! asynchronous so engines that need I/O (remote registries, lookups) fit
//! behind it as well as pure in-memory validators.
//!
//! A few engines ship with the crate:
//!
//! - [`ObjectSchema`] - field-typed objects with coercion, defaults and an unknown-keys policy
//! - [`UnionSchema`] - first successful member wins
//! - [`JsonSchema`] - a compiled JSON Schema document
//! - [`FnSchema`] / [`SyncFnSchema`] - any closure
//!
//! # Example
//!
//! ```
//! use praetor_core::schema::{FieldType, ObjectSchema, Schema};
//! use serde_json::json;
//!
//! # tokio_test::block_on(async {
//! let schema = ObjectSchema::builder()
//!     .required("id", FieldType::Integer)
//!     .coerce(true)
//!     .build();
//!
//! let coerced = schema.validate(&json!({"id": "42"})).await.unwrap();
//! assert_eq!(coerced, json!({"id": 42}));
//! # });
//! ```

mod json;
mod object;
mod union;

pub use json::JsonSchema;
pub use object::{FieldType, ObjectSchema, ObjectSchemaBuilder, UnknownKeys};
pub use union::UnionSchema;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use thiserror::Error;

/// A boxed, sendable future.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// A schema shared read-only between routes and requests.
pub type SharedSchema = Arc<dyn Schema>;

/// The validate-and-coerce capability.
///
/// Implementations must be pure with respect to identical input: validating
/// the same value twice yields the same result. They must not mutate shared
/// state, since one schema instance serves every concurrent request of every
/// route that references it.
pub trait Schema: Send + Sync + 'static {
    /// Validates `value`, returning the coerced value on success.
    ///
    /// The coerced value may differ from the input: strings turned into
    /// numbers, defaults filled in, unknown fields stripped.
    fn validate<'a>(&'a self, value: &'a Value) -> BoxFuture<'a, Result<Value, SchemaError>>;
}

/// A single problem found while validating a value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Issue {
    /// Machine-readable issue code (e.g. `invalid_type`).
    pub code: String,
    /// Path from the validated value to the offending node.
    pub path: Vec<String>,
    /// Human-readable message.
    pub message: String,
}

impl Issue {
    /// Creates an issue at the root of the validated value.
    #[must_use]
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            path: Vec::new(),
            message: message.into(),
        }
    }

    /// Prefixes the issue path with a segment.
    #[must_use]
    pub fn under(mut self, segment: impl Into<String>) -> Self {
        self.path.insert(0, segment.into());
        self
    }
}

/// Structured validation error reported by a schema.
///
/// The validation layer treats this as opaque data: it is stored in the
/// [`InvalidRecord`](crate::InvalidRecord) and serialized into exposed error
/// responses as `{"issues": [...]}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Error)]
#[error("{}", summarize(.issues))]
pub struct SchemaError {
    /// Every issue found, in discovery order.
    pub issues: Vec<Issue>,
}

fn summarize(issues: &[Issue]) -> String {
    match issues {
        [] => "validation failed".to_string(),
        [only] => only.message.clone(),
        [first, rest @ ..] => format!("{} (and {} more issues)", first.message, rest.len()),
    }
}

impl SchemaError {
    /// Creates an error from a list of issues.
    #[must_use]
    pub fn new(issues: Vec<Issue>) -> Self {
        Self { issues }
    }

    /// Creates an error with a single root-level issue.
    #[must_use]
    pub fn single(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            issues: vec![Issue::new(code, message)],
        }
    }

    /// Returns `true` if any issue carries the given code.
    #[must_use]
    pub fn has_code(&self, code: &str) -> bool {
        self.issues.iter().any(|issue| issue.code == code)
    }
}

/// A schema backed by an asynchronous closure.
///
/// This is the adapter for third-party schema engines.
///
/// # Example
///
/// ```
/// use praetor_core::schema::{FnSchema, Schema, SchemaError};
/// use serde_json::{json, Value};
///
/// let non_null = FnSchema::new(|value: &Value| {
///     Box::pin(async move {
///         if value.is_null() {
///             Err(SchemaError::single("required", "value is required"))
///         } else {
///             Ok(value.clone())
///         }
///     })
/// });
///
/// # tokio_test::block_on(async {
/// assert!(non_null.validate(&json!(null)).await.is_err());
/// # });
/// ```
pub struct FnSchema<F> {
    func: F,
}

impl<F> FnSchema<F>
where
    F: for<'a> Fn(&'a Value) -> BoxFuture<'a, Result<Value, SchemaError>> + Send + Sync + 'static,
{
    /// Wraps an asynchronous validation closure.
    pub const fn new(func: F) -> Self {
        Self { func }
    }
}

impl<F> Schema for FnSchema<F>
where
    F: for<'a> Fn(&'a Value) -> BoxFuture<'a, Result<Value, SchemaError>> + Send + Sync + 'static,
{
    fn validate<'a>(&'a self, value: &'a Value) -> BoxFuture<'a, Result<Value, SchemaError>> {
        (self.func)(value)
    }
}

impl<F> std::fmt::Debug for FnSchema<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FnSchema").finish_non_exhaustive()
    }
}

/// A schema backed by a synchronous closure.
pub struct SyncFnSchema<F> {
    func: F,
}

impl<F> SyncFnSchema<F>
where
    F: Fn(&Value) -> Result<Value, SchemaError> + Send + Sync + 'static,
{
    /// Wraps a synchronous validation closure.
    pub const fn new(func: F) -> Self {
        Self { func }
    }
}

impl<F> Schema for SyncFnSchema<F>
where
    F: Fn(&Value) -> Result<Value, SchemaError> + Send + Sync + 'static,
{
    fn validate<'a>(&'a self, value: &'a Value) -> BoxFuture<'a, Result<Value, SchemaError>> {
        let result = (self.func)(value);
        Box::pin(async move { result })
    }
}

impl<F> std::fmt::Debug for SyncFnSchema<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SyncFnSchema").finish_non_exhaustive()
    }
}
