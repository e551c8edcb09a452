//! Validation configuration.
//!
//! [`ValidationOptions`] is the per-route configuration: one optional schema
//! per request part, an optional response schema, and the continue-on-error
//! flag. [`RouterOpts`] holds the process-wide defaults that decide how
//! failures are surfaced. Both are immutable once built and shared read-only
//! across every request.

use crate::part::Part;
use crate::schema::{Schema, SharedSchema};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Per-route validation configuration.
///
/// # Example
///
/// ```
/// use praetor_core::{Part, ValidationOptions};
/// use praetor_core::schema::{FieldType, ObjectSchema};
///
/// let options = ValidationOptions::builder()
///     .body(ObjectSchema::builder().required("foo", FieldType::Number).build())
///     .params(ObjectSchema::builder().required("id", FieldType::String).build())
///     .build();
///
/// assert!(options.schema_for(Part::Body).is_some());
/// assert!(options.schema_for(Part::Query).is_none());
/// assert!(!options.continue_on_error());
/// ```
#[derive(Clone, Default)]
pub struct ValidationOptions {
    headers: Option<SharedSchema>,
    params: Option<SharedSchema>,
    query: Option<SharedSchema>,
    body: Option<SharedSchema>,
    files: Option<SharedSchema>,
    response: Option<SharedSchema>,
    continue_on_error: bool,
}

impl ValidationOptions {
    /// Creates a new options builder.
    #[must_use]
    pub fn builder() -> ValidationOptionsBuilder {
        ValidationOptionsBuilder::default()
    }

    /// Returns the schema configured for a request part.
    #[must_use]
    pub fn schema_for(&self, part: Part) -> Option<&dyn Schema> {
        let slot = match part {
            Part::Headers => &self.headers,
            Part::Params => &self.params,
            Part::Query => &self.query,
            Part::Body => &self.body,
            Part::Files => &self.files,
        };
        slot.as_deref()
    }

    /// Returns the response schema.
    #[must_use]
    pub fn response(&self) -> Option<&dyn Schema> {
        self.response.as_deref()
    }

    /// Whether failed requests still reach downstream handlers.
    #[must_use]
    pub fn continue_on_error(&self) -> bool {
        self.continue_on_error
    }

    /// Returns `true` if no request or response schema is configured.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.response.is_none() && Part::ALL.iter().all(|part| self.schema_for(*part).is_none())
    }

    /// Returns the parts that have a schema.
    #[must_use]
    pub fn configured_parts(&self) -> Vec<Part> {
        Part::ALL
            .into_iter()
            .filter(|part| self.schema_for(*part).is_some())
            .collect()
    }
}

impl std::fmt::Debug for ValidationOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ValidationOptions")
            .field("parts", &self.configured_parts())
            .field("response", &self.response.is_some())
            .field("continue_on_error", &self.continue_on_error)
            .finish()
    }
}

/// Builder for [`ValidationOptions`].
#[derive(Default)]
pub struct ValidationOptionsBuilder {
    options: ValidationOptions,
}

impl ValidationOptionsBuilder {
    /// Sets the header schema.
    #[must_use]
    pub fn headers(self, schema: impl Schema) -> Self {
        self.part(Part::Headers, Arc::new(schema))
    }

    /// Sets the path parameter schema.
    #[must_use]
    pub fn params(self, schema: impl Schema) -> Self {
        self.part(Part::Params, Arc::new(schema))
    }

    /// Sets the query schema.
    #[must_use]
    pub fn query(self, schema: impl Schema) -> Self {
        self.part(Part::Query, Arc::new(schema))
    }

    /// Sets the body schema.
    #[must_use]
    pub fn body(self, schema: impl Schema) -> Self {
        self.part(Part::Body, Arc::new(schema))
    }

    /// Sets the file upload schema.
    #[must_use]
    pub fn files(self, schema: impl Schema) -> Self {
        self.part(Part::Files, Arc::new(schema))
    }

    /// Sets the schema for a part from a schema shared with other routes.
    #[must_use]
    pub fn part(mut self, part: Part, schema: SharedSchema) -> Self {
        let slot = match part {
            Part::Headers => &mut self.options.headers,
            Part::Params => &mut self.options.params,
            Part::Query => &mut self.options.query,
            Part::Body => &mut self.options.body,
            Part::Files => &mut self.options.files,
        };
        *slot = Some(schema);
        self
    }

    /// Sets the response schema.
    #[must_use]
    pub fn response(self, schema: impl Schema) -> Self {
        self.response_shared(Arc::new(schema))
    }

    /// Sets the response schema from a shared schema.
    #[must_use]
    pub fn response_shared(mut self, schema: SharedSchema) -> Self {
        self.options.response = Some(schema);
        self
    }

    /// Lets failed requests continue to downstream handlers.
    #[must_use]
    pub fn continue_on_error(mut self, continue_on_error: bool) -> Self {
        self.options.continue_on_error = continue_on_error;
        self
    }

    /// Builds the options.
    #[must_use]
    pub fn build(self) -> ValidationOptions {
        self.options
    }
}

/// Process-wide validation defaults.
///
/// A route may carry its own `RouterOpts`, which then replaces these
/// defaults for that route.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RouterOpts {
    /// Respond to failed requests with `400` and the structured errors.
    #[serde(default)]
    pub expose_request_errors: bool,

    /// Respond to failed responses with `500` and the structured error.
    #[serde(default)]
    pub expose_response_errors: bool,

    /// A custom validation error handler is installed downstream: failed
    /// requests continue with the invalid record attached.
    #[serde(default)]
    pub validation_error_handler: bool,
}

impl RouterOpts {
    /// Options that expose both request and response errors.
    #[must_use]
    pub fn exposed() -> Self {
        Self {
            expose_request_errors: true,
            expose_response_errors: true,
            validation_error_handler: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::ObjectSchema;

    #[test]
    fn test_default_options_are_empty() {
        let options = ValidationOptions::default();
        assert!(options.is_empty());
        assert!(options.configured_parts().is_empty());
        assert!(options.response().is_none());
    }

    #[test]
    fn test_response_only_is_not_empty() {
        let options = ValidationOptions::builder()
            .response(ObjectSchema::any())
            .build();
        assert!(!options.is_empty());
        assert!(options.configured_parts().is_empty());
    }

    #[test]
    fn test_shared_schema_across_parts() {
        let shared: SharedSchema = Arc::new(ObjectSchema::any());
        let options = ValidationOptions::builder()
            .part(Part::Query, shared.clone())
            .part(Part::Params, shared)
            .continue_on_error(true)
            .build();
        assert_eq!(options.configured_parts(), vec![Part::Params, Part::Query]);
        assert!(options.continue_on_error());
    }

    #[test]
    fn test_router_opts_defaults() {
        let opts: RouterOpts = serde_json::from_str("{}").unwrap();
        assert_eq!(opts, RouterOpts::default());
        assert!(!opts.expose_request_errors);
        assert!(!opts.expose_response_errors);
        assert!(!opts.validation_error_handler);
    }

    #[test]
    fn test_router_opts_rejects_unknown_fields() {
        let result: Result<RouterOpts, _> = serde_json::from_str(r#"{"expose_everything": true}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_router_opts_exposed() {
        let opts = RouterOpts::exposed();
        assert!(opts.expose_request_errors);
        assert!(opts.expose_response_errors);
    }
}
