//! Request and response validation middleware.
//!
//! # Pipeline Position
//!
//! The validation stage sits between a route's pre-handlers and its
//! handlers. It validates the request on the way in and the response on
//! the way out:
//!
//! ```text
//! pre-handlers → [Validation] → handlers
//!                     ↑              ↓
//!                     └── response ──┘
//! ```
//!
//! # Request Flow
//!
//! 1. Every configured part is validated concurrently against its schema
//! 2. Failures are collected into one [`InvalidRecord`]
//! 3. On failure, the route's policy decides what happens:
//!    - `continue_on_error` or a custom error handler: attach the record
//!      and run the handlers; nothing is merged and the response is not
//!      validated
//!    - `expose_request_errors`: respond `400` with `{"error": <record>}`
//!      and publish an event
//!    - otherwise: abort with `400 VALIDATION_ERROR`
//! 4. Coerced values are shallow-merged into the request parts
//! 5. Downstream handlers run
//! 6. If a response schema is set, the body is validated and replaced by
//!    the coerced value. A failure responds `500`, with
//!    `{"error": {"response": <error>}}` when `expose_response_errors` is set.

use crate::{
    context::MiddlewareContext,
    events::{ErrorEvents, ValidationErrorEvent, ValidationFailure},
    middleware::{BoxFuture, Middleware, Next},
};
use http::StatusCode;
use praetor_core::{
    validate_part, InvalidRecord, Part, PartResult, PraetorError, PraetorResult, RouterOpts,
    ValidationOptions,
};
use praetor_telemetry::metrics::{
    record_part_failure, record_request_outcome, record_response_failure,
    record_validation_duration, RequestOutcome,
};
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Instant;

/// Validates a route's requests and responses against its schemas.
///
/// # Example
///
/// ```
/// use praetor_core::schema::{FieldType, ObjectSchema};
/// use praetor_core::{RouterOpts, ValidationOptions};
/// use praetor_middleware::events::ErrorEvents;
/// use praetor_middleware::stages::ValidationMiddleware;
///
/// let options = ValidationOptions::builder()
///     .body(ObjectSchema::builder().required("foo", FieldType::Number).build())
///     .build();
///
/// let validation = ValidationMiddleware::new(options, RouterOpts::default(), ErrorEvents::default());
/// assert!(!validation.is_noop());
/// ```
#[derive(Debug, Clone)]
pub struct ValidationMiddleware {
    options: Arc<ValidationOptions>,
    router_opts: RouterOpts,
    events: ErrorEvents,
}

impl ValidationMiddleware {
    /// Creates the middleware for one route.
    #[must_use]
    pub fn new(options: ValidationOptions, router_opts: RouterOpts, events: ErrorEvents) -> Self {
        Self {
            options: Arc::new(options),
            router_opts,
            events,
        }
    }

    /// Returns the route's validation options.
    #[must_use]
    pub fn options(&self) -> &ValidationOptions {
        &self.options
    }

    /// Returns the effective router options.
    #[must_use]
    pub fn router_opts(&self) -> RouterOpts {
        self.router_opts
    }

    /// Returns `true` if no schema is configured; the middleware then only
    /// calls the next stage.
    #[must_use]
    pub fn is_noop(&self) -> bool {
        self.options.is_empty()
    }

    /// Validates every part concurrently, in [`Part::ALL`] order.
    async fn validate_request(&self, ctx: &MiddlewareContext) -> [PartResult; 5] {
        let snapshot = |part: Part| {
            if self.options.schema_for(part).is_some() {
                ctx.request().value(part)
            } else {
                Value::Null
            }
        };
        let headers = snapshot(Part::Headers);
        let params = snapshot(Part::Params);
        let query = snapshot(Part::Query);
        let body = snapshot(Part::Body);
        let files = snapshot(Part::Files);

        let (headers, params, query, body, files) = tokio::join!(
            validate_part(&headers, self.options.schema_for(Part::Headers), Part::Headers),
            validate_part(&params, self.options.schema_for(Part::Params), Part::Params),
            validate_part(&query, self.options.schema_for(Part::Query), Part::Query),
            validate_part(&body, self.options.schema_for(Part::Body), Part::Body),
            validate_part(&files, self.options.schema_for(Part::Files), Part::Files),
        );
        [headers, params, query, body, files]
    }

    fn expose_request_failure(&self, ctx: &mut MiddlewareContext, invalid: InvalidRecord) {
        let response = ctx.response_mut();
        response.set_status(StatusCode::BAD_REQUEST);
        response.set_content_type("json");
        response.set_body(json!({ "error": invalid }));

        self.events.emit(ValidationErrorEvent::new(
            ctx.request_id(),
            ctx.method().clone(),
            ctx.path(),
            ValidationFailure::Request(invalid),
        ));
    }

    async fn validate_response(&self, ctx: &mut MiddlewareContext) -> PraetorResult<()> {
        let Some(schema) = self.options.response() else {
            return Ok(());
        };

        let body = ctx.response().body().cloned().unwrap_or(Value::Null);
        match schema.validate(&body).await {
            Ok(coerced) => {
                ctx.response_mut().set_body(coerced);
                Ok(())
            }
            Err(error) => {
                record_response_failure();
                tracing::warn!(
                    request_id = %ctx.request_id(),
                    http.path = ctx.path(),
                    error = %error,
                    exposed = self.router_opts.expose_response_errors,
                    "response validation failed"
                );

                if !self.router_opts.expose_response_errors {
                    return Err(PraetorError::abort(StatusCode::INTERNAL_SERVER_ERROR));
                }

                let response = ctx.response_mut();
                response.set_status(StatusCode::INTERNAL_SERVER_ERROR);
                response.set_content_type("json");
                response.set_body(json!({ "error": { "response": error } }));

                self.events.emit(ValidationErrorEvent::new(
                    ctx.request_id(),
                    ctx.method().clone(),
                    ctx.path(),
                    ValidationFailure::Response(error),
                ));
                Ok(())
            }
        }
    }
}

impl Middleware for ValidationMiddleware {
    fn name(&self) -> &'static str {
        "validation"
    }

    fn process<'a>(
        &'a self,
        ctx: &'a mut MiddlewareContext,
        next: Next<'a>,
    ) -> BoxFuture<'a, PraetorResult<()>> {
        Box::pin(async move {
            if self.is_noop() {
                return next.run(ctx).await;
            }

            let started = Instant::now();
            let results = self.validate_request(ctx).await;
            record_validation_duration(started.elapsed().as_secs_f64());

            let invalid = InvalidRecord::from_failures(results.iter().filter_map(PartResult::failure));

            if invalid.has_errors() {
                for part in invalid.failed_parts() {
                    record_part_failure(part.as_str());
                }

                if self.options.continue_on_error() || self.router_opts.validation_error_handler {
                    record_request_outcome(RequestOutcome::PassedThrough);
                    tracing::info!(
                        request_id = %ctx.request_id(),
                        http.path = ctx.path(),
                        parts = ?invalid.failed_parts(),
                        "request validation failed, continuing"
                    );
                    ctx.set_invalid(invalid);
                    return next.run(ctx).await;
                } else if self.router_opts.expose_request_errors {
                    record_request_outcome(RequestOutcome::Exposed);
                    tracing::warn!(
                        request_id = %ctx.request_id(),
                        http.path = ctx.path(),
                        parts = ?invalid.failed_parts(),
                        "request validation failed"
                    );
                    self.expose_request_failure(ctx, invalid);
                    return Ok(());
                } else {
                    record_request_outcome(RequestOutcome::Aborted);
                    tracing::info!(
                        request_id = %ctx.request_id(),
                        http.path = ctx.path(),
                        parts = ?invalid.failed_parts(),
                        "request validation failed, aborting"
                    );
                    return Err(PraetorError::validation_failed());
                }
            } else {
                record_request_outcome(RequestOutcome::Valid);
                tracing::debug!(
                    request_id = %ctx.request_id(),
                    http.method = %ctx.method(),
                    http.path = ctx.path(),
                    "request validated"
                );
                ctx.set_invalid(invalid);
            }

            for (part, result) in Part::ALL.into_iter().zip(results) {
                if let Some(coerced) = result.into_coerced() {
                    ctx.request_mut().merge(part, coerced);
                }
            }

            next.run(ctx).await?;
            self.validate_response(ctx).await
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::middleware::FnMiddleware;
    use http::Method;
    use praetor_core::schema::{FieldType, ObjectSchema};

    fn body_schema() -> ObjectSchema {
        ObjectSchema::builder().required("foo", FieldType::Number).build()
    }

    fn ctx_with_body(body: Value) -> MiddlewareContext {
        let mut ctx = MiddlewareContext::new(Method::POST, "/hello/1");
        ctx.request_mut().body = body;
        ctx
    }

    #[test]
    fn test_name() {
        let mw = ValidationMiddleware::new(
            ValidationOptions::default(),
            RouterOpts::default(),
            ErrorEvents::default(),
        );
        assert_eq!(mw.name(), "validation");
        assert!(mw.is_noop());
    }

    #[tokio::test]
    async fn test_noop_does_not_attach_record() {
        let mw = ValidationMiddleware::new(
            ValidationOptions::default(),
            RouterOpts::default(),
            ErrorEvents::default(),
        );
        let mut ctx = ctx_with_body(json!({"foo": "not a number"}));
        mw.process(&mut ctx, Next::end()).await.unwrap();
        assert!(ctx.invalid().is_none());
    }

    #[tokio::test]
    async fn test_valid_request_attaches_clean_record() {
        let options = ValidationOptions::builder().body(body_schema()).build();
        let mw = ValidationMiddleware::new(options, RouterOpts::default(), ErrorEvents::default());

        let mut ctx = ctx_with_body(json!({"foo": 1, "extra": true}));
        mw.process(&mut ctx, Next::end()).await.unwrap();

        assert_eq!(ctx.invalid(), Some(&InvalidRecord::valid()));
        assert_eq!(ctx.request().body, json!({"foo": 1, "extra": true}));
    }

    #[tokio::test]
    async fn test_invalid_request_aborts_by_default() {
        let options = ValidationOptions::builder().body(body_schema()).build();
        let mw = ValidationMiddleware::new(options, RouterOpts::default(), ErrorEvents::default());

        let reached = FnMiddleware::new("handler", |ctx, _next| {
            Box::pin(async move {
                ctx.response_mut().set_body("reached");
                Ok(())
            })
        });

        let mut ctx = ctx_with_body(json!({}));
        let err = mw
            .process(&mut ctx, Next::new(&reached, Next::end()))
            .await
            .unwrap_err();

        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(err.exposed_message(), Some("VALIDATION_ERROR"));
        assert!(ctx.response().body().is_none());
    }

    #[tokio::test]
    async fn test_response_schema_replaces_body() {
        let options = ValidationOptions::builder()
            .response(ObjectSchema::builder().required("success", FieldType::Boolean).build())
            .build();
        let mw = ValidationMiddleware::new(options, RouterOpts::default(), ErrorEvents::default());

        let handler = FnMiddleware::new("handler", |ctx, next| {
            Box::pin(async move {
                ctx.response_mut().set_body(json!({"success": true, "internal": 1}));
                next.run(ctx).await
            })
        });

        let mut ctx = ctx_with_body(json!({}));
        mw.process(&mut ctx, Next::new(&handler, Next::end())).await.unwrap();
        assert_eq!(ctx.response().body(), Some(&json!({"success": true})));
    }

    #[tokio::test]
    async fn test_response_failure_aborts_with_500() {
        let options = ValidationOptions::builder()
            .response(ObjectSchema::builder().required("success", FieldType::Boolean).build())
            .build();
        let mw = ValidationMiddleware::new(options, RouterOpts::default(), ErrorEvents::default());

        let mut ctx = ctx_with_body(json!({}));
        let err = mw.process(&mut ctx, Next::end()).await.unwrap_err();
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.exposed_message(), None);
    }
}
