//! # Praetor Middleware
//!
//! Request/response validation middleware and the pipeline that hosts it.
//!
//! ## Request Flow
//!
//! ```text
//! Request → pre-handlers → Validation → handlers
//!                             ↓
//! Response ←──────── response validation
//! ```
//!
//! The validation stage validates headers, path parameters, query, body and
//! uploaded files concurrently, merges the coerced values back into the
//! context, runs the handlers, and validates the response body.
//!
//! ## Failure Handling
//!
//! | Route configuration | Invalid request | Invalid response |
//! |---------------------|-----------------|------------------|
//! | `continue_on_error` or `validation_error_handler` | continue, `ctx.invalid()` set, nothing merged | not validated |
//! | `expose_request_errors` / `expose_response_errors` | `400` JSON + event | `500` JSON + event |
//! | neither | `400 VALIDATION_ERROR` | bare `500` |
//!
//! ## Example
//!
//! ```
//! use http::{Method, StatusCode};
//! use praetor_core::schema::{FieldType, ObjectSchema};
//! use praetor_core::{RouterOpts, ValidationOptions};
//! use praetor_middleware::{FnMiddleware, MiddlewareContext, Router};
//! use serde_json::json;
//!
//! # tokio_test::block_on(async {
//! let mut router = Router::new(RouterOpts::default());
//! router.post(
//!     "/hello/:id",
//!     FnMiddleware::new("hello", |ctx, next| {
//!         Box::pin(async move {
//!             ctx.response_mut().set_body("hello");
//!             next.run(ctx).await
//!         })
//!     }),
//!     ValidationOptions::builder()
//!         .body(ObjectSchema::builder().required("foo", FieldType::Number).build())
//!         .build(),
//! );
//!
//! let route = router.route(&Method::POST, "/hello/:id").unwrap();
//! let mut ctx = MiddlewareContext::new(Method::POST, "/hello/1");
//! ctx.request_mut().body = json!({"foo": "bar"});
//!
//! let response = route.process(ctx).await;
//! assert_eq!(response.status(), StatusCode::BAD_REQUEST);
//! # });
//! ```

#![doc(html_root_url = "https://docs.rs/praetor-middleware/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod context;
pub mod events;
pub mod middleware;
pub mod pipeline;
pub mod router;
pub mod stages;
pub mod types;

pub use context::{MiddlewareContext, RequestParts, ResponseState};
pub use events::{ErrorEvents, ValidationErrorEvent, ValidationFailure};
pub use middleware::{BoxFuture, FnMiddleware, Middleware, Next};
pub use pipeline::{BoxedMiddleware, Pipeline, PipelineBuilder};
pub use router::{Route, RouteBuilder, Router};
pub use stages::ValidationMiddleware;
pub use types::{Request, Response, ResponseExt};
