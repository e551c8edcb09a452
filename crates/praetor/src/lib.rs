//! # Praetor
//!
//! **Schema-driven request and response validation middleware**
//!
//! Praetor validates the five facets of an HTTP request (headers, path
//! parameters, query, body, uploaded files) against per-route schemas,
//! writes the coerced values back, and checks the response body on the way
//! out.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use praetor::prelude::*;
//!
//! let config = ConfigLoader::new().with_env_prefix("PRAETOR").load()?;
//! init_telemetry(&config.telemetry.to_telemetry_config())?;
//!
//! let mut router = praetor::router(&config);
//! router.post(
//!     "/hello/:id",
//!     hello,
//!     ValidationOptions::builder()
//!         .params(ObjectSchema::builder().required("id", FieldType::String).build())
//!         .build(),
//! );
//! ```
//!
//! ## Architecture
//!
//! ```text
//! Request → pre-handlers → Validation → handlers
//!                             ↓
//! Response ←──────── response validation
//! ```

#![doc(html_root_url = "https://docs.rs/praetor/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

// Re-export core types
pub use praetor_core as core;

// Re-export middleware, pipeline and router
pub use praetor_middleware as middleware;

// Re-export configuration
pub use praetor_config as config;

// Re-export telemetry
pub use praetor_telemetry as telemetry;

/// Creates a router whose defaults come from `config.router`.
#[must_use]
pub fn router(config: &praetor_config::PraetorConfig) -> praetor_middleware::Router {
    praetor_middleware::Router::new(config.router)
}

/// Prelude module for convenient imports.
///
/// ```
/// use praetor::prelude::*;
///
/// let router = Router::new(RouterOpts::exposed());
/// assert!(router.is_empty());
/// ```
pub mod prelude {
    pub use praetor_core::schema::{FieldType, JsonSchema, ObjectSchema, UnionSchema, UnknownKeys};
    pub use praetor_core::{
        FnSchema, InvalidRecord, Part, PraetorError, PraetorResult, RequestId, RouterOpts, Schema,
        SchemaError, SharedSchema, SyncFnSchema, ValidationOptions,
    };

    pub use praetor_middleware::{
        BoxFuture, FnMiddleware, Middleware, MiddlewareContext, Next, Request, Response,
        ResponseExt, Route, Router, ValidationErrorEvent, ValidationFailure,
    };

    pub use praetor_config::{ConfigLoader, PraetorConfig};

    pub use praetor_telemetry::init_telemetry;
}
