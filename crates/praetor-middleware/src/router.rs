//! Route registration.
//!
//! A [`Router`] holds the process-wide [`RouterOpts`] and the shared
//! [`ErrorEvents`] channel. Each registered route becomes a [`Pipeline`]
//! ordered pre-handlers → validation → handlers.
//!
//! The router does not match paths. Routes are keyed by method and path
//! template exactly as registered; the host resolves the template and
//! supplies the path parameters on the context.
//!
//! # Example
//!
//! ```
//! use http::Method;
//! use praetor_core::schema::{FieldType, ObjectSchema};
//! use praetor_core::{RouterOpts, ValidationOptions};
//! use praetor_middleware::router::{Route, Router};
//! use praetor_middleware::FnMiddleware;
//!
//! let mut router = Router::new(RouterOpts::default());
//! router.register(
//!     Route::builder(Method::POST, "/hello/:id")
//!         .handler(FnMiddleware::new("hello", |ctx, next| {
//!             Box::pin(async move {
//!                 ctx.response_mut().set_body("hello");
//!                 next.run(ctx).await
//!             })
//!         }))
//!         .validate(
//!             ValidationOptions::builder()
//!                 .params(ObjectSchema::builder().required("id", FieldType::String).build())
//!                 .build(),
//!         ),
//! );
//!
//! let route = router.route(&Method::POST, "/hello/:id").unwrap();
//! assert_eq!(route.pipeline().stage_names(), vec!["validation", "hello"]);
//! ```

use crate::context::MiddlewareContext;
use crate::events::{ErrorEvents, ValidationErrorEvent};
use crate::middleware::Middleware;
use crate::pipeline::{BoxedMiddleware, Pipeline};
use crate::stages::ValidationMiddleware;
use crate::types::Response;
use http::Method;
use praetor_core::{RouterOpts, ValidationOptions};
use std::sync::Arc;
use tokio::sync::broadcast;

/// A registered route.
#[derive(Debug, Clone)]
pub struct Route {
    method: Method,
    path: String,
    router_opts: RouterOpts,
    pipeline: Pipeline,
}

impl Route {
    /// Starts building a route.
    #[must_use]
    pub fn builder(method: Method, path: impl Into<String>) -> RouteBuilder {
        RouteBuilder {
            method,
            path: path.into(),
            pre: Vec::new(),
            handlers: Vec::new(),
            validate: ValidationOptions::default(),
            opts: None,
        }
    }

    /// Returns the route's method.
    #[must_use]
    pub fn method(&self) -> &Method {
        &self.method
    }

    /// Returns the route's path template.
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Returns the effective router options of this route.
    #[must_use]
    pub fn router_opts(&self) -> RouterOpts {
        self.router_opts
    }

    /// Returns the route's pipeline.
    #[must_use]
    pub fn pipeline(&self) -> &Pipeline {
        &self.pipeline
    }

    /// Runs the route's pipeline over a context.
    pub async fn process(&self, ctx: MiddlewareContext) -> Response {
        self.pipeline.process(ctx).await
    }
}

/// Builder for a [`Route`].
pub struct RouteBuilder {
    method: Method,
    path: String,
    pre: Vec<BoxedMiddleware>,
    handlers: Vec<BoxedMiddleware>,
    validate: ValidationOptions,
    opts: Option<RouterOpts>,
}

impl RouteBuilder {
    /// Adds a middleware that runs before validation.
    #[must_use]
    pub fn pre<M: Middleware>(mut self, middleware: M) -> Self {
        self.pre.push(Arc::new(middleware));
        self
    }

    /// Adds a handler that runs after request validation.
    #[must_use]
    pub fn handler<M: Middleware>(mut self, middleware: M) -> Self {
        self.handlers.push(Arc::new(middleware));
        self
    }

    /// Sets the route's validation options.
    #[must_use]
    pub fn validate(mut self, options: ValidationOptions) -> Self {
        self.validate = options;
        self
    }

    /// Replaces the router's defaults for this route.
    #[must_use]
    pub fn opts(mut self, opts: RouterOpts) -> Self {
        self.opts = Some(opts);
        self
    }

    fn build(self, defaults: RouterOpts, events: ErrorEvents) -> Route {
        let router_opts = self.opts.unwrap_or(defaults);
        let validation = ValidationMiddleware::new(self.validate, router_opts, events);

        let mut pipeline = Pipeline::builder();
        for middleware in self.pre {
            pipeline = pipeline.shared_stage(middleware);
        }
        pipeline = pipeline.stage(validation);
        for middleware in self.handlers {
            pipeline = pipeline.shared_stage(middleware);
        }

        Route {
            method: self.method,
            path: self.path,
            router_opts,
            pipeline: pipeline.build(),
        }
    }
}

/// Holds the process-wide options and every registered route.
#[derive(Debug, Default)]
pub struct Router {
    opts: RouterOpts,
    events: ErrorEvents,
    routes: Vec<Route>,
}

impl Router {
    /// Creates a router with the given defaults.
    #[must_use]
    pub fn new(opts: RouterOpts) -> Self {
        Self {
            opts,
            events: ErrorEvents::default(),
            routes: Vec::new(),
        }
    }

    /// Uses an existing event channel.
    #[must_use]
    pub fn with_events(mut self, events: ErrorEvents) -> Self {
        self.events = events;
        self
    }

    /// Returns the process-wide defaults.
    #[must_use]
    pub fn opts(&self) -> RouterOpts {
        self.opts
    }

    /// Returns the event channel.
    #[must_use]
    pub fn events(&self) -> &ErrorEvents {
        &self.events
    }

    /// Subscribes to validation events.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<Arc<ValidationErrorEvent>> {
        self.events.subscribe()
    }

    /// Registers a route. A route with the same method and path replaces
    /// the earlier one.
    pub fn register(&mut self, builder: RouteBuilder) -> &mut Self {
        let route = builder.build(self.opts, self.events.clone());
        tracing::debug!(
            http.method = %route.method,
            http.path = %route.path,
            stages = ?route.pipeline.stage_names(),
            "route registered"
        );

        if let Some(existing) = self
            .routes
            .iter_mut()
            .find(|r| r.method == route.method && r.path == route.path)
        {
            tracing::warn!(http.method = %route.method, http.path = %route.path, "route replaced");
            *existing = route;
        } else {
            self.routes.push(route);
        }
        self
    }

    /// Registers a `GET` route with one handler.
    pub fn get<M: Middleware>(
        &mut self,
        path: &str,
        handler: M,
        validate: ValidationOptions,
    ) -> &mut Self {
        self.register(Route::builder(Method::GET, path).handler(handler).validate(validate))
    }

    /// Registers a `POST` route with one handler.
    pub fn post<M: Middleware>(
        &mut self,
        path: &str,
        handler: M,
        validate: ValidationOptions,
    ) -> &mut Self {
        self.register(Route::builder(Method::POST, path).handler(handler).validate(validate))
    }

    /// Registers a `PUT` route with one handler.
    pub fn put<M: Middleware>(
        &mut self,
        path: &str,
        handler: M,
        validate: ValidationOptions,
    ) -> &mut Self {
        self.register(Route::builder(Method::PUT, path).handler(handler).validate(validate))
    }

    /// Registers a `PATCH` route with one handler.
    pub fn patch<M: Middleware>(
        &mut self,
        path: &str,
        handler: M,
        validate: ValidationOptions,
    ) -> &mut Self {
        self.register(Route::builder(Method::PATCH, path).handler(handler).validate(validate))
    }

    /// Registers a `DELETE` route with one handler.
    pub fn delete<M: Middleware>(
        &mut self,
        path: &str,
        handler: M,
        validate: ValidationOptions,
    ) -> &mut Self {
        self.register(Route::builder(Method::DELETE, path).handler(handler).validate(validate))
    }

    /// Looks up a route by method and path template.
    #[must_use]
    pub fn route(&self, method: &Method, path: &str) -> Option<&Route> {
        self.routes
            .iter()
            .find(|r| &r.method == method && r.path == path)
    }

    /// Returns every registered route in registration order.
    pub fn routes(&self) -> impl Iterator<Item = &Route> {
        self.routes.iter()
    }

    /// Returns the number of registered routes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.routes.len()
    }

    /// Returns `true` if no route is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}
