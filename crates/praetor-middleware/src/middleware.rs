//! Core middleware trait and chain types.
//!
//! A middleware receives the mutable context and a [`Next`] continuation.
//! It may do work before and after calling `next.run(ctx)`, or skip the
//! call to short-circuit the chain. The only way to abort a request is to
//! return an error; the pipeline renders it into a response.
//!
//! # Example
//!
//! ```
//! use praetor_core::PraetorResult;
//! use praetor_middleware::{BoxFuture, Middleware, MiddlewareContext, Next};
//!
//! struct Timing;
//!
//! impl Middleware for Timing {
//!     fn name(&self) -> &'static str {
//!         "timing"
//!     }
//!
//!     fn process<'a>(
//!         &'a self,
//!         ctx: &'a mut MiddlewareContext,
//!         next: Next<'a>,
//!     ) -> BoxFuture<'a, PraetorResult<()>> {
//!         Box::pin(async move {
//!             let result = next.run(ctx).await;
//!             tracing::debug!(elapsed = ?ctx.elapsed(), "request finished");
//!             result
//!         })
//!     }
//! }
//! ```

use crate::context::MiddlewareContext;
use praetor_core::PraetorResult;

pub use praetor_core::BoxFuture;

/// The core middleware trait.
///
/// # Invariants
///
/// - Middleware calls `next.run()` at most once
/// - Middleware propagates errors returned by downstream middleware
pub trait Middleware: Send + Sync + 'static {
    /// Returns the name of this middleware, used in logs.
    fn name(&self) -> &'static str;

    /// Processes the request.
    fn process<'a>(
        &'a self,
        ctx: &'a mut MiddlewareContext,
        next: Next<'a>,
    ) -> BoxFuture<'a, PraetorResult<()>>;
}

/// Continuation invoking the rest of the chain.
///
/// Consumed by [`Next::run`], so it can only be called once.
pub struct Next<'a> {
    inner: NextInner<'a>,
}

enum NextInner<'a> {
    Chain {
        middleware: &'a dyn Middleware,
        next: Box<Next<'a>>,
    },
    End,
}

impl<'a> Next<'a> {
    /// Creates a `Next` that invokes `middleware`, then `next`.
    #[must_use]
    pub fn new(middleware: &'a dyn Middleware, next: Next<'a>) -> Self {
        Self {
            inner: NextInner::Chain {
                middleware,
                next: Box::new(next),
            },
        }
    }

    /// Creates the terminal `Next`; running it does nothing.
    #[must_use]
    pub const fn end() -> Self {
        Self {
            inner: NextInner::End,
        }
    }

    /// Returns `true` if nothing remains in the chain.
    #[must_use]
    pub fn is_end(&self) -> bool {
        matches!(self.inner, NextInner::End)
    }

    /// Invokes the rest of the chain.
    pub async fn run(self, ctx: &mut MiddlewareContext) -> PraetorResult<()> {
        match self.inner {
            NextInner::Chain { middleware, next } => middleware.process(ctx, *next).await,
            NextInner::End => Ok(()),
        }
    }
}

/// A middleware built from a closure.
///
/// # Example
///
/// ```
/// use http::StatusCode;
/// use praetor_middleware::FnMiddleware;
///
/// let handler = FnMiddleware::new("hello", |ctx, next| {
///     Box::pin(async move {
///         ctx.response_mut().set_status(StatusCode::OK);
///         ctx.response_mut().set_body("hello");
///         next.run(ctx).await
///     })
/// });
/// ```
pub struct FnMiddleware<F> {
    name: &'static str,
    func: F,
}

impl<F> FnMiddleware<F>
where
    F: for<'a> Fn(&'a mut MiddlewareContext, Next<'a>) -> BoxFuture<'a, PraetorResult<()>>
        + Send
        + Sync
        + 'static,
{
    /// Creates a new closure-based middleware.
    pub const fn new(name: &'static str, func: F) -> Self {
        Self { name, func }
    }
}

impl<F> Middleware for FnMiddleware<F>
where
    F: for<'a> Fn(&'a mut MiddlewareContext, Next<'a>) -> BoxFuture<'a, PraetorResult<()>>
        + Send
        + Sync
        + 'static,
{
    fn name(&self) -> &'static str {
        self.name
    }

    fn process<'a>(
        &'a self,
        ctx: &'a mut MiddlewareContext,
        next: Next<'a>,
    ) -> BoxFuture<'a, PraetorResult<()>> {
        (self.func)(ctx, next)
    }
}

impl<F> std::fmt::Debug for FnMiddleware<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FnMiddleware")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::{Method, StatusCode};
    use praetor_core::PraetorError;

    #[derive(Debug, Default)]
    struct Visits(Vec<&'static str>);

    struct Recording {
        name: &'static str,
    }

    impl Middleware for Recording {
        fn name(&self) -> &'static str {
            self.name
        }

        fn process<'a>(
            &'a self,
            ctx: &'a mut MiddlewareContext,
            next: Next<'a>,
        ) -> BoxFuture<'a, PraetorResult<()>> {
            Box::pin(async move {
                let mut visits = ctx.remove_extension::<Visits>().unwrap_or_default();
                visits.0.push(self.name);
                ctx.set_extension(visits);
                next.run(ctx).await
            })
        }
    }

    #[tokio::test]
    async fn test_end_is_a_no_op() {
        let mut ctx = MiddlewareContext::new(Method::GET, "/");
        let next = Next::end();
        assert!(next.is_end());
        assert!(next.run(&mut ctx).await.is_ok());
    }

    #[tokio::test]
    async fn test_chain_runs_in_order() {
        let first = Recording { name: "first" };
        let second = Recording { name: "second" };
        let mut ctx = MiddlewareContext::new(Method::GET, "/");

        let next = Next::new(&first, Next::new(&second, Next::end()));
        next.run(&mut ctx).await.unwrap();

        assert_eq!(ctx.get_extension::<Visits>().unwrap().0, vec!["first", "second"]);
    }

    #[tokio::test]
    async fn test_fn_middleware_short_circuits() {
        let abort = FnMiddleware::new("abort", |_ctx, _next| {
            Box::pin(async move { Err(PraetorError::abort(StatusCode::FORBIDDEN)) })
        });
        let after = Recording { name: "after" };
        let mut ctx = MiddlewareContext::new(Method::GET, "/");

        let err = Next::new(&abort, Next::new(&after, Next::end()))
            .run(&mut ctx)
            .await
            .unwrap_err();

        assert_eq!(err.status_code(), StatusCode::FORBIDDEN);
        assert!(ctx.get_extension::<Visits>().is_none());
        assert_eq!(abort.name(), "abort");
    }
}
