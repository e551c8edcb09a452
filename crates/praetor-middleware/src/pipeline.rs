//! Middleware pipeline.
//!
//! A [`Pipeline`] is an ordered list of middleware. Running it threads one
//! [`MiddlewareContext`] through every stage; [`Pipeline::process`] then
//! renders the final context into an HTTP response:
//!
//! - An unset status becomes `200` when a body was set and `404` otherwise
//! - String bodies are sent as text, every other body as JSON
//! - An error renders a fresh response with the error's status; the body is
//!   the error's message for client errors, otherwise the status reason

use crate::context::MiddlewareContext;
use crate::middleware::{Middleware, Next};
use crate::types::{expand_content_type, Request, Response, ResponseExt, APPLICATION_JSON, TEXT_PLAIN};
use bytes::Bytes;
use http::StatusCode;
use praetor_core::{PraetorError, PraetorResult};
use serde_json::Value;
use std::sync::Arc;

/// A shared middleware.
pub type BoxedMiddleware = Arc<dyn Middleware>;

/// An ordered middleware chain.
///
/// # Example
///
/// ```
/// use http::{Method, StatusCode};
/// use praetor_middleware::{FnMiddleware, MiddlewareContext, Pipeline};
///
/// # tokio_test::block_on(async {
/// let pipeline = Pipeline::builder()
///     .stage(FnMiddleware::new("hello", |ctx, next| {
///         Box::pin(async move {
///             ctx.response_mut().set_body("hello");
///             next.run(ctx).await
///         })
///     }))
///     .build();
///
/// let response = pipeline.process(MiddlewareContext::new(Method::GET, "/")).await;
/// assert_eq!(response.status(), StatusCode::OK);
/// # });
/// ```
#[derive(Clone, Default)]
pub struct Pipeline {
    stages: Vec<BoxedMiddleware>,
}

impl Pipeline {
    /// Creates a new pipeline builder.
    #[must_use]
    pub fn builder() -> PipelineBuilder {
        PipelineBuilder::new()
    }

    /// Runs every stage over the context.
    pub async fn run(&self, ctx: &mut MiddlewareContext) -> PraetorResult<()> {
        self.build_chain().run(ctx).await
    }

    /// Runs the pipeline and renders the response.
    pub async fn process(&self, mut ctx: MiddlewareContext) -> Response {
        let result = self.run(&mut ctx).await;
        render(&mut ctx, result)
    }

    /// Builds a context from an HTTP request, then runs and renders it.
    pub async fn handle(&self, request: Request) -> Response {
        match MiddlewareContext::from_request(request).await {
            Ok(ctx) => self.process(ctx).await,
            Err(err) => render_error(&err),
        }
    }

    fn build_chain(&self) -> Next<'_> {
        self.stages
            .iter()
            .rev()
            .fold(Next::end(), |next, middleware| Next::new(middleware.as_ref(), next))
    }

    /// Returns the names of all stages in order.
    #[must_use]
    pub fn stage_names(&self) -> Vec<&'static str> {
        self.stages.iter().map(|mw| mw.name()).collect()
    }

    /// Returns the number of stages.
    #[must_use]
    pub fn stage_count(&self) -> usize {
        self.stages.len()
    }
}

impl std::fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pipeline")
            .field("stages", &self.stage_names())
            .finish()
    }
}

/// Builder for a [`Pipeline`].
#[derive(Default)]
pub struct PipelineBuilder {
    stages: Vec<BoxedMiddleware>,
}

impl PipelineBuilder {
    /// Creates an empty builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a stage.
    #[must_use]
    pub fn stage<M: Middleware>(self, middleware: M) -> Self {
        self.shared_stage(Arc::new(middleware))
    }

    /// Appends a stage shared with other pipelines.
    #[must_use]
    pub fn shared_stage(mut self, middleware: BoxedMiddleware) -> Self {
        self.stages.push(middleware);
        self
    }

    /// Builds the pipeline.
    #[must_use]
    pub fn build(self) -> Pipeline {
        Pipeline {
            stages: self.stages,
        }
    }
}

/// Renders a finished context into a response.
pub fn render(ctx: &mut MiddlewareContext, result: PraetorResult<()>) -> Response {
    if let Err(err) = result {
        if let PraetorError::Internal { .. } = err {
            tracing::error!(
                request_id = %ctx.request_id(),
                http.path = ctx.path(),
                error = %err,
                "request failed"
            );
        }
        return render_error(&err);
    }

    let body = ctx.response_mut().take_body();
    let status = ctx.response().status().unwrap_or(if body.is_some() {
        StatusCode::OK
    } else {
        StatusCode::NOT_FOUND
    });
    let explicit_type = ctx.response().content_type().map(expand_content_type);

    match body {
        None if status == StatusCode::NO_CONTENT || status == StatusCode::NOT_MODIFIED => {
            Response::with_content_type(status, explicit_type.unwrap_or(TEXT_PLAIN), Bytes::new())
        }
        None => Response::text(status, status.canonical_reason().unwrap_or_default()),
        Some(Value::String(text)) => {
            Response::with_content_type(status, explicit_type.unwrap_or(TEXT_PLAIN), Bytes::from(text))
        }
        Some(value) => Response::with_content_type(
            status,
            explicit_type.unwrap_or(APPLICATION_JSON),
            Bytes::from(value.to_string()),
        ),
    }
}

/// Renders an error into a fresh response.
#[must_use]
pub fn render_error(err: &PraetorError) -> Response {
    let status = err.status_code();
    let message = err
        .exposed_message()
        .or_else(|| status.canonical_reason())
        .unwrap_or_default();
    Response::text(status, message)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::middleware::FnMiddleware;
    use http::header::CONTENT_TYPE;
    use http::Method;
    use http_body_util::BodyExt;
    use serde_json::json;

    async fn body_string(response: Response) -> String {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    fn ctx() -> MiddlewareContext {
        MiddlewareContext::new(Method::GET, "/")
    }

    #[tokio::test]
    async fn test_empty_pipeline_is_not_found() {
        let response = Pipeline::default().process(ctx()).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(body_string(response).await, "Not Found");
    }

    #[tokio::test]
    async fn test_json_body_defaults_to_ok() {
        let pipeline = Pipeline::builder()
            .stage(FnMiddleware::new("json", |ctx, next| {
                Box::pin(async move {
                    ctx.response_mut().set_body(json!({"success": true}));
                    next.run(ctx).await
                })
            }))
            .build();

        let response = pipeline.process(ctx()).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers().get(CONTENT_TYPE).unwrap(), APPLICATION_JSON);
        assert_eq!(body_string(response).await, r#"{"success":true}"#);
    }

    #[tokio::test]
    async fn test_abort_renders_message() {
        let pipeline = Pipeline::builder()
            .stage(FnMiddleware::new("abort", |ctx, _next| {
                Box::pin(async move {
                    ctx.response_mut().set_body("never sent");
                    Err(PraetorError::validation_failed())
                })
            }))
            .build();

        let response = pipeline.process(ctx()).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(response.headers().get(CONTENT_TYPE).unwrap(), TEXT_PLAIN);
        assert_eq!(body_string(response).await, "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_server_error_hides_message() {
        let err = PraetorError::abort_with_message(StatusCode::INTERNAL_SERVER_ERROR, "secret");
        let response = render_error(&err);
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body_string(response).await, "Internal Server Error");
    }

    #[tokio::test]
    async fn test_explicit_status_without_body() {
        let pipeline = Pipeline::builder()
            .stage(FnMiddleware::new("created", |ctx, next| {
                Box::pin(async move {
                    ctx.response_mut().set_status(StatusCode::NO_CONTENT);
                    next.run(ctx).await
                })
            }))
            .build();

        let response = pipeline.process(ctx()).await;
        assert_eq!(response.status(), StatusCode::NO_CONTENT);
        assert_eq!(body_string(response).await, "");
    }

    #[tokio::test]
    async fn test_handle_rejects_malformed_json() {
        let request = http::Request::builder()
            .method(Method::POST)
            .uri("/")
            .header(CONTENT_TYPE, "application/json")
            .body(http_body_util::Full::new(Bytes::from("{")))
            .unwrap();

        let response = Pipeline::default().handle(request).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_string(response).await, "invalid JSON body");
    }

    #[test]
    fn test_stage_names() {
        let pipeline = Pipeline::builder()
            .stage(FnMiddleware::new("a", |ctx, next| Box::pin(next.run(ctx))))
            .stage(FnMiddleware::new("b", |ctx, next| Box::pin(next.run(ctx))))
            .build();
        assert_eq!(pipeline.stage_names(), vec!["a", "b"]);
        assert_eq!(pipeline.stage_count(), 2);
    }
}
