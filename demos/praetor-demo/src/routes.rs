//! Route handlers and their validation options.

use praetor::prelude::*;
use serde_json::{json, Map, Value};

/// Echoes the `id` path parameter.
pub struct Hello;

impl Middleware for Hello {
    fn name(&self) -> &'static str {
        "hello"
    }

    fn process<'a>(
        &'a self,
        ctx: &'a mut MiddlewareContext,
        next: Next<'a>,
    ) -> BoxFuture<'a, PraetorResult<()>> {
        Box::pin(async move {
            let id = ctx.request().params.get("id").cloned().unwrap_or(Value::Null);
            ctx.response_mut().set_body(id);
            next.run(ctx).await
        })
    }
}

/// Answers with more than the response schema allows.
pub struct Submit;

impl Middleware for Submit {
    fn name(&self) -> &'static str {
        "submit"
    }

    fn process<'a>(
        &'a self,
        ctx: &'a mut MiddlewareContext,
        next: Next<'a>,
    ) -> BoxFuture<'a, PraetorResult<()>> {
        Box::pin(async move {
            ctx.response_mut()
                .set_body(json!({"success": true, "second": "fdsafasd"}));
            next.run(ctx).await
        })
    }
}

/// Logs every request before validation runs.
pub struct Trace;

impl Middleware for Trace {
    fn name(&self) -> &'static str {
        "trace"
    }

    fn process<'a>(
        &'a self,
        ctx: &'a mut MiddlewareContext,
        next: Next<'a>,
    ) -> BoxFuture<'a, PraetorResult<()>> {
        Box::pin(async move {
            tracing::debug!(
                request_id = %ctx.request_id(),
                http.path = %ctx.path(),
                "pre-handler"
            );
            next.run(ctx).await
        })
    }
}

pub fn hello_options() -> ValidationOptions {
    ValidationOptions::builder()
        .body(ObjectSchema::builder().required("foo", FieldType::Number).build())
        .params(ObjectSchema::builder().required("id", FieldType::String).build())
        .build()
}

pub fn submit_options() -> ValidationOptions {
    ValidationOptions::builder()
        .body(ObjectSchema::builder().required("foo", FieldType::Number).build())
        .query(ObjectSchema::builder().required("bar", FieldType::String).build())
        .headers(
            ObjectSchema::builder()
                .required("x-test-header", FieldType::String)
                .build(),
        )
        .response(UnionSchema::of(
            ObjectSchema::builder().required("success", FieldType::Boolean).build(),
            ObjectSchema::builder().required("second", FieldType::String).build(),
        ))
        .build()
}

/// Matches a `:name` path template against a concrete path.
pub fn match_params(template: &str, path: &str) -> Option<Map<String, Value>> {
    let mut params = Map::new();
    let mut actual = path.trim_matches('/').split('/');

    for segment in template.trim_matches('/').split('/') {
        let value = actual.next()?;
        if let Some(name) = segment.strip_prefix(':') {
            params.insert(name.to_string(), Value::String(value.to_string()));
        } else if segment != value {
            return None;
        }
    }

    actual.next().is_none().then_some(params)
}
