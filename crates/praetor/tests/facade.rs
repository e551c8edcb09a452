//! Wiring through the facade: config to router to response.

use http::{Method, StatusCode};
use praetor::prelude::*;
use serde_json::json;

struct Echo;

impl Middleware for Echo {
    fn name(&self) -> &'static str {
        "echo"
    }

    fn process<'a>(
        &'a self,
        ctx: &'a mut MiddlewareContext,
        next: Next<'a>,
    ) -> BoxFuture<'a, PraetorResult<()>> {
        Box::pin(async move {
            let body = ctx.request().body.clone();
            ctx.response_mut().set_body(body);
            next.run(ctx).await
        })
    }
}

fn router_from(toml: &str) -> Router {
    let config = ConfigLoader::new()
        .with_string(toml, "toml")
        .unwrap()
        .load()
        .unwrap();

    let mut router = praetor::router(&config);
    router.post(
        "/items",
        Echo,
        ValidationOptions::builder()
            .body(ObjectSchema::builder().required("name", FieldType::String).build())
            .build(),
    );
    router
}

#[tokio::test]
async fn test_configured_exposure_reaches_the_route() {
    let router = router_from("[router]\nexpose_request_errors = true");
    let route = router.route(&Method::POST, "/items").unwrap();

    let mut ctx = MiddlewareContext::new(Method::POST, "/items");
    ctx.request_mut().body = json!({"name": 7});

    let response = route.process(ctx).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(response
        .headers()
        .get(http::header::CONTENT_TYPE)
        .unwrap()
        .to_str()
        .unwrap()
        .starts_with("application/json"));
}

#[tokio::test]
async fn test_valid_request_passes_through_facade() {
    let router = router_from("");
    let route = router.route(&Method::POST, "/items").unwrap();

    let mut ctx = MiddlewareContext::new(Method::POST, "/items");
    ctx.request_mut().body = json!({"name": "widget"});

    let response = route.process(ctx).await;
    assert_eq!(response.status(), StatusCode::OK);
}
