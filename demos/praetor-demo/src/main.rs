//! # Praetor Demo
//!
//! Registers two validated routes and drives a handful of requests through
//! them in-process, printing each response.
//!
//! ## Usage
//!
//! ```bash
//! cargo run -p praetor-demo
//! PRAETOR__ROUTER__EXPOSE_REQUEST_ERRORS=false cargo run -p praetor-demo
//! ```

mod events;
mod routes;

use anyhow::Context;
use bytes::Bytes;
use http::{Method, Request};
use http_body_util::{BodyExt, Full};
use praetor::prelude::*;


#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = ConfigLoader::new()
        .with_development()
        .with_optional_file("praetor.toml")?
        .with_dotenv()
        .with_env_prefix("PRAETOR")
        .load()
        .context("loading configuration")?;

    init_telemetry(&config.telemetry.to_telemetry_config())?;

    let mut router = praetor::router(&config);
    router.post("/hello/:id", routes::Hello, routes::hello_options());
    router.register(
        Route::builder(Method::POST, "/post")
            .pre(routes::Trace)
            .handler(routes::Submit)
            .validate(routes::submit_options()),
    );

    let receiver = router.subscribe();
    let listener = tokio::spawn(events::log_events(receiver));

    let samples = [
        (Method::POST, "/hello/42", None, r#"{"foo": 1}"#),
        (Method::POST, "/hello/42", None, r#"{"foo": "bar"}"#),
        (Method::POST, "/post?bar=baz", Some("yes"), r#"{"foo": 3}"#),
        (Method::POST, "/post", None, r#"{"foo": 3}"#),
    ];

    for (method, uri, header, body) in samples {
        let mut builder = Request::builder()
            .method(method.clone())
            .uri(uri)
            .header(http::header::CONTENT_TYPE, "application/json");
        if let Some(value) = header {
            builder = builder.header("x-test-header", value);
        }
        let request = builder.body(Full::new(Bytes::from(body)))?;

        let path = request.uri().path().to_string();
        let Some((route, params)) = router.routes().find_map(|route| {
            (route.method() == &method)
                .then(|| routes::match_params(route.path(), &path))
                .flatten()
                .map(|params| (route, params))
        }) else {
            println!("{method} {uri} -> no route");
            continue;
        };

        let response = match MiddlewareContext::from_request(request).await {
            Ok(ctx) => route.process(ctx.with_params(params)).await,
            Err(err) => praetor::middleware::pipeline::render_error(&err),
        };

        let status = response.status();
        let bytes = response.into_body().collect().await?.to_bytes();
        println!("{method} {uri} -> {status} {}", String::from_utf8_lossy(&bytes));
    }

    // Closing the channel lets the listener drain and stop.
    drop(router);
    listener.await?;
    Ok(())
}
