//! HTTP request and response types used by the pipeline.

use bytes::Bytes;
use http::header::{HeaderValue, CONTENT_TYPE};
use http::StatusCode;
use http_body_util::Full;
use serde_json::Value;

/// The HTTP request type accepted by the pipeline.
///
/// This is a standard `http::Request` with a `Full<Bytes>` body.
pub type Request = http::Request<Full<Bytes>>;

/// The HTTP response type produced by the pipeline.
///
/// This is a standard `http::Response` with a `Full<Bytes>` body.
pub type Response = http::Response<Full<Bytes>>;

/// Content type for text bodies.
pub const TEXT_PLAIN: &str = "text/plain; charset=utf-8";

/// Content type for JSON bodies.
pub const APPLICATION_JSON: &str = "application/json; charset=utf-8";

/// Extension trait for building responses.
pub trait ResponseExt {
    /// Creates a plain text response.
    fn text(status: StatusCode, body: &str) -> Response;

    /// Creates a JSON response.
    fn json(status: StatusCode, body: &Value) -> Response;

    /// Creates a response with an explicit content type.
    fn with_content_type(status: StatusCode, content_type: &str, body: Bytes) -> Response;
}

impl ResponseExt for Response {
    fn text(status: StatusCode, body: &str) -> Response {
        Self::with_content_type(status, TEXT_PLAIN, Bytes::from(body.to_string()))
    }

    fn json(status: StatusCode, body: &Value) -> Response {
        Self::with_content_type(status, APPLICATION_JSON, Bytes::from(body.to_string()))
    }

    fn with_content_type(status: StatusCode, content_type: &str, body: Bytes) -> Response {
        let mut response = http::Response::new(Full::new(body));
        *response.status_mut() = status;
        let value = HeaderValue::from_str(content_type)
            .unwrap_or_else(|_| HeaderValue::from_static("application/octet-stream"));
        response.headers_mut().insert(CONTENT_TYPE, value);
        response
    }
}

/// Expands a short content type name into a full media type.
///
/// `"json"`, `"text"` and `"html"` are shorthands; anything else is used
/// as given.
#[must_use]
pub fn expand_content_type(content_type: &str) -> &str {
    match content_type {
        "json" => APPLICATION_JSON,
        "text" => TEXT_PLAIN,
        "html" => "text/html; charset=utf-8",
        other => other,
    }
}
