//! Per-request middleware context.
//!
//! The context is the single mutable object threaded through the chain. It
//! carries the five request parts the validation stage reads and merges
//! into, the response state handlers write and the response stage
//! replaces, and the invalid record attached by the validation stage.

use bytes::Bytes;
use http::{HeaderMap, Method, StatusCode};
use http_body_util::BodyExt;
use praetor_core::{InvalidRecord, Part, PraetorError, PraetorResult, RequestId};
use serde_json::{Map, Value};
use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::time::Instant;
use uuid::Uuid;

use crate::types::Request;

/// Header used to propagate a caller-supplied request ID.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// The request facets visible to middleware and handlers.
#[derive(Debug, Clone, PartialEq)]
pub struct RequestParts {
    /// Header map with lower-cased names. Repeated headers are joined with `", "`.
    pub headers: Map<String, Value>,
    /// Path parameters supplied by the router.
    pub params: Map<String, Value>,
    /// Parsed query string.
    pub query: Map<String, Value>,
    /// Parsed request body.
    pub body: Value,
    /// Uploaded files supplied by the host.
    pub files: Map<String, Value>,
}

impl Default for RequestParts {
    fn default() -> Self {
        Self {
            headers: Map::new(),
            params: Map::new(),
            query: Map::new(),
            body: Value::Object(Map::new()),
            files: Map::new(),
        }
    }
}

impl RequestParts {
    /// Returns a snapshot of a part as a JSON value.
    #[must_use]
    pub fn value(&self, part: Part) -> Value {
        match part {
            Part::Headers => Value::Object(self.headers.clone()),
            Part::Params => Value::Object(self.params.clone()),
            Part::Query => Value::Object(self.query.clone()),
            Part::Body => self.body.clone(),
            Part::Files => Value::Object(self.files.clone()),
        }
    }

    /// Shallow-merges a coerced object into a part.
    ///
    /// Keys in `coerced` overwrite existing keys; keys not in `coerced` are
    /// kept. A non-object body is replaced by an empty object before the
    /// merge. Returns `false` and leaves the part untouched if `coerced` is
    /// not an object.
    pub fn merge(&mut self, part: Part, coerced: Value) -> bool {
        let Value::Object(fields) = coerced else {
            return false;
        };

        let target = match part {
            Part::Headers => &mut self.headers,
            Part::Params => &mut self.params,
            Part::Query => &mut self.query,
            Part::Files => &mut self.files,
            Part::Body => {
                if !self.body.is_object() {
                    self.body = Value::Object(Map::new());
                }
                match &mut self.body {
                    Value::Object(map) => map,
                    _ => return false,
                }
            }
        };

        target.extend(fields);
        true
    }
}

/// Response state written by handlers.
///
/// Status and body start unset. The pipeline decides the final status when
/// rendering: `200` if a body was set, `404` otherwise.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResponseState {
    status: Option<StatusCode>,
    body: Option<Value>,
    content_type: Option<String>,
}

impl ResponseState {
    /// Returns the explicitly set status.
    #[must_use]
    pub fn status(&self) -> Option<StatusCode> {
        self.status
    }

    /// Sets the status.
    pub fn set_status(&mut self, status: StatusCode) {
        self.status = Some(status);
    }

    /// Returns the body.
    #[must_use]
    pub fn body(&self) -> Option<&Value> {
        self.body.as_ref()
    }

    /// Sets the body.
    pub fn set_body(&mut self, body: impl Into<Value>) {
        self.body = Some(body.into());
    }

    /// Removes and returns the body.
    pub fn take_body(&mut self) -> Option<Value> {
        self.body.take()
    }

    /// Returns the explicit content type.
    #[must_use]
    pub fn content_type(&self) -> Option<&str> {
        self.content_type.as_deref()
    }

    /// Sets the content type. Accepts `"json"`, `"text"` and `"html"` as
    /// shorthands.
    pub fn set_content_type(&mut self, content_type: impl Into<String>) {
        self.content_type = Some(content_type.into());
    }
}

/// Context passed through the middleware chain.
///
/// # Example
///
/// ```
/// use http::Method;
/// use praetor_middleware::context::MiddlewareContext;
/// use serde_json::json;
///
/// let mut ctx = MiddlewareContext::new(Method::POST, "/hello/1");
/// ctx.request_mut().params.insert("id".into(), json!("1"));
///
/// assert!(ctx.invalid().is_none());
/// assert_eq!(ctx.request().params["id"], "1");
/// ```
pub struct MiddlewareContext {
    request_id: RequestId,
    method: Method,
    path: String,
    request: RequestParts,
    response: ResponseState,
    invalid: Option<InvalidRecord>,
    started_at: Instant,
    extensions: HashMap<TypeId, Box<dyn Any + Send + Sync>>,
}

impl MiddlewareContext {
    /// Creates an empty context for a method and path.
    #[must_use]
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            request_id: RequestId::new(),
            method,
            path: path.into(),
            request: RequestParts::default(),
            response: ResponseState::default(),
            invalid: None,
            started_at: Instant::now(),
            extensions: HashMap::new(),
        }
    }

    /// Builds a context from an HTTP request.
    ///
    /// Header names are lower-cased and repeated headers joined with `", "`.
    /// The query string is decoded into a map, with repeated keys collected
    /// into arrays. The body is decoded according to its content type: JSON,
    /// URL-encoded form, or text. An empty body becomes an empty object.
    ///
    /// # Errors
    ///
    /// Aborts with `400` if the body claims to be JSON but does not parse.
    pub async fn from_request(request: Request) -> PraetorResult<Self> {
        let (parts, body) = request.into_parts();
        let bytes = match body.collect().await {
            Ok(collected) => collected.to_bytes(),
            Err(never) => match never {},
        };

        let mut ctx = Self::new(parts.method, parts.uri.path());
        if let Some(id) = parts
            .headers
            .get(REQUEST_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .and_then(|s| Uuid::parse_str(s).ok())
        {
            ctx.request_id = RequestId::from_uuid(id);
        }

        let content_type = parts
            .headers
            .get(http::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_owned);

        ctx.request.headers = headers_to_map(&parts.headers);
        ctx.request.query = parse_query(parts.uri.query())?;
        ctx.request.body = parse_body(content_type.as_deref(), &bytes)?;
        Ok(ctx)
    }

    /// Sets the path parameters.
    #[must_use]
    pub fn with_params(mut self, params: Map<String, Value>) -> Self {
        self.request.params = params;
        self
    }

    /// Sets the uploaded files.
    #[must_use]
    pub fn with_files(mut self, files: Map<String, Value>) -> Self {
        self.request.files = files;
        self
    }

    /// Returns the request ID.
    #[must_use]
    pub fn request_id(&self) -> RequestId {
        self.request_id
    }

    /// Returns the request method.
    #[must_use]
    pub fn method(&self) -> &Method {
        &self.method
    }

    /// Returns the request path.
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Returns the request parts.
    #[must_use]
    pub fn request(&self) -> &RequestParts {
        &self.request
    }

    /// Returns the request parts for mutation.
    pub fn request_mut(&mut self) -> &mut RequestParts {
        &mut self.request
    }

    /// Returns the response state.
    #[must_use]
    pub fn response(&self) -> &ResponseState {
        &self.response
    }

    /// Returns the response state for mutation.
    pub fn response_mut(&mut self) -> &mut ResponseState {
        &mut self.response
    }

    /// Returns the invalid record attached by the validation stage.
    ///
    /// `None` until a validation stage has run, and on routes without
    /// schemas.
    #[must_use]
    pub fn invalid(&self) -> Option<&InvalidRecord> {
        self.invalid.as_ref()
    }

    /// Attaches the invalid record.
    pub fn set_invalid(&mut self, invalid: InvalidRecord) {
        self.invalid = Some(invalid);
    }

    /// Returns when processing of this request started.
    #[must_use]
    pub fn started_at(&self) -> Instant {
        self.started_at
    }

    /// Returns the elapsed time since the request started.
    #[must_use]
    pub fn elapsed(&self) -> std::time::Duration {
        self.started_at.elapsed()
    }

    /// Stores a typed extension value.
    pub fn set_extension<T: Send + Sync + 'static>(&mut self, value: T) {
        self.extensions.insert(TypeId::of::<T>(), Box::new(value));
    }

    /// Retrieves a typed extension value.
    #[must_use]
    pub fn get_extension<T: Send + Sync + 'static>(&self) -> Option<&T> {
        self.extensions
            .get(&TypeId::of::<T>())
            .and_then(|v| v.downcast_ref())
    }

    /// Removes and returns a typed extension value.
    pub fn remove_extension<T: Send + Sync + 'static>(&mut self) -> Option<T> {
        self.extensions
            .remove(&TypeId::of::<T>())
            .and_then(|v| v.downcast().ok())
            .map(|b| *b)
    }
}

impl std::fmt::Debug for MiddlewareContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MiddlewareContext")
            .field("request_id", &self.request_id)
            .field("method", &self.method)
            .field("path", &self.path)
            .field("request", &self.request)
            .field("response", &self.response)
            .field("invalid", &self.invalid)
            .finish_non_exhaustive()
    }
}

fn headers_to_map(headers: &HeaderMap) -> Map<String, Value> {
    let mut map = Map::new();
    for (name, value) in headers {
        let value = String::from_utf8_lossy(value.as_bytes()).into_owned();
        match map.get_mut(name.as_str()) {
            Some(Value::String(existing)) => {
                existing.push_str(", ");
                existing.push_str(&value);
            }
            _ => {
                map.insert(name.as_str().to_owned(), Value::String(value));
            }
        }
    }
    map
}

fn pairs_to_map(pairs: Vec<(String, String)>) -> Map<String, Value> {
    let mut map = Map::new();
    for (key, value) in pairs {
        match map.get_mut(&key) {
            Some(Value::Array(items)) => items.push(Value::String(value)),
            Some(existing) => {
                let first = existing.take();
                *existing = Value::Array(vec![first, Value::String(value)]);
            }
            None => {
                map.insert(key, Value::String(value));
            }
        }
    }
    map
}

fn parse_query(query: Option<&str>) -> PraetorResult<Map<String, Value>> {
    let Some(query) = query else {
        return Ok(Map::new());
    };
    let pairs: Vec<(String, String)> = serde_urlencoded::from_str(query).map_err(|_| {
        PraetorError::abort_with_message(StatusCode::BAD_REQUEST, "invalid query string")
    })?;
    Ok(pairs_to_map(pairs))
}

fn parse_body(content_type: Option<&str>, bytes: &Bytes) -> PraetorResult<Value> {
    if bytes.is_empty() {
        return Ok(Value::Object(Map::new()));
    }

    let media_type = content_type
        .and_then(|ct| ct.split(';').next())
        .map(|ct| ct.trim().to_ascii_lowercase())
        .unwrap_or_default();

    if media_type == "application/json" || media_type.ends_with("+json") {
        return serde_json::from_slice(bytes).map_err(|_| {
            PraetorError::abort_with_message(StatusCode::BAD_REQUEST, "invalid JSON body")
        });
    }

    if media_type == "application/x-www-form-urlencoded" {
        let pairs: Vec<(String, String)> = serde_urlencoded::from_bytes(bytes).map_err(|_| {
            PraetorError::abort_with_message(StatusCode::BAD_REQUEST, "invalid form body")
        })?;
        return Ok(Value::Object(pairs_to_map(pairs)));
    }

    Ok(Value::String(String::from_utf8_lossy(bytes).into_owned()))
}
