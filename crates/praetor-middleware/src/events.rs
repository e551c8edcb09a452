//! Validation error events.
//!
//! When failures are exposed to the client, the validation stage also
//! publishes a [`ValidationErrorEvent`] on the router's [`ErrorEvents`]
//! channel. Publishing never blocks the request; events are dropped when
//! nobody is subscribed, and slow subscribers observe a lag instead of
//! applying back-pressure.

use http::Method;
use praetor_core::{InvalidRecord, RequestId, SchemaError};
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::broadcast;

/// Kind tag carried by every validation event.
pub const VALIDATION_ERROR_KIND: &str = "ValidationError";

/// Default channel capacity.
pub const DEFAULT_EVENT_CAPACITY: usize = 64;

/// What failed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "stage", content = "cause", rename_all = "snake_case")]
pub enum ValidationFailure {
    /// One or more request parts failed.
    Request(InvalidRecord),
    /// The handler's response failed the response schema.
    Response(SchemaError),
}

impl ValidationFailure {
    /// Returns the stage name used in logs and metrics.
    #[must_use]
    pub const fn stage(&self) -> &'static str {
        match self {
            Self::Request(_) => "request",
            Self::Response(_) => "response",
        }
    }
}

/// An exposed validation failure.
#[derive(Debug, Clone, Serialize)]
pub struct ValidationErrorEvent {
    /// Always [`VALIDATION_ERROR_KIND`].
    pub kind: &'static str,
    /// The failed request.
    pub request_id: RequestId,
    /// Request method.
    #[serde(serialize_with = "serialize_method")]
    pub method: Method,
    /// Request path.
    pub path: String,
    /// The failure.
    #[serde(flatten)]
    pub failure: ValidationFailure,
}

impl ValidationErrorEvent {
    /// Creates an event.
    #[must_use]
    pub fn new(
        request_id: RequestId,
        method: Method,
        path: impl Into<String>,
        failure: ValidationFailure,
    ) -> Self {
        Self {
            kind: VALIDATION_ERROR_KIND,
            request_id,
            method,
            path: path.into(),
            failure,
        }
    }
}

fn serialize_method<S: serde::Serializer>(method: &Method, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(method.as_str())
}

/// Broadcast channel for validation events.
///
/// Cloning shares the channel.
#[derive(Debug, Clone)]
pub struct ErrorEvents {
    sender: broadcast::Sender<Arc<ValidationErrorEvent>>,
}

impl ErrorEvents {
    /// Creates a channel holding up to `capacity` undelivered events per
    /// subscriber.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    /// Subscribes to events published after this call.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<Arc<ValidationErrorEvent>> {
        self.sender.subscribe()
    }

    /// Publishes an event. Returns the number of subscribers that will see it.
    pub fn emit(&self, event: ValidationErrorEvent) -> usize {
        self.sender.send(Arc::new(event)).unwrap_or(0)
    }

    /// Returns the number of active subscribers.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for ErrorEvents {
    fn default() -> Self {
        Self::new(DEFAULT_EVENT_CAPACITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use praetor_core::Part;
    use serde_json::json;

    fn request_event() -> ValidationErrorEvent {
        let mut invalid = InvalidRecord::valid();
        invalid.record(Part::Body, SchemaError::single("required", "Required"));
        ValidationErrorEvent::new(
            RequestId::new(),
            Method::POST,
            "/hello/1",
            ValidationFailure::Request(invalid),
        )
    }

    #[test]
    fn test_emit_without_subscribers() {
        let events = ErrorEvents::default();
        assert_eq!(events.subscriber_count(), 0);
        assert_eq!(events.emit(request_event()), 0);
    }

    #[tokio::test]
    async fn test_subscriber_receives_event() {
        let events = ErrorEvents::new(4);
        let mut rx = events.subscribe();

        assert_eq!(events.emit(request_event()), 1);

        let event = rx.recv().await.unwrap();
        assert_eq!(event.kind, VALIDATION_ERROR_KIND);
        assert_eq!(event.failure.stage(), "request");
        assert_eq!(event.path, "/hello/1");
    }

    #[test]
    fn test_event_serialization() {
        let event = ValidationErrorEvent::new(
            RequestId::new(),
            Method::GET,
            "/x",
            ValidationFailure::Response(SchemaError::single("invalid_union", "Invalid input")),
        );
        let value = serde_json::to_value(&event).unwrap();
        assert_eq!(value["kind"], "ValidationError");
        assert_eq!(value["method"], "GET");
        assert_eq!(value["stage"], "response");
        assert_eq!(
            value["cause"],
            json!({"issues": [{"code": "invalid_union", "path": [], "message": "Invalid input"}]})
        );
    }
}
