//! Logs validation error events published by the router.

use std::sync::Arc;

use praetor::prelude::ValidationErrorEvent;
use tokio::sync::broadcast::error::RecvError;
use tokio::sync::broadcast::Receiver;
use tracing::{info, warn};

/// Logs events until every sender is gone. Returns how many were logged.
pub async fn log_events(mut events: Receiver<Arc<ValidationErrorEvent>>) -> usize {
    let mut logged = 0;
    loop {
        match events.recv().await {
            Ok(event) => {
                info!(
                    request_id = %event.request_id,
                    http.path = %event.path,
                    stage = event.failure.stage(),
                    "validation error event"
                );
                logged += 1;
            }
            Err(RecvError::Lagged(skipped)) => {
                warn!(skipped, "validation error listener lagged");
            }
            Err(RecvError::Closed) => return logged,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::Method;
    use praetor::middleware::ErrorEvents;
    use praetor::prelude::{RequestId, SchemaError, ValidationFailure};

    fn event() -> ValidationErrorEvent {
        ValidationErrorEvent::new(
            RequestId::new(),
            Method::POST,
            "/post",
            ValidationFailure::Response(SchemaError::single("required", "Required")),
        )
    }

    #[tokio::test]
    async fn test_listener_survives_lag() {
        let emitter = ErrorEvents::new(1);
        let receiver = emitter.subscribe();
        for _ in 0..3 {
            emitter.emit(event());
        }
        drop(emitter);

        assert_eq!(log_events(receiver).await, 1);
    }

    #[tokio::test]
    async fn test_listener_drains_before_stopping() {
        let emitter = ErrorEvents::new(8);
        let receiver = emitter.subscribe();
        emitter.emit(event());
        emitter.emit(event());
        drop(emitter);

        assert_eq!(log_events(receiver).await, 2);
    }
}
