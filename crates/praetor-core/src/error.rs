//! Error types for Praetor.
//!
//! This module provides the [`PraetorError`] type, the standard error type used
//! throughout the middleware pipeline. Failures inside the validation layer are
//! ordinary data (see [`InvalidRecord`](crate::InvalidRecord)); a `PraetorError`
//! is only produced when a request must stop.
//!
//! [`PraetorError::Abort`] is the single "abort the request with a status code"
//! primitive. The host pipeline catches it and renders a response from it;
//! nothing that happened to the response state before the abort survives.

use http::StatusCode;
use thiserror::Error;

/// Fixed textual code returned when request validation fails and error
/// detail is not exposed to the caller.
pub const VALIDATION_ERROR_CODE: &str = "VALIDATION_ERROR";

/// Result type alias using [`PraetorError`].
pub type PraetorResult<T> = Result<T, PraetorError>;

/// Standard error type for Praetor.
///
/// # Example
///
/// ```
/// use praetor_core::PraetorError;
/// use http::StatusCode;
///
/// let err = PraetorError::validation_failed();
/// assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
/// assert_eq!(err.exposed_message(), Some("VALIDATION_ERROR"));
///
/// let err = PraetorError::abort(StatusCode::INTERNAL_SERVER_ERROR);
/// assert_eq!(err.exposed_message(), None);
/// ```
#[derive(Error, Debug)]
pub enum PraetorError {
    /// The request was aborted with an explicit HTTP status.
    #[error("request aborted with status {status}")]
    Abort {
        /// The status code the host pipeline must respond with.
        status: StatusCode,
        /// Optional message. Only surfaced to the caller for client errors.
        message: Option<String>,
    },

    /// A downstream stage failed unexpectedly.
    #[error("internal error: {message}")]
    Internal {
        /// Human-readable error message (not exposed to clients).
        message: String,
        /// The underlying error (not exposed to clients).
        #[source]
        source: Option<anyhow::Error>,
    },
}

impl PraetorError {
    /// Creates a bare abort with the given status and no message.
    #[must_use]
    pub fn abort(status: StatusCode) -> Self {
        Self::Abort {
            status,
            message: None,
        }
    }

    /// Creates an abort carrying a message.
    #[must_use]
    pub fn abort_with_message(status: StatusCode, message: impl Into<String>) -> Self {
        Self::Abort {
            status,
            message: Some(message.into()),
        }
    }

    /// The non-exposed request validation failure: `400 VALIDATION_ERROR`.
    #[must_use]
    pub fn validation_failed() -> Self {
        Self::abort_with_message(StatusCode::BAD_REQUEST, VALIDATION_ERROR_CODE)
    }

    /// Creates an internal error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
            source: None,
        }
    }

    /// Creates an internal error with a source error.
    pub fn internal_with_source(
        message: impl Into<String>,
        source: impl Into<anyhow::Error>,
    ) -> Self {
        Self::Internal {
            message: message.into(),
            source: Some(source.into()),
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::Abort { status, .. } => *status,
            Self::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Returns the message that may be shown to the caller.
    ///
    /// Server errors never expose a message.
    #[must_use]
    pub fn exposed_message(&self) -> Option<&str> {
        match self {
            Self::Abort { status, message } if !status.is_server_error() => message.as_deref(),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_failed() {
        let error = PraetorError::validation_failed();
        assert_eq!(error.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(error.exposed_message(), Some(VALIDATION_ERROR_CODE));
    }

    #[test]
    fn test_bare_abort_has_no_message() {
        let error = PraetorError::abort(StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(error.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(error.exposed_message().is_none());
    }

    #[test]
    fn test_server_error_message_is_hidden() {
        let error = PraetorError::abort_with_message(StatusCode::BAD_GATEWAY, "upstream exploded");
        assert!(error.exposed_message().is_none());
    }

    #[test]
    fn test_internal_error() {
        let error = PraetorError::internal_with_source("handler failed", anyhow::anyhow!("boom"));
        assert_eq!(error.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(error.exposed_message().is_none());
        assert!(error.to_string().contains("handler failed"));
    }
}
