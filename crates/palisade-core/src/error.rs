//! Error types for Palisade.
//!
//! Every failure raised inside a pipeline execution (guard, pipe, handler or
//! interceptor) is a [`PipelineError`]. The executor catches it exactly once
//! and turns it into an [`ErrorEnvelope`].
//!
//! | Variant | Category | Status |
//! |---|---|---|
//! | `Validation` | `Validation` | 400 |
//! | `Authentication` | `Authentication` | 401 |
//! | `Authorization` | `Authorization` | 403 |
//! | `NotFound` | `NotFound` | 404 |
//! | `Timeout` | `Timeout` | 408 |
//! | `Http` | `Handler` | carried by the error |
//! | `Enveloped` | `Handler` | carried by the envelope |
//! | `Internal` | `Internal` | 500 |
//! | `Config` | `Config` | 500 |

use crate::Value;
use chrono::{DateTime, Utc};
use http::StatusCode;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias using [`PipelineError`].
pub type PipelineResult<T> = Result<T, PipelineError>;

/// Coarse classification of a [`PipelineError`], used for status mapping and metrics labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    /// A pipe rejected a parameter.
    Validation,
    /// No usable principal or credentials.
    Authentication,
    /// The principal lacks the required role, or a guard rejected the request.
    Authorization,
    /// The handler is not registered.
    NotFound,
    /// The handler exceeded its deadline.
    Timeout,
    /// An error raised with an explicit status code.
    Handler,
    /// Any other failure.
    Internal,
    /// Registration or configuration error.
    Config,
}

impl ErrorCategory {
    /// Status reported when the error does not carry its own.
    #[must_use]
    pub const fn default_status_code(&self) -> StatusCode {
        match self {
            Self::Validation => StatusCode::BAD_REQUEST,
            Self::Authentication => StatusCode::UNAUTHORIZED,
            Self::Authorization => StatusCode::FORBIDDEN,
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::Timeout => StatusCode::REQUEST_TIMEOUT,
            Self::Handler | Self::Internal | Self::Config => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Failure raised by any pipeline stage or by the handler.
///
/// # Example
///
/// ```
/// use palisade_core::{ErrorCategory, PipelineError};
/// use http::StatusCode;
///
/// let err = PipelineError::http(StatusCode::NOT_FOUND, "Cat not found");
/// assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
///
/// let err = PipelineError::internal("Database error");
/// assert_eq!(err.category(), ErrorCategory::Internal);
/// ```
#[derive(Error, Debug)]
pub enum PipelineError {
    /// A pipe could not transform or validate a parameter.
    #[error("invalid parameter: {message}")]
    Validation {
        /// Human-readable reason.
        message: String,
    },

    /// The request carries no usable principal or credentials.
    #[error("unauthenticated: {message}")]
    Authentication {
        /// Human-readable reason.
        message: String,
    },

    /// The request was rejected by a guard.
    #[error("forbidden: {message}")]
    Authorization {
        /// Human-readable reason.
        message: String,
    },

    /// The handler or resource does not exist.
    #[error("not found: {message}")]
    NotFound {
        /// Human-readable reason.
        message: String,
    },

    /// The handler did not settle before its deadline.
    #[error("timed out: {message}")]
    Timeout {
        /// Human-readable reason.
        message: String,
    },

    /// An error that already declares its status code and response payload.
    #[error("HTTP {status}: {response}")]
    Http {
        /// Status code to report.
        status: StatusCode,
        /// Response payload, a string or a structured object.
        response: Value,
    },

    /// Any other failure. Its detail is logged but never sent to callers.
    #[error("internal failure: {message}")]
    Internal {
        /// Internal diagnostic message.
        message: String,
        /// The underlying error.
        #[source]
        source: Option<anyhow::Error>,
    },

    /// Registration or configuration failure. Raised at startup only.
    #[error("bad registration or configuration: {message}")]
    Config {
        /// Human-readable reason.
        message: String,
    },

    /// An error already converted into an envelope by an interceptor.
    #[error("HTTP {}: {}", .0.status_code, .0.message)]
    Enveloped(Box<ErrorEnvelope>),
}

impl PipelineError {
    /// A pipe rejected a parameter (400).
    #[must_use]
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Credentials are missing or unusable (401).
    #[must_use]
    pub fn authentication(message: impl Into<String>) -> Self {
        Self::Authentication {
            message: message.into(),
        }
    }

    /// A guard refused the request (403).
    #[must_use]
    pub fn authorization(message: impl Into<String>) -> Self {
        Self::Authorization {
            message: message.into(),
        }
    }

    /// Nothing matches the request (404).
    #[must_use]
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound {
            message: message.into(),
        }
    }

    /// The handler missed its deadline (408).
    #[must_use]
    pub fn timeout(message: impl Into<String>) -> Self {
        Self::Timeout {
            message: message.into(),
        }
    }

    /// Creates an error with an explicit status code and payload.
    #[must_use]
    pub fn http(status: StatusCode, response: impl Into<Value>) -> Self {
        Self::Http {
            status,
            response: response.into(),
        }
    }

    /// An unexpected failure whose detail stays server-side (500).
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
            source: None,
        }
    }

    /// Like [`internal`](Self::internal), keeping the underlying error as the source.
    pub fn internal_with_source(
        message: impl Into<String>,
        source: impl Into<anyhow::Error>,
    ) -> Self {
        Self::Internal {
            message: message.into(),
            source: Some(source.into()),
        }
    }

    /// Startup-time registration or configuration failure.
    #[must_use]
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Wraps an already-built envelope.
    #[must_use]
    pub fn enveloped(envelope: ErrorEnvelope) -> Self {
        Self::Enveloped(Box::new(envelope))
    }

    /// Classifies the error.
    #[must_use]
    pub const fn category(&self) -> ErrorCategory {
        match self {
            Self::Validation { .. } => ErrorCategory::Validation,
            Self::Authentication { .. } => ErrorCategory::Authentication,
            Self::Authorization { .. } => ErrorCategory::Authorization,
            Self::NotFound { .. } => ErrorCategory::NotFound,
            Self::Timeout { .. } => ErrorCategory::Timeout,
            Self::Http { .. } | Self::Enveloped(_) => ErrorCategory::Handler,
            Self::Internal { .. } => ErrorCategory::Internal,
            Self::Config { .. } => ErrorCategory::Config,
        }
    }

    /// Status the caller will see, before any exception filter applies.
    #[must_use]
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Http { status, .. } => *status,
            Self::Enveloped(envelope) => envelope.status(),
            other => other.category().default_status_code(),
        }
    }

    /// Returns `true` if this error carries its own status code.
    #[must_use]
    pub const fn has_status(&self) -> bool {
        matches!(self, Self::Http { .. } | Self::Enveloped(_))
    }
}

/// The structured error a caller receives when a pipeline execution fails.
///
/// Serialized in camelCase: `{"statusCode", "message", "timestamp", "path"}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorEnvelope {
    /// HTTP status code.
    pub status_code: u16,
    /// A string or a structured payload.
    pub message: Value,
    /// When the failure was normalized.
    pub timestamp: DateTime<Utc>,
    /// Path of the failed request.
    pub path: String,
}

impl ErrorEnvelope {
    /// Creates an envelope stamped with the current time.
    #[must_use]
    pub fn new(status: StatusCode, message: impl Into<Value>, path: impl Into<String>) -> Self {
        Self {
            status_code: status.as_u16(),
            message: message.into(),
            timestamp: Utc::now(),
            path: path.into(),
        }
    }

    /// Returns the status code as a [`StatusCode`].
    #[must_use]
    pub fn status(&self) -> StatusCode {
        StatusCode::from_u16(self.status_code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_status_codes() {
        assert_eq!(
            PipelineError::validation("bad").status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            PipelineError::authentication("who").status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            PipelineError::authorization("no").status_code(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            PipelineError::timeout("slow").status_code(),
            StatusCode::REQUEST_TIMEOUT
        );
        assert_eq!(
            PipelineError::internal("boom").status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_http_error_carries_status() {
        let err = PipelineError::http(StatusCode::NOT_FOUND, "Cat not found");
        assert!(err.has_status());
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(err.category(), ErrorCategory::Handler);
        assert_eq!(err.to_string(), "HTTP 404 Not Found: \"Cat not found\"");
    }

    #[test]
    fn test_internal_error_keeps_source() {
        let io = std::io::Error::new(std::io::ErrorKind::Other, "disk full");
        let err = PipelineError::internal_with_source("write failed", io);
        let source = std::error::Error::source(&err).expect("source should be kept");
        assert_eq!(source.to_string(), "disk full");
    }

    #[test]
    fn test_enveloped_reports_envelope_status() {
        let envelope = ErrorEnvelope::new(StatusCode::CONFLICT, "taken", "/cats");
        let err = PipelineError::enveloped(envelope);
        assert_eq!(err.status_code(), StatusCode::CONFLICT);
        assert!(err.has_status());
    }

    #[test]
    fn test_envelope_serializes_camel_case() {
        let envelope = ErrorEnvelope::new(StatusCode::NOT_FOUND, "Cat not found", "/cats/9");
        let json = serde_json::to_value(&envelope).expect("serialization should work");
        assert_eq!(json["statusCode"], 404);
        assert_eq!(json["message"], "Cat not found");
        assert_eq!(json["path"], "/cats/9");
        assert!(json["timestamp"].is_string());
    }

    #[test]
    fn test_envelope_status_falls_back_to_500() {
        let mut envelope = ErrorEnvelope::new(StatusCode::OK, "x", "/");
        envelope.status_code = 1000;
        assert_eq!(envelope.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_all_error_categories_have_error_status_codes() {
        let categories = [
            ErrorCategory::Validation,
            ErrorCategory::Authentication,
            ErrorCategory::Authorization,
            ErrorCategory::NotFound,
            ErrorCategory::Timeout,
            ErrorCategory::Handler,
            ErrorCategory::Internal,
            ErrorCategory::Config,
        ];

        for category in categories {
            let status = category.default_status_code();
            assert!(
                status.is_client_error() || status.is_server_error(),
                "{category:?} maps to non-error status {status}"
            );
        }
    }
}
