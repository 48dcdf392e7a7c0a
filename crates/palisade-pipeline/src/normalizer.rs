//! Exception normalization.
//!
//! The last stage of every execution. Whatever failed (registry lookup,
//! guard, pipe, interceptor or handler) the caller receives exactly one
//! [`ErrorEnvelope`]:
//!
//! ```json
//! {
//!   "statusCode": 404,
//!   "message": "Cat not found",
//!   "timestamp": "2026-01-01T00:00:00Z",
//!   "path": "/cats/1"
//! }
//! ```
//!
//! Errors that carry a status keep it together with their message. Everything
//! else becomes a 500 whose message hides the internal detail, unless
//! [`expose_internal_errors`](ExceptionNormalizer::expose_internal_errors) is
//! enabled.

use std::fmt;
use std::sync::Arc;

use http::StatusCode;
use palisade_config::PipelineConfig;
use palisade_core::{ErrorEnvelope, PipelineError, RequestContext, Value};

/// Default message for errors without a status of their own.
pub const DEFAULT_INTERNAL_MESSAGE: &str = "Internal server error";

/// Custom error handling that runs before the default normalization.
///
/// Filters are tried in registration order; the first one to return an
/// envelope wins. Returning `None` defers to the next filter.
///
/// ```
/// use http::StatusCode;
/// use palisade_core::{ErrorCategory, ErrorEnvelope, PipelineError, RequestContext};
/// use palisade_pipeline::normalizer::ExceptionFilter;
///
/// struct TimeoutAsUnavailable;
///
/// impl ExceptionFilter for TimeoutAsUnavailable {
///     fn catch(&self, error: &PipelineError, request: &RequestContext) -> Option<ErrorEnvelope> {
///         (error.category() == ErrorCategory::Timeout).then(|| {
///             ErrorEnvelope::new(StatusCode::SERVICE_UNAVAILABLE, "Try again later", request.path())
///         })
///     }
/// }
/// ```
pub trait ExceptionFilter: Send + Sync + 'static {
    /// Returns an envelope for `error`, or `None` to pass.
    fn catch(&self, error: &PipelineError, request: &RequestContext) -> Option<ErrorEnvelope>;
}

/// How errors without a status of their own are reported.
///
/// Shared by the [`ExceptionNormalizer`] and by
/// [`ExceptionInterceptor`](crate::interceptors::ExceptionInterceptor), so a
/// handler chain that converts its own errors still honors
/// `pipeline.internal_error_message` and `pipeline.expose_internal_errors`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorPolicy {
    expose_internal_errors: bool,
    internal_error_message: String,
}

impl Default for ErrorPolicy {
    fn default() -> Self {
        Self {
            expose_internal_errors: false,
            internal_error_message: DEFAULT_INTERNAL_MESSAGE.to_string(),
        }
    }
}

impl ErrorPolicy {
    /// Whether internal error details reach the caller.
    #[must_use]
    pub const fn exposes_internal_errors(&self) -> bool {
        self.expose_internal_errors
    }

    /// Message sent in place of internal error details.
    #[must_use]
    pub fn internal_error_message(&self) -> &str {
        &self.internal_error_message
    }

    /// Maps `error` to an envelope without consulting any filter.
    ///
    /// An already enveloped error is returned as is.
    pub fn envelope(&self, error: &PipelineError, request: &RequestContext) -> ErrorEnvelope {
        if let PipelineError::Enveloped(envelope) = error {
            return (**envelope).clone();
        }

        let path = request.path();
        match client_error(error) {
            Some((status, message)) => {
                if status.is_server_error() {
                    tracing::error!(request_id = %request.request_id(), error = %error, path, "request failed");
                } else {
                    tracing::debug!(request_id = %request.request_id(), error = %error, path, "request rejected");
                }
                ErrorEnvelope::new(status, message, path)
            }
            None => {
                tracing::error!(
                    request_id = %request.request_id(),
                    error = %error,
                    error.category = ?error.category(),
                    path,
                    "unhandled error"
                );
                let message = if self.expose_internal_errors {
                    internal_detail(error)
                } else {
                    self.internal_error_message.clone()
                };
                ErrorEnvelope::new(StatusCode::INTERNAL_SERVER_ERROR, message, path)
            }
        }
    }
}

/// Turns any [`PipelineError`] into an [`ErrorEnvelope`].
#[derive(Clone, Default)]
pub struct ExceptionNormalizer {
    policy: Arc<ErrorPolicy>,
    filters: Vec<Arc<dyn ExceptionFilter>>,
}

impl fmt::Debug for ExceptionNormalizer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExceptionNormalizer")
            .field("policy", &self.policy)
            .field("filters", &self.filters.len())
            .finish()
    }
}

impl ExceptionNormalizer {
    /// Creates a normalizer with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a normalizer from the `[pipeline]` configuration section.
    #[must_use]
    pub fn from_config(config: &PipelineConfig) -> Self {
        Self::new()
            .expose_internal_errors(config.expose_internal_errors)
            .internal_error_message(&config.internal_error_message)
    }

    /// Sets whether internal error details reach the caller.
    ///
    /// **Warning**: Only enable this in development environments.
    #[must_use]
    pub fn expose_internal_errors(mut self, expose: bool) -> Self {
        Arc::make_mut(&mut self.policy).expose_internal_errors = expose;
        self
    }

    /// Sets the message used for internal errors.
    #[must_use]
    pub fn internal_error_message(mut self, message: &str) -> Self {
        Arc::make_mut(&mut self.policy).internal_error_message = message.to_string();
        self
    }

    /// Appends an exception filter.
    #[must_use]
    pub fn with_filter<F: ExceptionFilter>(mut self, filter: F) -> Self {
        self.filters.push(Arc::new(filter));
        self
    }

    /// Appends an already shared exception filter.
    #[must_use]
    pub fn with_shared_filter(mut self, filter: Arc<dyn ExceptionFilter>) -> Self {
        self.filters.push(filter);
        self
    }

    /// Number of registered filters.
    #[must_use]
    pub fn filter_count(&self) -> usize {
        self.filters.len()
    }

    /// The reporting policy applied after the filters.
    #[must_use]
    pub fn policy(&self) -> &Arc<ErrorPolicy> {
        &self.policy
    }

    /// Builds the envelope for `error` raised while serving `request`.
    pub fn normalize(&self, error: &PipelineError, request: &RequestContext) -> ErrorEnvelope {
        self.filters
            .iter()
            .find_map(|filter| filter.catch(error, request))
            .unwrap_or_else(|| self.policy.envelope(error, request))
    }
}

/// Status and message for errors that declare their own status.
///
/// Returns `None` for internal and configuration errors, whose detail must
/// not reach the caller by default. Envelopes are handled by the caller.
fn client_error(error: &PipelineError) -> Option<(StatusCode, Value)> {
    match error {
        PipelineError::Validation { message }
        | PipelineError::Authentication { message }
        | PipelineError::Authorization { message }
        | PipelineError::NotFound { message }
        | PipelineError::Timeout { message } => {
            Some((error.status_code(), Value::String(message.clone())))
        }
        PipelineError::Http { status, response } => Some((*status, response.clone())),
        PipelineError::Enveloped(envelope) => Some((envelope.status(), envelope.message.clone())),
        PipelineError::Internal { .. } | PipelineError::Config { .. } => None,
    }
}

fn internal_detail(error: &PipelineError) -> String {
    match error {
        PipelineError::Internal { message, .. } | PipelineError::Config { message } => {
            message.clone()
        }
        other => other.to_string(),
    }
}
