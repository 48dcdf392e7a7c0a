//! Per-execution context.

use std::sync::Arc;
use std::time::Duration;

use palisade_core::{Principal, RequestContext};

use crate::descriptor::HandlerDescriptor;
use crate::normalizer::ErrorPolicy;

/// Default deadline applied by the timeout interceptor.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(5000);

/// The request being processed together with the resolved handler.
///
/// Guards, pipes and interceptors all receive this. It owns the
/// [`RequestContext`], so it belongs to exactly one execution.
#[derive(Debug)]
pub struct ExecutionContext {
    request: RequestContext,
    descriptor: Arc<HandlerDescriptor>,
    default_timeout: Duration,
    error_policy: Arc<ErrorPolicy>,
}

impl ExecutionContext {
    /// Creates a context using [`DEFAULT_TIMEOUT`].
    #[must_use]
    pub fn new(request: RequestContext, descriptor: Arc<HandlerDescriptor>) -> Self {
        Self {
            request,
            descriptor,
            default_timeout: DEFAULT_TIMEOUT,
            error_policy: Arc::default(),
        }
    }

    /// Overrides the fallback deadline used by timeout interceptors that
    /// declare none of their own.
    #[must_use]
    pub fn with_default_timeout(mut self, timeout: Duration) -> Self {
        self.default_timeout = timeout;
        self
    }

    /// Sets how errors without a status are reported inside the chain.
    #[must_use]
    pub fn with_error_policy(mut self, policy: Arc<ErrorPolicy>) -> Self {
        self.error_policy = policy;
        self
    }

    /// Returns the error reporting policy of the executor running this request.
    #[must_use]
    pub fn error_policy(&self) -> &ErrorPolicy {
        &self.error_policy
    }

    /// Returns the request.
    #[must_use]
    pub const fn request(&self) -> &RequestContext {
        &self.request
    }

    /// Returns the handler descriptor.
    #[must_use]
    pub fn descriptor(&self) -> &HandlerDescriptor {
        &self.descriptor
    }

    /// Returns the handler id.
    #[must_use]
    pub fn handler_id(&self) -> &str {
        self.descriptor.id()
    }

    /// Shortcut for `request().principal()`.
    #[must_use]
    pub const fn principal(&self) -> Option<&Principal> {
        self.request.principal()
    }

    /// Returns the fallback deadline.
    #[must_use]
    pub const fn default_timeout(&self) -> Duration {
        self.default_timeout
    }

    /// Gives the request back once the execution is over.
    #[must_use]
    pub fn into_request(self) -> RequestContext {
        self.request
    }
}
