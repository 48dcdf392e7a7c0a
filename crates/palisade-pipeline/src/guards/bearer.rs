//! Authorization header guard.

use std::future::ready;

use palisade_core::{PipelineError, PipelineResult};

use super::UNAUTHORIZED_MESSAGE;
use crate::context::ExecutionContext;
use crate::guard::Guard;
use crate::interceptor::BoxFuture;

/// Admits requests whose `authorization` header has the form
/// `<scheme> <token>` with a non-empty token.
///
/// By default any scheme is accepted. [`with_scheme`](Self::with_scheme)
/// restricts it, compared case-insensitively.
///
/// ```
/// use palisade_pipeline::guards::BearerTokenGuard;
///
/// let guard = BearerTokenGuard::new().with_scheme("Bearer");
/// assert_eq!(guard.token_from("Bearer abc"), Some("abc"));
/// assert_eq!(guard.token_from("Basic abc"), None);
/// assert_eq!(guard.token_from("Bearer"), None);
/// ```
#[derive(Debug, Clone, Default)]
pub struct BearerTokenGuard {
    scheme: Option<String>,
}

impl BearerTokenGuard {
    /// Accepts any scheme.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Requires the given scheme.
    #[must_use]
    pub fn with_scheme(mut self, scheme: impl Into<String>) -> Self {
        self.scheme = Some(scheme.into());
        self
    }

    /// Extracts the token from a header value, or `None` if the header is
    /// malformed or uses another scheme.
    #[must_use]
    pub fn token_from<'h>(&self, header: &'h str) -> Option<&'h str> {
        let mut parts = header.split(' ');
        let scheme = parts.next()?;
        let token = parts.next().filter(|t| !t.is_empty())?;

        match &self.scheme {
            Some(expected) if !expected.eq_ignore_ascii_case(scheme) => None,
            _ => Some(token),
        }
    }
}

impl Guard for BearerTokenGuard {
    fn name(&self) -> &'static str {
        "bearer_token"
    }

    fn can_activate<'a>(&'a self, ctx: &'a ExecutionContext) -> BoxFuture<'a, PipelineResult<bool>> {
        let token = ctx
            .request()
            .header("authorization")
            .and_then(|header| self.token_from(header));

        let result = if token.is_some() {
            Ok(true)
        } else {
            tracing::debug!(handler_id = ctx.handler_id(), "missing or malformed authorization header");
            Err(PipelineError::authentication(UNAUTHORIZED_MESSAGE))
        };
        Box::pin(ready(result))
    }
}
