//! Handler deadlines.

use std::time::Duration;

use palisade_core::{PipelineError, PipelineResult, Value};
use palisade_telemetry::metrics::{duration_ms, record_timeout};

use crate::context::ExecutionContext;
use crate::interceptor::{BoxFuture, Interceptor, Next};

/// Message carried by timeout errors.
pub const TIMEOUT_MESSAGE: &str = "Request Timeout";

/// Races the rest of the chain against a deadline.
///
/// The deadline is, in priority order: the handler's declared timeout, the
/// duration given to [`with_duration`](Self::with_duration), and the
/// executor's default (5000 ms unless configured).
///
/// When the deadline passes first, the pending future is dropped and a
/// timeout error (408) is returned. A late result can never reach the caller.
#[derive(Debug, Clone, Copy, Default)]
pub struct TimeoutInterceptor {
    duration: Option<Duration>,
}

impl TimeoutInterceptor {
    /// Uses the handler's or the executor's deadline.
    #[must_use]
    pub const fn new() -> Self {
        Self { duration: None }
    }

    /// Uses `duration` unless the handler declares its own.
    #[must_use]
    pub const fn with_duration(duration: Duration) -> Self {
        Self {
            duration: Some(duration),
        }
    }

    /// The deadline that applies to `ctx`.
    #[must_use]
    pub fn effective_timeout(&self, ctx: &ExecutionContext) -> Duration {
        ctx.descriptor()
            .timeout()
            .or(self.duration)
            .unwrap_or_else(|| ctx.default_timeout())
    }
}

impl Interceptor for TimeoutInterceptor {
    fn name(&self) -> &'static str {
        "timeout"
    }

    fn is_timeout(&self) -> bool {
        true
    }

    fn intercept<'a>(
        &'a self,
        ctx: &'a ExecutionContext,
        next: Next<'a>,
    ) -> BoxFuture<'a, PipelineResult<Value>> {
        Box::pin(async move {
            let deadline = self.effective_timeout(ctx);

            match tokio::time::timeout(deadline, next.run(ctx)).await {
                Ok(result) => result,
                Err(_) => {
                    tracing::warn!(
                        handler_id = ctx.handler_id(),
                        timeout_ms = duration_ms(deadline),
                        "handler timed out"
                    );
                    record_timeout(ctx.handler_id());
                    Err(PipelineError::timeout(TIMEOUT_MESSAGE))
                }
            }
        })
    }
}
