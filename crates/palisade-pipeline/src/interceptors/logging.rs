//! Request timing logs.

use std::time::Instant;

use palisade_core::{PipelineResult, Value};
use palisade_telemetry::metrics::duration_ms;

use crate::context::ExecutionContext;
use crate::interceptor::{BoxFuture, Interceptor, Next};

/// Logs before the rest of the chain runs and logs the elapsed time after it
/// settles. The response is returned untouched.
#[derive(Debug, Clone, Copy, Default)]
pub struct LoggingInterceptor;

impl Interceptor for LoggingInterceptor {
    fn name(&self) -> &'static str {
        "logging"
    }

    fn intercept<'a>(
        &'a self,
        ctx: &'a ExecutionContext,
        next: Next<'a>,
    ) -> BoxFuture<'a, PipelineResult<Value>> {
        Box::pin(async move {
            tracing::info!(
                handler_id = ctx.handler_id(),
                http.method = ctx.request().method(),
                http.path = ctx.request().path(),
                "Before..."
            );

            let start = Instant::now();
            let result = next.run(ctx).await;
            let duration_ms = duration_ms(start.elapsed());

            match &result {
                Ok(response) => {
                    tracing::info!(handler_id = ctx.handler_id(), duration_ms, "After... {duration_ms}ms");
                    tracing::trace!(handler_id = ctx.handler_id(), response = %response, "response");
                }
                Err(error) => {
                    tracing::info!(
                        handler_id = ctx.handler_id(),
                        duration_ms,
                        error = %error,
                        "After... {duration_ms}ms (failed)"
                    );
                }
            }

            result
        })
    }
}
