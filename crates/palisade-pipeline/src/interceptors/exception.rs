//! Error envelope conversion inside the interceptor chain.

use palisade_core::{PipelineError, PipelineResult, Value};

use crate::context::ExecutionContext;
use crate::interceptor::{BoxFuture, Interceptor, Next};

/// Converts any error from the rest of the chain into an [`ErrorEnvelope`].
///
/// Errors with a status code keep their status and message. Anything else
/// becomes a 500 reported under the executor's [`ErrorPolicy`], so the
/// configured internal error message and exposure setting apply here too.
/// The envelope is returned as `PipelineError::Enveloped`, which the executor
/// passes through without wrapping it again.
///
/// [`ErrorEnvelope`]: palisade_core::ErrorEnvelope
/// [`ErrorPolicy`]: crate::normalizer::ErrorPolicy
#[derive(Debug, Clone, Copy, Default)]
pub struct ExceptionInterceptor;

impl ExceptionInterceptor {
    fn envelope(error: PipelineError, ctx: &ExecutionContext) -> PipelineError {
        if let PipelineError::Enveloped(_) = error {
            return error;
        }
        PipelineError::enveloped(ctx.error_policy().envelope(&error, ctx.request()))
    }
}

impl Interceptor for ExceptionInterceptor {
    fn name(&self) -> &'static str {
        "exception"
    }

    fn intercept<'a>(
        &'a self,
        ctx: &'a ExecutionContext,
        next: Next<'a>,
    ) -> BoxFuture<'a, PipelineResult<Value>> {
        Box::pin(async move {
            next.run(ctx)
                .await
                .map_err(|error| Self::envelope(error, ctx))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::HandlerDescriptor;
    use crate::normalizer::ExceptionNormalizer;
    use http::StatusCode;
    use palisade_core::{ErrorEnvelope, RequestContext};
    use serde_json::json;
    use std::sync::Arc;

    fn ctx() -> ExecutionContext {
        ExecutionContext::new(
            RequestContext::new("GET", "/cats/1"),
            Arc::new(HandlerDescriptor::new("cats.exceptionDemo")),
        )
    }

    async fn run(error: PipelineError) -> ErrorEnvelope {
        let ctx = ctx();
        let next = Next::handler(move || async move { Err(error) });
        match ExceptionInterceptor.intercept(&ctx, next).await {
            Err(PipelineError::Enveloped(envelope)) => *envelope,
            other => panic!("expected an envelope, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_generic_error_becomes_500() {
        let envelope = run(PipelineError::internal("Database error")).await;
        assert_eq!(envelope.status_code, 500);
        assert_eq!(envelope.message, json!("Internal server error"));
        assert_eq!(envelope.path, "/cats/1");
    }

    #[tokio::test]
    async fn test_status_error_passes_through() {
        let envelope = run(PipelineError::http(StatusCode::NOT_FOUND, "Cat not found")).await;
        assert_eq!(envelope.status_code, 404);
        assert_eq!(envelope.message, json!("Cat not found"));
    }

    #[tokio::test]
    async fn test_structured_message_passes_through() {
        let body = json!({"statusCode": 409, "error": "Conflict"});
        let envelope = run(PipelineError::http(StatusCode::CONFLICT, body.clone())).await;
        assert_eq!(envelope.status_code, 409);
        assert_eq!(envelope.message, body);
    }

    #[tokio::test]
    async fn test_already_enveloped_not_rewrapped() {
        let inner = ErrorEnvelope::new(StatusCode::FORBIDDEN, "inner", "/inner");
        let envelope = run(PipelineError::enveloped(inner.clone())).await;
        assert_eq!(envelope, inner);
    }

    #[tokio::test]
    async fn test_generic_error_uses_executor_policy() {
        let normalizer = ExceptionNormalizer::new().internal_error_message("Something went wrong");
        let ctx = ctx().with_error_policy(normalizer.policy().clone());
        let next = Next::handler(|| async { Err(PipelineError::internal("Database error")) });

        let Err(PipelineError::Enveloped(envelope)) = ExceptionInterceptor.intercept(&ctx, next).await else {
            panic!("expected an envelope");
        };
        assert_eq!(envelope.status_code, 500);
        assert_eq!(envelope.message, json!("Something went wrong"));
    }

    #[tokio::test]
    async fn test_exposed_internal_detail() {
        let normalizer = ExceptionNormalizer::new().expose_internal_errors(true);
        let ctx = ctx().with_error_policy(normalizer.policy().clone());
        let next = Next::handler(|| async { Err(PipelineError::internal("Database error")) });

        let Err(PipelineError::Enveloped(envelope)) = ExceptionInterceptor.intercept(&ctx, next).await else {
            panic!("expected an envelope");
        };
        assert_eq!(envelope.message, json!("Database error"));
    }

    #[tokio::test]
    async fn test_success_untouched() {
        let ctx = ctx();
        let next = Next::handler(|| async { Ok(json!("ok")) });
        assert_eq!(ExceptionInterceptor.intercept(&ctx, next).await.unwrap(), json!("ok"));
    }
}
