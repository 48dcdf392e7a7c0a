//! Response envelope.

use palisade_core::{PipelineResult, Value};

use crate::context::ExecutionContext;
use crate::interceptor::{BoxFuture, Interceptor, Next};

/// Wraps successful responses as `{"data": <response>}`. Errors pass through.
#[derive(Debug, Clone, Copy, Default)]
pub struct TransformInterceptor;

impl Interceptor for TransformInterceptor {
    fn name(&self) -> &'static str {
        "transform"
    }

    fn intercept<'a>(
        &'a self,
        ctx: &'a ExecutionContext,
        next: Next<'a>,
    ) -> BoxFuture<'a, PipelineResult<Value>> {
        Box::pin(async move {
            let data = next.run(ctx).await?;
            Ok(serde_json::json!({ "data": data }))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::HandlerDescriptor;
    use palisade_core::{ErrorCategory, PipelineError, RequestContext};
    use serde_json::json;
    use std::sync::Arc;

    fn ctx() -> ExecutionContext {
        ExecutionContext::new(
            RequestContext::new("GET", "/cats/interceptor/transform"),
            Arc::new(HandlerDescriptor::new("cats.transformDemo")),
        )
    }

    #[tokio::test]
    async fn test_wraps_response() {
        let ctx = ctx();
        let next = Next::handler(|| async { Ok(json!({"name": "Fluffy", "age": 3})) });
        let out = TransformInterceptor.intercept(&ctx, next).await.unwrap();
        assert_eq!(out, json!({"data": {"name": "Fluffy", "age": 3}}));
    }

    #[tokio::test]
    async fn test_error_not_wrapped() {
        let ctx = ctx();
        let next = Next::handler(|| async { Err(PipelineError::validation("bad")) });
        let err = TransformInterceptor.intercept(&ctx, next).await.unwrap_err();
        assert_eq!(err.category(), ErrorCategory::Validation);
    }
}
