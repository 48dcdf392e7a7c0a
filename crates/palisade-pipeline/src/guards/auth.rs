//! Principal presence guard.

use std::future::ready;

use palisade_core::{PipelineError, PipelineResult};

use super::UNAUTHORIZED_MESSAGE;
use crate::context::ExecutionContext;
use crate::guard::Guard;
use crate::interceptor::BoxFuture;

/// Admits only requests with an attached principal.
///
/// A missing principal is an authentication failure (401), not a rejection.
#[derive(Debug, Clone, Copy, Default)]
pub struct AuthGuard;

impl Guard for AuthGuard {
    fn name(&self) -> &'static str {
        "auth"
    }

    fn can_activate<'a>(&'a self, ctx: &'a ExecutionContext) -> BoxFuture<'a, PipelineResult<bool>> {
        let result = match ctx.principal() {
            Some(principal) => {
                tracing::trace!(principal = %principal.log_id(), "principal present");
                Ok(true)
            }
            None => Err(PipelineError::authentication(UNAUTHORIZED_MESSAGE)),
        };
        Box::pin(ready(result))
    }
}
