//! Guards and the guard evaluator.
//!
//! Guards decide whether a request may reach parameter binding at all. The
//! [`GuardEvaluator`] runs global guards, then the handler's own guards, then
//! the handler's role requirement, one at a time and in that order. The first
//! guard that answers `false` or fails stops evaluation.

use std::future::ready;
use std::sync::Arc;

use palisade_core::PipelineResult;

use crate::context::ExecutionContext;
use crate::guards::RolesGuard;
use crate::interceptor::BoxFuture;

/// Decides whether a request may proceed.
///
/// Returning `Ok(false)` rejects the request as forbidden. Returning an error
/// rejects it with that error, which lets a guard report a missing principal
/// as an authentication failure rather than a generic rejection.
pub trait Guard: Send + Sync + 'static {
    /// Name used in logs.
    fn name(&self) -> &'static str;

    /// Evaluates the guard.
    fn can_activate<'a>(&'a self, ctx: &'a ExecutionContext) -> BoxFuture<'a, PipelineResult<bool>>;
}

/// A guard built from a synchronous closure.
///
/// ```
/// use palisade_pipeline::guard::FnGuard;
///
/// let business_hours = FnGuard::new("business_hours", |_ctx| Ok(true));
/// ```
pub struct FnGuard<F> {
    name: &'static str,
    func: F,
}

impl<F> FnGuard<F>
where
    F: Fn(&ExecutionContext) -> PipelineResult<bool> + Send + Sync + 'static,
{
    /// Creates a guard named `name`.
    pub const fn new(name: &'static str, func: F) -> Self {
        Self { name, func }
    }
}

impl<F> Guard for FnGuard<F>
where
    F: Fn(&ExecutionContext) -> PipelineResult<bool> + Send + Sync + 'static,
{
    fn name(&self) -> &'static str {
        self.name
    }

    fn can_activate<'a>(&'a self, ctx: &'a ExecutionContext) -> BoxFuture<'a, PipelineResult<bool>> {
        Box::pin(ready((self.func)(ctx)))
    }
}

/// Runs global guards, handler guards and the role requirement in order.
#[derive(Default, Clone)]
pub struct GuardEvaluator {
    global: Vec<Arc<dyn Guard>>,
    roles: RolesGuard,
}

impl GuardEvaluator {
    /// Creates an evaluator with no global guards.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an evaluator that runs `global` before every handler's guards.
    #[must_use]
    pub fn with_global(global: Vec<Arc<dyn Guard>>) -> Self {
        Self {
            global,
            roles: RolesGuard,
        }
    }

    /// Evaluates every guard for `ctx`.
    ///
    /// Returns `Ok(false)` as soon as one guard rejects; later guards are not
    /// invoked. A guard error is propagated unchanged.
    pub async fn evaluate(&self, ctx: &ExecutionContext) -> PipelineResult<bool> {
        if !run_guards(&self.global, ctx).await? || !run_guards(ctx.descriptor().guards(), ctx).await? {
            return Ok(false);
        }

        let allowed = self.roles.can_activate(ctx).await?;
        if !allowed {
            tracing::debug!(
                guard = self.roles.name(),
                roles = ?ctx.descriptor().required_roles(),
                "principal lacks required role"
            );
        }
        Ok(allowed)
    }
}

async fn run_guards(guards: &[Arc<dyn Guard>], ctx: &ExecutionContext) -> PipelineResult<bool> {
    for guard in guards {
        let allowed = guard.can_activate(ctx).await.map_err(|error| {
            tracing::debug!(guard = guard.name(), error = %error, "guard failed");
            error
        })?;

        if !allowed {
            tracing::debug!(guard = guard.name(), "guard rejected request");
            return Ok(false);
        }
    }
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::HandlerDescriptor;
    use palisade_core::{ErrorCategory, PipelineError, Principal, RequestContext};
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct Counting {
        answer: bool,
        calls: Arc<AtomicUsize>,
    }

    impl Guard for Counting {
        fn name(&self) -> &'static str {
            "counting"
        }

        fn can_activate<'a>(
            &'a self,
            _ctx: &'a ExecutionContext,
        ) -> BoxFuture<'a, PipelineResult<bool>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Box::pin(ready(Ok(self.answer)))
        }
    }

    fn ctx(descriptor: HandlerDescriptor, request: RequestContext) -> ExecutionContext {
        ExecutionContext::new(request, Arc::new(descriptor))
    }

    #[tokio::test]
    async fn test_no_guards_no_roles_allows() {
        let ctx = ctx(HandlerDescriptor::new("open"), RequestContext::new("GET", "/"));
        assert!(GuardEvaluator::new().evaluate(&ctx).await.unwrap());
    }

    #[tokio::test]
    async fn test_first_rejection_stops_evaluation() {
        let first = Arc::new(AtomicUsize::new(0));
        let second = Arc::new(AtomicUsize::new(0));

        let descriptor = HandlerDescriptor::new("guarded")
            .with_guard(Counting {
                answer: false,
                calls: first.clone(),
            })
            .with_guard(Counting {
                answer: true,
                calls: second.clone(),
            });
        let ctx = ctx(descriptor, RequestContext::new("GET", "/"));

        assert!(!GuardEvaluator::new().evaluate(&ctx).await.unwrap());
        assert_eq!(first.load(Ordering::SeqCst), 1);
        assert_eq!(second.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_global_guards_run_first() {
        let global_calls = Arc::new(AtomicUsize::new(0));
        let local_calls = Arc::new(AtomicUsize::new(0));

        let global: Arc<dyn Guard> = Arc::new(Counting {
            answer: false,
            calls: global_calls.clone(),
        });
        let descriptor = HandlerDescriptor::new("guarded").with_guard(Counting {
            answer: true,
            calls: local_calls.clone(),
        });
        let ctx = ctx(descriptor, RequestContext::new("GET", "/"));

        let evaluator = GuardEvaluator::with_global(vec![global]);
        assert!(!evaluator.evaluate(&ctx).await.unwrap());
        assert_eq!(global_calls.load(Ordering::SeqCst), 1);
        assert_eq!(local_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_guard_error_propagates() {
        let descriptor = HandlerDescriptor::new("guarded").with_guard(FnGuard::new(
            "token_service",
            |_ctx| Err(PipelineError::authentication("token expired")),
        ));
        let ctx = ctx(descriptor, RequestContext::new("GET", "/"));

        let err = GuardEvaluator::new().evaluate(&ctx).await.unwrap_err();
        assert_eq!(err.category(), ErrorCategory::Authentication);
        assert!(err.to_string().contains("token expired"));
    }

    #[tokio::test]
    async fn test_role_requirement_enforced_without_explicit_guard() {
        let descriptor = HandlerDescriptor::new("admin").with_role("admin");

        let user = ctx(
            descriptor.clone(),
            RequestContext::new("GET", "/").with_principal(Principal::new("u").with_role("user")),
        );
        assert!(!GuardEvaluator::new().evaluate(&user).await.unwrap());

        let admin = ctx(
            descriptor,
            RequestContext::new("GET", "/").with_principal(Principal::new("a").with_role("admin")),
        );
        assert!(GuardEvaluator::new().evaluate(&admin).await.unwrap());
    }

    #[tokio::test]
    async fn test_role_requirement_without_principal_is_authentication_error() {
        let descriptor = HandlerDescriptor::new("admin").with_role("admin");
        let ctx = ctx(descriptor, RequestContext::new("GET", "/"));

        let err = GuardEvaluator::new().evaluate(&ctx).await.unwrap_err();
        assert_eq!(err.category(), ErrorCategory::Authentication);
    }
}
