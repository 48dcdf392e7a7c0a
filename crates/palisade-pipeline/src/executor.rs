//! The pipeline executor.
//!
//! Every request runs through the same stages in the same order:
//!
//! 1. **Resolve** - look up the [`HandlerDescriptor`](crate::descriptor::HandlerDescriptor) by id
//! 2. **Guards** - global guards, handler guards, then the role requirement
//! 3. **Pipes** - extract and transform every declared parameter
//! 4. **Interceptors** - global interceptors wrap handler interceptors, which
//!    wrap the handler
//! 5. **Normalization** - any error from stages 1-4 becomes an [`ErrorEnvelope`]
//!
//! ```text
//! Request → Resolve → Guards → Pipes → [Interceptors → Handler → Interceptors] → Response
//!              └────────┴────────┴──────────────┴──────→ ExceptionNormalizer → ErrorEnvelope
//! ```
//!
//! A failure at any stage skips every later stage. In particular the handler
//! is never invoked for a request rejected by a guard or a pipe.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use palisade_config::PipelineConfig;
use palisade_core::{ErrorCategory, ErrorEnvelope, PipelineError, PipelineResult, RequestContext, Value};
use palisade_telemetry::metrics::{duration_ms, record_guard_rejection, record_request, InFlightGuard};
use tracing::Instrument;

use crate::context::{ExecutionContext, DEFAULT_TIMEOUT};
use crate::guard::{Guard, GuardEvaluator};
use crate::guards::FORBIDDEN_MESSAGE;
use crate::interceptor::{Interceptor, Next};
use crate::interceptors::TimeoutInterceptor;
use crate::normalizer::{ExceptionFilter, ExceptionNormalizer};
use crate::pipe::{BoundParameters, Pipe, PipeChain};
use crate::registry::MetadataRegistry;

/// Metrics label used when the handler id does not resolve.
const UNREGISTERED_HANDLER: &str = "unregistered";

/// Runs requests through the guard, pipe and interceptor stages.
///
/// The executor is immutable once built and can be shared across tasks.
///
/// # Example
///
/// ```
/// use palisade_core::{PipelineResult, RequestContext};
/// use palisade_pipeline::descriptor::{HandlerDescriptor, ParamPipeSpec};
/// use palisade_pipeline::executor::PipelineExecutor;
/// use palisade_pipeline::pipes::ParseIntPipe;
/// use palisade_pipeline::registry::MetadataRegistry;
/// use serde_json::json;
///
/// # tokio_test::block_on(async {
/// let registry = MetadataRegistry::builder()
///     .register(
///         HandlerDescriptor::new("cats.findOne")
///             .with_param(ParamPipeSpec::param("id").pipe(ParseIntPipe)),
///     )?
///     .build();
/// let executor = PipelineExecutor::builder(registry).build();
///
/// let request = RequestContext::new("GET", "/cats/42").with_route_param("id", "42");
/// let response = executor
///     .execute(request, "cats.findOne", |params| async move {
///         params.parse::<i64>(0).map(|id| json!({ "id": id }))
///     })
///     .await;
///
/// assert_eq!(response.unwrap(), json!({ "id": 42 }));
/// # PipelineResult::Ok(())
/// # }).unwrap();
/// ```
#[derive(Clone)]
pub struct PipelineExecutor {
    registry: Arc<MetadataRegistry>,
    guards: GuardEvaluator,
    pipes: PipeChain,
    interceptors: Vec<Arc<dyn Interceptor>>,
    normalizer: ExceptionNormalizer,
    default_timeout: Duration,
}

impl std::fmt::Debug for PipelineExecutor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PipelineExecutor")
            .field("handlers", &self.registry.len())
            .field(
                "interceptors",
                &self.interceptors.iter().map(|i| i.name()).collect::<Vec<_>>(),
            )
            .field("normalizer", &self.normalizer)
            .field("default_timeout", &self.default_timeout)
            .finish_non_exhaustive()
    }
}

impl PipelineExecutor {
    /// Creates a builder over `registry`.
    #[must_use]
    pub fn builder(registry: impl Into<Arc<MetadataRegistry>>) -> PipelineExecutorBuilder {
        PipelineExecutorBuilder::new(registry.into())
    }

    /// Returns the registry.
    #[must_use]
    pub fn registry(&self) -> &MetadataRegistry {
        &self.registry
    }

    /// Returns the fallback handler deadline.
    #[must_use]
    pub const fn default_timeout(&self) -> Duration {
        self.default_timeout
    }

    /// Runs `request` through the pipeline for `handler_id`.
    ///
    /// `invoker` receives the bound parameters, in declaration order, and is
    /// called at most once. It is not called at all when a guard or pipe
    /// rejects the request, or when an interceptor answers on its own.
    ///
    /// Every failure is returned as an [`ErrorEnvelope`].
    pub async fn execute<H, Fut>(
        &self,
        request: RequestContext,
        handler_id: &str,
        invoker: H,
    ) -> Result<Value, ErrorEnvelope>
    where
        H: FnOnce(BoundParameters) -> Fut + Send,
        Fut: Future<Output = PipelineResult<Value>> + Send,
    {
        let span = tracing::info_span!(
            "pipeline",
            request_id = %request.request_id(),
            handler_id,
            http.method = request.method(),
            http.path = request.path(),
            principal = ?request.principal().map(|p| p.log_id()),
        );

        self.execute_inner(request, handler_id, invoker)
            .instrument(span)
            .await
    }

    async fn execute_inner<H, Fut>(
        &self,
        request: RequestContext,
        handler_id: &str,
        invoker: H,
    ) -> Result<Value, ErrorEnvelope>
    where
        H: FnOnce(BoundParameters) -> Fut + Send,
        Fut: Future<Output = PipelineResult<Value>> + Send,
    {
        let _in_flight = InFlightGuard::new();

        let descriptor = match self.registry.resolve(handler_id) {
            Ok(descriptor) => descriptor,
            Err(error) => {
                let envelope = self.normalizer.normalize(&error, &request);
                record_request(UNREGISTERED_HANDLER, envelope.status_code, request.elapsed());
                return Err(envelope);
            }
        };

        let ctx = ExecutionContext::new(request, descriptor)
            .with_default_timeout(self.default_timeout)
            .with_error_policy(self.normalizer.policy().clone());
        let result = self.run_stages(&ctx, invoker).await;
        let duration = ctx.request().elapsed();
        let duration_ms = duration_ms(duration);

        match result {
            Ok(response) => {
                tracing::debug!(duration_ms, "request completed");
                record_request(ctx.handler_id(), 200, duration);
                Ok(response)
            }
            Err(error) => {
                let envelope = self.normalizer.normalize(&error, ctx.request());
                tracing::debug!(
                    http.status_code = envelope.status_code,
                    duration_ms,
                    "request failed"
                );
                record_request(ctx.handler_id(), envelope.status_code, duration);
                Err(envelope)
            }
        }
    }

    async fn run_stages<H, Fut>(&self, ctx: &ExecutionContext, invoker: H) -> PipelineResult<Value>
    where
        H: FnOnce(BoundParameters) -> Fut + Send,
        Fut: Future<Output = PipelineResult<Value>> + Send,
    {
        self.check_guards(ctx).await?;

        let params = self.pipes.bind(ctx).await?;

        let descriptor = ctx.descriptor();
        let implicit_timeout = descriptor
            .timeout()
            .filter(|_| !self.has_explicit_timeout(ctx))
            .map(|_| TimeoutInterceptor::new());

        let interceptors = self
            .interceptors
            .iter()
            .map(|i| &**i as &dyn Interceptor)
            .chain(descriptor.interceptors().iter().map(|i| &**i as &dyn Interceptor))
            .chain(implicit_timeout.iter().map(|t| t as &dyn Interceptor));

        let terminal = Next::handler(move || invoker(params));
        Next::chain(interceptors, terminal).run(ctx).await
    }

    async fn check_guards(&self, ctx: &ExecutionContext) -> PipelineResult<()> {
        match self.guards.evaluate(ctx).await {
            Ok(true) => Ok(()),
            Ok(false) => {
                record_guard_rejection(ctx.handler_id(), "authorization");
                Err(PipelineError::authorization(FORBIDDEN_MESSAGE))
            }
            Err(error) => {
                let kind = match error.category() {
                    ErrorCategory::Authentication => "authentication",
                    ErrorCategory::Authorization => "authorization",
                    _ => "error",
                };
                record_guard_rejection(ctx.handler_id(), kind);
                Err(error)
            }
        }
    }

    fn has_explicit_timeout(&self, ctx: &ExecutionContext) -> bool {
        self.interceptors
            .iter()
            .chain(ctx.descriptor().interceptors())
            .any(|i| i.is_timeout())
    }
}

/// Builder for [`PipelineExecutor`].
pub struct PipelineExecutorBuilder {
    registry: Arc<MetadataRegistry>,
    guards: Vec<Arc<dyn Guard>>,
    pipes: Vec<Arc<dyn Pipe>>,
    interceptors: Vec<Arc<dyn Interceptor>>,
    normalizer: ExceptionNormalizer,
    default_timeout: Duration,
}

impl PipelineExecutorBuilder {
    fn new(registry: Arc<MetadataRegistry>) -> Self {
        Self {
            registry,
            guards: Vec::new(),
            pipes: Vec::new(),
            interceptors: Vec::new(),
            normalizer: ExceptionNormalizer::new(),
            default_timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Applies the `[pipeline]` configuration section.
    #[must_use]
    pub fn config(mut self, config: &PipelineConfig) -> Self {
        self.default_timeout = config.default_timeout();
        self.normalizer = self
            .normalizer
            .expose_internal_errors(config.expose_internal_errors)
            .internal_error_message(&config.internal_error_message);
        self
    }

    /// Adds a guard that runs before every handler's own guards.
    #[must_use]
    pub fn global_guard<G: Guard>(mut self, guard: G) -> Self {
        self.guards.push(Arc::new(guard));
        self
    }

    /// Adds a pipe that runs before every parameter's own pipes.
    #[must_use]
    pub fn global_pipe<P: Pipe>(mut self, pipe: P) -> Self {
        self.pipes.push(Arc::new(pipe));
        self
    }

    /// Adds an interceptor that wraps every handler's own interceptors.
    ///
    /// Global interceptors are applied in registration order, the first one
    /// outermost.
    #[must_use]
    pub fn global_interceptor<I: Interceptor>(mut self, interceptor: I) -> Self {
        self.interceptors.push(Arc::new(interceptor));
        self
    }

    /// Adds an already shared global interceptor.
    #[must_use]
    pub fn shared_global_interceptor(mut self, interceptor: Arc<dyn Interceptor>) -> Self {
        self.interceptors.push(interceptor);
        self
    }

    /// Adds an exception filter, tried before the default normalization.
    #[must_use]
    pub fn exception_filter<F: ExceptionFilter>(mut self, filter: F) -> Self {
        self.normalizer = self.normalizer.with_filter(filter);
        self
    }

    /// Sets the deadline used by timeout interceptors that declare none.
    #[must_use]
    pub fn default_timeout(mut self, timeout: Duration) -> Self {
        self.default_timeout = timeout;
        self
    }

    /// Sets whether internal error details reach the caller.
    #[must_use]
    pub fn expose_internal_errors(mut self, expose: bool) -> Self {
        self.normalizer = self.normalizer.expose_internal_errors(expose);
        self
    }

    /// Sets the message used for internal errors.
    #[must_use]
    pub fn internal_error_message(mut self, message: &str) -> Self {
        self.normalizer = self.normalizer.internal_error_message(message);
        self
    }

    /// Builds the executor.
    #[must_use]
    pub fn build(self) -> PipelineExecutor {
        tracing::debug!(
            handlers = self.registry.len(),
            global_guards = self.guards.len(),
            global_pipes = self.pipes.len(),
            global_interceptors = self.interceptors.len(),
            "pipeline executor built"
        );

        PipelineExecutor {
            registry: self.registry,
            guards: GuardEvaluator::with_global(self.guards),
            pipes: PipeChain::with_global(self.pipes),
            interceptors: self.interceptors,
            normalizer: self.normalizer,
            default_timeout: self.default_timeout,
        }
    }
}
