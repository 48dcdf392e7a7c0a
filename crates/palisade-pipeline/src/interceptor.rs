//! Interceptor trait and chain.
//!
//! Interceptors are around-advice. Each one receives a [`Next`] that runs the
//! rest of the chain, handler included, and decides what to do before and
//! after it. Chained interceptors nest like an onion: for `[I1, I2, I3]` the
//! pre-phases run I1, I2, I3 and the post-phases run I3, I2, I1.
//!
//! # Example
//!
//! ```ignore
//! use palisade_pipeline::{BoxFuture, ExecutionContext, Interceptor, Next};
//! use palisade_core::{PipelineResult, Value};
//!
//! struct Stamp;
//!
//! impl Interceptor for Stamp {
//!     fn name(&self) -> &'static str {
//!         "stamp"
//!     }
//!
//!     fn intercept<'a>(
//!         &'a self,
//!         ctx: &'a ExecutionContext,
//!         next: Next<'a>,
//!     ) -> BoxFuture<'a, PipelineResult<Value>> {
//!         Box::pin(async move {
//!             let value = next.run(ctx).await?;
//!             Ok(serde_json::json!({ "handler": ctx.handler_id(), "value": value }))
//!         })
//!     }
//! }
//! ```

use std::future::Future;
use std::pin::Pin;

use palisade_core::{PipelineResult, Value};

use crate::context::ExecutionContext;

/// A boxed, sendable future.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Around-advice wrapped around handler invocation.
///
/// # Invariants
///
/// - `next.run()` is called at most once. Not calling it short-circuits the
///   rest of the chain, handler included.
/// - An interceptor that does not mean to handle an error returns it unchanged.
pub trait Interceptor: Send + Sync + 'static {
    /// Name used in logs.
    fn name(&self) -> &'static str;

    /// Returns `true` for interceptors that enforce the handler's deadline.
    ///
    /// When a handler declares a timeout and none of its interceptors
    /// answers `true`, the executor adds a
    /// [`TimeoutInterceptor`](crate::interceptors::TimeoutInterceptor) itself.
    fn is_timeout(&self) -> bool {
        false
    }

    /// Runs this interceptor around `next`.
    fn intercept<'a>(
        &'a self,
        ctx: &'a ExecutionContext,
        next: Next<'a>,
    ) -> BoxFuture<'a, PipelineResult<Value>>;
}

/// The remainder of the interceptor chain.
///
/// Consumed by [`run`](Self::run), so it can be invoked at most once.
pub struct Next<'a> {
    inner: NextInner<'a>,
}

enum NextInner<'a> {
    Chain {
        interceptor: &'a dyn Interceptor,
        next: Box<Next<'a>>,
    },
    Handler(Box<dyn FnOnce() -> BoxFuture<'a, PipelineResult<Value>> + Send + 'a>),
}

impl<'a> Next<'a> {
    /// Wraps `next` in `interceptor`.
    #[must_use]
    pub fn new(interceptor: &'a dyn Interceptor, next: Next<'a>) -> Self {
        Self {
            inner: NextInner::Chain {
                interceptor,
                next: Box::new(next),
            },
        }
    }

    /// Terminal link that invokes the handler.
    ///
    /// `f` is only called when the chain actually reaches the handler.
    #[must_use]
    pub fn handler<F, Fut>(f: F) -> Self
    where
        F: FnOnce() -> Fut + Send + 'a,
        Fut: Future<Output = PipelineResult<Value>> + Send + 'a,
    {
        Self {
            inner: NextInner::Handler(Box::new(
                move || -> BoxFuture<'a, PipelineResult<Value>> { Box::pin(f()) },
            )),
        }
    }

    /// Wraps `terminal` in `interceptors`, the first becoming the outermost.
    #[must_use]
    pub fn chain<I>(interceptors: I, terminal: Next<'a>) -> Self
    where
        I: IntoIterator<Item = &'a dyn Interceptor>,
        I::IntoIter: DoubleEndedIterator,
    {
        interceptors
            .into_iter()
            .rev()
            .fold(terminal, |next, interceptor| Self::new(interceptor, next))
    }

    /// Runs the next interceptor, or the handler at the end of the chain.
    pub async fn run(self, ctx: &'a ExecutionContext) -> PipelineResult<Value> {
        match self.inner {
            NextInner::Chain { interceptor, next } => interceptor.intercept(ctx, *next).await,
            NextInner::Handler(handler) => handler().await,
        }
    }
}
