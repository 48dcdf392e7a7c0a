//! In-memory response cache.
//!
//! One cache per interceptor instance, keyed by `"{METHOD} {path}"`. Entries
//! live until [`invalidate`](CacheInterceptor::invalidate) or
//! [`clear`](CacheInterceptor::clear) removes them; there is no expiry or size
//! bound. Intended for idempotent reads only.

use dashmap::DashMap;
use palisade_core::{PipelineResult, RequestContext, Value};
use palisade_telemetry::metrics::record_cache_lookup;

use crate::context::ExecutionContext;
use crate::interceptor::{BoxFuture, Interceptor, Next};

/// Serves repeated requests for the same method and path from memory.
///
/// A hit skips the rest of the chain, handler included. On a miss the
/// successful response is stored; errors are never cached. When concurrent
/// misses race on one key, the first stored value is kept.
///
/// Share one instance across handlers, or keep an `Arc` to it to invalidate
/// entries:
///
/// ```
/// use std::sync::Arc;
/// use palisade_pipeline::descriptor::HandlerDescriptor;
/// use palisade_pipeline::interceptors::CacheInterceptor;
///
/// let cache = Arc::new(CacheInterceptor::new());
/// let descriptor = HandlerDescriptor::new("cats.findAll")
///     .with_shared_interceptor(cache.clone());
///
/// cache.invalidate("GET /cats");
/// assert!(cache.is_empty());
/// ```
#[derive(Debug, Default)]
pub struct CacheInterceptor {
    entries: DashMap<String, Value>,
}

impl CacheInterceptor {
    /// Creates an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Cache key for a request.
    #[must_use]
    pub fn key_for(request: &RequestContext) -> String {
        format!("{} {}", request.method(), request.path())
    }

    /// Returns a clone of the cached value for `key`.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<Value> {
        self.entries.get(key).map(|entry| entry.value().clone())
    }

    /// Removes one entry. Returns `true` if it existed.
    pub fn invalidate(&self, key: &str) -> bool {
        self.entries.remove(key).is_some()
    }

    /// Removes every entry.
    pub fn clear(&self) {
        self.entries.clear();
    }

    /// Number of cached entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if nothing is cached.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Interceptor for CacheInterceptor {
    fn name(&self) -> &'static str {
        "cache"
    }

    fn intercept<'a>(
        &'a self,
        ctx: &'a ExecutionContext,
        next: Next<'a>,
    ) -> BoxFuture<'a, PipelineResult<Value>> {
        Box::pin(async move {
            let key = Self::key_for(ctx.request());

            if let Some(cached) = self.get(&key) {
                tracing::debug!(handler_id = ctx.handler_id(), key = %key, "Cache hit");
                record_cache_lookup(true);
                return Ok(cached);
            }

            tracing::debug!(handler_id = ctx.handler_id(), key = %key, "Cache miss");
            record_cache_lookup(false);

            let response = next.run(ctx).await?;
            self.entries.entry(key).or_insert_with(|| response.clone());
            Ok(response)
        })
    }
}
