//! Pipes and parameter binding.
//!
//! Each handler parameter is extracted from the request by its
//! [`ParamSource`] and then passed left to right through the global pipes
//! followed by its own pipes. The first failing pipe aborts binding; the
//! remaining pipes and parameters are skipped.
//!
//! An absent value (missing route parameter, query key, principal or field)
//! is represented as `Value::Null`.

use std::future::ready;
use std::sync::Arc;

use palisade_core::{PipelineError, PipelineResult, RequestContext, Value};
use serde::de::DeserializeOwned;

use crate::context::ExecutionContext;
use crate::descriptor::{ArgumentMetadata, ParamSource};
use crate::interceptor::BoxFuture;

/// Transforms or validates one parameter value.
///
/// Validation failures are reported as `PipelineError::Validation`.
pub trait Pipe: Send + Sync + 'static {
    /// Name used in logs.
    fn name(&self) -> &'static str;

    /// Transforms `value`.
    fn transform<'a>(
        &'a self,
        value: Value,
        metadata: &'a ArgumentMetadata,
    ) -> BoxFuture<'a, PipelineResult<Value>>;
}

/// A pipe built from a synchronous closure.
///
/// ```
/// use palisade_pipeline::pipe::FnPipe;
/// use serde_json::Value;
///
/// let upper = FnPipe::new("upper", |value, _meta| {
///     Ok(match value {
///         Value::String(s) => Value::String(s.to_uppercase()),
///         other => other,
///     })
/// });
/// ```
pub struct FnPipe<F> {
    name: &'static str,
    func: F,
}

impl<F> FnPipe<F>
where
    F: Fn(Value, &ArgumentMetadata) -> PipelineResult<Value> + Send + Sync + 'static,
{
    /// Creates a pipe named `name`.
    pub const fn new(name: &'static str, func: F) -> Self {
        Self { name, func }
    }
}

impl<F> Pipe for FnPipe<F>
where
    F: Fn(Value, &ArgumentMetadata) -> PipelineResult<Value> + Send + Sync + 'static,
{
    fn name(&self) -> &'static str {
        self.name
    }

    fn transform<'a>(
        &'a self,
        value: Value,
        metadata: &'a ArgumentMetadata,
    ) -> BoxFuture<'a, PipelineResult<Value>> {
        Box::pin(ready((self.func)(value, metadata)))
    }
}

/// Parameter values after piping, in handler-signature order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BoundParameters(Vec<Value>);

impl BoundParameters {
    /// Wraps already-bound values.
    #[must_use]
    pub const fn new(values: Vec<Value>) -> Self {
        Self(values)
    }

    /// Number of parameters.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` if the handler takes no parameters.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns the parameter at `index`.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&Value> {
        self.0.get(index)
    }

    /// Deserializes the parameter at `index`.
    ///
    /// # Errors
    ///
    /// Returns `PipelineError::Validation` if there is no such parameter or
    /// it does not deserialize into `T`.
    pub fn parse<T: DeserializeOwned>(&self, index: usize) -> PipelineResult<T> {
        let value = self.0.get(index).cloned().ok_or_else(|| {
            PipelineError::validation(format!("Validation failed: missing parameter {index}"))
        })?;
        serde_json::from_value(value)
            .map_err(|e| PipelineError::validation(format!("Validation failed: {e}")))
    }

    /// Returns the values.
    #[must_use]
    pub fn into_inner(self) -> Vec<Value> {
        self.0
    }

    /// Iterates the values.
    pub fn iter(&self) -> std::slice::Iter<'_, Value> {
        self.0.iter()
    }
}

impl IntoIterator for BoundParameters {
    type Item = Value;
    type IntoIter = std::vec::IntoIter<Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

/// Reads the raw value for `source` from the request.
#[must_use]
pub fn extract(request: &RequestContext, source: &ParamSource) -> Value {
    match source {
        ParamSource::Body => request.body().clone(),
        ParamSource::Param(name) => request
            .route_param(name)
            .map_or(Value::Null, |v| Value::String(v.to_string())),
        ParamSource::Query(name) => match request.query_values(name) {
            None | Some([]) => Value::Null,
            Some([single]) => Value::String(single.clone()),
            Some(many) => Value::Array(many.iter().cloned().map(Value::String).collect()),
        },
        ParamSource::Principal { field: None } => {
            request.principal().map_or(Value::Null, |p| p.to_value())
        }
        ParamSource::Principal { field: Some(field) } => request
            .principal()
            .and_then(|p| p.field(field))
            .unwrap_or(Value::Null),
    }
}

/// Extracts and pipes every handler parameter.
#[derive(Default, Clone)]
pub struct PipeChain {
    global: Vec<Arc<dyn Pipe>>,
}

impl PipeChain {
    /// Creates a chain with no global pipes.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a chain that runs `global` before every parameter's own pipes.
    #[must_use]
    pub fn with_global(global: Vec<Arc<dyn Pipe>>) -> Self {
        Self { global }
    }

    /// Binds every parameter declared by the handler.
    ///
    /// # Errors
    ///
    /// Returns the first pipe error encountered.
    pub async fn bind(&self, ctx: &ExecutionContext) -> PipelineResult<BoundParameters> {
        let params = ctx.descriptor().params();
        let mut values = Vec::with_capacity(params.len());

        for (index, spec) in params.iter().enumerate() {
            let metadata = ArgumentMetadata {
                index,
                source: spec.source().clone(),
            };
            let raw = extract(ctx.request(), spec.source());

            let piped = match apply(&self.global, raw, &metadata).await {
                Ok(value) => apply(spec.pipes(), value, &metadata).await,
                Err(error) => Err(error),
            };
            let value = piped.map_err(|error| {
                tracing::debug!(
                    handler_id = ctx.handler_id(),
                    param = %metadata.source,
                    error = %error,
                    "parameter rejected"
                );
                palisade_telemetry::metrics::record_pipe_failure(
                    ctx.handler_id(),
                    &metadata.source.to_string(),
                );
                error
            })?;

            values.push(value);
        }

        Ok(BoundParameters(values))
    }
}

/// Runs `value` through `pipes` left to right, stopping at the first error.
pub async fn apply(
    pipes: &[Arc<dyn Pipe>],
    mut value: Value,
    metadata: &ArgumentMetadata,
) -> PipelineResult<Value> {
    for pipe in pipes {
        value = pipe.transform(value, metadata).await?;
    }
    Ok(value)
}
