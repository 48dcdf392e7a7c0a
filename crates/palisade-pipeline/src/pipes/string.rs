//! String normalization pipes. Non-string values pass through unchanged.

use std::future::ready;

use palisade_core::{PipelineResult, Value};

use crate::descriptor::ArgumentMetadata;
use crate::interceptor::BoxFuture;
use crate::pipe::Pipe;

/// Lower-cases strings.
#[derive(Debug, Clone, Copy, Default)]
pub struct ToLowerCasePipe;

impl Pipe for ToLowerCasePipe {
    fn name(&self) -> &'static str {
        "to_lower_case"
    }

    fn transform<'a>(
        &'a self,
        value: Value,
        _metadata: &'a ArgumentMetadata,
    ) -> BoxFuture<'a, PipelineResult<Value>> {
        let value = match value {
            Value::String(s) => Value::String(s.to_lowercase()),
            other => other,
        };
        Box::pin(ready(Ok(value)))
    }
}

/// Strips leading and trailing whitespace from strings.
#[derive(Debug, Clone, Copy, Default)]
pub struct TrimPipe;

impl Pipe for TrimPipe {
    fn name(&self) -> &'static str {
        "trim"
    }

    fn transform<'a>(
        &'a self,
        value: Value,
        _metadata: &'a ArgumentMetadata,
    ) -> BoxFuture<'a, PipelineResult<Value>> {
        let value = match value {
            Value::String(s) => Value::String(s.trim().to_string()),
            other => other,
        };
        Box::pin(ready(Ok(value)))
    }
}
