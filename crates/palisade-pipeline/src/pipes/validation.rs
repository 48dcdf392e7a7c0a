//! Presence and shape validation.

use std::future::ready;

use palisade_core::{PipelineError, PipelineResult, Value};

use crate::descriptor::{ArgumentMetadata, ParamSource};
use crate::interceptor::BoxFuture;
use crate::pipe::Pipe;

/// Rejects missing values and values of the wrong shape for their source.
///
/// - `null`, `false`, `0` and `""` are rejected as missing.
/// - Body values must be objects or arrays.
/// - Route and query values must be strings.
///
/// The value itself passes through unchanged.
#[derive(Debug, Clone, Copy, Default)]
pub struct ValidationPipe;

impl ValidationPipe {
    fn is_missing(value: &Value) -> bool {
        match value {
            Value::Null => true,
            Value::Bool(b) => !b,
            Value::Number(n) => n.as_f64() == Some(0.0),
            Value::String(s) => s.is_empty(),
            Value::Array(_) | Value::Object(_) => false,
        }
    }

    fn validate(value: &Value, metadata: &ArgumentMetadata) -> PipelineResult<()> {
        if Self::is_missing(value) {
            return Err(PipelineError::validation(
                "Validation failed: no value provided",
            ));
        }

        match &metadata.source {
            ParamSource::Body if !(value.is_object() || value.is_array()) => Err(
                PipelineError::validation("Validation failed: body must be an object"),
            ),
            ParamSource::Param(_) if !value.is_string() => Err(PipelineError::validation(
                "Validation failed: param must be a string",
            )),
            ParamSource::Query(_) if !value.is_string() => Err(PipelineError::validation(
                "Validation failed: query must be a string",
            )),
            _ => Ok(()),
        }
    }
}

impl Pipe for ValidationPipe {
    fn name(&self) -> &'static str {
        "validation"
    }

    fn transform<'a>(
        &'a self,
        value: Value,
        metadata: &'a ArgumentMetadata,
    ) -> BoxFuture<'a, PipelineResult<Value>> {
        let result = Self::validate(&value, metadata).map(|()| value);
        Box::pin(ready(result))
    }
}
