//! Default value substitution.

use std::future::ready;

use palisade_core::{PipelineResult, Value};

use crate::descriptor::ArgumentMetadata;
use crate::interceptor::BoxFuture;
use crate::pipe::Pipe;

/// Replaces an absent value with a default.
///
/// Only absence (`Value::Null`) triggers substitution. A present but empty
/// string passes through unchanged.
///
/// ```
/// use palisade_pipeline::pipes::DefaultValuePipe;
///
/// let page = DefaultValuePipe::new(1);
/// assert_eq!(page.default_value(), &serde_json::json!(1));
/// ```
#[derive(Debug, Clone)]
pub struct DefaultValuePipe {
    default: Value,
}

impl DefaultValuePipe {
    /// Creates a pipe substituting `default`.
    pub fn new(default: impl Into<Value>) -> Self {
        Self {
            default: default.into(),
        }
    }

    /// Returns the substituted value.
    #[must_use]
    pub const fn default_value(&self) -> &Value {
        &self.default
    }
}

impl Pipe for DefaultValuePipe {
    fn name(&self) -> &'static str {
        "default_value"
    }

    fn transform<'a>(
        &'a self,
        value: Value,
        _metadata: &'a ArgumentMetadata,
    ) -> BoxFuture<'a, PipelineResult<Value>> {
        let value = if value.is_null() {
            self.default.clone()
        } else {
            value
        };
        Box::pin(ready(Ok(value)))
    }
}
