//! Sequence splitting.

use std::sync::Arc;

use palisade_core::{PipelineError, PipelineResult, Value};

use crate::descriptor::ArgumentMetadata;
use crate::interceptor::BoxFuture;
use crate::pipe::Pipe;

const ARRAY_EXPECTED: &str = "Validation failed (parsable array expected)";

/// Splits a delimited string into an array of strings.
///
/// Arrays (for example a repeated query key) pass through. With
/// [`items`](Self::items), every element is then run through another pipe.
///
/// ```
/// use palisade_pipeline::pipes::{ParseArrayPipe, ParseIntPipe};
///
/// let ids = ParseArrayPipe::new().items(ParseIntPipe);
/// let tags = ParseArrayPipe::new().separator(';');
/// ```
#[derive(Clone)]
pub struct ParseArrayPipe {
    separator: char,
    items: Option<Arc<dyn Pipe>>,
}

impl Default for ParseArrayPipe {
    fn default() -> Self {
        Self::new()
    }
}

impl ParseArrayPipe {
    /// Splits on commas.
    #[must_use]
    pub fn new() -> Self {
        Self {
            separator: ',',
            items: None,
        }
    }

    /// Splits on `separator` instead.
    #[must_use]
    pub fn separator(mut self, separator: char) -> Self {
        self.separator = separator;
        self
    }

    /// Pipes every element through `pipe`.
    #[must_use]
    pub fn items<P: Pipe>(mut self, pipe: P) -> Self {
        self.items = Some(Arc::new(pipe));
        self
    }

    fn split(&self, value: Value) -> PipelineResult<Vec<Value>> {
        match value {
            Value::Array(items) => Ok(items),
            Value::String(s) if s.is_empty() => Ok(Vec::new()),
            Value::String(s) => Ok(s
                .split(self.separator)
                .map(|item| Value::String(item.to_string()))
                .collect()),
            _ => Err(PipelineError::validation(ARRAY_EXPECTED)),
        }
    }
}

impl Pipe for ParseArrayPipe {
    fn name(&self) -> &'static str {
        "parse_array"
    }

    fn transform<'a>(
        &'a self,
        value: Value,
        metadata: &'a ArgumentMetadata,
    ) -> BoxFuture<'a, PipelineResult<Value>> {
        Box::pin(async move {
            let items = self.split(value)?;

            let Some(pipe) = &self.items else {
                return Ok(Value::Array(items));
            };

            let mut out = Vec::with_capacity(items.len());
            for item in items {
                out.push(pipe.transform(item, metadata).await?);
            }
            Ok(Value::Array(out))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::ParamSource;
    use crate::pipes::ParseIntPipe;
    use palisade_core::ErrorCategory;
    use serde_json::json;

    fn meta() -> ArgumentMetadata {
        ArgumentMetadata {
            index: 0,
            source: ParamSource::Query("ids".into()),
        }
    }

    #[tokio::test]
    async fn test_splits_on_commas() {
        let meta = meta();
        let out = ParseArrayPipe::new().transform(json!("1,2,3"), &meta).await.unwrap();
        assert_eq!(out, json!(["1", "2", "3"]));
    }

    #[tokio::test]
    async fn test_custom_separator_and_items() {
        let meta = meta();
        let out = ParseArrayPipe::new()
            .separator('|')
            .items(ParseIntPipe)
            .transform(json!("4|5"), &meta)
            .await
            .unwrap();
        assert_eq!(out, json!([4, 5]));
    }

    #[tokio::test]
    async fn test_array_passes_through() {
        let meta = meta();
        let out = ParseArrayPipe::new().transform(json!(["a", "b"]), &meta).await.unwrap();
        assert_eq!(out, json!(["a", "b"]));
    }

    #[tokio::test]
    async fn test_item_failure_propagates() {
        let meta = meta();
        let err = ParseArrayPipe::new()
            .items(ParseIntPipe)
            .transform(json!("1,x"), &meta)
            .await
            .unwrap_err();
        assert_eq!(err.category(), ErrorCategory::Validation);
    }

    #[tokio::test]
    async fn test_absent_value_rejected() {
        let meta = meta();
        let err = ParseArrayPipe::new().transform(Value::Null, &meta).await.unwrap_err();
        assert!(err.to_string().contains("parsable array expected"));
    }
}
