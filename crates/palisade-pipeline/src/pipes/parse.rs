//! Scalar coercion pipes.

use std::future::ready;

use palisade_core::{PipelineError, PipelineResult, Value};
use uuid::Uuid;

use crate::descriptor::ArgumentMetadata;
use crate::interceptor::BoxFuture;
use crate::pipe::Pipe;

const NUMERIC_EXPECTED: &str = "Validation failed (numeric string is expected)";
const BOOLEAN_EXPECTED: &str = "Validation failed (boolean string is expected)";
const UUID_EXPECTED: &str = "Validation failed (uuid is expected)";

/// Parses a base-10 integer. Accepts an optional leading `-` and digits only.
#[derive(Debug, Clone, Copy, Default)]
pub struct ParseIntPipe;

impl ParseIntPipe {
    fn parse(value: &Value) -> Option<i64> {
        match value {
            Value::Number(n) => n.as_i64(),
            Value::String(s) => {
                let digits = s.strip_prefix('-').unwrap_or(s);
                if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
                    return None;
                }
                s.parse().ok()
            }
            _ => None,
        }
    }
}

impl Pipe for ParseIntPipe {
    fn name(&self) -> &'static str {
        "parse_int"
    }

    fn transform<'a>(
        &'a self,
        value: Value,
        _metadata: &'a ArgumentMetadata,
    ) -> BoxFuture<'a, PipelineResult<Value>> {
        let result = Self::parse(&value)
            .map(Value::from)
            .ok_or_else(|| PipelineError::validation(NUMERIC_EXPECTED));
        Box::pin(ready(result))
    }
}

/// Parses a finite floating-point number.
#[derive(Debug, Clone, Copy, Default)]
pub struct ParseFloatPipe;

impl ParseFloatPipe {
    fn parse(value: &Value) -> Option<f64> {
        let parsed = match value {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.parse::<f64>().ok(),
            _ => None,
        };
        parsed.filter(|f| f.is_finite())
    }
}

impl Pipe for ParseFloatPipe {
    fn name(&self) -> &'static str {
        "parse_float"
    }

    fn transform<'a>(
        &'a self,
        value: Value,
        _metadata: &'a ArgumentMetadata,
    ) -> BoxFuture<'a, PipelineResult<Value>> {
        let result = Self::parse(&value)
            .and_then(serde_json::Number::from_f64)
            .map(Value::Number)
            .ok_or_else(|| PipelineError::validation(NUMERIC_EXPECTED));
        Box::pin(ready(result))
    }
}

/// Parses `"true"`/`"1"` and `"false"`/`"0"`. Booleans pass through.
#[derive(Debug, Clone, Copy, Default)]
pub struct ParseBoolPipe;

impl Pipe for ParseBoolPipe {
    fn name(&self) -> &'static str {
        "parse_bool"
    }

    fn transform<'a>(
        &'a self,
        value: Value,
        _metadata: &'a ArgumentMetadata,
    ) -> BoxFuture<'a, PipelineResult<Value>> {
        let parsed = match &value {
            Value::Bool(b) => Some(*b),
            Value::String(s) => match s.as_str() {
                "true" | "1" => Some(true),
                "false" | "0" => Some(false),
                _ => None,
            },
            _ => None,
        };
        let result = parsed
            .map(Value::Bool)
            .ok_or_else(|| PipelineError::validation(BOOLEAN_EXPECTED));
        Box::pin(ready(result))
    }
}

/// Checks that a string is a hyphenated UUID, optionally of one version.
///
/// The value passes through unchanged.
#[derive(Debug, Clone, Copy, Default)]
pub struct ParseUuidPipe {
    version: Option<usize>,
}

impl ParseUuidPipe {
    /// Accepts any UUID version.
    #[must_use]
    pub const fn new() -> Self {
        Self { version: None }
    }

    /// Accepts only UUIDs of `version` (for example `4` or `7`).
    #[must_use]
    pub const fn version(version: usize) -> Self {
        Self {
            version: Some(version),
        }
    }

    fn accepts(&self, s: &str) -> bool {
        if s.len() != 36 {
            return false;
        }
        match Uuid::try_parse(s) {
            Ok(uuid) => self.version.map_or(true, |v| uuid.get_version_num() == v),
            Err(_) => false,
        }
    }
}

impl Pipe for ParseUuidPipe {
    fn name(&self) -> &'static str {
        "parse_uuid"
    }

    fn transform<'a>(
        &'a self,
        value: Value,
        _metadata: &'a ArgumentMetadata,
    ) -> BoxFuture<'a, PipelineResult<Value>> {
        let ok = value.as_str().is_some_and(|s| self.accepts(s));
        let result = if ok {
            Ok(value)
        } else {
            Err(PipelineError::validation(UUID_EXPECTED))
        };
        Box::pin(ready(result))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::ParamSource;
    use palisade_core::ErrorCategory;
    use serde_json::json;

    fn meta() -> ArgumentMetadata {
        ArgumentMetadata {
            index: 0,
            source: ParamSource::Param("id".into()),
        }
    }

    async fn run<P: Pipe>(pipe: P, value: Value) -> PipelineResult<Value> {
        let meta = meta();
        pipe.transform(value, &meta).await
    }

    #[tokio::test]
    async fn test_parse_int() {
        assert_eq!(run(ParseIntPipe, json!("42")).await.unwrap(), json!(42));
        assert_eq!(run(ParseIntPipe, json!("-7")).await.unwrap(), json!(-7));
        assert_eq!(run(ParseIntPipe, json!(5)).await.unwrap(), json!(5));

        for bad in [json!("abc"), json!("4.2"), json!(""), json!("-"), json!("+1"), json!("12a"), Value::Null] {
            let err = run(ParseIntPipe, bad).await.unwrap_err();
            assert_eq!(err.category(), ErrorCategory::Validation);
            assert!(err.to_string().contains("numeric string is expected"));
        }
    }

    #[tokio::test]
    async fn test_parse_int_overflow() {
        assert!(run(ParseIntPipe, json!("99999999999999999999")).await.is_err());
    }

    #[tokio::test]
    async fn test_parse_float() {
        assert_eq!(run(ParseFloatPipe, json!("3.5")).await.unwrap(), json!(3.5));
        assert_eq!(run(ParseFloatPipe, json!("-2")).await.unwrap(), json!(-2.0));
        assert!(run(ParseFloatPipe, json!("NaN")).await.is_err());
        assert!(run(ParseFloatPipe, json!("inf")).await.is_err());
        assert!(run(ParseFloatPipe, json!("x1")).await.is_err());
    }

    #[tokio::test]
    async fn test_parse_bool() {
        assert_eq!(run(ParseBoolPipe, json!("true")).await.unwrap(), json!(true));
        assert_eq!(run(ParseBoolPipe, json!("1")).await.unwrap(), json!(true));
        assert_eq!(run(ParseBoolPipe, json!("false")).await.unwrap(), json!(false));
        assert_eq!(run(ParseBoolPipe, json!("0")).await.unwrap(), json!(false));
        assert_eq!(run(ParseBoolPipe, json!(true)).await.unwrap(), json!(true));

        let err = run(ParseBoolPipe, json!("yes")).await.unwrap_err();
        assert!(err.to_string().contains("boolean string is expected"));
    }

    #[tokio::test]
    async fn test_parse_uuid() {
        let id = "0192f1c4-5b7e-7cc3-9a4e-3f1d2b6a8e10";
        assert_eq!(run(ParseUuidPipe::new(), json!(id)).await.unwrap(), json!(id));
        assert!(run(ParseUuidPipe::version(7), json!(id)).await.is_ok());
        assert!(run(ParseUuidPipe::version(4), json!(id)).await.is_err());

        let err = run(ParseUuidPipe::new(), json!("not-a-uuid")).await.unwrap_err();
        assert!(err.to_string().contains("uuid is expected"));
        assert!(run(ParseUuidPipe::new(), json!("0192f1c45b7e7cc39a4e3f1d2b6a8e10")).await.is_err());
    }
}
