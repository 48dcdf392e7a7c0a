//! `tracing` subscriber setup.
//!
//! Pipeline stages log with structured fields (`request_id`, `handler_id`,
//! `http.method`, `http.path`, `principal`). The executor opens one
//! `pipeline` span per execution, so enabling span durations yields one
//! timing line per request.
//!
//! ```rust,ignore
//! use palisade_telemetry::logging::{init_logging, LogConfig, LogOutput};
//!
//! init_logging(&LogConfig::default().with_output(LogOutput::Pretty))?;
//! tracing::info!(handler_id = "cats.findAll", "serving");
//! ```

use crate::error::TelemetryError;
use crate::TelemetryResult;
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter, Layer, Registry};

/// How log lines are rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogOutput {
    /// One JSON object per event.
    #[default]
    Json,
    /// Multi-line, human-readable output.
    Pretty,
}

/// What [`init_logging`] installs.
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// When `false`, [`init_logging`] does nothing.
    pub enabled: bool,

    /// `EnvFilter` directive, e.g. `info` or `palisade_pipeline=debug,warn`.
    pub filter: String,

    /// Line format.
    pub output: LogOutput,

    /// Emit a line when each span closes, carrying its duration.
    pub span_durations: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            filter: "info".to_string(),
            output: LogOutput::Json,
            span_durations: false,
        }
    }
}

impl LogConfig {
    /// Pretty output at `debug` with span durations.
    #[must_use]
    pub fn development() -> Self {
        Self {
            enabled: true,
            filter: "debug".to_string(),
            output: LogOutput::Pretty,
            span_durations: true,
        }
    }

    /// Sets the line format.
    #[must_use]
    pub const fn with_output(mut self, output: LogOutput) -> Self {
        self.output = output;
        self
    }

    /// Sets the filter directive.
    #[must_use]
    pub fn with_filter(mut self, filter: impl Into<String>) -> Self {
        self.filter = filter.into();
        self
    }
}

/// Installs the global subscriber.
///
/// # Errors
///
/// Returns `TelemetryError::LoggingInit` if the filter directive is invalid
/// or a global subscriber is already installed.
pub fn init_logging(config: &LogConfig) -> TelemetryResult<()> {
    if !config.enabled {
        return Ok(());
    }

    let filter = parse_filter(&config.filter)?;
    let span_events = if config.span_durations {
        FmtSpan::CLOSE
    } else {
        FmtSpan::NONE
    };

    let layer: Box<dyn Layer<Registry> + Send + Sync> = match config.output {
        LogOutput::Json => fmt::layer().json().with_span_events(span_events).boxed(),
        LogOutput::Pretty => fmt::layer().pretty().with_span_events(span_events).boxed(),
    };

    tracing_subscriber::registry()
        .with(layer.with_filter(filter))
        .try_init()
        .map_err(|e| TelemetryError::LoggingInit(e.to_string()))
}

/// Parses an `EnvFilter` directive.
///
/// # Errors
///
/// Returns `TelemetryError::LoggingInit` naming the bad directive.
pub fn parse_filter(directive: &str) -> TelemetryResult<EnvFilter> {
    EnvFilter::try_new(directive)
        .map_err(|e| TelemetryError::LoggingInit(format!("bad filter '{directive}': {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_json_at_info() {
        let config = LogConfig::default();
        assert!(config.enabled);
        assert_eq!(config.output, LogOutput::Json);
        assert_eq!(config.filter, "info");
        assert!(!config.span_durations);
    }

    #[test]
    fn test_builders() {
        let config = LogConfig::default()
            .with_output(LogOutput::Pretty)
            .with_filter("palisade_pipeline=trace");
        assert_eq!(config.output, LogOutput::Pretty);
        assert_eq!(config.filter, "palisade_pipeline=trace");

        assert!(LogConfig::development().span_durations);
    }

    #[test]
    fn test_parse_filter() {
        assert!(parse_filter("warn").is_ok());
        assert!(parse_filter("palisade_pipeline=debug,warn").is_ok());

        let err = parse_filter("palisade=notalevel").unwrap_err();
        assert!(err.to_string().contains("palisade=notalevel"));
    }

    #[test]
    fn test_disabled_installs_nothing() {
        let config = LogConfig {
            enabled: false,
            filter: "not a directive ===".to_string(),
            ..LogConfig::default()
        };
        assert!(init_logging(&config).is_ok());
    }
}
