//! Observability for the Palisade request pipeline.
//!
//! - **Logging**: structured `tracing` output, JSON or pretty, filtered by level
//! - **Metrics**: Prometheus-format metrics recorded through the `metrics` facade
//!
//! # Standard Metrics
//!
//! | Metric | Type | Labels | Description |
//! |--------|------|--------|-------------|
//! | `palisade_requests_total` | Counter | `handler`, `status` | Completed pipeline executions |
//! | `palisade_request_duration_seconds` | Histogram | `handler` | Execution latency |
//! | `palisade_in_flight_requests` | Gauge | - | Executions currently running |
//! | `palisade_guard_rejections_total` | Counter | `handler`, `kind` | Requests stopped at the guard stage |
//! | `palisade_pipe_failures_total` | Counter | `handler`, `param` | Parameters rejected by a pipe |
//! | `palisade_cache_lookups_total` | Counter | `result` | Cache interceptor hits and misses |
//! | `palisade_timeouts_total` | Counter | `handler` | Handlers abandoned by the timeout interceptor |
//!
//! Recording is a no-op until [`init_metrics`] installs a recorder.
//!
//! # Example
//!
//! ```rust,ignore
//! use palisade_telemetry::{init_logging, LogConfig};
//!
//! init_logging(&LogConfig::development())?;
//! tracing::info!(handler_id = "cats.findOne", "Handler registered");
//! ```

#![warn(missing_docs)]

pub mod error;
pub mod logging;
pub mod metrics;

pub use error::TelemetryError;
pub use logging::{init_logging, LogConfig, LogOutput};
pub use metrics::{init_metrics, MetricsConfig};

/// Result type for telemetry operations.
pub type TelemetryResult<T> = Result<T, TelemetryError>;
