//! Prometheus metrics for Palisade.
//!
//! Recording functions go through the `metrics` facade, so they are cheap
//! no-ops until [`init_metrics`] installs the Prometheus recorder.
//!
//! # Example
//!
//! ```rust,ignore
//! use palisade_telemetry::metrics::record_request;
//! use std::time::Duration;
//!
//! record_request("cats.findOne", 200, Duration::from_millis(4));
//! ```

use crate::error::TelemetryError;
use crate::TelemetryResult;
use metrics::{counter, describe_counter, describe_gauge, describe_histogram, gauge, histogram};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use std::net::SocketAddr;
use std::sync::OnceLock;
use std::time::Duration;

/// Global metrics handle for rendering.
static METRICS_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

/// Metrics configuration.
#[derive(Debug, Clone)]
pub struct MetricsConfig {
    /// Whether metrics are enabled.
    pub enabled: bool,

    /// Address the Prometheus scrape endpoint listens on.
    pub addr: String,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            addr: "0.0.0.0:9090".to_string(),
        }
    }
}

/// Installs the Prometheus recorder and scrape endpoint.
///
/// Must be called from within a Tokio runtime when enabled.
///
/// # Errors
///
/// Returns `TelemetryError::InvalidAddress` if the address does not parse and
/// `TelemetryError::MetricsInit` if the recorder cannot be installed.
pub fn init_metrics(config: &MetricsConfig) -> TelemetryResult<()> {
    if !config.enabled {
        return Ok(());
    }

    let addr: SocketAddr = config
        .addr
        .parse()
        .map_err(|e| TelemetryError::InvalidAddress(format!("{}: {e}", config.addr)))?;

    let handle = PrometheusBuilder::new()
        .with_http_listener(addr)
        .install_recorder()
        .map_err(|e| TelemetryError::MetricsInit(e.to_string()))?;

    let _ = METRICS_HANDLE.set(handle);

    register_metric_descriptions();

    Ok(())
}

/// Renders metrics in Prometheus text format.
///
/// Returns `None` if metrics are not initialized.
#[must_use]
pub fn render_metrics() -> Option<String> {
    METRICS_HANDLE.get().map(PrometheusHandle::render)
}

fn register_metric_descriptions() {
    describe_counter!(
        "palisade_requests_total",
        "Total number of pipeline executions"
    );
    describe_histogram!(
        "palisade_request_duration_seconds",
        "Pipeline execution duration in seconds"
    );
    describe_gauge!(
        "palisade_in_flight_requests",
        "Number of pipeline executions currently running"
    );
    describe_counter!(
        "palisade_guard_rejections_total",
        "Requests rejected at the guard stage"
    );
    describe_counter!(
        "palisade_pipe_failures_total",
        "Parameters rejected by a pipe"
    );
    describe_counter!(
        "palisade_cache_lookups_total",
        "Cache interceptor lookups by result"
    );
    describe_counter!(
        "palisade_timeouts_total",
        "Handlers abandoned by the timeout interceptor"
    );
}

/// Whole milliseconds in `duration` for log fields, saturating at `u64::MAX`.
#[must_use]
pub fn duration_ms(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

/// Records a completed pipeline execution.
pub fn record_request(handler: &str, status_code: u16, duration: Duration) {
    counter!(
        "palisade_requests_total",
        "handler" => handler.to_string(),
        "status" => status_code.to_string()
    )
    .increment(1);

    histogram!(
        "palisade_request_duration_seconds",
        "handler" => handler.to_string()
    )
    .record(duration.as_secs_f64());
}

/// Records a guard-stage rejection. `kind` is `authentication` or `authorization`.
pub fn record_guard_rejection(handler: &str, kind: &'static str) {
    counter!(
        "palisade_guard_rejections_total",
        "handler" => handler.to_string(),
        "kind" => kind
    )
    .increment(1);
}

/// Records a parameter rejected by a pipe.
pub fn record_pipe_failure(handler: &str, param: &str) {
    counter!(
        "palisade_pipe_failures_total",
        "handler" => handler.to_string(),
        "param" => param.to_string()
    )
    .increment(1);
}

/// Records a cache interceptor lookup.
pub fn record_cache_lookup(hit: bool) {
    let result = if hit { "hit" } else { "miss" };
    counter!("palisade_cache_lookups_total", "result" => result).increment(1);
}

/// Records a handler abandoned on timeout.
pub fn record_timeout(handler: &str) {
    counter!("palisade_timeouts_total", "handler" => handler.to_string()).increment(1);
}

/// Guard that tracks one in-flight execution and decrements on drop.
pub struct InFlightGuard {
    _private: (),
}

impl InFlightGuard {
    /// Creates a new guard and increments the in-flight gauge.
    #[must_use]
    pub fn new() -> Self {
        gauge!("palisade_in_flight_requests").increment(1.0);
        Self { _private: () }
    }
}

impl Default for InFlightGuard {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        gauge!("palisade_in_flight_requests").decrement(1.0);
    }
}
