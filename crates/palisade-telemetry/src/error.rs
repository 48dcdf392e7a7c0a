//! Telemetry bootstrap errors.

use thiserror::Error;

/// Why logging or metrics could not be installed.
#[derive(Debug, Error)]
pub enum TelemetryError {
    /// The Prometheus recorder or its listener could not be installed.
    #[error("metrics recorder not installed: {0}")]
    MetricsInit(String),

    /// The filter directive is invalid or a subscriber is already set.
    #[error("log subscriber not installed: {0}")]
    LoggingInit(String),

    /// The metrics listen address does not parse as `host:port`.
    #[error("bad metrics listen address {0}")]
    InvalidAddress(String),
}
