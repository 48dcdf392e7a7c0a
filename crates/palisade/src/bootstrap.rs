//! Startup wiring from configuration.

use palisade_config::{ConfigError, ConfigLoader, PalisadeConfig};
use palisade_pipeline::{MetadataRegistry, PipelineExecutor, PipelineExecutorBuilder};
use palisade_telemetry::{init_logging, init_metrics, TelemetryError};
use std::path::Path;
use std::sync::Arc;
use thiserror::Error;

/// Errors raised while starting a Palisade service.
#[derive(Debug, Error)]
pub enum BootstrapError {
    /// The configuration could not be loaded or is invalid.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Logging or metrics could not be installed.
    #[error(transparent)]
    Telemetry(#[from] TelemetryError),
}

/// Loads `palisade.toml` if present, applies `PALISADE__*` environment
/// overrides (reading `.env` first) and validates the result.
pub fn load_config() -> Result<PalisadeConfig, BootstrapError> {
    load_config_from("palisade.toml")
}

/// Like [`load_config`], reading the optional file at `path` instead.
pub fn load_config_from(path: impl AsRef<Path>) -> Result<PalisadeConfig, BootstrapError> {
    let config = ConfigLoader::new()
        .with_dotenv()
        .with_optional_file(path)?
        .with_env_prefix("PALISADE")
        .load()?;
    Ok(config)
}

/// Installs the logging subscriber and the metrics recorder described by
/// `config.telemetry`.
///
/// Metrics, when enabled, must be initialized from within a Tokio runtime.
pub fn init_telemetry(config: &PalisadeConfig) -> Result<(), BootstrapError> {
    init_logging(&config.telemetry.logging.to_log_config())?;
    init_metrics(&config.telemetry.metrics.to_metrics_config())?;

    tracing::info!(
        service = %config.service_name,
        default_timeout_ms = config.pipeline.default_timeout_ms,
        metrics = config.telemetry.metrics.enabled,
        "telemetry initialized"
    );
    Ok(())
}

/// Starts an executor builder with the `[pipeline]` section applied.
#[must_use]
pub fn executor_builder(
    registry: impl Into<Arc<MetadataRegistry>>,
    config: &PalisadeConfig,
) -> PipelineExecutorBuilder {
    PipelineExecutor::builder(registry).config(&config.pipeline)
}
