//! Top-level configuration.

use serde::{Deserialize, Serialize};

use crate::{ConfigError, PipelineConfig, TelemetryConfigSection};

/// Complete Palisade configuration.
///
/// Use [`ConfigLoader`](crate::ConfigLoader) to load it from files and
/// environment variables.
///
/// # Example
///
/// ```
/// use palisade_config::PalisadeConfig;
///
/// let config = PalisadeConfig::default();
/// assert_eq!(config.pipeline.default_timeout_ms, 5000);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct PalisadeConfig {
    /// Service name used in log output.
    #[serde(default = "default_service_name")]
    pub service_name: String,

    /// Pipeline executor settings.
    #[serde(default)]
    pub pipeline: PipelineConfig,

    /// Logging and metrics settings.
    #[serde(default)]
    pub telemetry: TelemetryConfigSection,
}

impl Default for PalisadeConfig {
    fn default() -> Self {
        Self {
            service_name: default_service_name(),
            pipeline: PipelineConfig::default(),
            telemetry: TelemetryConfigSection::default(),
        }
    }
}

impl PalisadeConfig {
    /// Development preset: pretty debug logs and internal error details.
    #[must_use]
    pub fn development() -> Self {
        let mut config = Self::default();
        config.pipeline.expose_internal_errors = true;
        config.telemetry.logging.level = "debug".to_string();
        config.telemetry.logging.format = crate::LogFormat::Pretty;
        config
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` if:
    /// - `pipeline.default_timeout_ms` is zero
    /// - `pipeline.internal_error_message` is empty
    /// - metrics are enabled with an unparseable address
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.pipeline.default_timeout_ms == 0 {
            return Err(ConfigError::invalid_value(
                "pipeline.default_timeout_ms",
                "must be greater than zero",
            ));
        }

        if self.pipeline.internal_error_message.trim().is_empty() {
            return Err(ConfigError::invalid_value(
                "pipeline.internal_error_message",
                "must not be empty",
            ));
        }

        if self.telemetry.metrics.enabled
            && self
                .telemetry
                .metrics
                .addr
                .parse::<std::net::SocketAddr>()
                .is_err()
        {
            return Err(ConfigError::invalid_value(
                "telemetry.metrics.addr",
                format!("invalid socket address: {}", self.telemetry.metrics.addr),
            ));
        }

        Ok(())
    }
}

fn default_service_name() -> String {
    "palisade".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        assert!(PalisadeConfig::default().validate().is_ok());
    }

    #[test]
    fn test_development_preset() {
        let config = PalisadeConfig::development();
        assert!(config.pipeline.expose_internal_errors);
        assert_eq!(config.telemetry.logging.level, "debug");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let mut config = PalisadeConfig::default();
        config.pipeline.default_timeout_ms = 0;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("default_timeout_ms"));
    }

    #[test]
    fn test_empty_internal_message_rejected() {
        let mut config = PalisadeConfig::default();
        config.pipeline.internal_error_message = "  ".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_bad_metrics_addr_rejected_only_when_enabled() {
        let mut config = PalisadeConfig::default();
        config.telemetry.metrics.addr = "nope".to_string();
        assert!(config.validate().is_ok());

        config.telemetry.metrics.enabled = true;
        assert!(config.validate().is_err());
    }
}
