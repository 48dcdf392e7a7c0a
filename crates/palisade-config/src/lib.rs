//! Typed configuration for Palisade.
//!
//! - TOML and JSON configuration files
//! - Environment variable overrides
//! - Strict validation (fails on unknown fields)
//! - Layered configuration (defaults → file → env)
//!
//! # Example
//!
//! ```no_run
//! use palisade_config::ConfigLoader;
//!
//! # fn main() -> Result<(), palisade_config::ConfigError> {
//! let config = ConfigLoader::new()
//!     .with_optional_file("palisade.toml")?
//!     .with_env_prefix("PALISADE")
//!     .load()?;
//!
//! println!("default timeout: {} ms", config.pipeline.default_timeout_ms);
//! # Ok(())
//! # }
//! ```
//!
//! # Configuration File Format
//!
//! ```toml
//! service_name = "cats"
//!
//! [pipeline]
//! default_timeout_ms = 5000
//! expose_internal_errors = false
//! internal_error_message = "Internal server error"
//!
//! [telemetry.logging]
//! enabled = true
//! level = "info"
//! format = "json"
//!
//! [telemetry.metrics]
//! enabled = false
//! addr = "0.0.0.0:9090"
//! ```
//!
//! # Environment Variable Overrides
//!
//! Values are overridden with `PREFIX__SECTION__KEY`, for example
//! `PALISADE__PIPELINE__DEFAULT_TIMEOUT_MS=2000` or
//! `PALISADE__TELEMETRY__LOGGING__LEVEL=debug`.

#![warn(missing_docs)]

mod config;
mod error;
mod loader;
mod schema;

pub use config::PalisadeConfig;
pub use error::ConfigError;
pub use loader::ConfigLoader;
pub use schema::{
    LogFormat, LoggingConfig, MetricsConfigSection, PipelineConfig, TelemetryConfigSection,
};
