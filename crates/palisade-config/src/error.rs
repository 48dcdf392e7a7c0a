//! Configuration errors.

use std::path::PathBuf;
use thiserror::Error;

/// Why a configuration could not be produced.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// A required file does not exist.
    #[error("config file {} does not exist", .path.display())]
    Missing {
        /// The path that was looked up.
        path: PathBuf,
    },

    /// A file exists but could not be read.
    #[error("cannot read config file {}", .path.display())]
    Read {
        /// The file.
        path: PathBuf,
        /// I/O failure.
        #[source]
        source: std::io::Error,
    },

    /// A TOML layer is malformed or has unknown keys.
    #[error("bad TOML config: {0}")]
    Toml(#[from] toml::de::Error),

    /// A JSON layer is malformed or has unknown keys.
    #[error("bad JSON config: {0}")]
    Json(#[from] serde_json::Error),

    /// The merged configuration failed validation.
    #[error("{field}: {reason}")]
    InvalidValue {
        /// Dotted path of the offending key, e.g. `pipeline.default_timeout_ms`.
        field: String,
        /// What is wrong with it.
        reason: String,
    },

    /// An override variable has a value of the wrong type.
    #[error("environment override {var}: {reason}")]
    Env {
        /// Variable name.
        var: String,
        /// What was expected.
        reason: String,
    },

    /// `with_string` was given a format other than `toml` or `json`.
    #[error("unsupported config format '{0}'")]
    UnsupportedFormat(String),
}

impl ConfigError {
    /// A [`Missing`](Self::Missing) error.
    pub fn file_not_found(path: impl Into<PathBuf>) -> Self {
        Self::Missing { path: path.into() }
    }

    /// A [`Read`](Self::Read) error.
    pub fn read_error(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Read {
            path: path.into(),
            source,
        }
    }

    /// An [`InvalidValue`](Self::InvalidValue) error.
    pub fn invalid_value(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidValue {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// An [`Env`](Self::Env) error.
    pub fn env_parse_error(var: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Env {
            var: var.into(),
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_name_the_culprit() {
        let err = ConfigError::file_not_found("/etc/palisade.toml");
        assert_eq!(err.to_string(), "config file /etc/palisade.toml does not exist");

        let err = ConfigError::invalid_value("pipeline.default_timeout_ms", "must be positive");
        assert_eq!(err.to_string(), "pipeline.default_timeout_ms: must be positive");

        let err = ConfigError::env_parse_error("PALISADE__PIPELINE__X", "expected integer");
        assert_eq!(
            err.to_string(),
            "environment override PALISADE__PIPELINE__X: expected integer"
        );
    }

    #[test]
    fn test_read_error_keeps_source() {
        use std::error::Error as _;

        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err = ConfigError::read_error("palisade.toml", io);
        assert!(err.source().is_some());
    }
}
