//! Error types shared across the archive loader.

use thiserror::Error;

/// Configuration loading and validation errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Layered configuration could not be built or deserialized
    #[error("Configuration error: {0}")]
    Config(String),

    /// A configuration value is out of range
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

impl From<config::ConfigError> for ConfigError {
    fn from(err: config::ConfigError) -> Self {
        ConfigError::Config(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ConfigError::Invalid("batch_size must be > 0".to_string());
        assert_eq!(
            err.to_string(),
            "Invalid configuration: batch_size must be > 0"
        );
    }

    #[test]
    fn test_from_config_error() {
        let err: ConfigError = config::ConfigError::NotFound("engine_url".to_string()).into();
        assert!(matches!(err, ConfigError::Config(_)));
    }
}
