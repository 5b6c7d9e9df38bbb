//! Configuration error types

use thiserror::Error;

/// Errors that can occur during configuration loading
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration loading failed: {0}")]
    LoadError(#[from] config::ConfigError),

    #[error("Validation failed: {0}")]
    ValidationFailed(#[from] ValidationError),
}

/// Errors that can occur during configuration validation
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Invalid timeout for {0}: must be greater than zero")]
    InvalidTimeout(&'static str),

    #[error("Retry base delay must be greater than zero when retries are enabled")]
    InvalidRetryDelay,

    #[error("Maximum context items must be between 1 and {max}")]
    InvalidItemLimit { max: usize },

    #[error("Confidence threshold must be within (0, 1]")]
    InvalidConfidenceThreshold,

    #[error("Frequent interaction count must be at least 1")]
    InvalidFrequency,

    #[error("Template catalog path is empty")]
    EmptyCatalogPath,

    #[error("Invalid log level directive: {0}")]
    InvalidLogLevel(String),
}
