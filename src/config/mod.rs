//! Application configuration module
//!
//! This module provides type-safe configuration loading from environment variables
//! using the `config` and `dotenvy` crates. Configuration is loaded with the
//! `CONTENT_SHERPA` prefix and nested values use double underscores as separators.
//! Every section has defaults, so an empty environment yields a usable config.
//!
//! # Example
//!
//! ```no_run
//! use content_sherpa::config::AppConfig;
//!
//! let config = AppConfig::load().expect("Failed to load configuration");
//! config.validate().expect("Invalid configuration");
//! config.logging.init();
//! ```

mod engine;
mod error;
mod learning;
mod logging;
mod retrieval;
mod security;
mod templates;

pub use engine::{EngineConfig, LearningMode};
pub use error::{ConfigError, ValidationError};
pub use learning::LearningConfig;
pub use logging::{LogFormat, LoggingConfig};
pub use retrieval::RetrievalConfig;
pub use security::SecurityConfig;
pub use templates::TemplatesConfig;

use serde::Deserialize;

/// Root application configuration
///
/// Load using [`AppConfig::load()`] which reads from environment variables.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// Model invocation and learning dispatch
    #[serde(default)]
    pub engine: EngineConfig,

    /// Context retrieval timeouts, limits and security ceiling
    #[serde(default)]
    pub retrieval: RetrievalConfig,

    /// Upstream classifier settings
    #[serde(default)]
    pub security: SecurityConfig,

    /// Learning thresholds
    #[serde(default)]
    pub learning: LearningConfig,

    /// Template catalog source
    #[serde(default)]
    pub templates: TemplatesConfig,

    /// Log level and format
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// This function:
    /// 1. Loads `.env` file if present (for development)
    /// 2. Reads environment variables with `CONTENT_SHERPA` prefix
    /// 3. Uses `__` (double underscore) to separate nested values
    /// 4. Deserializes into typed configuration structs
    ///
    /// # Environment Variable Format
    ///
    /// - `CONTENT_SHERPA__ENGINE__MODEL_TIMEOUT_MS=10000` -> `engine.model_timeout_ms = 10000`
    /// - `CONTENT_SHERPA__RETRIEVAL__RESTRICTED_ASSET_TYPES=legal,analytics` -> list
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if values cannot be parsed into expected types.
    pub fn load() -> Result<Self, ConfigError> {
        // Load .env file if present (development)
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(
                config::Environment::default()
                    .prefix("CONTENT_SHERPA")
                    .separator("__")
                    .try_parsing(true)
                    .list_separator(",")
                    .with_list_parse_key("retrieval.restricted_asset_types"),
            )
            .build()?
            .try_deserialize()?;

        Ok(config)
    }

    /// Load and validate in one step.
    pub fn load_validated() -> Result<Self, ConfigError> {
        let config = Self::load()?;
        config.validate()?;
        Ok(config)
    }

    /// Validate all configuration values
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` if any configuration value is invalid.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.engine.validate()?;
        self.retrieval.validate()?;
        self.security.validate()?;
        self.learning.validate()?;
        self.templates.validate()?;
        self.logging.validate()?;
        Ok(())
    }
}
