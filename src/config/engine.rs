//! Workflow engine configuration

use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;

/// How learning is recorded once a workflow completes.
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LearningMode {
    /// Record before the engine call returns.
    Inline,
    /// Record on a spawned task after the response is final.
    #[default]
    Background,
}

/// Workflow engine configuration
#[derive(Debug, Clone, Deserialize)]
pub struct EngineConfig {
    /// Timeout for a single model call in milliseconds
    #[serde(default = "default_model_timeout_ms")]
    pub model_timeout_ms: u64,

    /// Retries after the first model attempt, for retryable errors only
    #[serde(default = "default_max_model_retries")]
    pub max_model_retries: u32,

    /// Base delay for exponential backoff between model retries
    #[serde(default = "default_retry_base_delay_ms")]
    pub retry_base_delay_ms: u64,

    /// Where learning runs
    #[serde(default)]
    pub learning_mode: LearningMode,
}

impl EngineConfig {
    pub fn model_timeout(&self) -> Duration {
        Duration::from_millis(self.model_timeout_ms)
    }

    pub fn retry_base_delay(&self) -> Duration {
        Duration::from_millis(self.retry_base_delay_ms)
    }

    /// Validate engine configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.model_timeout_ms == 0 {
            return Err(ValidationError::InvalidTimeout("engine.model_timeout_ms"));
        }
        if self.max_model_retries > 0 && self.retry_base_delay_ms == 0 {
            return Err(ValidationError::InvalidRetryDelay);
        }
        Ok(())
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            model_timeout_ms: default_model_timeout_ms(),
            max_model_retries: default_max_model_retries(),
            retry_base_delay_ms: default_retry_base_delay_ms(),
            learning_mode: LearningMode::default(),
        }
    }
}

fn default_model_timeout_ms() -> u64 {
    30_000
}

fn default_max_model_retries() -> u32 {
    2
}

fn default_retry_base_delay_ms() -> u64 {
    500
}
