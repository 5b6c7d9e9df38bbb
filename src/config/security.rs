//! Security classification configuration

use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;

/// Security classification configuration
#[derive(Debug, Clone, Deserialize)]
pub struct SecurityConfig {
    /// Timeout for the upstream classifier in milliseconds
    #[serde(default = "default_upstream_timeout_ms")]
    pub upstream_timeout_ms: u64,
}

impl SecurityConfig {
    pub fn upstream_timeout(&self) -> Duration {
        Duration::from_millis(self.upstream_timeout_ms)
    }

    /// Validate security configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.upstream_timeout_ms == 0 {
            return Err(ValidationError::InvalidTimeout("security.upstream_timeout_ms"));
        }
        Ok(())
    }
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            upstream_timeout_ms: default_upstream_timeout_ms(),
        }
    }
}

fn default_upstream_timeout_ms() -> u64 {
    1_500
}
