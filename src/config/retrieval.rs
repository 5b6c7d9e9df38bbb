//! Context retrieval configuration

use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;
use crate::domain::security::{AssetType, SecurityLevel};

/// Hard cap on items per bundle list.
const MAX_ITEMS_LIMIT: usize = 50;

/// Context retrieval configuration
#[derive(Debug, Clone, Deserialize)]
pub struct RetrievalConfig {
    /// Timeout for the semantic search call in milliseconds
    #[serde(default = "default_search_timeout_ms")]
    pub search_timeout_ms: u64,

    /// Timeout for the profile lookup in milliseconds
    #[serde(default = "default_profile_timeout_ms")]
    pub profile_timeout_ms: u64,

    /// Maximum items kept per list (conversations, documents)
    #[serde(default = "default_max_items")]
    pub max_items: usize,

    /// Highest security level a search may return
    #[serde(default = "default_max_security_level")]
    pub max_security_level: SecurityLevel,

    /// Source types dropped from context outright
    #[serde(default = "AssetType::default_restricted")]
    pub restricted_asset_types: Vec<AssetType>,
}

impl RetrievalConfig {
    pub fn search_timeout(&self) -> Duration {
        Duration::from_millis(self.search_timeout_ms)
    }

    pub fn profile_timeout(&self) -> Duration {
        Duration::from_millis(self.profile_timeout_ms)
    }

    /// Validate retrieval configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.search_timeout_ms == 0 {
            return Err(ValidationError::InvalidTimeout("retrieval.search_timeout_ms"));
        }
        if self.profile_timeout_ms == 0 {
            return Err(ValidationError::InvalidTimeout("retrieval.profile_timeout_ms"));
        }
        if self.max_items == 0 || self.max_items > MAX_ITEMS_LIMIT {
            return Err(ValidationError::InvalidItemLimit {
                max: MAX_ITEMS_LIMIT,
            });
        }
        Ok(())
    }
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            search_timeout_ms: default_search_timeout_ms(),
            profile_timeout_ms: default_profile_timeout_ms(),
            max_items: default_max_items(),
            max_security_level: default_max_security_level(),
            restricted_asset_types: AssetType::default_restricted(),
        }
    }
}

fn default_search_timeout_ms() -> u64 {
    800
}

fn default_profile_timeout_ms() -> u64 {
    300
}

fn default_max_items() -> usize {
    5
}

fn default_max_security_level() -> SecurityLevel {
    SecurityLevel::Confidential
}
