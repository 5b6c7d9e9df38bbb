//! Learning recorder configuration

use serde::Deserialize;

use super::error::ValidationError;

/// Learning recorder configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LearningConfig {
    /// Confidence above which preference updates are committed
    #[serde(default = "default_confidence_threshold")]
    pub confidence_threshold: f32,

    /// Completed workflows at which a user counts as a frequent user
    #[serde(default = "default_frequent_after")]
    pub frequent_after: u32,
}

impl LearningConfig {
    /// Validate learning configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if !(self.confidence_threshold > 0.0 && self.confidence_threshold <= 1.0) {
            return Err(ValidationError::InvalidConfidenceThreshold);
        }
        if self.frequent_after == 0 {
            return Err(ValidationError::InvalidFrequency);
        }
        Ok(())
    }
}

impl Default for LearningConfig {
    fn default() -> Self {
        Self {
            confidence_threshold: default_confidence_threshold(),
            frequent_after: default_frequent_after(),
        }
    }
}

fn default_confidence_threshold() -> f32 {
    0.6
}

fn default_frequent_after() -> u32 {
    5
}
