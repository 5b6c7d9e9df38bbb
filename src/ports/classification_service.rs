//! Upstream classification port.
//!
//! An optional model-backed or remote classifier. Its verdict is only ever
//! combined with the deterministic pattern verdict through escalation, so it
//! can raise a level but never lower one.

use async_trait::async_trait;

use crate::domain::foundation::DomainError;
use crate::domain::security::SecurityClassification;

#[async_trait]
pub trait ClassificationService: Send + Sync {
    /// Classifies text.
    ///
    /// # Errors
    ///
    /// Any error makes the caller fail safe to `restricted`.
    async fn classify(&self, text: &str) -> Result<SecurityClassification, DomainError>;
}
