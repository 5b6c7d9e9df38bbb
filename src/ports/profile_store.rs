//! Profile store port.

use async_trait::async_trait;

use crate::domain::foundation::{DomainError, OrganizationId, UserId};
use crate::domain::learning::UserKnowledgeProfile;

/// Durable store for per (user, organization) knowledge profiles.
#[async_trait]
pub trait ProfileStore: Send + Sync {
    /// Returns `None` when the pair has no profile yet.
    async fn get_profile(
        &self,
        user_id: &UserId,
        organization_id: &OrganizationId,
    ) -> Result<Option<UserKnowledgeProfile>, DomainError>;

    /// Insert or replace the profile for its (user, organization).
    async fn upsert_profile(&self, profile: &UserKnowledgeProfile) -> Result<(), DomainError>;
}
