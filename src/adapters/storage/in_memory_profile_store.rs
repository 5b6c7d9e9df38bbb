//! In-Memory Profile Store Adapter

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::foundation::{DomainError, ErrorCode, OrganizationId, UserId};
use crate::domain::learning::UserKnowledgeProfile;
use crate::ports::ProfileStore;

type ProfileKey = (UserId, OrganizationId);

/// In-memory storage for user knowledge profiles
#[derive(Debug, Clone, Default)]
pub struct InMemoryProfileStore {
    profiles: Arc<RwLock<HashMap<ProfileKey, UserKnowledgeProfile>>>,
    unavailable: Arc<AtomicBool>,
}

impl InMemoryProfileStore {
    /// Create a new in-memory store
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every call fail with `CollaboratorUnavailable` until switched back
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Get the number of stored profiles
    pub async fn profile_count(&self) -> usize {
        self.profiles.read().await.len()
    }

    fn check_available(&self) -> Result<(), DomainError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(DomainError::new(
                ErrorCode::CollaboratorUnavailable,
                "profile store unavailable",
            ));
        }
        Ok(())
    }
}

#[async_trait]
impl ProfileStore for InMemoryProfileStore {
    async fn get_profile(
        &self,
        user_id: &UserId,
        organization_id: &OrganizationId,
    ) -> Result<Option<UserKnowledgeProfile>, DomainError> {
        self.check_available()?;
        let key = (user_id.clone(), organization_id.clone());
        Ok(self.profiles.read().await.get(&key).cloned())
    }

    async fn upsert_profile(&self, profile: &UserKnowledgeProfile) -> Result<(), DomainError> {
        self.check_available()?;
        let key = (profile.user_id().clone(), profile.organization_id().clone());
        self.profiles.write().await.insert(key, profile.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids() -> (UserId, OrganizationId) {
        (
            UserId::new("user-1").unwrap(),
            OrganizationId::new("org-1").unwrap(),
        )
    }

    #[tokio::test]
    async fn upsert_replaces_profile_for_same_pair() {
        let store = InMemoryProfileStore::new();
        let (user, org) = ids();

        store
            .upsert_profile(&UserKnowledgeProfile::new(user.clone(), org.clone()))
            .await
            .unwrap();
        store
            .upsert_profile(&UserKnowledgeProfile::new(user.clone(), org.clone()).with_role("CMO"))
            .await
            .unwrap();

        let found = store.get_profile(&user, &org).await.unwrap().unwrap();
        assert_eq!(found.role(), Some("CMO"));
        assert_eq!(store.profile_count().await, 1);
    }

    #[tokio::test]
    async fn profiles_are_scoped_by_organization() {
        let store = InMemoryProfileStore::new();
        let (user, org) = ids();
        store
            .upsert_profile(&UserKnowledgeProfile::new(user.clone(), org))
            .await
            .unwrap();

        let other_org = OrganizationId::new("org-2").unwrap();
        assert!(store.get_profile(&user, &other_org).await.unwrap().is_none());
    }
}
