//! Context retrieval coordinator.
//!
//! Fans out to semantic search, the profile store and input classification
//! concurrently, then filters every retrieved item through the classifier
//! and sanitizer before it can reach a bundle. Search and profile lookup
//! are independent failure domains: either can fail or time out without
//! affecting the other, and the coordinator itself never fails.

use std::sync::Arc;
use std::time::Duration;

use futures::future::join_all;
use tokio::time::timeout;

use crate::config::RetrievalConfig;
use crate::domain::context::{ContextBundle, ContextItem, KnowledgeScope};
use crate::domain::foundation::{OrganizationId, UserId};
use crate::domain::learning::{InputStyle, UserKnowledgeProfile};
use crate::domain::security::{ContentSanitizer, SecurityClassification, SecurityLevel};
use crate::domain::workflow::{WorkflowType, AUTO_EXECUTE_SENTINEL};
use crate::ports::{
    ProfileStore, SearchContentType, SearchHit, SearchQuery, SemanticSearch,
};

use super::SecurityClassifier;

/// Parameters of one context fetch.
#[derive(Debug, Clone)]
pub struct ContextRequest {
    pub user_id: UserId,
    pub organization_id: OrganizationId,
    pub workflow_type: WorkflowType,
    pub step_name: String,
    /// Raw user input; may be empty or the auto-execute sentinel.
    pub query_text: String,
}

pub struct ContextRetrievalCoordinator {
    search: Arc<dyn SemanticSearch>,
    profiles: Arc<dyn ProfileStore>,
    classifier: Arc<SecurityClassifier>,
    sanitizer: ContentSanitizer,
    search_timeout: Duration,
    profile_timeout: Duration,
    max_items: usize,
    max_security_level: SecurityLevel,
}

impl ContextRetrievalCoordinator {
    pub fn new(
        search: Arc<dyn SemanticSearch>,
        profiles: Arc<dyn ProfileStore>,
        classifier: Arc<SecurityClassifier>,
        config: &RetrievalConfig,
    ) -> Self {
        Self {
            search,
            profiles,
            classifier,
            sanitizer: ContentSanitizer::new(),
            search_timeout: config.search_timeout(),
            profile_timeout: config.profile_timeout(),
            max_items: config.max_items,
            max_security_level: config.max_security_level,
        }
    }

    pub fn classifier(&self) -> &SecurityClassifier {
        &self.classifier
    }

    /// Builds a sanitized, ranked bundle for one prompt.
    pub async fn get_context(&self, request: &ContextRequest) -> ContextBundle {
        let (hits, profile, input_classification) = tokio::join!(
            self.search_hits(request),
            self.lookup_profile(request),
            self.classify_input(&request.query_text),
        );

        let mut bundle = ContextBundle::empty();
        bundle.input_classification = input_classification;

        if let Some(profile) = &profile {
            bundle.user_profile = profile.summary();
            bundle.suggestions = suggestions(profile, request.workflow_type);
        }

        let items = join_all(hits.into_iter().map(|hit| self.admit(hit))).await;
        for (content_type, item) in items.into_iter().flatten() {
            match content_type {
                SearchContentType::Conversation => bundle.related_conversations.push(item),
                SearchContentType::Document => bundle.related_documents.push(item),
            }
        }
        bundle.rank_and_truncate(self.max_items);

        tracing::debug!(
            user_id = %request.user_id,
            workflow_type = request.workflow_type.key(),
            step = %request.step_name,
            items = bundle.item_count(),
            has_profile = profile.is_some(),
            "Context bundle assembled"
        );

        bundle
    }

    async fn search_hits(&self, request: &ContextRequest) -> Vec<SearchHit> {
        let query = SearchQuery {
            user_id: request.user_id.clone(),
            organization_id: request.organization_id.clone(),
            text: self.search_text(request),
            content_types: vec![SearchContentType::Conversation, SearchContentType::Document],
            max_security_level: self.max_security_level,
            // Headroom for items dropped by the filter below.
            limit: self.max_items.saturating_mul(2),
        };

        match timeout(self.search_timeout, self.search.search(&query)).await {
            Ok(Ok(hits)) => hits,
            Ok(Err(err)) => {
                tracing::warn!(user_id = %request.user_id, error = %err, "Semantic search failed, continuing without items");
                Vec::new()
            }
            Err(_) => {
                tracing::warn!(
                    user_id = %request.user_id,
                    timeout_ms = self.search_timeout.as_millis() as u64,
                    "Semantic search timed out, continuing without items"
                );
                Vec::new()
            }
        }
    }

    /// Query text with PII stripped; the search index is an external party.
    fn search_text(&self, request: &ContextRequest) -> String {
        let raw = request.query_text.trim();
        if raw.is_empty() || raw == AUTO_EXECUTE_SENTINEL {
            return format!("{} {}", request.workflow_type.display_name(), request.step_name);
        }
        let verdict = self.classifier.patterns().classify(raw);
        self.sanitizer.sanitize(raw, &verdict)
    }

    async fn lookup_profile(&self, request: &ContextRequest) -> Option<UserKnowledgeProfile> {
        let lookup = self
            .profiles
            .get_profile(&request.user_id, &request.organization_id);
        match timeout(self.profile_timeout, lookup).await {
            Ok(Ok(profile)) => profile,
            Ok(Err(err)) => {
                tracing::warn!(user_id = %request.user_id, error = %err, "Profile lookup failed");
                None
            }
            Err(_) => {
                tracing::warn!(user_id = %request.user_id, "Profile lookup timed out");
                None
            }
        }
    }

    async fn classify_input(&self, text: &str) -> Option<SecurityClassification> {
        let text = text.trim();
        if text.is_empty() || text == AUTO_EXECUTE_SENTINEL {
            return None;
        }
        Some(self.classifier.classify(text).await)
    }

    /// Classifies and sanitizes one hit, or drops it.
    async fn admit(&self, hit: SearchHit) -> Option<(SearchContentType, ContextItem)> {
        let verdict = self
            .classifier
            .classify_retrieved(&hit.content, &hit.source.origin())
            .await;

        if verdict.is_restricted_asset() {
            tracing::debug!(source_id = %hit.source.source_id, "Dropping item from restricted source");
            return None;
        }
        if !verdict.level.within(self.max_security_level) {
            tracing::debug!(
                source_id = %hit.source.source_id,
                level = %verdict.level,
                "Dropping item above security ceiling"
            );
            return None;
        }

        let content = self.sanitizer.sanitize(&hit.content, &verdict);
        let scope = if hit.source.global {
            KnowledgeScope::Global
        } else {
            KnowledgeScope::Organization
        };
        Some((
            hit.source.content_type,
            ContextItem {
                content,
                relevance: hit.relevance,
                scope,
                source_id: hit.source.source_id,
                level: verdict.level,
            },
        ))
    }
}

fn suggestions(profile: &UserKnowledgeProfile, current: WorkflowType) -> Vec<String> {
    let mut out = Vec::new();
    if let Some(favourite) = profile.favourite_workflow() {
        if favourite != current {
            out.push(format!(
                "The user often creates {} content; offer it as a follow-up when this one is done.",
                favourite.display_name()
            ));
        }
    }
    if profile.input_style() == Some(InputStyle::Brief) {
        out.push("The user prefers short exchanges; keep questions brief and few.".to_string());
    }
    out
}
