//! In-memory semantic search with lexical-overlap relevance.
//!
//! Stands in for the vector index in local runs and tests. Relevance is the
//! share of distinct query terms (three or more characters) found in the
//! content.

use async_trait::async_trait;
use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

use crate::domain::foundation::{DomainError, ErrorCode, OrganizationId, UserId};
use crate::ports::{SearchHit, SearchQuery, SemanticSearch, SourceMetadata};

/// Content visible to one owner, or to everyone when global.
#[derive(Debug, Clone)]
pub struct IndexedContent {
    pub content: String,
    pub source: SourceMetadata,
    /// `None` for global knowledge.
    pub organization_id: Option<OrganizationId>,
    /// `None` when shared across the organization.
    pub user_id: Option<UserId>,
}

impl IndexedContent {
    fn visible_to(&self, user_id: &UserId, organization_id: &OrganizationId) -> bool {
        if self.source.global {
            return true;
        }
        let org_matches = self.organization_id.as_ref() == Some(organization_id);
        let user_matches = self.user_id.as_ref().map_or(true, |u| u == user_id);
        org_matches && user_matches
    }
}

/// In-memory semantic search index
#[derive(Debug, Clone, Default)]
pub struct InMemorySemanticSearch {
    entries: Arc<RwLock<Vec<IndexedContent>>>,
    unavailable: Arc<AtomicBool>,
    delay: Duration,
}

impl InMemorySemanticSearch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Simulated latency per search.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Make every search fail until switched back.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    pub async fn index(&self, entry: IndexedContent) {
        self.entries.write().await.push(entry);
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

fn terms(text: &str) -> HashSet<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|t| t.chars().count() >= 3)
        .map(str::to_lowercase)
        .collect()
}

fn overlap(query_terms: &HashSet<String>, content: &str) -> f32 {
    if query_terms.is_empty() {
        return 0.0;
    }
    let content_terms = terms(content);
    let shared = query_terms.intersection(&content_terms).count();
    shared as f32 / query_terms.len() as f32
}

#[async_trait]
impl SemanticSearch for InMemorySemanticSearch {
    async fn search(&self, query: &SearchQuery) -> Result<Vec<SearchHit>, DomainError> {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(DomainError::new(
                ErrorCode::CollaboratorUnavailable,
                "semantic search unavailable",
            ));
        }

        let query_terms = terms(&query.text);
        let entries = self.entries.read().await;
        let mut hits: Vec<SearchHit> = entries
            .iter()
            .filter(|e| e.visible_to(&query.user_id, &query.organization_id))
            .filter(|e| query.content_types.contains(&e.source.content_type))
            .filter(|e| {
                e.source
                    .declared_level
                    .map_or(true, |level| level.within(query.max_security_level))
            })
            .filter_map(|e| {
                let relevance = overlap(&query_terms, &e.content);
                (relevance > 0.0).then(|| SearchHit {
                    content: e.content.clone(),
                    relevance,
                    source: e.source.clone(),
                })
            })
            .collect();

        hits.sort_by(|a, b| b.relevance.total_cmp(&a.relevance));
        hits.truncate(query.limit);
        Ok(hits)
    }
}
