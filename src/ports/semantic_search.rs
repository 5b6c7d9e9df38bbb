//! Semantic search port.
//!
//! Black-box similarity search over prior conversations and documents.
//! Treated as best-effort: callers bound its latency and tolerate failure.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::foundation::{DomainError, OrganizationId, UserId};
use crate::domain::security::{AssetType, ContentOrigin, SecurityLevel};

/// What kind of indexed content to search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchContentType {
    Conversation,
    Document,
}

/// Search request scoped to one (user, organization).
#[derive(Debug, Clone)]
pub struct SearchQuery {
    pub user_id: UserId,
    pub organization_id: OrganizationId,
    pub text: String,
    pub content_types: Vec<SearchContentType>,
    /// Items above this level must not be returned.
    pub max_security_level: SecurityLevel,
    pub limit: usize,
}

/// What the index knows about where a hit came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceMetadata {
    pub source_id: String,
    pub content_type: SearchContentType,
    pub asset_type: AssetType,
    #[serde(default)]
    pub declared_level: Option<SecurityLevel>,
    /// Shared/system knowledge rather than organization-specific content.
    #[serde(default)]
    pub global: bool,
}

impl SourceMetadata {
    pub fn origin(&self) -> ContentOrigin {
        ContentOrigin {
            asset_type: self.asset_type,
            declared_level: self.declared_level,
            global: self.global,
        }
    }
}

/// One raw, unsanitized search result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchHit {
    pub content: String,
    pub relevance: f32,
    pub source: SourceMetadata,
}

/// Port for semantic similarity search.
#[async_trait]
pub trait SemanticSearch: Send + Sync {
    /// Returns hits for the query, at most `query.limit` of them.
    ///
    /// # Errors
    ///
    /// - `CollaboratorUnavailable` when the index cannot be reached
    async fn search(&self, query: &SearchQuery) -> Result<Vec<SearchHit>, DomainError>;
}
