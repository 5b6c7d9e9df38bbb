//! Context bundle - sanitized, ranked knowledge assembled for one prompt.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

use crate::domain::security::{SecurityClassification, SecurityLevel};

/// Profile fields known about the user. Every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileSummary {
    pub company_name: Option<String>,
    pub industry: Option<String>,
    pub role: Option<String>,
    pub tone: Option<String>,
}

impl ProfileSummary {
    pub fn is_empty(&self) -> bool {
        self.company_name.is_none()
            && self.industry.is_none()
            && self.role.is_none()
            && self.tone.is_none()
    }

    pub fn has_company_facts(&self) -> bool {
        self.company_name.is_some() || self.industry.is_some()
    }
}

/// Whether an item is shared system knowledge or organization-specific.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KnowledgeScope {
    Global,
    Organization,
}

/// A retrieved snippet that already passed classification and sanitization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContextItem {
    pub content: String,
    pub relevance: f32,
    pub scope: KnowledgeScope,
    pub source_id: String,
    pub level: SecurityLevel,
}

impl ContextItem {
    pub fn is_global(&self) -> bool {
        self.scope == KnowledgeScope::Global
    }
}

/// Relevance descending; on equal relevance global knowledge first.
pub fn rank_order(a: &ContextItem, b: &ContextItem) -> Ordering {
    b.relevance
        .total_cmp(&a.relevance)
        .then_with(|| b.is_global().cmp(&a.is_global()))
}

/// Everything the injector may put in front of a model for one request.
///
/// Built fresh per request and never shared across users.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ContextBundle {
    pub user_profile: ProfileSummary,
    pub related_conversations: Vec<ContextItem>,
    pub related_documents: Vec<ContextItem>,
    pub suggestions: Vec<String>,
    /// Verdict for the raw user input this bundle was built for.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input_classification: Option<SecurityClassification>,
}

impl ContextBundle {
    pub fn empty() -> Self {
        Self::default()
    }

    /// True when there is nothing to inject beyond identity and rules.
    pub fn is_empty(&self) -> bool {
        self.user_profile.is_empty()
            && self.related_conversations.is_empty()
            && self.related_documents.is_empty()
            && self.suggestions.is_empty()
    }

    pub fn item_count(&self) -> usize {
        self.related_conversations.len() + self.related_documents.len()
    }

    /// Sorts both item lists by [`rank_order`] and keeps at most `limit` each.
    pub fn rank_and_truncate(&mut self, limit: usize) {
        for items in [&mut self.related_conversations, &mut self.related_documents] {
            items.sort_by(rank_order);
            items.truncate(limit);
        }
    }

    /// All items across both lists in rank order.
    pub fn ranked_items(&self) -> Vec<&ContextItem> {
        let mut all: Vec<&ContextItem> = self
            .related_conversations
            .iter()
            .chain(self.related_documents.iter())
            .collect();
        all.sort_by(|a, b| rank_order(a, b));
        all
    }

    pub fn input_has_pii(&self) -> bool {
        self.input_classification
            .as_ref()
            .map(|c| c.pii_detected)
            .unwrap_or(false)
    }
}
