//! UserKnowledgeProfile aggregate and its value objects.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::domain::context::ProfileSummary;
use crate::domain::foundation::{OrganizationId, Timestamp, UserId};
use crate::domain::workflow::WorkflowType;

use super::{InputStyle, LearningSignals};

/// Profile version for tracking updates
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProfileVersion(u32);

impl ProfileVersion {
    /// Create initial version (1)
    pub fn initial() -> Self {
        Self(1)
    }

    /// Increment version
    pub fn increment(&self) -> Self {
        Self(self.0 + 1)
    }

    /// Get inner value
    pub fn as_u32(&self) -> u32 {
        self.0
    }
}

impl Default for ProfileVersion {
    fn default() -> Self {
        Self::initial()
    }
}

impl std::fmt::Display for ProfileVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "v{}", self.0)
    }
}

/// Usage statistics for one workflow type.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkflowUsage {
    pub completed: u32,
    pub total_completion_secs: u64,
    pub last_completed_at: Option<Timestamp>,
}

impl WorkflowUsage {
    /// Mean seconds from creation to completion, if any completed.
    pub fn mean_completion_secs(&self) -> Option<u64> {
        if self.completed == 0 {
            None
        } else {
            Some(self.total_completion_secs / u64::from(self.completed))
        }
    }
}

/// Durable per (user, organization) knowledge record.
///
/// Created on first interaction, refined by the learning recorder, never
/// deleted implicitly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserKnowledgeProfile {
    user_id: UserId,
    organization_id: OrganizationId,
    company_name: Option<String>,
    industry: Option<String>,
    role: Option<String>,
    tone: Option<String>,
    input_style: Option<InputStyle>,
    usage: BTreeMap<WorkflowType, WorkflowUsage>,
    version: ProfileVersion,
    created_at: Timestamp,
    updated_at: Timestamp,
}

impl UserKnowledgeProfile {
    pub fn new(user_id: UserId, organization_id: OrganizationId) -> Self {
        let now = Timestamp::now();
        Self {
            user_id,
            organization_id,
            company_name: None,
            industry: None,
            role: None,
            tone: None,
            input_style: None,
            usage: BTreeMap::new(),
            version: ProfileVersion::initial(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn with_company(mut self, company_name: impl Into<String>, industry: Option<String>) -> Self {
        self.company_name = Some(company_name.into());
        self.industry = industry;
        self
    }

    pub fn with_role(mut self, role: impl Into<String>) -> Self {
        self.role = Some(role.into());
        self
    }

    pub fn with_tone(mut self, tone: impl Into<String>) -> Self {
        self.tone = Some(tone.into());
        self
    }

    // Getters
    pub fn user_id(&self) -> &UserId {
        &self.user_id
    }

    pub fn organization_id(&self) -> &OrganizationId {
        &self.organization_id
    }

    pub fn company_name(&self) -> Option<&str> {
        self.company_name.as_deref()
    }

    pub fn industry(&self) -> Option<&str> {
        self.industry.as_deref()
    }

    pub fn role(&self) -> Option<&str> {
        self.role.as_deref()
    }

    pub fn tone(&self) -> Option<&str> {
        self.tone.as_deref()
    }

    pub fn input_style(&self) -> Option<InputStyle> {
        self.input_style
    }

    pub fn usage(&self, workflow_type: WorkflowType) -> Option<&WorkflowUsage> {
        self.usage.get(&workflow_type)
    }

    pub fn version(&self) -> ProfileVersion {
        self.version
    }

    pub fn created_at(&self) -> Timestamp {
        self.created_at
    }

    pub fn updated_at(&self) -> Timestamp {
        self.updated_at
    }

    /// Completed workflows across all types.
    pub fn total_completed(&self) -> u32 {
        self.usage.values().map(|u| u.completed).sum()
    }

    /// Most completed workflow type, ties broken by declaration order.
    pub fn favourite_workflow(&self) -> Option<WorkflowType> {
        self.usage
            .iter()
            .filter(|(t, u)| u.completed > 0 && t.is_content_creation())
            .max_by(|(ta, a), (tb, b)| a.completed.cmp(&b.completed).then(tb.cmp(ta)))
            .map(|(t, _)| *t)
    }

    /// Records one completed workflow. Always applied, independent of confidence.
    pub fn record_usage(&mut self, workflow_type: WorkflowType, completion_secs: u64) {
        let now = Timestamp::now();
        let usage = self.usage.entry(workflow_type).or_default();
        usage.completed += 1;
        usage.total_completion_secs += completion_secs;
        usage.last_completed_at = Some(now);
        self.touch(now);
    }

    /// Overwrites preference fields with the values the signals carry.
    /// Absent signal values leave the stored preference alone.
    pub fn apply_preferences(&mut self, signals: &LearningSignals) {
        let candidates = &signals.preferences;
        if let Some(company) = &candidates.company_name {
            self.company_name = Some(company.clone());
        }
        if let Some(industry) = &candidates.industry {
            self.industry = Some(industry.clone());
        }
        if let Some(role) = &candidates.role {
            self.role = Some(role.clone());
        }
        if let Some(tone) = &candidates.tone {
            self.tone = Some(tone.clone());
        }
        if let Some(style) = signals.input_style {
            self.input_style = Some(style);
        }
        self.touch(Timestamp::now());
    }

    /// Profile fields as exposed to prompt context.
    pub fn summary(&self) -> ProfileSummary {
        ProfileSummary {
            company_name: self.company_name.clone(),
            industry: self.industry.clone(),
            role: self.role.clone(),
            tone: self.tone.clone(),
        }
    }

    fn touch(&mut self, now: Timestamp) {
        self.version = self.version.increment();
        self.updated_at = now;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::learning::PreferenceCandidates;

    fn profile() -> UserKnowledgeProfile {
        UserKnowledgeProfile::new(
            UserId::new("user-1").unwrap(),
            OrganizationId::new("org-1").unwrap(),
        )
    }

    #[test]
    fn new_profile_is_empty_at_version_one() {
        let p = profile();
        assert_eq!(p.version(), ProfileVersion::initial());
        assert!(p.summary().is_empty());
        assert_eq!(p.total_completed(), 0);
    }

    #[test]
    fn record_usage_accumulates_and_bumps_version() {
        let mut p = profile();
        p.record_usage(WorkflowType::BlogArticle, 100);
        p.record_usage(WorkflowType::BlogArticle, 300);

        let usage = p.usage(WorkflowType::BlogArticle).unwrap();
        assert_eq!(usage.completed, 2);
        assert_eq!(usage.mean_completion_secs(), Some(200));
        assert_eq!(p.version().as_u32(), 3);
        assert_eq!(p.favourite_workflow(), Some(WorkflowType::BlogArticle));
    }

    #[test]
    fn apply_preferences_keeps_fields_without_signal() {
        let mut p = profile().with_role("Founder").with_tone("formal");
        let signals = LearningSignals {
            preferences: PreferenceCandidates {
                company_name: Some("Acme".into()),
                tone: Some("playful".into()),
                ..PreferenceCandidates::default()
            },
            input_style: Some(InputStyle::Brief),
            ..LearningSignals::for_tests(WorkflowType::SocialPost)
        };

        p.apply_preferences(&signals);

        assert_eq!(p.company_name(), Some("Acme"));
        assert_eq!(p.role(), Some("Founder"));
        assert_eq!(p.tone(), Some("playful"));
        assert_eq!(p.input_style(), Some(InputStyle::Brief));
    }

    #[test]
    fn serializes_round_trip_through_yaml() {
        let mut p = profile().with_company("Acme", Some("Bakery".into()));
        p.record_usage(WorkflowType::Newsletter, 42);
        let yaml = serde_yaml::to_string(&p).unwrap();
        let back: UserKnowledgeProfile = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(back, p);
    }
}
