//! Content type a workflow produces.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::domain::foundation::ValidationError;

/// The kind of content a workflow template drives toward.
///
/// `Base` is the minimal conversational workflow that keeps a thread usable
/// after another workflow completes; every other variant produces content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkflowType {
    Base,
    BlogArticle,
    SocialPost,
    PressRelease,
    Newsletter,
    EmailCampaign,
}

impl WorkflowType {
    /// All workflow types in declaration order.
    pub const ALL: [WorkflowType; 6] = [
        WorkflowType::Base,
        WorkflowType::BlogArticle,
        WorkflowType::SocialPost,
        WorkflowType::PressRelease,
        WorkflowType::Newsletter,
        WorkflowType::EmailCampaign,
    ];

    /// Human-readable name, also used when the model names a workflow.
    pub fn display_name(&self) -> &'static str {
        match self {
            WorkflowType::Base => "Base",
            WorkflowType::BlogArticle => "Blog Article",
            WorkflowType::SocialPost => "Social Post",
            WorkflowType::PressRelease => "Press Release",
            WorkflowType::Newsletter => "Newsletter",
            WorkflowType::EmailCampaign => "Email Campaign",
        }
    }

    /// Lowercase phrases a user may use to ask for this content type.
    pub fn aliases(&self) -> &'static [&'static str] {
        match self {
            WorkflowType::Base => &[],
            WorkflowType::BlogArticle => &["blog article", "blog post", "blog", "article"],
            WorkflowType::SocialPost => &[
                "social media post",
                "social post",
                "linkedin post",
                "instagram post",
                "tweet",
            ],
            WorkflowType::PressRelease => &["press release", "press announcement"],
            WorkflowType::Newsletter => &["newsletter"],
            WorkflowType::EmailCampaign => &["email campaign", "marketing email", "email blast"],
        }
    }

    /// Resolves an alias or display name, case-insensitively.
    pub fn from_alias(phrase: &str) -> Option<WorkflowType> {
        let needle = phrase.trim().to_lowercase();
        Self::ALL.into_iter().find(|t| {
            t.display_name().to_lowercase() == needle || t.aliases().contains(&needle.as_str())
        })
    }

    /// True for workflow types that generate publishable content.
    pub fn is_content_creation(&self) -> bool {
        !matches!(self, WorkflowType::Base)
    }

    /// Snake-case key used in configuration and markers.
    pub fn key(&self) -> &'static str {
        match self {
            WorkflowType::Base => "base",
            WorkflowType::BlogArticle => "blog_article",
            WorkflowType::SocialPost => "social_post",
            WorkflowType::PressRelease => "press_release",
            WorkflowType::Newsletter => "newsletter",
            WorkflowType::EmailCampaign => "email_campaign",
        }
    }
}

impl fmt::Display for WorkflowType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

impl FromStr for WorkflowType {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase();
        Self::ALL
            .into_iter()
            .find(|t| t.key() == normalized.replace(' ', "_"))
            .or_else(|| Self::from_alias(&normalized))
            .ok_or_else(|| {
                ValidationError::invalid_format("workflow_type", format!("unknown type '{}'", s))
            })
    }
}
