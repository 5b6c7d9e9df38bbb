//! Security classification value object.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::{SecurityLevel, SecurityTag, SecurityTags};

/// Verdict produced for one piece of text.
///
/// Built fresh per classified text and never mutated in place; the only way
/// to combine verdicts is [`SecurityClassification::escalate`], which cannot
/// lower the level or drop a tag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecurityClassification {
    pub level: SecurityLevel,
    pub tags: SecurityTags,
    pub pii_detected: bool,
    /// True when the text may be handed to a model without redaction.
    pub ai_safe: bool,
    pub rationale: String,
}

impl SecurityClassification {
    /// Creates a classification, deriving `ai_safe` from level and PII flag.
    pub fn new(
        level: SecurityLevel,
        tags: SecurityTags,
        pii_detected: bool,
        rationale: impl Into<String>,
    ) -> Self {
        Self {
            level,
            tags,
            pii_detected,
            ai_safe: !pii_detected && level.is_model_safe(),
            rationale: rationale.into(),
        }
    }

    /// Conservative default for text with no detected signal.
    pub fn unremarkable() -> Self {
        Self::new(
            SecurityLevel::Internal,
            SecurityTags::new(),
            false,
            "no sensitive signals detected",
        )
    }

    /// Most restrictive verdict, used whenever classification itself fails.
    pub fn fail_safe(reason: impl fmt::Display) -> Self {
        Self {
            level: SecurityLevel::Restricted,
            tags: SecurityTags::new().with(SecurityTag::ClassificationFailure),
            pii_detected: false,
            ai_safe: false,
            rationale: format!("classification failed, defaulting to restricted: {}", reason),
        }
    }

    /// Combines two verdicts for the same content, keeping the stricter of each field.
    pub fn escalate(&self, other: &SecurityClassification) -> SecurityClassification {
        let rationale = if other.rationale.is_empty() || other.rationale == self.rationale {
            self.rationale.clone()
        } else {
            format!("{}; {}", self.rationale, other.rationale)
        };
        Self {
            level: self.level.escalate(other.level),
            tags: self.tags.union(&other.tags),
            pii_detected: self.pii_detected || other.pii_detected,
            ai_safe: self.ai_safe
                && other.ai_safe
                && self.level.escalate(other.level).is_model_safe(),
            rationale,
        }
    }

    /// Raises the level to at least `level`, recording why.
    pub fn raise_to(&self, level: SecurityLevel, reason: &str) -> SecurityClassification {
        if level <= self.level {
            return self.clone();
        }
        let raised = SecurityClassification {
            level,
            tags: SecurityTags::new(),
            pii_detected: false,
            ai_safe: level.is_model_safe(),
            rationale: reason.to_string(),
        };
        self.escalate(&raised)
    }

    /// Adds a tag without touching the level.
    pub fn tagged(mut self, tag: SecurityTag) -> SecurityClassification {
        self.tags.insert(tag);
        self
    }

    /// True when the content comes from a source that is excluded outright.
    pub fn is_restricted_asset(&self) -> bool {
        self.tags.contains(SecurityTag::RestrictedAsset)
    }

    /// True when the classifier failed and this verdict is the fail-safe default.
    pub fn is_failure(&self) -> bool {
        self.tags.contains(SecurityTag::ClassificationFailure)
    }
}

/// Kind of source a retrieved item came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssetType {
    Conversation,
    Document,
    Template,
    Analytics,
    HumanResources,
    Legal,
    FinanceInternal,
}

impl AssetType {
    /// Source types excluded from prompts unless configured otherwise.
    pub fn default_restricted() -> Vec<AssetType> {
        vec![
            AssetType::Analytics,
            AssetType::HumanResources,
            AssetType::Legal,
            AssetType::FinanceInternal,
        ]
    }
}

impl fmt::Display for AssetType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            AssetType::Conversation => "conversation",
            AssetType::Document => "document",
            AssetType::Template => "template",
            AssetType::Analytics => "analytics",
            AssetType::HumanResources => "human_resources",
            AssetType::Legal => "legal",
            AssetType::FinanceInternal => "finance_internal",
        };
        write!(f, "{}", s)
    }
}

/// Where a retrieved item came from, as far as classification cares.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentOrigin {
    pub asset_type: AssetType,
    /// Level recorded by the source system, if any.
    pub declared_level: Option<SecurityLevel>,
    /// Shared/system knowledge rather than organization-specific content.
    pub global: bool,
}
