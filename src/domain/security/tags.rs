//! Closed vocabulary of security tags.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// A single security signal attached to a classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SecurityTag {
    /// Any personally identifiable information.
    Pii,
    Email,
    Phone,
    NationalId,
    PaymentCard,
    Financial,
    Legal,
    HumanResources,
    InternalSystem,
    /// Content originates from a source type that must never reach a prompt.
    RestrictedAsset,
    /// Content is shared/system knowledge rather than organization-specific.
    GlobalKnowledge,
    /// The classifier could not produce a verdict and failed safe.
    ClassificationFailure,
}

impl fmt::Display for SecurityTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SecurityTag::Pii => "pii",
            SecurityTag::Email => "email",
            SecurityTag::Phone => "phone",
            SecurityTag::NationalId => "national_id",
            SecurityTag::PaymentCard => "payment_card",
            SecurityTag::Financial => "financial",
            SecurityTag::Legal => "legal",
            SecurityTag::HumanResources => "human_resources",
            SecurityTag::InternalSystem => "internal_system",
            SecurityTag::RestrictedAsset => "restricted_asset",
            SecurityTag::GlobalKnowledge => "global_knowledge",
            SecurityTag::ClassificationFailure => "classification_failure",
        };
        write!(f, "{}", s)
    }
}

/// Set of tags computed once per classification.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SecurityTags(BTreeSet<SecurityTag>);

impl SecurityTags {
    /// Creates an empty tag set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a tag, returning the updated set.
    pub fn with(mut self, tag: SecurityTag) -> Self {
        self.0.insert(tag);
        self
    }

    /// Adds a tag in place.
    pub fn insert(&mut self, tag: SecurityTag) {
        self.0.insert(tag);
    }

    /// Returns true if the tag is present.
    pub fn contains(&self, tag: SecurityTag) -> bool {
        self.0.contains(&tag)
    }

    /// Returns the union of both sets.
    pub fn union(&self, other: &SecurityTags) -> SecurityTags {
        SecurityTags(self.0.union(&other.0).copied().collect())
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = SecurityTag> + '_ {
        self.0.iter().copied()
    }
}

impl FromIterator<SecurityTag> for SecurityTags {
    fn from_iter<I: IntoIterator<Item = SecurityTag>>(iter: I) -> Self {
        SecurityTags(iter.into_iter().collect())
    }
}

impl fmt::Display for SecurityTags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let joined = self
            .0
            .iter()
            .map(|t| t.to_string())
            .collect::<Vec<_>>()
            .join(",");
        write!(f, "{}", joined)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn union_merges_without_duplicates() {
        let a = SecurityTags::new().with(SecurityTag::Pii).with(SecurityTag::Email);
        let b = SecurityTags::new().with(SecurityTag::Email).with(SecurityTag::Legal);

        let merged = a.union(&b);

        assert_eq!(merged.len(), 3);
        assert!(merged.contains(SecurityTag::Legal));
    }

    #[test]
    fn display_is_stable_and_ordered() {
        let tags: SecurityTags = [SecurityTag::Legal, SecurityTag::Pii].into_iter().collect();
        assert_eq!(tags.to_string(), "pii,legal");
    }

    #[test]
    fn serializes_as_array_of_snake_case_strings() {
        let tags = SecurityTags::new().with(SecurityTag::PaymentCard);
        assert_eq!(serde_json::to_string(&tags).unwrap(), "[\"payment_card\"]");
    }
}
