//! Deterministic pattern-based security classifier.

use std::collections::BTreeSet;

use super::patterns::{detect_pii, detect_sensitive};
use super::{
    AssetType, ContentOrigin, SecurityClassification, SecurityLevel, SecurityTag, SecurityTags,
};

/// Scores text for sensitivity using PII signatures and keyword lexicons.
///
/// Rules, applied in order and only ever raising the level:
/// - no signal: `internal` (never `public` by default)
/// - sensitive keyword: at least `confidential`
/// - any PII: `confidential`, PII flag set
/// - national-id or payment-card PII: `restricted`
#[derive(Debug, Clone)]
pub struct PatternClassifier {
    restricted_assets: BTreeSet<AssetType>,
}

impl Default for PatternClassifier {
    fn default() -> Self {
        Self::new(AssetType::default_restricted())
    }
}

impl PatternClassifier {
    pub fn new(restricted_assets: impl IntoIterator<Item = AssetType>) -> Self {
        Self {
            restricted_assets: restricted_assets.into_iter().collect(),
        }
    }

    pub fn restricted_assets(&self) -> &BTreeSet<AssetType> {
        &self.restricted_assets
    }

    /// Classifies free text.
    pub fn classify(&self, text: &str) -> SecurityClassification {
        let pii = detect_pii(text);
        let sensitive = detect_sensitive(text);

        if pii.is_empty() && sensitive.is_empty() {
            return SecurityClassification::unremarkable();
        }

        let mut level = SecurityLevel::Internal;
        let mut tags = SecurityTags::new();
        let mut reasons = Vec::new();

        if !sensitive.is_empty() {
            level = level.escalate(SecurityLevel::Confidential);
            for category in &sensitive {
                tags.insert(category.tag());
            }
            reasons.push(format!(
                "sensitive vocabulary: {}",
                sensitive
                    .iter()
                    .map(|c| c.tag().to_string())
                    .collect::<Vec<_>>()
                    .join(", ")
            ));
        }

        if !pii.is_empty() {
            tags.insert(SecurityTag::Pii);
            for kind in &pii {
                tags.insert(kind.tag());
            }
            let pii_level = if pii.iter().any(|k| k.is_high_risk()) {
                SecurityLevel::Restricted
            } else {
                SecurityLevel::Confidential
            };
            level = level.escalate(pii_level);
            reasons.push(format!(
                "pii detected: {}",
                pii.iter()
                    .map(|k| k.tag().to_string())
                    .collect::<Vec<_>>()
                    .join(", ")
            ));
        }

        SecurityClassification::new(level, tags, !pii.is_empty(), reasons.join("; "))
    }

    /// Classifies a retrieved item, folding in what is known about its source.
    ///
    /// Items from restricted asset types are tagged `RestrictedAsset` and
    /// forced to `restricted`; a level declared by the source can only raise
    /// the verdict.
    pub fn classify_retrieved(&self, text: &str, origin: &ContentOrigin) -> SecurityClassification {
        let mut verdict = self.classify(text);

        if let Some(declared) = origin.declared_level {
            verdict = verdict.raise_to(declared, &format!("source declared {}", declared));
        }

        if self.restricted_assets.contains(&origin.asset_type) {
            verdict = verdict
                .raise_to(
                    SecurityLevel::Restricted,
                    &format!("restricted asset type: {}", origin.asset_type),
                )
                .tagged(SecurityTag::RestrictedAsset);
        }

        if origin.global {
            verdict = verdict.tagged(SecurityTag::GlobalKnowledge);
        }

        verdict
    }
}
