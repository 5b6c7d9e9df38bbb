//! Content sanitizer - redacts text flagged by the classifier.
//!
//! Redaction replaces each PII span with a typed placeholder and, inside
//! sentences that use sensitive vocabulary, each numeric/amount token with
//! [`AMOUNT_PLACEHOLDER`]. Everything else is left untouched so downstream
//! prompts stay grammatical.
//!
//! Sanitization is idempotent and never fails: when the input cannot be
//! processed it collapses to [`REDACTION_MARKER`] instead of leaking.

use serde_json::Value;

use super::patterns::{amount_pattern, mentions_sensitive_topic, sentences, PiiKind, AMOUNT_PLACEHOLDER};
use super::SecurityClassification;

/// Replaces the entire text when it cannot be sanitized safely.
pub const REDACTION_MARKER: &str = "[CONTENT_REDACTED]";

/// Maximum input length accepted for span-level redaction (256KB).
pub const MAX_SANITIZE_LENGTH: usize = 256 * 1024;

/// Upper bound on PII redaction passes before giving up.
const MAX_REDACTION_PASSES: usize = 8;

/// Redacts sensitive spans according to a classification.
#[derive(Debug, Clone, Default)]
pub struct ContentSanitizer;

impl ContentSanitizer {
    pub fn new() -> Self {
        Self
    }

    /// Sanitizes `text` according to `classification`.
    ///
    /// AI-safe content is returned unchanged.
    pub fn sanitize(&self, text: &str, classification: &SecurityClassification) -> String {
        if classification.ai_safe {
            return text.to_string();
        }
        match self.redact(text) {
            Some(clean) => clean,
            None => {
                tracing::warn!(
                    length = text.len(),
                    level = %classification.level,
                    "Sanitization could not converge, replacing whole text"
                );
                REDACTION_MARKER.to_string()
            }
        }
    }

    /// Recursively sanitizes every string leaf of a JSON value.
    pub fn sanitize_json(&self, value: &Value, classification: &SecurityClassification) -> Value {
        match value {
            Value::String(s) => Value::String(self.sanitize(s, classification)),
            Value::Array(items) => Value::Array(
                items
                    .iter()
                    .map(|v| self.sanitize_json(v, classification))
                    .collect(),
            ),
            Value::Object(map) => Value::Object(
                map.iter()
                    .map(|(k, v)| (k.clone(), self.sanitize_json(v, classification)))
                    .collect(),
            ),
            other => other.clone(),
        }
    }

    fn redact(&self, text: &str) -> Option<String> {
        if text.len() > MAX_SANITIZE_LENGTH {
            return None;
        }
        let without_pii = self.redact_pii(text)?;
        Some(self.redact_amounts(&without_pii))
    }

    /// Replaces PII spans until no signature matches.
    ///
    /// Every replacement removes at least one digit or `@`, so the loop
    /// converges; the pass bound only guards pathological inputs.
    fn redact_pii(&self, text: &str) -> Option<String> {
        let mut current = text.to_string();
        for _ in 0..MAX_REDACTION_PASSES {
            let mut changed = false;
            for kind in PiiKind::REDACTION_ORDER {
                let pattern = kind.pattern();
                if pattern.is_match(&current) {
                    current = pattern
                        .replace_all(&current, kind.placeholder())
                        .into_owned();
                    changed = true;
                }
            }
            if !changed {
                return Some(current);
            }
        }
        let residual = PiiKind::REDACTION_ORDER
            .iter()
            .any(|kind| kind.pattern().is_match(&current));
        if residual {
            None
        } else {
            Some(current)
        }
    }

    fn redact_amounts(&self, text: &str) -> String {
        sentences(text)
            .into_iter()
            .map(|sentence| {
                if mentions_sensitive_topic(sentence) {
                    amount_pattern()
                        .replace_all(sentence, AMOUNT_PLACEHOLDER)
                        .into_owned()
                } else {
                    sentence.to_string()
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::security::patterns::detect_pii;
    use crate::domain::security::PatternClassifier;
    use proptest::prelude::*;

    fn sanitize(text: &str) -> String {
        let classification = PatternClassifier::default().classify(text);
        ContentSanitizer::new().sanitize(text, &classification)
    }

    #[test]
    fn safe_text_is_unchanged() {
        let text = "Tell me about your favourite product launch.";
        assert_eq!(sanitize(text), text);
    }

    #[test]
    fn email_and_phone_get_typed_placeholders() {
        let out = sanitize("Email jane@acme.com or call 555-123-4567 today.");
        assert_eq!(out, "Email [EMAIL_REDACTED] or call [PHONE_REDACTED] today.");
    }

    #[test]
    fn card_and_national_id_are_redacted() {
        let out = sanitize("Card 4111 1111 1111 1111 and SSN 123-45-6789.");
        assert_eq!(out, "Card [CARD_REDACTED] and SSN [NATIONAL_ID_REDACTED].");
    }

    #[test]
    fn amounts_in_sensitive_sentences_are_redacted() {
        let out = sanitize("Revenue reached $1.5M this year. We hired 12 people.");
        assert_eq!(
            out,
            "Revenue reached [AMOUNT_REDACTED] this year. We hired 12 people."
        );
    }

    #[test]
    fn amounts_outside_sensitive_sentences_survive() {
        let out = sanitize("Our budget is tight. The launch is on May 3.");
        assert_eq!(out, "Our budget is tight. The launch is on May 3.");
    }

    #[test]
    fn oversized_input_collapses_to_marker() {
        let huge = format!("{} jo@example.com", "a".repeat(MAX_SANITIZE_LENGTH));
        assert_eq!(sanitize(&huge), REDACTION_MARKER);
    }

    #[test]
    fn fail_safe_classification_still_redacts() {
        let c = SecurityClassification::fail_safe("upstream down");
        let out = ContentSanitizer::new().sanitize("ping jo@example.com", &c);
        assert_eq!(out, "ping [EMAIL_REDACTED]");
    }

    #[test]
    fn json_leaves_are_sanitized() {
        let c = SecurityClassification::fail_safe("x");
        let value = serde_json::json!({
            "companyInfo": {"name": "Acme", "contact": "jo@example.com"},
            "count": 3,
            "notes": ["call 555-123-4567"]
        });

        let out = ContentSanitizer::new().sanitize_json(&value, &c);

        assert_eq!(out["companyInfo"]["name"], "Acme");
        assert_eq!(out["companyInfo"]["contact"], "[EMAIL_REDACTED]");
        assert_eq!(out["count"], 3);
        assert_eq!(out["notes"][0], "call [PHONE_REDACTED]");
    }

    fn sensitive_text() -> impl Strategy<Value = String> {
        let fragment = prop_oneof![
            Just("revenue".to_string()),
            Just("salary".to_string()),
            Just("jo.smith@example.org".to_string()),
            Just("555-123-4567".to_string()),
            Just("123-45-6789".to_string()),
            Just("4111 1111 1111 1111".to_string()),
            Just("$1.5M".to_string()),
            Just("42%".to_string()),
            Just(". ".to_string()),
            Just("\n".to_string()),
            "[a-z ]{0,12}",
            "[0-9 .,$-]{0,12}",
        ];
        prop::collection::vec(fragment, 0..12).prop_map(|parts| parts.join(" "))
    }

    proptest! {
        #[test]
        fn sanitize_is_idempotent(text in sensitive_text()) {
            let classification = PatternClassifier::default().classify(&text);
            let sanitizer = ContentSanitizer::new();
            let once = sanitizer.sanitize(&text, &classification);
            let twice = sanitizer.sanitize(&once, &classification);
            prop_assert_eq!(once, twice);
        }

        #[test]
        fn sanitized_pii_leaves_no_residual_matches(text in sensitive_text()) {
            let classification = PatternClassifier::default().classify(&text);
            prop_assume!(classification.pii_detected);
            let out = ContentSanitizer::new().sanitize(&text, &classification);
            prop_assert!(detect_pii(&out).is_empty(), "residual pii in {:?}", out);
        }
    }
}
