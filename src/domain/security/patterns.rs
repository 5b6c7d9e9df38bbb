//! PII signatures and sensitive-keyword lexicons.
//!
//! Shared by the classifier (detection) and the sanitizer (redaction) so the
//! two can never disagree about what counts as a match.

use once_cell::sync::Lazy;
use regex::Regex;

use super::SecurityTag;

static EMAIL_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)[a-z0-9._%+\-]+@[a-z0-9\-]+(?:\.[a-z0-9\-]+)*\.[a-z]{2,}").unwrap()
});

/// 10-digit numbers with optional country code and separators.
static PHONE_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?:\+\d{1,3}[\s.\-]?)?(?:\(\d{3}\)|\b\d{3})[\s.\-]?\d{3}[\s.\-]?\d{4}\b").unwrap()
});

/// 3-2-4 digit groups (SSN-like national identifiers).
static NATIONAL_ID_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b\d{3}[\s\-]\d{2}[\s\-]\d{4}\b").unwrap());

/// 13 to 19 digits, optionally separated by single spaces or dashes.
static PAYMENT_CARD_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b(?:\d[ \-]?){12,18}\d\b").unwrap());

static FINANCIAL_LEXICON: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)\b(?:revenue|profits?|margins?|salary|salaries|payroll|budgets?|invoices?|bank account|account number|routing number|earnings|ebitda|valuation|funding round|burn rate|forecasts?)\b",
    )
    .unwrap()
});

static LEGAL_LEXICON: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)\b(?:lawsuits?|litigation|settlement|subpoena|non-disclosure|nda|attorney-client|privileged|legal hold|indemnif\w*|breach of contract)\b",
    )
    .unwrap()
});

static HR_LEXICON: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)\b(?:performance reviews?|disciplinary|terminations?|layoffs?|severance|grievances?|medical leave|background checks?|compensation)\b",
    )
    .unwrap()
});

static INTERNAL_SYSTEM_LEXICON: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)\b(?:internal dashboard|admin panel|staging server|intranet|vpn|api keys?|access tokens?|passwords?|credentials|database dump)\b",
    )
    .unwrap()
});

/// Currency amounts and numbers with a magnitude or percentage suffix, plus bare numbers.
static AMOUNT_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)[$€£]\s?\d[\d,]*(?:\.\d+)?(?:\s?(?:k|m|bn|million|billion|thousand)\b)?|\b\d[\d,]*(?:\.\d+)?(?:\s?(?:%|percent\b|k\b|m\b|bn\b|million\b|billion\b|thousand\b))?",
    )
    .unwrap()
});

/// Sentence terminators: punctuation followed by whitespace or end of text, or a newline.
static SENTENCE_END: Lazy<Regex> = Lazy::new(|| Regex::new(r"[.!?]+(?:\s+|$)|\n+").unwrap());

/// Category of personally identifiable information.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PiiKind {
    PaymentCard,
    NationalId,
    Email,
    Phone,
}

impl PiiKind {
    /// Order in which redaction runs: long digit runs first so shorter
    /// signatures never carve them up.
    pub const REDACTION_ORDER: [PiiKind; 4] = [
        PiiKind::PaymentCard,
        PiiKind::NationalId,
        PiiKind::Email,
        PiiKind::Phone,
    ];

    pub fn pattern(&self) -> &'static Regex {
        match self {
            PiiKind::PaymentCard => &PAYMENT_CARD_PATTERN,
            PiiKind::NationalId => &NATIONAL_ID_PATTERN,
            PiiKind::Email => &EMAIL_PATTERN,
            PiiKind::Phone => &PHONE_PATTERN,
        }
    }

    pub fn tag(&self) -> SecurityTag {
        match self {
            PiiKind::PaymentCard => SecurityTag::PaymentCard,
            PiiKind::NationalId => SecurityTag::NationalId,
            PiiKind::Email => SecurityTag::Email,
            PiiKind::Phone => SecurityTag::Phone,
        }
    }

    /// Typed placeholder substituted for a match.
    pub fn placeholder(&self) -> &'static str {
        match self {
            PiiKind::PaymentCard => "[CARD_REDACTED]",
            PiiKind::NationalId => "[NATIONAL_ID_REDACTED]",
            PiiKind::Email => "[EMAIL_REDACTED]",
            PiiKind::Phone => "[PHONE_REDACTED]",
        }
    }

    /// High-risk classes force `restricted` rather than `confidential`.
    pub fn is_high_risk(&self) -> bool {
        matches!(self, PiiKind::PaymentCard | PiiKind::NationalId)
    }
}

/// Category of sensitive business vocabulary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SensitiveCategory {
    Financial,
    Legal,
    HumanResources,
    InternalSystem,
}

impl SensitiveCategory {
    pub const ALL: [SensitiveCategory; 4] = [
        SensitiveCategory::Financial,
        SensitiveCategory::Legal,
        SensitiveCategory::HumanResources,
        SensitiveCategory::InternalSystem,
    ];

    pub fn lexicon(&self) -> &'static Regex {
        match self {
            SensitiveCategory::Financial => &FINANCIAL_LEXICON,
            SensitiveCategory::Legal => &LEGAL_LEXICON,
            SensitiveCategory::HumanResources => &HR_LEXICON,
            SensitiveCategory::InternalSystem => &INTERNAL_SYSTEM_LEXICON,
        }
    }

    pub fn tag(&self) -> SecurityTag {
        match self {
            SensitiveCategory::Financial => SecurityTag::Financial,
            SensitiveCategory::Legal => SecurityTag::Legal,
            SensitiveCategory::HumanResources => SecurityTag::HumanResources,
            SensitiveCategory::InternalSystem => SecurityTag::InternalSystem,
        }
    }
}

/// Placeholder for amounts found next to sensitive vocabulary.
pub const AMOUNT_PLACEHOLDER: &str = "[AMOUNT_REDACTED]";

/// Returns every PII kind present in `text`, in redaction order.
pub fn detect_pii(text: &str) -> Vec<PiiKind> {
    PiiKind::REDACTION_ORDER
        .into_iter()
        .filter(|kind| kind.pattern().is_match(text))
        .collect()
}

/// Returns every sensitive category whose lexicon matches `text`.
pub fn detect_sensitive(text: &str) -> Vec<SensitiveCategory> {
    SensitiveCategory::ALL
        .into_iter()
        .filter(|category| category.lexicon().is_match(text))
        .collect()
}

/// True if any sensitive lexicon matches.
pub fn mentions_sensitive_topic(text: &str) -> bool {
    SensitiveCategory::ALL
        .iter()
        .any(|category| category.lexicon().is_match(text))
}

pub(crate) fn amount_pattern() -> &'static Regex {
    &AMOUNT_PATTERN
}

/// Splits text into sentences, each keeping its trailing terminator and whitespace.
///
/// Concatenating the returned slices reproduces the input exactly.
pub fn sentences(text: &str) -> Vec<&str> {
    let mut out = Vec::new();
    let mut start = 0;
    for m in SENTENCE_END.find_iter(text) {
        if m.end() > start {
            out.push(&text[start..m.end()]);
            start = m.end();
        }
    }
    if start < text.len() {
        out.push(&text[start..]);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_email() {
        assert_eq!(detect_pii("mail jane.doe@acme.io today"), vec![PiiKind::Email]);
    }

    #[test]
    fn detects_phone_formats() {
        assert!(PiiKind::Phone.pattern().is_match("call 555-123-4567"));
        assert!(PiiKind::Phone.pattern().is_match("call (555) 123-4567"));
        assert!(PiiKind::Phone.pattern().is_match("call +1 555 123 4567"));
    }

    #[test]
    fn detects_national_id_without_phone() {
        let found = detect_pii("ssn 123-45-6789");
        assert_eq!(found, vec![PiiKind::NationalId]);
    }

    #[test]
    fn detects_payment_card_with_separators() {
        assert!(PiiKind::PaymentCard.pattern().is_match("4111 1111 1111 1111"));
        assert!(PiiKind::PaymentCard.pattern().is_match("4111-1111-1111-1111"));
        assert!(PiiKind::PaymentCard.pattern().is_match("4111111111111111"));
    }

    #[test]
    fn plain_text_has_no_signals() {
        assert!(detect_pii("We launch the spring collection next week").is_empty());
        assert!(detect_sensitive("We launch the spring collection next week").is_empty());
    }

    #[test]
    fn lexicons_are_case_insensitive() {
        assert_eq!(
            detect_sensitive("Q3 REVENUE grew"),
            vec![SensitiveCategory::Financial]
        );
        assert_eq!(
            detect_sensitive("pending Litigation and a layoff"),
            vec![SensitiveCategory::Legal, SensitiveCategory::HumanResources]
        );
    }

    #[test]
    fn lexicons_respect_word_boundaries() {
        assert!(detect_sensitive("the agenda for today").is_empty());
    }

    #[test]
    fn amount_pattern_matches_currency_and_magnitudes() {
        let re = amount_pattern();
        assert!(re.is_match("$1.5M"));
        assert!(re.is_match("€ 200"));
        assert!(re.is_match("12%"));
        assert!(re.is_match("3 million"));
        assert!(!re.is_match("Q three"));
    }

    #[test]
    fn sentences_reassemble_to_input() {
        let text = "Revenue hit $1.5M. Great news!\nNext line";
        let parts = sentences(text);
        assert_eq!(parts.concat(), text);
        assert_eq!(parts.len(), 3);
        assert_eq!(parts[0], "Revenue hit $1.5M. ");
    }

    #[test]
    fn placeholders_contain_no_signals() {
        for kind in PiiKind::REDACTION_ORDER {
            assert!(detect_pii(kind.placeholder()).is_empty());
            assert!(detect_sensitive(kind.placeholder()).is_empty());
        }
        assert!(!amount_pattern().is_match(AMOUNT_PLACEHOLDER));
    }
}
