//! Security domain - classification and sanitization of text bound for prompts.
//!
//! # Components
//!
//! - `SecurityLevel` / `SecurityTag` - closed vocabulary for verdicts
//! - `SecurityClassification` - value object produced per classified text
//! - `PatternClassifier` - deterministic PII and keyword scoring
//! - `ContentSanitizer` - idempotent redaction driven by a classification
//!
//! Nothing in this module performs I/O. The async classifier that consults an
//! optional upstream service lives in the application layer.

mod classification;
mod classifier;
mod level;
pub mod patterns;
mod sanitizer;
mod tags;

pub use classification::{AssetType, ContentOrigin, SecurityClassification};
pub use classifier::PatternClassifier;
pub use level::SecurityLevel;
pub use sanitizer::{ContentSanitizer, MAX_SANITIZE_LENGTH, REDACTION_MARKER};
pub use tags::{SecurityTag, SecurityTags};
