//! Cross-workflow intent detection.
//!
//! Two independent paths look for a request to produce a different content
//! type: the user's own words ("now do a social post") and the model's
//! output proposing to start a named workflow. Either path only fires when
//! the requested type differs from the workflow currently running.

mod detector;

pub use detector::{CrossWorkflowIntent, IntentDetector, IntentSource};
