use serde::{Deserialize, Serialize};
use std::fmt;

/// What a step does with a user turn.
///
/// Step behavior is dispatched on this tag, never on the step name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepKind {
    /// Collects structured information through conversation.
    Dialog,
    /// Produces an artifact from collected information.
    Generation,
    /// Presents the latest artifact and completes on approval.
    Review,
}

impl fmt::Display for StepKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            StepKind::Dialog => "dialog",
            StepKind::Generation => "generation",
            StepKind::Review => "review",
        };
        write!(f, "{}", s)
    }
}
