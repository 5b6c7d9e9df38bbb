//! StepStatus enum for tracking progress of workflow steps.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::StateMachine;

/// Progress of a single workflow step.
///
/// Transitions are monotonic: `Pending -> InProgress -> Complete`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum StepStatus {
    #[default]
    Pending,
    InProgress,
    Complete,
}

impl StepStatus {
    /// Returns true if work has begun on this step.
    pub fn is_started(&self) -> bool {
        !matches!(self, StepStatus::Pending)
    }

    /// Returns true if the step is finished.
    pub fn is_complete(&self) -> bool {
        matches!(self, StepStatus::Complete)
    }

    /// Returns true if this is the active step.
    pub fn is_in_progress(&self) -> bool {
        matches!(self, StepStatus::InProgress)
    }
}

impl StateMachine for StepStatus {
    fn can_transition_to(&self, target: &Self) -> bool {
        use StepStatus::*;
        matches!((self, target), (Pending, InProgress) | (InProgress, Complete))
    }

    fn valid_transitions(&self) -> Vec<Self> {
        use StepStatus::*;
        match self {
            Pending => vec![InProgress],
            InProgress => vec![Complete],
            Complete => vec![],
        }
    }
}

impl fmt::Display for StepStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            StepStatus::Pending => "pending",
            StepStatus::InProgress => "in_progress",
            StepStatus::Complete => "complete",
        };
        write!(f, "{}", s)
    }
}
