//! WorkflowStatus enum for tracking lifecycle of workflow instances.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::StateMachine;

/// Lifecycle status of a workflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum WorkflowStatus {
    #[default]
    InProgress,
    Completed,
}

impl WorkflowStatus {
    /// Returns true if the workflow can still accept step responses.
    pub fn is_active(&self) -> bool {
        matches!(self, WorkflowStatus::InProgress)
    }
}

impl StateMachine for WorkflowStatus {
    fn can_transition_to(&self, target: &Self) -> bool {
        matches!(
            (self, target),
            (WorkflowStatus::InProgress, WorkflowStatus::Completed)
        )
    }

    fn valid_transitions(&self) -> Vec<Self> {
        match self {
            WorkflowStatus::InProgress => vec![WorkflowStatus::Completed],
            WorkflowStatus::Completed => vec![],
        }
    }
}

impl fmt::Display for WorkflowStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            WorkflowStatus::InProgress => "in_progress",
            WorkflowStatus::Completed => "completed",
        };
        write!(f, "{}", s)
    }
}
