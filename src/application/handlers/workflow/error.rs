//! Errors surfaced by workflow handlers.

use thiserror::Error;

use crate::domain::foundation::{DomainError, ErrorCode, StepId, WorkflowId};
use crate::domain::workflow::WorkflowType;

#[derive(Debug, Error)]
pub enum WorkflowEngineError {
    #[error("Workflow not found: {0}")]
    WorkflowNotFound(WorkflowId),

    #[error("Step not found: {0}")]
    StepNotFound(StepId),

    /// The step is no longer (or not yet) the workflow's current step.
    /// The client should resync.
    #[error("Step {step_id} is not the current step of workflow {workflow_id}")]
    StepNotCurrent {
        workflow_id: WorkflowId,
        step_id: StepId,
    },

    /// Another request closed the workflow first.
    #[error("Workflow {0} was already completed by another request")]
    AlreadyCompleted(WorkflowId),

    #[error("No template registered for workflow type {0}")]
    TemplateNotFound(WorkflowType),

    #[error("Workflow {workflow_id} violates an invariant: {message}")]
    InvariantViolation {
        workflow_id: WorkflowId,
        message: String,
    },

    #[error("Persistence error: {0}")]
    Persistence(DomainError),
}

impl WorkflowEngineError {
    pub fn code(&self) -> ErrorCode {
        match self {
            WorkflowEngineError::WorkflowNotFound(_) => ErrorCode::WorkflowNotFound,
            WorkflowEngineError::StepNotFound(_) => ErrorCode::StepNotFound,
            WorkflowEngineError::StepNotCurrent { .. } => ErrorCode::StepNotCurrent,
            WorkflowEngineError::AlreadyCompleted(_) => ErrorCode::WorkflowCompleted,
            WorkflowEngineError::TemplateNotFound(_) => ErrorCode::TemplateNotFound,
            WorkflowEngineError::InvariantViolation { .. } => ErrorCode::InvariantViolation,
            WorkflowEngineError::Persistence(err) => err.code,
        }
    }

    /// True for conflicts the client resolves by reloading.
    pub fn is_conflict(&self) -> bool {
        matches!(
            self,
            WorkflowEngineError::StepNotCurrent { .. } | WorkflowEngineError::AlreadyCompleted(_)
        )
    }
}

impl From<DomainError> for WorkflowEngineError {
    fn from(err: DomainError) -> Self {
        WorkflowEngineError::Persistence(err)
    }
}
