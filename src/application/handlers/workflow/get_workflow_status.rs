//! GetWorkflowStatusHandler - Query handler for workflow progress.
//!
//! Answers "what step are you on?" without touching the workflow.

use std::sync::Arc;

use crate::domain::foundation::{StepStatus, ThreadId, WorkflowId, WorkflowStatus};
use crate::domain::workflow::{Workflow, WorkflowType};
use crate::ports::WorkflowRepository;

use super::WorkflowEngineError;

/// Query for one workflow's status
#[derive(Debug, Clone)]
pub struct GetWorkflowStatusQuery {
    pub workflow_id: WorkflowId,
}

/// Read model of a workflow's progress
#[derive(Debug, Clone, PartialEq)]
pub struct WorkflowStatusView {
    pub workflow_id: WorkflowId,
    pub workflow_type: WorkflowType,
    pub status: WorkflowStatus,
    pub current_step: Option<String>,
    pub completed_steps: Vec<String>,
    pub pending_steps: Vec<String>,
}

impl From<&Workflow> for WorkflowStatusView {
    fn from(workflow: &Workflow) -> Self {
        Self {
            workflow_id: workflow.id(),
            workflow_type: workflow.workflow_type(),
            status: workflow.status(),
            current_step: workflow.current_step().map(|s| s.name().to_string()),
            completed_steps: workflow
                .completed_step_names()
                .into_iter()
                .map(str::to_string)
                .collect(),
            pending_steps: workflow
                .steps()
                .iter()
                .filter(|s| s.status() == StepStatus::Pending)
                .map(|s| s.name().to_string())
                .collect(),
        }
    }
}

/// Handler for workflow status queries
pub struct GetWorkflowStatusHandler {
    repository: Arc<dyn WorkflowRepository>,
}

impl GetWorkflowStatusHandler {
    pub fn new(repository: Arc<dyn WorkflowRepository>) -> Self {
        Self { repository }
    }

    pub async fn handle(
        &self,
        query: GetWorkflowStatusQuery,
    ) -> Result<WorkflowStatusView, WorkflowEngineError> {
        let workflow = self
            .repository
            .get_workflow(&query.workflow_id)
            .await?
            .ok_or(WorkflowEngineError::WorkflowNotFound(query.workflow_id))?;
        Ok(WorkflowStatusView::from(&workflow))
    }

    /// Most recently created active workflow on a thread.
    pub async fn active_on_thread(
        &self,
        thread_id: ThreadId,
    ) -> Result<Option<WorkflowStatusView>, WorkflowEngineError> {
        let workflows = self.repository.find_by_thread(&thread_id).await?;
        Ok(workflows
            .iter()
            .rev()
            .find(|w| w.is_active())
            .map(WorkflowStatusView::from))
    }
}
