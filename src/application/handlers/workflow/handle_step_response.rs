//! HandleStepResponseHandler - apply one user response to the current step.

use std::sync::Arc;

use crate::domain::foundation::{OrganizationId, StepId, UserId, WorkflowId};

use super::{NewWorkflow, RequestContext, WorkflowEngine, WorkflowEngineError};

/// Command carrying a user's response to a workflow step.
#[derive(Debug, Clone)]
pub struct HandleStepResponseCommand {
    pub workflow_id: WorkflowId,
    pub step_id: StepId,
    pub user_id: UserId,
    pub organization_id: OrganizationId,
    pub input: String,
}

/// Result of handling a step response.
#[derive(Debug, Clone, PartialEq)]
pub struct HandleStepResponseResult {
    /// Reply for the user's turn. Output of auto-executed steps is posted
    /// to the thread separately.
    pub reply: String,
    pub step_completed: bool,
    /// Step now waiting for the user, if the workflow is still running.
    pub current_step: Option<String>,
    pub workflow_completed: bool,
    pub new_workflow: Option<NewWorkflow>,
    pub auto_executed: Vec<String>,
    pub context_used: bool,
    /// The reply came from the unenhanced path, or is a request to retry.
    pub degraded: bool,
}

/// Handler for step responses
pub struct HandleStepResponseHandler {
    engine: Arc<WorkflowEngine>,
}

impl HandleStepResponseHandler {
    pub fn new(engine: Arc<WorkflowEngine>) -> Self {
        Self { engine }
    }

    pub async fn handle(
        &self,
        cmd: HandleStepResponseCommand,
    ) -> Result<HandleStepResponseResult, WorkflowEngineError> {
        let ctx = RequestContext::new(cmd.user_id, cmd.organization_id);

        // 1. Load the workflow
        let mut workflow = self.engine.load(cmd.workflow_id).await?;

        // 2. Finish any transition a previous request left half-applied
        if workflow.needs_recovery() {
            let recovered = self.engine.recover(&mut workflow, &ctx).await?;
            if recovered.map_or(false, |a| a.workflow_completed) {
                self.engine.record_learning(&workflow, &ctx).await;
            }
        }

        // 3. Never act on an inconsistent workflow
        self.engine.ensure_invariants(&workflow)?;

        // 4. The step must exist and be current
        let step = workflow
            .step(cmd.step_id)
            .ok_or(WorkflowEngineError::StepNotFound(cmd.step_id))?;
        if workflow.current_step_id() != Some(step.id()) || !step.status().is_in_progress() {
            tracing::warn!(
                workflow_id = %workflow.id(),
                step_id = %cmd.step_id,
                step_status = %step.status(),
                "Response for a step that is not current"
            );
            return Err(WorkflowEngineError::StepNotCurrent {
                workflow_id: workflow.id(),
                step_id: cmd.step_id,
            });
        }
        let step_name = step.name().to_string();

        // 5. Process the turn
        let processed = self
            .engine
            .process(&workflow, cmd.step_id, &cmd.input, &ctx)
            .await;
        let mut result = HandleStepResponseResult {
            reply: processed.reply,
            step_completed: false,
            current_step: Some(step_name),
            workflow_completed: false,
            new_workflow: None,
            auto_executed: Vec::new(),
            context_used: processed.context_used,
            degraded: processed.degraded,
        };

        // 6. Nothing to persist: the user was asked to try again
        let Some(metadata) = processed.metadata else {
            return Ok(result);
        };

        // 7. A request for another content type ends this workflow
        if let Some(intent) = processed.intent {
            let created = self
                .engine
                .switch(&mut workflow, cmd.step_id, metadata, intent.target, &ctx)
                .await?;
            result.step_completed = true;
            result.workflow_completed = true;
            result.current_step = None;
            result.new_workflow = Some(created);
            self.engine.record_learning(&workflow, &ctx).await;
            return Ok(result);
        }

        // 8. Still collecting: keep the step
        if !processed.complete {
            self.engine
                .save_progress(&mut workflow, cmd.step_id, metadata)
                .await?;
            return Ok(result);
        }

        // 9. Complete and move on
        self.engine
            .complete_step(&mut workflow, cmd.step_id, metadata)
            .await?;
        let advancement = self.engine.advance(&mut workflow, &ctx).await?;

        result.step_completed = true;
        result.current_step = advancement.current_step;
        result.workflow_completed = advancement.workflow_completed;
        result.new_workflow = advancement.new_workflow;
        result.auto_executed = advancement.auto_executed;

        if result.workflow_completed {
            self.engine.record_learning(&workflow, &ctx).await;
        }
        Ok(result)
    }
}
