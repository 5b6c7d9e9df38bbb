//! StartWorkflowHandler - create a workflow of a given type on a thread.

use std::sync::Arc;

use crate::domain::foundation::{OrganizationId, ThreadId, UserId, WorkflowId};
use crate::domain::workflow::WorkflowType;

use super::{Advancement, RequestContext, WorkflowEngine, WorkflowEngineError};

/// Command to start a workflow
#[derive(Debug, Clone)]
pub struct StartWorkflowCommand {
    pub thread_id: ThreadId,
    pub workflow_type: WorkflowType,
    pub user_id: UserId,
    pub organization_id: OrganizationId,
    /// Create without posting the opening prompt or running any step.
    pub silent: bool,
}

/// Result of starting a workflow
#[derive(Debug, Clone, PartialEq)]
pub struct StartWorkflowResult {
    pub workflow_id: WorkflowId,
    pub workflow_type: WorkflowType,
    pub current_step: Option<String>,
    /// Initial prompt posted to the thread.
    pub opening_message: Option<String>,
    pub auto_executed: Vec<String>,
}

/// Handler for starting workflows
pub struct StartWorkflowHandler {
    engine: Arc<WorkflowEngine>,
}

impl StartWorkflowHandler {
    pub fn new(engine: Arc<WorkflowEngine>) -> Self {
        Self { engine }
    }

    pub async fn handle(
        &self,
        cmd: StartWorkflowCommand,
    ) -> Result<StartWorkflowResult, WorkflowEngineError> {
        let ctx = RequestContext::new(cmd.user_id, cmd.organization_id);

        // 1. Instantiate and persist
        let mut workflow = self
            .engine
            .create(cmd.thread_id, cmd.workflow_type, None)
            .await?;

        let mut result = StartWorkflowResult {
            workflow_id: workflow.id(),
            workflow_type: cmd.workflow_type,
            current_step: workflow.current_step().map(|s| s.name().to_string()),
            opening_message: None,
            auto_executed: Vec::new(),
        };
        if cmd.silent {
            return Ok(result);
        }

        // 2. Greet
        let initial_prompt = self
            .engine
            .templates()
            .for_type(cmd.workflow_type)
            .and_then(|t| t.initial_prompt.clone());
        if let Some(prompt) = initial_prompt {
            self.engine.post(cmd.thread_id, &prompt).await;
            result.opening_message = Some(prompt);
        }

        // 3. A first step flagged auto-execute runs right away
        let Some(first) = workflow.current_step_id() else {
            return Ok(result);
        };
        let mut advancement = Advancement {
            current_step: result.current_step.clone(),
            ..Advancement::default()
        };
        if self
            .engine
            .execute_if_auto(&mut workflow, first, &mut advancement, &ctx)
            .await?
        {
            let further = self.engine.advance(&mut workflow, &ctx).await?;
            advancement.auto_executed.extend(further.auto_executed);
            advancement.current_step = further.current_step;
            if further.workflow_completed {
                self.engine.record_learning(&workflow, &ctx).await;
            }
        }

        result.current_step = advancement.current_step;
        result.auto_executed = advancement.auto_executed;
        Ok(result)
    }
}
