//! Step processing.
//!
//! A [`StepProcessor`] turns one user input (or the auto-execute sentinel)
//! into a reply plus the step metadata to persist. Processors never write
//! to the repository; the engine applies their result.
//!
//! - [`EnhancedStepProcessor`] - context retrieval, prompt injection and
//!   cross-workflow intent detection around the model call
//! - [`BaselineStepProcessor`] - the model call alone
//! - [`FallbackStepProcessor`] - runs one, falls back to the other, and
//!   turns a double failure into an explicit "please try again"

mod baseline;
mod enhanced;
mod fallback;
mod handlers;

pub use baseline::BaselineStepProcessor;
pub use enhanced::EnhancedStepProcessor;
pub use fallback::{FallbackStepProcessor, TRY_AGAIN_REPLY};
pub use handlers::{
    handler_for, DialogHandler, GenerationHandler, ReviewHandler, StepHandler, StepOutcome,
    StepTurn,
};

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::foundation::{OrganizationId, StepId, UserId};
use crate::domain::intent::CrossWorkflowIntent;
use crate::domain::workflow::{StepMetadata, Workflow, WorkflowStep, AUTO_EXECUTE_SENTINEL};
use crate::ports::{
    AIError, AIProvider, CompletionRequest, MessageRole, RequestMetadata,
};

/// Message sent to the model in place of a user turn for sentinel runs.
const SENTINEL_MESSAGE: &str = "Proceed with this step using the information above.";

/// One unit of step work.
#[derive(Debug, Clone)]
pub struct StepRequest {
    pub user_id: UserId,
    pub organization_id: OrganizationId,
    /// Snapshot taken after the engine validated the step is current.
    pub workflow: Workflow,
    pub step_id: StepId,
    /// Raw user input, or [`AUTO_EXECUTE_SENTINEL`].
    pub input: String,
    pub trace_id: String,
}

impl StepRequest {
    pub fn is_sentinel(&self) -> bool {
        self.input.trim() == AUTO_EXECUTE_SENTINEL
    }

    pub fn step(&self) -> Result<&WorkflowStep, StepProcessingError> {
        self.workflow
            .step(self.step_id)
            .ok_or(StepProcessingError::StepNotFound(self.step_id))
    }
}

/// What processing produced for one request.
#[derive(Debug, Clone, PartialEq)]
pub struct ProcessedStep {
    pub reply: String,
    pub complete: bool,
    /// Metadata to persist. `None` means nothing happened and the user was
    /// asked to try again.
    pub metadata: Option<StepMetadata>,
    pub intent: Option<CrossWorkflowIntent>,
    pub context_used: bool,
    /// Produced by the fallback path.
    pub degraded: bool,
}

impl ProcessedStep {
    pub fn from_outcome(outcome: StepOutcome) -> Self {
        Self {
            reply: outcome.reply,
            complete: outcome.complete,
            metadata: Some(outcome.metadata),
            intent: None,
            context_used: false,
            degraded: false,
        }
    }

    pub fn try_again() -> Self {
        Self {
            reply: TRY_AGAIN_REPLY.to_string(),
            complete: false,
            metadata: None,
            intent: None,
            context_used: false,
            degraded: true,
        }
    }

    pub fn is_try_again(&self) -> bool {
        self.metadata.is_none()
    }
}

#[derive(Debug, Error)]
pub enum StepProcessingError {
    #[error("Step not found in workflow snapshot: {0}")]
    StepNotFound(StepId),

    #[error("Model call failed: {0}")]
    Model(#[from] AIError),
}

#[async_trait]
pub trait StepProcessor: Send + Sync {
    async fn process(&self, request: &StepRequest) -> Result<ProcessedStep, StepProcessingError>;
}

/// Sends one step turn to the model and returns its text.
pub(crate) async fn call_model(
    ai: &dyn AIProvider,
    request: &StepRequest,
    step: &WorkflowStep,
    instructions: String,
    input: &str,
) -> Result<String, AIError> {
    let user_message = if request.is_sentinel() {
        SENTINEL_MESSAGE
    } else {
        input
    };
    let completion = CompletionRequest::new(RequestMetadata::new(
        request.user_id.clone(),
        request.workflow.id(),
        step.id(),
        request.trace_id.clone(),
    ))
    .with_system_prompt(instructions)
    .with_history(&step.metadata().history)
    .with_message(MessageRole::User, user_message)
    .with_step_kind(step.kind());

    let response = ai.complete(completion).await?;
    Ok(response.content)
}
