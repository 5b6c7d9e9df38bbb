//! WorkflowEngine - step transitions shared by the workflow handlers.
//!
//! Every persistence write is a single repository call, ordered so that a
//! crash between two calls leaves a workflow the engine can recover:
//!
//! 1. complete the step (compare-and-set on `in_progress`, with metadata)
//! 2. start the next step
//! 3. move the current-step pointer
//!
//! Completion clears the pointer before the status flips to `completed`.
//! A local copy of the workflow mirrors each successful write so later
//! decisions in the same request see the new state without a reload.

use serde_json::Value;
use std::sync::Arc;
use uuid::Uuid;

use crate::adapters::ai::{RetryPolicy, RetryingAIProvider};
use crate::application::step_processing::{
    BaselineStepProcessor, EnhancedStepProcessor, FallbackStepProcessor, ProcessedStep,
    StepProcessor, StepRequest,
};
use crate::application::{ContextRetrievalCoordinator, LearningRecorder, SecurityClassifier};
use crate::config::AppConfig;
use crate::domain::foundation::{
    ErrorCode, OrganizationId, StepId, StepStatus, ThreadId, UserId, WorkflowId, WorkflowStatus,
};
use crate::domain::security::ContentSanitizer;
use crate::domain::workflow::{
    CarryoverContext, StepMetadata, StepPatch, TemplateRegistry, Workflow, WorkflowType,
    AUTO_EXECUTE_SENTINEL,
};
use crate::ports::{
    AIProvider, ClassificationService, MessageDelivery, ProfileStore, SemanticSearch,
    WorkflowRepository,
};

use super::WorkflowEngineError;

/// Who a request acts for.
#[derive(Debug, Clone)]
pub struct RequestContext {
    pub user_id: UserId,
    pub organization_id: OrganizationId,
    pub trace_id: String,
}

impl RequestContext {
    pub fn new(user_id: UserId, organization_id: OrganizationId) -> Self {
        Self {
            user_id,
            organization_id,
            trace_id: Uuid::new_v4().to_string(),
        }
    }

    pub fn with_trace_id(mut self, trace_id: impl Into<String>) -> Self {
        self.trace_id = trace_id.into();
        self
    }
}

/// Why a workflow was created as a side effect of a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NewWorkflowReason {
    /// The previous workflow finished; a base workflow keeps the thread usable.
    Renewal,
    /// The user asked for a different content type.
    Switch,
}

/// A workflow created as a side effect of a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewWorkflow {
    pub workflow_id: WorkflowId,
    pub workflow_type: WorkflowType,
    pub reason: NewWorkflowReason,
    pub carryover_applied: bool,
}

/// What advancing a workflow did.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Advancement {
    /// Name of the step now waiting for the user.
    pub current_step: Option<String>,
    /// Steps run with the auto-execute sentinel, in order.
    pub auto_executed: Vec<String>,
    pub workflow_completed: bool,
    pub new_workflow: Option<NewWorkflow>,
}

/// Collaborators needed to assemble an engine from configuration.
pub struct EnginePorts {
    pub repository: Arc<dyn WorkflowRepository>,
    pub search: Arc<dyn SemanticSearch>,
    pub profiles: Arc<dyn ProfileStore>,
    pub ai: Arc<dyn AIProvider>,
    pub delivery: Arc<dyn MessageDelivery>,
    pub upstream_classifier: Option<Arc<dyn ClassificationService>>,
}

pub struct WorkflowEngine {
    repository: Arc<dyn WorkflowRepository>,
    templates: Arc<TemplateRegistry>,
    processor: Arc<dyn StepProcessor>,
    delivery: Arc<dyn MessageDelivery>,
    classifier: Arc<SecurityClassifier>,
    learning: LearningRecorder,
    sanitizer: ContentSanitizer,
}

impl WorkflowEngine {
    pub fn new(
        repository: Arc<dyn WorkflowRepository>,
        templates: Arc<TemplateRegistry>,
        processor: Arc<dyn StepProcessor>,
        delivery: Arc<dyn MessageDelivery>,
        classifier: Arc<SecurityClassifier>,
        learning: LearningRecorder,
    ) -> Self {
        Self {
            repository,
            templates,
            processor,
            delivery,
            classifier,
            learning,
            sanitizer: ContentSanitizer::new(),
        }
    }

    /// Wires the full processing stack: retrying model calls, the enhanced
    /// processor with its context coordinator, and the baseline fallback.
    pub fn from_config(config: &AppConfig, templates: TemplateRegistry, ports: EnginePorts) -> Self {
        let mut classifier = SecurityClassifier::from_config(&config.security, &config.retrieval);
        if let Some(upstream) = ports.upstream_classifier {
            classifier = classifier.with_upstream(upstream);
        }
        let classifier = Arc::new(classifier);

        let ai: Arc<dyn AIProvider> = Arc::new(RetryingAIProvider::new(
            ports.ai,
            RetryPolicy::from_config(&config.engine),
        ));
        let coordinator = Arc::new(ContextRetrievalCoordinator::new(
            ports.search,
            ports.profiles.clone(),
            classifier.clone(),
            &config.retrieval,
        ));
        let processor = Arc::new(FallbackStepProcessor::new(
            Arc::new(EnhancedStepProcessor::new(ai.clone(), coordinator)),
            Arc::new(BaselineStepProcessor::new(ai)),
        ));
        let learning = LearningRecorder::new(ports.profiles, config.learning.clone())
            .with_mode(config.engine.learning_mode);

        Self::new(
            ports.repository,
            Arc::new(templates),
            processor,
            ports.delivery,
            classifier,
            learning,
        )
    }

    pub fn templates(&self) -> &TemplateRegistry {
        &self.templates
    }

    pub fn repository(&self) -> &Arc<dyn WorkflowRepository> {
        &self.repository
    }

    pub(crate) async fn load(&self, id: WorkflowId) -> Result<Workflow, WorkflowEngineError> {
        self.repository
            .get_workflow(&id)
            .await?
            .ok_or(WorkflowEngineError::WorkflowNotFound(id))
    }

    /// Rejects the request, untouched, when the stored workflow is inconsistent.
    pub(crate) fn ensure_invariants(&self, workflow: &Workflow) -> Result<(), WorkflowEngineError> {
        workflow.check_invariants().map_err(|err| {
            tracing::error!(
                workflow_id = %workflow.id(),
                thread_id = %workflow.thread_id(),
                error = %err,
                "Workflow invariant violated, rejecting request"
            );
            WorkflowEngineError::InvariantViolation {
                workflow_id: workflow.id(),
                message: err.message,
            }
        })
    }

    /// Runs one step turn. Never fails: processing errors become a
    /// "please try again" reply.
    pub(crate) async fn process(
        &self,
        workflow: &Workflow,
        step_id: StepId,
        input: &str,
        ctx: &RequestContext,
    ) -> ProcessedStep {
        let request = StepRequest {
            user_id: ctx.user_id.clone(),
            organization_id: ctx.organization_id.clone(),
            workflow: workflow.clone(),
            step_id,
            input: input.to_string(),
            trace_id: ctx.trace_id.clone(),
        };
        match self.processor.process(&request).await {
            Ok(processed) => processed,
            Err(err) => {
                tracing::warn!(
                    workflow_id = %workflow.id(),
                    step_id = %step_id,
                    error = %err,
                    "Step processing failed"
                );
                ProcessedStep::try_again()
            }
        }
    }

    /// Compare-and-set `in_progress -> complete` with the final metadata.
    pub(crate) async fn complete_step(
        &self,
        workflow: &mut Workflow,
        step_id: StepId,
        metadata: StepMetadata,
    ) -> Result<(), WorkflowEngineError> {
        let patch =
            StepPatch::transition(StepStatus::InProgress, StepStatus::Complete).with_metadata(metadata);
        self.write_step(workflow, step_id, patch).await?;
        tracing::info!(workflow_id = %workflow.id(), step_id = %step_id, "Step completed");
        Ok(())
    }

    /// Persists metadata of a step that stays in progress.
    pub(crate) async fn save_progress(
        &self,
        workflow: &mut Workflow,
        step_id: StepId,
        metadata: StepMetadata,
    ) -> Result<(), WorkflowEngineError> {
        let patch = StepPatch::metadata(metadata).expecting(StepStatus::InProgress);
        self.write_step(workflow, step_id, patch).await
    }

    async fn write_step(
        &self,
        workflow: &mut Workflow,
        step_id: StepId,
        patch: StepPatch,
    ) -> Result<(), WorkflowEngineError> {
        match self.repository.update_step(&step_id, patch.clone()).await {
            Ok(_) => {
                workflow.apply_step_patch(step_id, patch)?;
                Ok(())
            }
            Err(err) if err.code == ErrorCode::ConcurrentModification => {
                tracing::warn!(
                    workflow_id = %workflow.id(),
                    step_id = %step_id,
                    "Step changed by a concurrent request, rejecting as conflict"
                );
                Err(WorkflowEngineError::StepNotCurrent {
                    workflow_id: workflow.id(),
                    step_id,
                })
            }
            Err(err) => Err(err.into()),
        }
    }

    async fn point_at(
        &self,
        workflow: &mut Workflow,
        step_id: Option<StepId>,
    ) -> Result<(), WorkflowEngineError> {
        self.repository
            .update_workflow_current_step(&workflow.id(), step_id)
            .await?;
        workflow.set_current_step(step_id)?;
        Ok(())
    }

    /// Starts the next eligible step and runs auto-execute steps until one
    /// needs the user. With no step left the workflow completes and a base
    /// workflow is created on the thread.
    pub(crate) async fn advance(
        &self,
        workflow: &mut Workflow,
        ctx: &RequestContext,
    ) -> Result<Advancement, WorkflowEngineError> {
        let mut advancement = Advancement::default();
        loop {
            let next = workflow
                .next_eligible_step()
                .map(|s| (s.id(), s.name().to_string()));
            let Some((step_id, name)) = next else {
                self.finish(workflow).await?;
                advancement.current_step = None;
                advancement.workflow_completed = true;
                advancement.new_workflow = Some(self.renew(workflow.thread_id()).await?);
                return Ok(advancement);
            };

            self.write_step(
                workflow,
                step_id,
                StepPatch::transition(StepStatus::Pending, StepStatus::InProgress),
            )
            .await?;
            self.point_at(workflow, Some(step_id)).await?;
            tracing::info!(
                workflow_id = %workflow.id(),
                step_id = %step_id,
                step = %name,
                "Step started"
            );
            advancement.current_step = Some(name);

            if !self.execute_if_auto(workflow, step_id, &mut advancement, ctx).await? {
                return Ok(advancement);
            }
        }
    }

    /// Runs the step with the auto-execute sentinel when it is flagged for
    /// it, posting the output to the thread. Returns true when the step
    /// completed and the caller should advance further.
    pub(crate) async fn execute_if_auto(
        &self,
        workflow: &mut Workflow,
        step_id: StepId,
        advancement: &mut Advancement,
        ctx: &RequestContext,
    ) -> Result<bool, WorkflowEngineError> {
        let Some(step) = workflow.step(step_id) else {
            return Err(WorkflowEngineError::StepNotFound(step_id));
        };
        if !step.is_auto_execute() {
            return Ok(false);
        }
        let name = step.name().to_string();

        let processed = self.process(workflow, step_id, AUTO_EXECUTE_SENTINEL, ctx).await;
        self.post(workflow.thread_id(), &processed.reply).await;
        let Some(metadata) = processed.metadata else {
            return Ok(false);
        };
        advancement.auto_executed.push(name);

        if !processed.complete {
            self.save_progress(workflow, step_id, metadata).await?;
            return Ok(false);
        }
        self.complete_step(workflow, step_id, metadata).await?;
        Ok(true)
    }

    /// Clears the pointer, then marks the workflow completed.
    ///
    /// The status write succeeds for exactly one request; a request that
    /// loses the race gets `AlreadyCompleted` and must not renew the thread
    /// or record learning.
    async fn finish(&self, workflow: &mut Workflow) -> Result<(), WorkflowEngineError> {
        self.point_at(workflow, None).await?;
        match self
            .repository
            .update_workflow_status(&workflow.id(), WorkflowStatus::Completed)
            .await
        {
            Ok(()) => {}
            Err(err) if err.code == ErrorCode::ConcurrentModification => {
                tracing::warn!(
                    workflow_id = %workflow.id(),
                    thread_id = %workflow.thread_id(),
                    "Workflow completed by a concurrent request, rejecting as conflict"
                );
                return Err(WorkflowEngineError::AlreadyCompleted(workflow.id()));
            }
            Err(err) => return Err(err.into()),
        }
        workflow.set_status(WorkflowStatus::Completed)?;
        tracing::info!(
            workflow_id = %workflow.id(),
            thread_id = %workflow.thread_id(),
            workflow_type = workflow.workflow_type().key(),
            "Workflow completed"
        );
        Ok(())
    }

    async fn renew(&self, thread_id: ThreadId) -> Result<NewWorkflow, WorkflowEngineError> {
        let created = self.create(thread_id, WorkflowType::Base, None).await?;
        Ok(NewWorkflow {
            workflow_id: created.id(),
            workflow_type: WorkflowType::Base,
            reason: NewWorkflowReason::Renewal,
            carryover_applied: false,
        })
    }

    /// Completes the current workflow on a detected intent and creates the
    /// target workflow with sanitized carryover. Replaces the renewal path.
    pub(crate) async fn switch(
        &self,
        workflow: &mut Workflow,
        step_id: StepId,
        metadata: StepMetadata,
        target: WorkflowType,
        ctx: &RequestContext,
    ) -> Result<NewWorkflow, WorkflowEngineError> {
        // 1. The step ends with this turn's data
        self.complete_step(workflow, step_id, metadata).await?;

        // 2. Close the source workflow
        self.finish(workflow).await?;

        // 3. Carryover, when a company name is recoverable
        let carryover = match CarryoverContext::extract(workflow) {
            Some(context) => Some(self.sanitize_carryover(context.to_json()).await),
            None => None,
        };

        // 4. Target workflow, created without its initial prompt
        let source: &Workflow = workflow;
        let created = self
            .create(source.thread_id(), target, carryover.map(|c| (c, source)))
            .await?;
        let carryover_applied = created
            .first_dialog_step()
            .map_or(false, |s| s.metadata().carryover_from_workflow.is_some());

        tracing::info!(
            workflow_id = %source.id(),
            new_workflow_id = %created.id(),
            thread_id = %source.thread_id(),
            user_id = %ctx.user_id,
            target = target.key(),
            carryover_applied,
            "Switched workflow"
        );

        Ok(NewWorkflow {
            workflow_id: created.id(),
            workflow_type: target,
            reason: NewWorkflowReason::Switch,
            carryover_applied,
        })
    }

    async fn sanitize_carryover(&self, raw: Value) -> Value {
        let verdict = self.classifier.classify(&raw.to_string()).await;
        self.sanitizer.sanitize_json(&raw, &verdict)
    }

    /// Instantiates and stores a workflow. Nothing is posted.
    pub(crate) async fn create(
        &self,
        thread_id: ThreadId,
        workflow_type: WorkflowType,
        carryover: Option<(Value, &Workflow)>,
    ) -> Result<Workflow, WorkflowEngineError> {
        let template = self
            .templates
            .require(workflow_type)
            .map_err(|_| WorkflowEngineError::TemplateNotFound(workflow_type))?;
        let mut workflow = Workflow::instantiate(template, thread_id);
        if let Some((value, source)) = carryover {
            workflow.apply_carryover(value, source.id(), source.workflow_type());
        }

        self.repository.create_workflow(&workflow).await?;
        tracing::info!(
            workflow_id = %workflow.id(),
            thread_id = %thread_id,
            workflow_type = workflow_type.key(),
            "Workflow created"
        );
        Ok(workflow)
    }

    /// Finishes a transition interrupted between its writes.
    ///
    /// Returns the advancement when the engine had to move the workflow on.
    pub(crate) async fn recover(
        &self,
        workflow: &mut Workflow,
        ctx: &RequestContext,
    ) -> Result<Option<Advancement>, WorkflowEngineError> {
        tracing::warn!(
            workflow_id = %workflow.id(),
            thread_id = %workflow.thread_id(),
            "Recovering interrupted transition"
        );
        if let Some(active) = workflow.in_progress_step().map(|s| s.id()) {
            self.point_at(workflow, Some(active)).await?;
            return Ok(None);
        }
        self.advance(workflow, ctx).await.map(Some)
    }

    pub(crate) async fn post(&self, thread_id: ThreadId, text: &str) {
        if let Err(err) = self.delivery.post_message(&thread_id, text).await {
            tracing::warn!(thread_id = %thread_id, error = %err, "Message delivery failed");
        }
    }

    /// Hands a finished workflow to the learning recorder. Never fails.
    pub(crate) async fn record_learning(&self, workflow: &Workflow, ctx: &RequestContext) {
        self.learning
            .dispatch(workflow, &ctx.user_id, &ctx.organization_id)
            .await;
    }
}
