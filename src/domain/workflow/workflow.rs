//! Workflow aggregate - a template instance bound to a conversation thread.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::domain::foundation::{
    DomainError, ErrorCode, StateMachine, StepId, StepStatus, TemplateId, ThreadId, Timestamp,
    WorkflowId, WorkflowStatus,
};

use super::{StepKind, StepPatch, WorkflowStep, WorkflowTemplate, WorkflowType};

/// A running workflow.
///
/// Invariants:
/// - at most one step is `in_progress`
/// - `current_step_id`, when set, names a step of this workflow that is
///   `in_progress`, or `complete` while an advancement is still pending
/// - a completed workflow has no `in_progress` step and no current step
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Workflow {
    id: WorkflowId,
    template_id: TemplateId,
    workflow_type: WorkflowType,
    thread_id: ThreadId,
    status: WorkflowStatus,
    current_step_id: Option<StepId>,
    steps: Vec<WorkflowStep>,
    created_at: Timestamp,
    completed_at: Option<Timestamp>,
}

impl Workflow {
    /// Creates a workflow from a template with its first eligible step
    /// already `in_progress` and current.
    pub fn instantiate(template: &WorkflowTemplate, thread_id: ThreadId) -> Self {
        let id = WorkflowId::new();
        let steps = template
            .steps
            .iter()
            .enumerate()
            .map(|(order, spec)| WorkflowStep::from_spec(id, order as u32, spec))
            .collect();

        let mut workflow = Self {
            id,
            template_id: template.id,
            workflow_type: template.workflow_type,
            thread_id,
            status: WorkflowStatus::InProgress,
            current_step_id: None,
            steps,
            created_at: Timestamp::now(),
            completed_at: None,
        };

        if let Some(first) = workflow.next_eligible_step().map(|s| s.id()) {
            if let Some(step) = workflow.step_mut(first) {
                step.begin();
            }
            workflow.current_step_id = Some(first);
        }
        workflow
    }

    pub fn id(&self) -> WorkflowId {
        self.id
    }

    pub fn template_id(&self) -> TemplateId {
        self.template_id
    }

    pub fn workflow_type(&self) -> WorkflowType {
        self.workflow_type
    }

    pub fn thread_id(&self) -> ThreadId {
        self.thread_id
    }

    pub fn status(&self) -> WorkflowStatus {
        self.status
    }

    pub fn current_step_id(&self) -> Option<StepId> {
        self.current_step_id
    }

    pub fn created_at(&self) -> Timestamp {
        self.created_at
    }

    pub fn completed_at(&self) -> Option<Timestamp> {
        self.completed_at
    }

    pub fn is_active(&self) -> bool {
        self.status.is_active()
    }

    /// Steps in ascending `order`.
    pub fn steps(&self) -> &[WorkflowStep] {
        &self.steps
    }

    pub fn step(&self, id: StepId) -> Option<&WorkflowStep> {
        self.steps.iter().find(|s| s.id() == id)
    }

    pub fn step_by_name(&self, name: &str) -> Option<&WorkflowStep> {
        self.steps.iter().find(|s| s.name() == name)
    }

    pub fn current_step(&self) -> Option<&WorkflowStep> {
        self.current_step_id.and_then(|id| self.step(id))
    }

    pub fn in_progress_step(&self) -> Option<&WorkflowStep> {
        self.steps.iter().find(|s| s.status().is_in_progress())
    }

    /// First dialog step by order.
    pub fn first_dialog_step(&self) -> Option<&WorkflowStep> {
        self.steps.iter().find(|s| s.kind() == StepKind::Dialog)
    }

    pub fn completed_step_names(&self) -> Vec<&str> {
        self.steps
            .iter()
            .filter(|s| s.status().is_complete())
            .map(|s| s.name())
            .collect()
    }

    /// The next step to start: the lowest-order `pending` step whose every
    /// dependency is `complete`. Order breaks ties among eligible steps.
    pub fn next_eligible_step(&self) -> Option<&WorkflowStep> {
        self.steps.iter().find(|candidate| {
            candidate.status() == StepStatus::Pending
                && candidate.dependencies().iter().all(|dep| {
                    self.step_by_name(dep)
                        .map(|d| d.status().is_complete())
                        .unwrap_or(false)
                })
        })
    }

    /// Collected data of every step merged in step order; later steps win.
    pub fn collected_data(&self) -> Map<String, Value> {
        let mut merged = super::StepMetadata::default();
        for step in &self.steps {
            merged.merge_collected(&step.metadata().collected);
        }
        merged.collected
    }

    /// Artifact of the highest-order step that produced one.
    pub fn latest_artifact(&self) -> Option<&str> {
        self.steps
            .iter()
            .rev()
            .find_map(|s| s.metadata().generated_artifact.as_deref())
    }

    /// True if any step ran with retrieved context.
    pub fn context_used(&self) -> bool {
        self.steps.iter().any(|s| s.metadata().context_used)
    }

    /// True when the current-step pointer was left on a finished step, or
    /// missing on an active workflow, by an interrupted transition.
    pub fn needs_recovery(&self) -> bool {
        if !self.is_active() {
            return false;
        }
        match self.current_step() {
            Some(step) => step.status().is_complete(),
            None => true,
        }
    }

    /// Verifies the aggregate invariants.
    ///
    /// # Errors
    ///
    /// `InvariantViolation` describing the first broken rule.
    pub fn check_invariants(&self) -> Result<(), DomainError> {
        let in_progress: Vec<&WorkflowStep> = self
            .steps
            .iter()
            .filter(|s| s.status().is_in_progress())
            .collect();

        if in_progress.len() > 1 {
            return Err(self.violation(format!(
                "{} steps are in progress: {}",
                in_progress.len(),
                in_progress
                    .iter()
                    .map(|s| s.name())
                    .collect::<Vec<_>>()
                    .join(", ")
            )));
        }

        if let Some(current_id) = self.current_step_id {
            let current = self
                .step(current_id)
                .ok_or_else(|| self.violation("current step does not belong to workflow"))?;
            if current.status() == StepStatus::Pending {
                return Err(self.violation(format!(
                    "current step '{}' is still pending",
                    current.name()
                )));
            }
            if let Some(active) = in_progress.first() {
                if current.status().is_in_progress() && active.id() != current_id {
                    return Err(self.violation("current step is not the in-progress step"));
                }
            }
        }

        if !self.is_active() && (!in_progress.is_empty() || self.current_step_id.is_some()) {
            return Err(self.violation("completed workflow still has an active step"));
        }

        for step in &in_progress {
            let blocked = step.dependencies().iter().any(|dep| {
                !self
                    .step_by_name(dep)
                    .map(|d| d.status().is_complete())
                    .unwrap_or(false)
            });
            if blocked {
                return Err(self.violation(format!(
                    "step '{}' started before its dependencies completed",
                    step.name()
                )));
            }
        }

        Ok(())
    }

    fn violation(&self, message: impl Into<String>) -> DomainError {
        DomainError::new(ErrorCode::InvariantViolation, message)
            .with_detail("workflow_id", self.id.to_string())
    }

    /// Pre-populates the first dialog step with carried-over data.
    ///
    /// `carryover` must already be sanitized. Company info, tone and topic
    /// are also merged into the step's collected data so the model treats
    /// them as known. Returns false when the workflow has no dialog step.
    pub fn apply_carryover(
        &mut self,
        carryover: Value,
        source_id: WorkflowId,
        source_type: WorkflowType,
    ) -> bool {
        let Some(target) = self.first_dialog_step().map(|s| s.id()) else {
            return false;
        };
        let Some(step) = self.step_mut(target) else {
            return false;
        };

        let mut seed = Map::new();
        if let Some(obj) = carryover.as_object() {
            for key in ["companyInfo", "announcementTopic", "tone"] {
                if let Some(value) = obj.get(key) {
                    seed.insert(key.to_string(), value.clone());
                }
            }
        }

        let metadata = step.metadata_mut();
        metadata.merge_collected(&seed);
        metadata.carryover = Some(carryover);
        metadata.carryover_from_workflow = Some(source_id);
        metadata.carryover_note = Some(format!(
            "Continuing from the {} workflow; details already provided there are known.",
            source_type.display_name()
        ));
        true
    }

    /// Applies a step patch (repository-side write).
    pub fn apply_step_patch(
        &mut self,
        step_id: StepId,
        patch: StepPatch,
    ) -> Result<WorkflowStep, DomainError> {
        let workflow_id = self.id;
        let step = self.step_mut(step_id).ok_or_else(|| {
            DomainError::new(ErrorCode::StepNotFound, format!("Step not found: {}", step_id))
                .with_detail("workflow_id", workflow_id.to_string())
        })?;
        step.apply_patch(patch)?;
        Ok(step.clone())
    }

    /// Sets the workflow status (repository-side write).
    ///
    /// Setting the current status again fails with `ConcurrentModification`:
    /// only one request may close a workflow.
    pub fn set_status(&mut self, status: WorkflowStatus) -> Result<(), DomainError> {
        if status == self.status {
            return Err(DomainError::new(
                ErrorCode::ConcurrentModification,
                format!("Workflow is already {}", status),
            )
            .with_detail("workflow_id", self.id.to_string()));
        }
        self.status = self.status.transition_to(status).map_err(|e| {
            DomainError::new(ErrorCode::InvalidStateTransition, e.to_string())
                .with_detail("workflow_id", self.id.to_string())
        })?;
        if status == WorkflowStatus::Completed {
            self.completed_at = Some(Timestamp::now());
        }
        Ok(())
    }

    /// Points the workflow at a step, or clears the pointer (repository-side write).
    pub fn set_current_step(&mut self, step_id: Option<StepId>) -> Result<(), DomainError> {
        if let Some(id) = step_id {
            if self.step(id).is_none() {
                return Err(DomainError::new(
                    ErrorCode::StepNotFound,
                    format!("Step not found: {}", id),
                )
                .with_detail("workflow_id", self.id.to_string()));
            }
            if !self.is_active() {
                return Err(DomainError::new(
                    ErrorCode::WorkflowCompleted,
                    "Cannot set the current step of a completed workflow",
                )
                .with_detail("workflow_id", self.id.to_string()));
            }
        }
        self.current_step_id = step_id;
        Ok(())
    }

    fn step_mut(&mut self, id: StepId) -> Option<&mut WorkflowStep> {
        self.steps.iter_mut().find(|s| s.id() == id)
    }
}
