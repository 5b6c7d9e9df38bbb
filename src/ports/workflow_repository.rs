//! Workflow repository port (persistence collaborator).
//!
//! Every call is atomic on its own; the engine never assumes a transaction
//! spanning several calls. Transition writes are ordered so that a crash
//! between two calls leaves a workflow the engine can recover.

use async_trait::async_trait;

use crate::domain::foundation::{DomainError, StepId, ThreadId, WorkflowId, WorkflowStatus};
use crate::domain::workflow::{StepPatch, Workflow, WorkflowStep};

/// Repository port for Workflow aggregate persistence.
#[async_trait]
pub trait WorkflowRepository: Send + Sync {
    /// Find a workflow with all of its steps.
    ///
    /// Returns `None` if not found.
    async fn get_workflow(&self, id: &WorkflowId) -> Result<Option<Workflow>, DomainError>;

    /// Find a single step by its ID.
    ///
    /// Returns `None` if not found.
    async fn get_step(&self, id: &StepId) -> Result<Option<WorkflowStep>, DomainError>;

    /// Apply a patch to one step and return the stored result.
    ///
    /// When the patch carries an expected status the update is a
    /// compare-and-set against the stored status.
    ///
    /// # Errors
    ///
    /// - `StepNotFound` if the step doesn't exist
    /// - `ConcurrentModification` if the expected status no longer matches
    /// - `InvalidStateTransition` if the new status is not reachable
    async fn update_step(&self, id: &StepId, patch: StepPatch) -> Result<WorkflowStep, DomainError>;

    /// Set the workflow-level status.
    ///
    /// # Errors
    ///
    /// - `WorkflowNotFound` if the workflow doesn't exist
    /// - `InvalidStateTransition` on a backward transition
    /// - `ConcurrentModification` if the workflow already has `status`
    async fn update_workflow_status(
        &self,
        id: &WorkflowId,
        status: WorkflowStatus,
    ) -> Result<(), DomainError>;

    /// Point the workflow at a step, or clear the pointer.
    ///
    /// # Errors
    ///
    /// - `WorkflowNotFound` if the workflow doesn't exist
    /// - `StepNotFound` if the step is not part of the workflow
    async fn update_workflow_current_step(
        &self,
        id: &WorkflowId,
        step_id: Option<StepId>,
    ) -> Result<(), DomainError>;

    /// Persist a freshly instantiated workflow.
    ///
    /// # Errors
    ///
    /// - `DatabaseError` on persistence failure
    async fn create_workflow(&self, workflow: &Workflow) -> Result<(), DomainError>;

    /// All workflows bound to a thread, oldest first.
    async fn find_by_thread(&self, thread_id: &ThreadId) -> Result<Vec<Workflow>, DomainError>;
}
