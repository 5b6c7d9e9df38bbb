//! In-Memory Workflow Repository Adapter
//!
//! Stores workflows in memory. Each call takes the write lock for its whole
//! duration, so every call is atomic and step updates are a true
//! compare-and-set. Useful for testing and development.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::foundation::{
    DomainError, ErrorCode, StepId, ThreadId, WorkflowId, WorkflowStatus,
};
use crate::domain::workflow::{StepPatch, Workflow, WorkflowStep};
use crate::ports::WorkflowRepository;

#[derive(Debug, Default)]
struct Store {
    workflows: HashMap<WorkflowId, Workflow>,
    step_index: HashMap<StepId, WorkflowId>,
    /// Creation order, for thread lookups.
    order: Vec<WorkflowId>,
}

impl Store {
    fn workflow_mut(&mut self, id: &WorkflowId) -> Result<&mut Workflow, DomainError> {
        self.workflows.get_mut(id).ok_or_else(|| {
            DomainError::new(ErrorCode::WorkflowNotFound, format!("Workflow not found: {}", id))
        })
    }

    fn put(&mut self, workflow: Workflow) {
        let id = workflow.id();
        for step in workflow.steps() {
            self.step_index.insert(step.id(), id);
        }
        if !self.workflows.contains_key(&id) {
            self.order.push(id);
        }
        self.workflows.insert(id, workflow);
    }
}

/// In-memory storage for workflows
#[derive(Debug, Clone, Default)]
pub struct InMemoryWorkflowRepository {
    store: Arc<RwLock<Store>>,
    unavailable: Arc<AtomicBool>,
}

impl InMemoryWorkflowRepository {
    /// Create a new in-memory repository
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a workflow as-is, replacing any previous version (test seeding)
    pub async fn insert(&self, workflow: Workflow) {
        self.store.write().await.put(workflow);
    }

    /// Make every call fail with `DatabaseError` until switched back
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Clear all stored data (useful for tests)
    pub async fn clear(&self) {
        let mut store = self.store.write().await;
        *store = Store::default();
    }

    /// Get the number of stored workflows
    pub async fn workflow_count(&self) -> usize {
        self.store.read().await.workflows.len()
    }

    fn check_available(&self) -> Result<(), DomainError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(DomainError::new(
                ErrorCode::DatabaseError,
                "workflow store unavailable",
            ));
        }
        Ok(())
    }
}

#[async_trait]
impl WorkflowRepository for InMemoryWorkflowRepository {
    async fn get_workflow(&self, id: &WorkflowId) -> Result<Option<Workflow>, DomainError> {
        self.check_available()?;
        Ok(self.store.read().await.workflows.get(id).cloned())
    }

    async fn get_step(&self, id: &StepId) -> Result<Option<WorkflowStep>, DomainError> {
        self.check_available()?;
        let store = self.store.read().await;
        Ok(store
            .step_index
            .get(id)
            .and_then(|wid| store.workflows.get(wid))
            .and_then(|w| w.step(*id))
            .cloned())
    }

    async fn update_step(&self, id: &StepId, patch: StepPatch) -> Result<WorkflowStep, DomainError> {
        self.check_available()?;
        let mut store = self.store.write().await;
        let workflow_id = *store.step_index.get(id).ok_or_else(|| {
            DomainError::new(ErrorCode::StepNotFound, format!("Step not found: {}", id))
        })?;
        store.workflow_mut(&workflow_id)?.apply_step_patch(*id, patch)
    }

    async fn update_workflow_status(
        &self,
        id: &WorkflowId,
        status: WorkflowStatus,
    ) -> Result<(), DomainError> {
        self.check_available()?;
        self.store.write().await.workflow_mut(id)?.set_status(status)
    }

    async fn update_workflow_current_step(
        &self,
        id: &WorkflowId,
        step_id: Option<StepId>,
    ) -> Result<(), DomainError> {
        self.check_available()?;
        self.store
            .write()
            .await
            .workflow_mut(id)?
            .set_current_step(step_id)
    }

    async fn create_workflow(&self, workflow: &Workflow) -> Result<(), DomainError> {
        self.check_available()?;
        let mut store = self.store.write().await;
        if store.workflows.contains_key(&workflow.id()) {
            return Err(DomainError::new(
                ErrorCode::DatabaseError,
                format!("Workflow already exists: {}", workflow.id()),
            ));
        }
        store.put(workflow.clone());
        Ok(())
    }

    async fn find_by_thread(&self, thread_id: &ThreadId) -> Result<Vec<Workflow>, DomainError> {
        self.check_available()?;
        let store = self.store.read().await;
        Ok(store
            .order
            .iter()
            .filter_map(|id| store.workflows.get(id))
            .filter(|w| w.thread_id() == *thread_id)
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::StepStatus;
    use crate::domain::workflow::{TemplateRegistry, WorkflowType};

    fn blog(thread: ThreadId) -> Workflow {
        let registry = TemplateRegistry::builtin();
        Workflow::instantiate(registry.for_type(WorkflowType::BlogArticle).unwrap(), thread)
    }

    #[tokio::test]
    async fn create_and_fetch_workflow_and_step() {
        let repo = InMemoryWorkflowRepository::new();
        let wf = blog(ThreadId::new());
        let step_id = wf.current_step_id().unwrap();

        repo.create_workflow(&wf).await.unwrap();

        assert_eq!(repo.get_workflow(&wf.id()).await.unwrap(), Some(wf.clone()));
        let step = repo.get_step(&step_id).await.unwrap().unwrap();
        assert_eq!(step.workflow_id(), wf.id());
        assert!(repo.create_workflow(&wf).await.is_err());
    }

    #[tokio::test]
    async fn compare_and_set_rejects_stale_status() {
        let repo = InMemoryWorkflowRepository::new();
        let wf = blog(ThreadId::new());
        let step_id = wf.current_step_id().unwrap();
        repo.create_workflow(&wf).await.unwrap();

        let complete = StepPatch::transition(StepStatus::InProgress, StepStatus::Complete);
        repo.update_step(&step_id, complete.clone()).await.unwrap();
        let err = repo.update_step(&step_id, complete).await.unwrap_err();

        assert_eq!(err.code, ErrorCode::ConcurrentModification);
    }

    #[tokio::test]
    async fn concurrent_completions_have_one_winner() {
        let repo = InMemoryWorkflowRepository::new();
        let wf = blog(ThreadId::new());
        let step_id = wf.current_step_id().unwrap();
        repo.create_workflow(&wf).await.unwrap();

        let attempts = (0..8).map(|_| {
            let repo = repo.clone();
            tokio::spawn(async move {
                repo.update_step(
                    &step_id,
                    StepPatch::transition(StepStatus::InProgress, StepStatus::Complete),
                )
                .await
            })
        });
        let results = futures::future::join_all(attempts).await;

        let winners = results
            .into_iter()
            .filter(|r| matches!(r, Ok(Ok(_))))
            .count();
        assert_eq!(winners, 1);
    }

    #[tokio::test]
    async fn find_by_thread_keeps_creation_order() {
        let repo = InMemoryWorkflowRepository::new();
        let thread = ThreadId::new();
        let first = blog(thread);
        let second = blog(thread);
        repo.create_workflow(&first).await.unwrap();
        repo.create_workflow(&blog(ThreadId::new())).await.unwrap();
        repo.create_workflow(&second).await.unwrap();

        let found = repo.find_by_thread(&thread).await.unwrap();

        assert_eq!(
            found.iter().map(|w| w.id()).collect::<Vec<_>>(),
            vec![first.id(), second.id()]
        );
    }

    #[tokio::test]
    async fn unavailable_store_fails_every_call() {
        let repo = InMemoryWorkflowRepository::new();
        repo.set_unavailable(true);

        let err = repo.get_workflow(&WorkflowId::new()).await.unwrap_err();

        assert_eq!(err.code, ErrorCode::DatabaseError);
    }

    #[tokio::test]
    async fn unknown_ids_are_not_found() {
        let repo = InMemoryWorkflowRepository::new();
        assert!(repo.get_workflow(&WorkflowId::new()).await.unwrap().is_none());
        let err = repo
            .update_workflow_status(&WorkflowId::new(), WorkflowStatus::Completed)
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::WorkflowNotFound);
    }
}
