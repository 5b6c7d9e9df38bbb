//! Storage adapters.

mod in_memory_profile_store;
mod in_memory_workflow_repository;

pub use in_memory_profile_store::InMemoryProfileStore;
pub use in_memory_workflow_repository::InMemoryWorkflowRepository;
