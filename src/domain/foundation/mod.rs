//! Foundation module - Shared domain primitives.
//!
//! Contains value objects, identifiers, enums, and error types
//! that form the vocabulary of the workflow engine.

mod errors;
mod ids;
mod state_machine;
mod step_status;
mod timestamp;
mod workflow_status;

pub use errors::{DomainError, ErrorCode, ValidationError};
pub use ids::{OrganizationId, StepId, TemplateId, ThreadId, UserId, WorkflowId};
pub use state_machine::StateMachine;
pub use step_status::StepStatus;
pub use timestamp::Timestamp;
pub use workflow_status::WorkflowStatus;
