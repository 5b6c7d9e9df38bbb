//! Application layer - Services, Commands, Queries, and Handlers.
//!
//! This layer orchestrates domain operations and coordinates between ports.
//!
//! - `security_classifier` - pattern verdicts escalated by an optional upstream
//! - `context_retrieval` - concurrent, security-filtered context fan-out
//! - `step_processing` - per-kind step handlers and the degrade-gracefully
//!   processor stack
//! - `learning_recorder` - profile refinement from finished workflows
//! - `handlers` - workflow commands and queries

mod context_retrieval;
pub mod handlers;
mod learning_recorder;
mod security_classifier;
pub mod step_processing;

pub use context_retrieval::{ContextRequest, ContextRetrievalCoordinator};
pub use handlers::{
    EnginePorts, GetWorkflowStatusHandler, GetWorkflowStatusQuery, HandleStepResponseCommand,
    HandleStepResponseHandler, HandleStepResponseResult, NewWorkflow, NewWorkflowReason,
    RequestContext, StartWorkflowCommand, StartWorkflowHandler, StartWorkflowResult,
    WorkflowEngine, WorkflowEngineError, WorkflowStatusView,
};
pub use learning_recorder::{LearningOutcome, LearningRecorder};
pub use security_classifier::SecurityClassifier;
