//! Workflow Command and Query Handlers
//!
//! ## Commands
//! - `HandleStepResponse` - Apply a user response to the current step and
//!   run the resulting transition
//! - `StartWorkflow` - Create a workflow of a given type on a thread
//!
//! ## Queries
//! - `GetWorkflowStatus` - Current step and progress of a workflow
//!
//! The transition mechanics the commands share live in [`WorkflowEngine`].

mod engine;
mod error;
mod get_workflow_status;
mod handle_step_response;
mod start_workflow;

pub use engine::{
    Advancement, EnginePorts, NewWorkflow, NewWorkflowReason, RequestContext, WorkflowEngine,
};
pub use error::WorkflowEngineError;
pub use get_workflow_status::{
    GetWorkflowStatusHandler, GetWorkflowStatusQuery, WorkflowStatusView,
};
pub use handle_step_response::{
    HandleStepResponseCommand, HandleStepResponseHandler, HandleStepResponseResult,
};
pub use start_workflow::{StartWorkflowCommand, StartWorkflowHandler, StartWorkflowResult};
