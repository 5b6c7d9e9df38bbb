//! Application handlers.
//!
//! Command and query handlers that orchestrate domain operations.

pub mod workflow;

pub use workflow::{
    Advancement, EnginePorts, GetWorkflowStatusHandler, GetWorkflowStatusQuery,
    HandleStepResponseCommand, HandleStepResponseHandler, HandleStepResponseResult, NewWorkflow,
    NewWorkflowReason, RequestContext, StartWorkflowCommand, StartWorkflowHandler,
    StartWorkflowResult, WorkflowEngine, WorkflowEngineError, WorkflowStatusView,
};
