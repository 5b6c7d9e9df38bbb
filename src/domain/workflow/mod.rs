//! Workflow domain - templates, workflow instances and their steps.
//!
//! A [`WorkflowTemplate`] is an immutable, validated step graph. A
//! [`Workflow`] is one instance of it bound to a conversation thread; it
//! owns its [`WorkflowStep`]s and exposes the dependency-gated selection of
//! the next step. Status changes reach persisted workflows only through
//! [`StepPatch`] and the repository port, so every write is a single atomic
//! call.

mod carryover;
mod catalog;
mod registry;
mod step;
mod step_kind;
mod step_output;
mod template;
#[allow(clippy::module_inception)]
mod workflow;
mod workflow_type;

pub use carryover::CarryoverContext;
pub use catalog::{builtin_templates, ASSET_REVIEW, INFORMATION_COLLECTION};
pub use registry::TemplateRegistry;
pub use step::{ChatTurn, StepMetadata, StepPatch, TurnRole, WorkflowStep};
pub use step_kind::StepKind;
pub use step_output::{is_approval, DialogOutput, AUTO_EXECUTE_SENTINEL, DIALOG_PROTOCOL};
pub use template::{StepSpec, WorkflowTemplate};
pub use workflow::Workflow;
pub use workflow_type::WorkflowType;
