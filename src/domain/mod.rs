//! Domain layer containing business logic and domain types.
//!
//! # Module Organization
//!
//! - `foundation` - Shared domain primitives (value objects, IDs, enums, errors)
//! - `security` - Sensitivity classification and content sanitization
//! - `workflow` - Templates, workflow instances and their step state machine
//! - `context` - Context bundles and prompt header injection
//! - `intent` - Cross-workflow intent detection
//! - `learning` - User knowledge profiles and learning signals

pub mod context;
pub mod foundation;
pub mod intent;
pub mod learning;
pub mod security;
pub mod workflow;
