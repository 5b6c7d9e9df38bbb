//! Message delivery port.
//!
//! Used when the engine pushes a message outside the request/response
//! turn, e.g. the output of an auto-executed step.

use async_trait::async_trait;

use crate::domain::foundation::{DomainError, ThreadId};

#[async_trait]
pub trait MessageDelivery: Send + Sync {
    /// Posts an assistant message to a conversation thread.
    async fn post_message(&self, thread_id: &ThreadId, text: &str) -> Result<(), DomainError>;
}
