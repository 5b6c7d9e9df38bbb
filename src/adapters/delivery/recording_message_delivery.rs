//! Message delivery adapter that records posted messages.
//!
//! Stands in for the chat transport in local runs and tests.

use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::foundation::{DomainError, ThreadId};
use crate::ports::MessageDelivery;

/// A message posted outside the request/response turn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostedMessage {
    pub thread_id: ThreadId,
    pub text: String,
}

#[derive(Debug, Clone, Default)]
pub struct RecordingMessageDelivery {
    posted: Arc<RwLock<Vec<PostedMessage>>>,
}

impl RecordingMessageDelivery {
    pub fn new() -> Self {
        Self::default()
    }

    /// All messages in posting order.
    pub async fn messages(&self) -> Vec<PostedMessage> {
        self.posted.read().await.clone()
    }

    /// Messages posted to one thread.
    pub async fn messages_for(&self, thread_id: &ThreadId) -> Vec<String> {
        self.posted
            .read()
            .await
            .iter()
            .filter(|m| m.thread_id == *thread_id)
            .map(|m| m.text.clone())
            .collect()
    }

    pub async fn message_count(&self) -> usize {
        self.posted.read().await.len()
    }

    pub async fn clear(&self) {
        self.posted.write().await.clear();
    }
}

#[async_trait]
impl MessageDelivery for RecordingMessageDelivery {
    async fn post_message(&self, thread_id: &ThreadId, text: &str) -> Result<(), DomainError> {
        tracing::debug!(thread_id = %thread_id, length = text.len(), "Posting message");
        self.posted.write().await.push(PostedMessage {
            thread_id: *thread_id,
            text: text.to_string(),
        });
        Ok(())
    }
}
