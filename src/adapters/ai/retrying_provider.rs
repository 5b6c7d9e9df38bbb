//! Retrying AI Provider - bounded retries with exponential backoff.
//!
//! Wraps any provider. Each attempt is bounded by a timeout; retryable
//! failures (rate limits, unavailability, network, timeout) are retried
//! up to `max_retries` times with delays of `base_delay * 2^attempt`.
//!
//! # Example
//!
//! ```ignore
//! let provider = RetryingAIProvider::new(Arc::new(inner), RetryPolicy::from_config(&config.engine));
//! ```

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{sleep, timeout};

use crate::config::EngineConfig;
use crate::ports::{AIError, AIProvider, CompletionRequest, CompletionResponse};

/// Retry and timeout settings for model calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub base_delay: Duration,
    pub attempt_timeout: Duration,
}

impl RetryPolicy {
    pub fn from_config(config: &EngineConfig) -> Self {
        Self {
            max_retries: config.max_model_retries,
            base_delay: config.retry_base_delay(),
            attempt_timeout: config.model_timeout(),
        }
    }

    /// Backoff before retry number `retry` (0-based).
    pub fn delay_for(&self, retry: u32) -> Duration {
        self.base_delay.saturating_mul(1u32 << retry.min(16))
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from_config(&EngineConfig::default())
    }
}

/// Provider decorator adding a per-attempt timeout and bounded retries.
pub struct RetryingAIProvider {
    inner: Arc<dyn AIProvider>,
    policy: RetryPolicy,
}

impl RetryingAIProvider {
    pub fn new(inner: Arc<dyn AIProvider>, policy: RetryPolicy) -> Self {
        Self { inner, policy }
    }

    async fn attempt(&self, request: CompletionRequest) -> Result<CompletionResponse, AIError> {
        match timeout(self.policy.attempt_timeout, self.inner.complete(request)).await {
            Ok(result) => result,
            Err(_) => Err(AIError::timeout(
                self.policy.attempt_timeout.as_millis() as u64
            )),
        }
    }
}

#[async_trait]
impl AIProvider for RetryingAIProvider {
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, AIError> {
        let mut retry_count = 0;

        loop {
            match self.attempt(request.clone()).await {
                Ok(response) => return Ok(response),
                Err(err) => {
                    if !err.is_retryable() || retry_count >= self.policy.max_retries {
                        return Err(err);
                    }
                    let delay = self.policy.delay_for(retry_count);
                    tracing::warn!(
                        error = %err,
                        retry = retry_count + 1,
                        max_retries = self.policy.max_retries,
                        delay_ms = delay.as_millis() as u64,
                        trace_id = %request.metadata.trace_id,
                        "Model call failed, retrying"
                    );
                    sleep(delay).await;
                    retry_count += 1;
                }
            }
        }
    }
}
