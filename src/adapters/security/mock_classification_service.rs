//! Mock upstream classification service for testing.

use async_trait::async_trait;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::domain::foundation::{DomainError, ErrorCode};
use crate::domain::security::SecurityClassification;
use crate::ports::ClassificationService;

#[derive(Debug, Clone)]
enum Behaviour {
    Verdict(SecurityClassification),
    Fail(String),
}

/// Returns a fixed verdict or a fixed error, optionally after a delay.
#[derive(Debug, Clone)]
pub struct MockClassificationService {
    behaviour: Behaviour,
    delay: Duration,
    calls: Arc<Mutex<Vec<String>>>,
}

impl MockClassificationService {
    /// Always answers with `verdict`.
    pub fn returning(verdict: SecurityClassification) -> Self {
        Self {
            behaviour: Behaviour::Verdict(verdict),
            delay: Duration::ZERO,
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Always fails with `CollaboratorUnavailable`.
    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            behaviour: Behaviour::Fail(message.into()),
            delay: Duration::ZERO,
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Sets simulated latency per call.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Returns the number of calls made.
    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl ClassificationService for MockClassificationService {
    async fn classify(&self, text: &str) -> Result<SecurityClassification, DomainError> {
        self.calls.lock().unwrap().push(text.to_string());
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        match &self.behaviour {
            Behaviour::Verdict(verdict) => Ok(verdict.clone()),
            Behaviour::Fail(message) => Err(DomainError::new(
                ErrorCode::CollaboratorUnavailable,
                message.clone(),
            )),
        }
    }
}
