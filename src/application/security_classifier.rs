//! Security classification service.
//!
//! Combines the deterministic pattern classifier with an optional upstream
//! classifier. The upstream verdict can only escalate; its failure or
//! timeout makes the whole verdict fail safe to `restricted`.

use std::sync::Arc;
use std::time::Duration;

use tokio::time::timeout;

use crate::config::{RetrievalConfig, SecurityConfig};
use crate::domain::security::{ContentOrigin, PatternClassifier, SecurityClassification};
use crate::ports::ClassificationService;

pub struct SecurityClassifier {
    patterns: PatternClassifier,
    upstream: Option<Arc<dyn ClassificationService>>,
    upstream_timeout: Duration,
}

impl SecurityClassifier {
    /// Pattern-only classifier with the default restricted asset types.
    pub fn new() -> Self {
        Self {
            patterns: PatternClassifier::default(),
            upstream: None,
            upstream_timeout: SecurityConfig::default().upstream_timeout(),
        }
    }

    pub fn from_config(security: &SecurityConfig, retrieval: &RetrievalConfig) -> Self {
        Self {
            patterns: PatternClassifier::new(retrieval.restricted_asset_types.iter().copied()),
            upstream: None,
            upstream_timeout: security.upstream_timeout(),
        }
    }

    pub fn with_upstream(mut self, upstream: Arc<dyn ClassificationService>) -> Self {
        self.upstream = Some(upstream);
        self
    }

    pub fn with_upstream_timeout(mut self, upstream_timeout: Duration) -> Self {
        self.upstream_timeout = upstream_timeout;
        self
    }

    /// The deterministic part alone, for callers that cannot wait.
    pub fn patterns(&self) -> &PatternClassifier {
        &self.patterns
    }

    /// Classifies free text.
    pub async fn classify(&self, text: &str) -> SecurityClassification {
        let verdict = self.patterns.classify(text);
        self.consult_upstream(text, verdict).await
    }

    /// Classifies a retrieved item, folding in its source.
    pub async fn classify_retrieved(
        &self,
        text: &str,
        origin: &ContentOrigin,
    ) -> SecurityClassification {
        let verdict = self.patterns.classify_retrieved(text, origin);
        self.consult_upstream(text, verdict).await
    }

    async fn consult_upstream(
        &self,
        text: &str,
        verdict: SecurityClassification,
    ) -> SecurityClassification {
        let Some(upstream) = &self.upstream else {
            return verdict;
        };

        match timeout(self.upstream_timeout, upstream.classify(text)).await {
            Ok(Ok(upstream_verdict)) => verdict.escalate(&upstream_verdict),
            Ok(Err(err)) => {
                tracing::warn!(error = %err, "Upstream classifier failed, failing safe");
                verdict.escalate(&SecurityClassification::fail_safe(err))
            }
            Err(_) => {
                tracing::warn!(
                    timeout_ms = self.upstream_timeout.as_millis() as u64,
                    "Upstream classifier timed out, failing safe"
                );
                verdict.escalate(&SecurityClassification::fail_safe(format!(
                    "upstream timed out after {}ms",
                    self.upstream_timeout.as_millis()
                )))
            }
        }
    }
}

impl Default for SecurityClassifier {
    fn default() -> Self {
        Self::new()
    }
}
