//! Degrade-gracefully decorator around step processing.

use async_trait::async_trait;
use std::sync::Arc;

use super::{ProcessedStep, StepProcessingError, StepProcessor, StepRequest};

/// Reply when neither path could produce an answer.
pub const TRY_AGAIN_REPLY: &str =
    "Sorry, I couldn't process that just now. Please try again in a moment.";

/// Runs the primary processor and falls back to the secondary on failure.
///
/// Never returns an error: when both fail the result is an explicit
/// "please try again" with nothing to persist.
pub struct FallbackStepProcessor {
    primary: Arc<dyn StepProcessor>,
    fallback: Arc<dyn StepProcessor>,
}

impl FallbackStepProcessor {
    pub fn new(primary: Arc<dyn StepProcessor>, fallback: Arc<dyn StepProcessor>) -> Self {
        Self { primary, fallback }
    }
}

#[async_trait]
impl StepProcessor for FallbackStepProcessor {
    async fn process(&self, request: &StepRequest) -> Result<ProcessedStep, StepProcessingError> {
        let primary_err = match self.primary.process(request).await {
            Ok(processed) => return Ok(processed),
            Err(err) => err,
        };
        tracing::warn!(
            workflow_id = %request.workflow.id(),
            step_id = %request.step_id,
            error = %primary_err,
            "Enhanced step processing failed, falling back to baseline"
        );

        match self.fallback.process(request).await {
            Ok(mut processed) => {
                processed.degraded = true;
                Ok(processed)
            }
            Err(err) => {
                tracing::warn!(
                    workflow_id = %request.workflow.id(),
                    step_id = %request.step_id,
                    error = %err,
                    "Baseline step processing failed, asking the user to retry"
                );
                Ok(ProcessedStep::try_again())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::{OrganizationId, ThreadId, UserId};
    use crate::domain::workflow::{StepMetadata, TemplateRegistry, Workflow, WorkflowType};
    use crate::ports::AIError;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct Scripted {
        ok: bool,
        calls: AtomicUsize,
    }

    impl Scripted {
        fn new(ok: bool) -> Arc<Self> {
            Arc::new(Self {
                ok,
                calls: AtomicUsize::new(0),
            })
        }
    }

    #[async_trait]
    impl StepProcessor for Scripted {
        async fn process(&self, _request: &StepRequest) -> Result<ProcessedStep, StepProcessingError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.ok {
                Ok(ProcessedStep {
                    reply: "ok".to_string(),
                    complete: false,
                    metadata: Some(StepMetadata::default()),
                    intent: None,
                    context_used: false,
                    degraded: false,
                })
            } else {
                Err(AIError::timeout(10).into())
            }
        }
    }

    fn request() -> StepRequest {
        let registry = TemplateRegistry::builtin();
        let workflow =
            Workflow::instantiate(registry.for_type(WorkflowType::Newsletter).unwrap(), ThreadId::new());
        let step_id = workflow.current_step_id().unwrap();
        StepRequest {
            user_id: UserId::new("user-1").unwrap(),
            organization_id: OrganizationId::new("org-1").unwrap(),
            workflow,
            step_id,
            input: "hello".to_string(),
            trace_id: "trace-1".to_string(),
        }
    }

    #[tokio::test]
    async fn primary_success_skips_fallback() {
        let primary = Scripted::new(true);
        let fallback = Scripted::new(true);
        let processor = FallbackStepProcessor::new(primary.clone(), fallback.clone());

        let processed = processor.process(&request()).await.unwrap();

        assert!(!processed.degraded);
        assert_eq!(fallback.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn primary_failure_uses_fallback() {
        let processor = FallbackStepProcessor::new(Scripted::new(false), Scripted::new(true));

        let processed = processor.process(&request()).await.unwrap();

        assert!(processed.degraded);
        assert_eq!(processed.reply, "ok");
    }

    #[tokio::test]
    async fn double_failure_asks_to_try_again() {
        let processor = FallbackStepProcessor::new(Scripted::new(false), Scripted::new(false));

        let processed = processor.process(&request()).await.unwrap();

        assert!(processed.is_try_again());
        assert_eq!(processed.reply, TRY_AGAIN_REPLY);
        assert!(!processed.complete);
    }
}
