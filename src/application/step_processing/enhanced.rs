//! Context-aware step processing.

use async_trait::async_trait;
use std::sync::Arc;

use crate::application::{ContextRequest, ContextRetrievalCoordinator};
use crate::domain::context::PromptContextInjector;
use crate::domain::intent::IntentDetector;
use crate::domain::security::ContentSanitizer;
use crate::ports::AIProvider;

use super::{
    call_model, handler_for, ProcessedStep, StepProcessingError, StepProcessor, StepRequest,
    StepTurn,
};

pub struct EnhancedStepProcessor {
    ai: Arc<dyn AIProvider>,
    coordinator: Arc<ContextRetrievalCoordinator>,
    injector: PromptContextInjector,
    detector: IntentDetector,
    sanitizer: ContentSanitizer,
}

impl EnhancedStepProcessor {
    pub fn new(ai: Arc<dyn AIProvider>, coordinator: Arc<ContextRetrievalCoordinator>) -> Self {
        Self {
            ai,
            coordinator,
            injector: PromptContextInjector::new(),
            detector: IntentDetector::new(),
            sanitizer: ContentSanitizer::new(),
        }
    }

    pub fn with_injector(mut self, injector: PromptContextInjector) -> Self {
        self.injector = injector;
        self
    }
}

#[async_trait]
impl StepProcessor for EnhancedStepProcessor {
    async fn process(&self, request: &StepRequest) -> Result<ProcessedStep, StepProcessingError> {
        let step = request.step()?;
        let handler = handler_for(step.kind());
        let workflow_type = request.workflow.workflow_type();
        let sentinel = request.is_sentinel();

        // 1. Gather context; never fails
        let bundle = self
            .coordinator
            .get_context(&ContextRequest {
                user_id: request.user_id.clone(),
                organization_id: request.organization_id.clone(),
                workflow_type,
                step_name: step.name().to_string(),
                query_text: request.input.clone(),
            })
            .await;

        // 2. Sanitize the user input with the verdict computed alongside retrieval
        let input = match &bundle.input_classification {
            Some(verdict) if !sentinel => self.sanitizer.sanitize(&request.input, verdict),
            _ => request.input.clone(),
        };
        let turn = StepTurn {
            workflow: &request.workflow,
            step,
            input: &input,
            sentinel,
        };

        // 3. Approvals and other local resolutions skip the model
        if let Some(outcome) = handler.shortcut(&turn) {
            return Ok(ProcessedStep::from_outcome(outcome));
        }

        // 4. Inject context and call the model
        let instructions =
            self.injector
                .inject(&handler.instructions(&turn), &bundle, workflow_type, step.name());
        let output = call_model(self.ai.as_ref(), request, step, instructions, &input).await?;

        // 5. Interpret and look for a request to switch content type
        let mut outcome = handler.interpret(&turn, &output);
        let context_used = !bundle.is_empty();
        outcome.metadata.context_used |= context_used;

        let intent = if sentinel {
            None
        } else {
            self.detector.detect(&output, &input, workflow_type)
        };
        if let Some(found) = &intent {
            tracing::info!(
                workflow_id = %request.workflow.id(),
                step_id = %step.id(),
                target = found.target.key(),
                source = ?found.source,
                "Cross-workflow intent detected"
            );
        }

        let mut processed = ProcessedStep::from_outcome(outcome);
        processed.intent = intent;
        processed.context_used = context_used;
        Ok(processed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::ai::MockAIProvider;
    use crate::adapters::search::InMemorySemanticSearch;
    use crate::adapters::storage::InMemoryProfileStore;
    use crate::application::SecurityClassifier;
    use crate::config::RetrievalConfig;
    use crate::domain::foundation::{OrganizationId, ThreadId, UserId};
    use crate::domain::intent::IntentSource;
    use crate::domain::learning::UserKnowledgeProfile;
    use crate::domain::workflow::{TemplateRegistry, Workflow, WorkflowType, AUTO_EXECUTE_SENTINEL};
    use crate::ports::ProfileStore;

    fn ids() -> (UserId, OrganizationId) {
        (
            UserId::new("user-1").unwrap(),
            OrganizationId::new("org-1").unwrap(),
        )
    }

    fn request(input: &str) -> StepRequest {
        let registry = TemplateRegistry::builtin();
        let workflow =
            Workflow::instantiate(registry.for_type(WorkflowType::BlogArticle).unwrap(), ThreadId::new());
        let step_id = workflow.current_step_id().unwrap();
        let (user_id, organization_id) = ids();
        StepRequest {
            user_id,
            organization_id,
            workflow,
            step_id,
            input: input.to_string(),
            trace_id: "trace-1".to_string(),
        }
    }

    fn processor(ai: &MockAIProvider, profiles: &InMemoryProfileStore) -> EnhancedStepProcessor {
        let coordinator = ContextRetrievalCoordinator::new(
            Arc::new(InMemorySemanticSearch::new()),
            Arc::new(profiles.clone()),
            Arc::new(SecurityClassifier::new()),
            &RetrievalConfig::default(),
        );
        EnhancedStepProcessor::new(Arc::new(ai.clone()), Arc::new(coordinator))
    }

    #[tokio::test]
    async fn profile_reaches_prompt_header() {
        let ai = MockAIProvider::new().with_response("What is the article about?");
        let profiles = InMemoryProfileStore::new();
        let (user, org) = ids();
        profiles
            .upsert_profile(&UserKnowledgeProfile::new(user, org).with_company("Acme", Some("Bakery".into())))
            .await
            .unwrap();

        let processed = processor(&ai, &profiles).process(&request("hi")).await.unwrap();

        assert!(processed.context_used);
        assert!(processed.metadata.unwrap().context_used);
        let prompt = ai.last_call().unwrap().system_prompt.unwrap();
        assert!(prompt.contains("Acme"));
        assert!(prompt.contains("Current step: Information Collection"));
    }

    #[tokio::test]
    async fn user_switch_request_is_detected() {
        let ai = MockAIProvider::new().with_response("Sure.");
        let processed = processor(&ai, &InMemoryProfileStore::new())
            .process(&request("now do a social post"))
            .await
            .unwrap();

        let intent = processed.intent.unwrap();
        assert_eq!(intent.target, WorkflowType::SocialPost);
        assert_eq!(intent.source, IntentSource::UserRequest);
    }

    #[tokio::test]
    async fn sentinel_skips_intent_detection() {
        let ai = MockAIProvider::new().with_response("I'll start a new Social Post workflow for you.");
        let processed = processor(&ai, &InMemoryProfileStore::new())
            .process(&request(AUTO_EXECUTE_SENTINEL))
            .await
            .unwrap();

        assert!(processed.intent.is_none());
        assert_eq!(processed.metadata.unwrap().history.len(), 1);
    }

    #[tokio::test]
    async fn pii_in_input_is_redacted_before_model_and_history() {
        let ai = MockAIProvider::new().with_response("Thanks.");
        let processed = processor(&ai, &InMemoryProfileStore::new())
            .process(&request("email me at jane@example.com"))
            .await
            .unwrap();

        let sent = ai.last_call().unwrap().last_user_message().unwrap();
        assert!(!sent.contains("jane@example.com"));
        let history = processed.metadata.unwrap().history;
        assert!(!history[0].content.contains("jane@example.com"));
    }
}
