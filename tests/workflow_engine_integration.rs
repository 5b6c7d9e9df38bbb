//! Integration tests for the workflow engine.
//!
//! These tests drive the public handlers end to end:
//! 1. Step responses move workflows through dependency-gated steps
//! 2. Auto-execute steps run without a user turn
//! 3. Finished workflows renew the thread; switch requests carry state over
//! 4. Collaborator failures degrade instead of failing the request
//! 5. Finished workflows refine the user's knowledge profile
//!
//! Uses in-memory adapters and the mock model provider.

use async_trait::async_trait;
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;

use content_sherpa::adapters::ai::{MockAIProvider, MockError};
use content_sherpa::adapters::delivery::RecordingMessageDelivery;
use content_sherpa::adapters::search::{InMemorySemanticSearch, IndexedContent};
use content_sherpa::adapters::storage::{InMemoryProfileStore, InMemoryWorkflowRepository};
use content_sherpa::application::step_processing::TRY_AGAIN_REPLY;
use content_sherpa::application::{
    EnginePorts, GetWorkflowStatusHandler, GetWorkflowStatusQuery, HandleStepResponseCommand,
    HandleStepResponseHandler, HandleStepResponseResult, NewWorkflowReason, StartWorkflowCommand,
    StartWorkflowHandler, WorkflowEngine, WorkflowEngineError,
};
use content_sherpa::config::{AppConfig, EngineConfig, LearningMode};
use content_sherpa::domain::foundation::{
    DomainError, OrganizationId, StepId, StepStatus, TemplateId, ThreadId, UserId, WorkflowId,
    WorkflowStatus,
};
use content_sherpa::domain::security::AssetType;
use content_sherpa::domain::workflow::{
    builtin_templates, StepKind, StepPatch, StepSpec, TemplateRegistry, Workflow,
    WorkflowStep, WorkflowTemplate, WorkflowType, ASSET_REVIEW, INFORMATION_COLLECTION,
};
use content_sherpa::ports::{
    ProfileStore, SearchContentType, SourceMetadata, WorkflowRepository,
};

// =============================================================================
// Test Infrastructure
// =============================================================================

fn user() -> UserId {
    UserId::new("user-1").unwrap()
}

fn org() -> OrganizationId {
    OrganizationId::new("org-1").unwrap()
}

/// Dialog reply carrying the progress block the engine parses.
fn dialog_reply(text: &str, complete: bool, collected: Value) -> String {
    format!(
        "{}\n```json\n{}\n```",
        text,
        json!({"complete": complete, "collected": collected})
    )
}

fn test_config() -> AppConfig {
    AppConfig {
        engine: EngineConfig {
            max_model_retries: 0,
            retry_base_delay_ms: 1,
            learning_mode: LearningMode::Inline,
            ..Default::default()
        },
        ..Default::default()
    }
}

/// Repository whose pointer writes stall, widening the window between a
/// step commit and the workflow-level writes that follow it.
struct SlowPointerRepository {
    inner: InMemoryWorkflowRepository,
    delay: Duration,
}

#[async_trait]
impl WorkflowRepository for SlowPointerRepository {
    async fn get_workflow(&self, id: &WorkflowId) -> Result<Option<Workflow>, DomainError> {
        self.inner.get_workflow(id).await
    }

    async fn get_step(&self, id: &StepId) -> Result<Option<WorkflowStep>, DomainError> {
        self.inner.get_step(id).await
    }

    async fn update_step(&self, id: &StepId, patch: StepPatch) -> Result<WorkflowStep, DomainError> {
        self.inner.update_step(id, patch).await
    }

    async fn update_workflow_status(
        &self,
        id: &WorkflowId,
        status: WorkflowStatus,
    ) -> Result<(), DomainError> {
        self.inner.update_workflow_status(id, status).await
    }

    async fn update_workflow_current_step(
        &self,
        id: &WorkflowId,
        step_id: Option<StepId>,
    ) -> Result<(), DomainError> {
        tokio::time::sleep(self.delay).await;
        self.inner.update_workflow_current_step(id, step_id).await
    }

    async fn create_workflow(&self, workflow: &Workflow) -> Result<(), DomainError> {
        self.inner.create_workflow(workflow).await
    }

    async fn find_by_thread(&self, thread_id: &ThreadId) -> Result<Vec<Workflow>, DomainError> {
        self.inner.find_by_thread(thread_id).await
    }
}

fn base_template() -> WorkflowTemplate {
    builtin_templates()
        .into_iter()
        .find(|t| t.workflow_type == WorkflowType::Base)
        .unwrap()
}

struct Harness {
    repo: InMemoryWorkflowRepository,
    profiles: InMemoryProfileStore,
    search: InMemorySemanticSearch,
    ai: MockAIProvider,
    delivery: RecordingMessageDelivery,
    engine: Arc<WorkflowEngine>,
}

impl Harness {
    fn new() -> Self {
        Self::with_templates(TemplateRegistry::builtin())
    }

    fn with_templates(templates: TemplateRegistry) -> Self {
        Self::with_repository(templates, |repo| Arc::new(repo))
    }

    /// Builds the engine over a repository derived from the shared in-memory store.
    fn with_repository(
        templates: TemplateRegistry,
        wrap: impl FnOnce(InMemoryWorkflowRepository) -> Arc<dyn WorkflowRepository>,
    ) -> Self {
        let repo = InMemoryWorkflowRepository::new();
        let profiles = InMemoryProfileStore::new();
        let search = InMemorySemanticSearch::new();
        let ai = MockAIProvider::new();
        let delivery = RecordingMessageDelivery::new();

        let engine = WorkflowEngine::from_config(
            &test_config(),
            templates,
            EnginePorts {
                repository: wrap(repo.clone()),
                search: Arc::new(search.clone()),
                profiles: Arc::new(profiles.clone()),
                ai: Arc::new(ai.clone()),
                delivery: Arc::new(delivery.clone()),
                upstream_classifier: None,
            },
        );

        Self {
            repo,
            profiles,
            search,
            ai,
            delivery,
            engine: Arc::new(engine),
        }
    }

    async fn start(&self, thread_id: ThreadId, workflow_type: WorkflowType) -> WorkflowId {
        StartWorkflowHandler::new(self.engine.clone())
            .handle(StartWorkflowCommand {
                thread_id,
                workflow_type,
                user_id: user(),
                organization_id: org(),
                silent: true,
            })
            .await
            .unwrap()
            .workflow_id
    }

    async fn workflow(&self, id: WorkflowId) -> Workflow {
        self.repo.get_workflow(&id).await.unwrap().unwrap()
    }

    /// Responds to whatever step is current.
    async fn respond(
        &self,
        workflow_id: WorkflowId,
        input: &str,
    ) -> Result<HandleStepResponseResult, WorkflowEngineError> {
        let step_id = self.workflow(workflow_id).await.current_step_id().unwrap();
        self.respond_to(workflow_id, step_id, input).await
    }

    async fn respond_to(
        &self,
        workflow_id: WorkflowId,
        step_id: StepId,
        input: &str,
    ) -> Result<HandleStepResponseResult, WorkflowEngineError> {
        HandleStepResponseHandler::new(self.engine.clone())
            .handle(HandleStepResponseCommand {
                workflow_id,
                step_id,
                user_id: user(),
                organization_id: org(),
                input: input.to_string(),
            })
            .await
    }

    /// Runs a social post workflow from collection to approval.
    async fn complete_social_post(&self, thread_id: ThreadId, company: &str) -> WorkflowId {
        let id = self.start(thread_id, WorkflowType::SocialPost).await;
        self.ai.push_response(dialog_reply(
            "Got it.",
            true,
            json!({"companyInfo": {"name": company, "industry": "Bakery"}, "tone": "warm"}),
        ));
        self.ai.push_response("Fresh bread every morning! #bakery");
        self.respond(id, &format!("We are {}, a bakery. Announce our new rye.", company))
            .await
            .unwrap();
        let approved = self.respond(id, "approve").await.unwrap();
        assert!(approved.workflow_completed);
        id
    }
}

// =============================================================================
// Transitions
// =============================================================================

#[tokio::test]
async fn dialog_turn_without_completion_keeps_step() {
    let h = Harness::new();
    let id = h.start(ThreadId::new(), WorkflowType::BlogArticle).await;
    h.ai.push_response(dialog_reply(
        "What should the article cover?",
        false,
        json!({"companyInfo": {"name": "Acme"}}),
    ));

    let result = h.respond(id, "We are Acme").await.unwrap();

    assert_eq!(result.reply, "What should the article cover?");
    assert!(!result.step_completed);
    assert_eq!(result.current_step.as_deref(), Some(INFORMATION_COLLECTION));

    let workflow = h.workflow(id).await;
    let step = workflow.current_step().unwrap();
    assert_eq!(step.name(), INFORMATION_COLLECTION);
    assert_eq!(step.metadata().collected["companyInfo"]["name"], json!("Acme"));
    assert_eq!(step.metadata().history.len(), 2);
}

#[tokio::test]
async fn order_breaks_ties_among_eligible_steps() {
    let custom = WorkflowTemplate::new(
        TemplateId::new(),
        WorkflowType::Newsletter,
        "Ordered",
        vec![
            StepSpec::new("A", StepKind::Dialog),
            StepSpec::new("B", StepKind::Dialog).depends_on("A"),
            StepSpec::new("C", StepKind::Dialog),
        ],
    )
    .unwrap();
    let h = Harness::with_templates(
        TemplateRegistry::from_templates([base_template(), custom]).unwrap(),
    );
    let id = h.start(ThreadId::new(), WorkflowType::Newsletter).await;
    h.ai.push_response(dialog_reply("Done with A.", true, json!({})));

    let result = h.respond(id, "here is everything").await.unwrap();

    assert!(result.step_completed);
    assert_eq!(result.current_step.as_deref(), Some("B"));
    let workflow = h.workflow(id).await;
    assert_eq!(workflow.current_step().unwrap().name(), "B");
    assert_eq!(workflow.step_by_name("C").unwrap().status(), StepStatus::Pending);
}

#[tokio::test]
async fn auto_execute_steps_run_without_user_input() {
    let h = Harness::new();
    let thread = ThreadId::new();
    let id = h.start(thread, WorkflowType::BlogArticle).await;
    h.ai.push_response(dialog_reply(
        "Thanks, writing now.",
        true,
        json!({"companyInfo": {"name": "Acme"}, "announcementTopic": "spring menu"}),
    ));
    h.ai.push_response("1. Intro\n2. Menu");
    h.ai.push_response("Spring is here at Acme...");

    let result = h.respond(id, "Acme, spring menu, friendly").await.unwrap();

    assert_eq!(result.auto_executed, vec!["Outline".to_string(), "Draft".to_string()]);
    assert_eq!(result.current_step.as_deref(), Some(ASSET_REVIEW));
    assert!(!result.workflow_completed);

    let posted = h.delivery.messages_for(&thread).await;
    assert_eq!(posted, vec!["1. Intro\n2. Menu".to_string(), "Spring is here at Acme...".to_string()]);

    let workflow = h.workflow(id).await;
    assert_eq!(workflow.latest_artifact(), Some("Spring is here at Acme..."));
    assert_eq!(workflow.step_by_name("Draft").unwrap().status(), StepStatus::Complete);
    assert_eq!(h.ai.call_count(), 3);
}

#[tokio::test]
async fn final_step_completion_renews_thread_exactly_once() {
    let h = Harness::new();
    let thread = ThreadId::new();
    let id = h.start(thread, WorkflowType::SocialPost).await;
    h.ai.push_response(dialog_reply("Great.", true, json!({"companyInfo": {"name": "Acme"}})));
    h.ai.push_response("Post text");
    h.respond(id, "Acme, new rye bread").await.unwrap();
    h.delivery.clear().await;

    let result = h.respond(id, "Looks good").await.unwrap();

    assert!(result.step_completed);
    assert!(result.workflow_completed);
    assert_eq!(result.current_step, None);
    let renewal = result.new_workflow.unwrap();
    assert_eq!(renewal.reason, NewWorkflowReason::Renewal);
    assert_eq!(renewal.workflow_type, WorkflowType::Base);

    let finished = h.workflow(id).await;
    assert_eq!(finished.status(), WorkflowStatus::Completed);
    assert_eq!(finished.current_step_id(), None);

    let on_thread = h.repo.find_by_thread(&thread).await.unwrap();
    assert_eq!(on_thread.len(), 2);
    let base = &on_thread[1];
    assert_eq!(base.id(), renewal.workflow_id);
    assert_eq!(base.status(), WorkflowStatus::InProgress);
    assert!(base.first_dialog_step().unwrap().metadata().carryover.is_none());
    // Renewal is silent
    assert!(h.delivery.messages_for(&thread).await.is_empty());
}

#[tokio::test]
async fn resubmitting_completed_step_is_a_conflict() {
    let h = Harness::new();
    let id = h.start(ThreadId::new(), WorkflowType::PressRelease).await;
    let step_id = h.workflow(id).await.current_step_id().unwrap();
    let reply = dialog_reply("All set.", true, json!({"companyInfo": {"name": "Acme"}}));
    h.ai.push_response(reply.clone());
    h.ai.push_response("Release text");

    let first = h.respond_to(id, step_id, "Acme opens a store").await.unwrap();
    let current_after_first = h.workflow(id).await.current_step_id();
    h.ai.push_response(reply);
    let second = h.respond_to(id, step_id, "Acme opens a store").await;

    assert!(first.step_completed);
    let err = second.unwrap_err();
    assert!(err.is_conflict());
    assert_eq!(h.workflow(id).await.current_step_id(), current_after_first);
}

#[tokio::test]
async fn racing_requests_on_the_final_step_renew_once() {
    let single = WorkflowTemplate::new(
        TemplateId::new(),
        WorkflowType::Newsletter,
        "Single",
        vec![StepSpec::new("Only", StepKind::Dialog)],
    )
    .unwrap();
    let h = Harness::with_repository(
        TemplateRegistry::from_templates([base_template(), single]).unwrap(),
        |repo| {
            Arc::new(SlowPointerRepository {
                inner: repo,
                delay: Duration::from_millis(50),
            })
        },
    );
    let thread = ThreadId::new();
    let id = h.start(thread, WorkflowType::Newsletter).await;
    let step_id = h.workflow(id).await.current_step_id().unwrap();
    h.ai.push_response(dialog_reply("All done.", true, json!({})));

    let engine = h.engine.clone();
    let first = tokio::spawn(async move {
        HandleStepResponseHandler::new(engine)
            .handle(HandleStepResponseCommand {
                workflow_id: id,
                step_id,
                user_id: user(),
                organization_id: org(),
                input: "all done".to_string(),
            })
            .await
    });
    // Second request lands while the first is stalled on its pointer write.
    tokio::time::sleep(Duration::from_millis(10)).await;
    let second = h.respond_to(id, step_id, "all done").await;
    let first = first.await.unwrap();

    let outcomes = [first, second];
    let succeeded: Vec<_> = outcomes.iter().filter_map(|r| r.as_ref().ok()).collect();
    assert_eq!(succeeded.len(), 1);
    assert!(succeeded[0].workflow_completed);
    assert!(outcomes
        .iter()
        .filter_map(|r| r.as_ref().err())
        .all(|e| e.is_conflict()));

    let on_thread = h.repo.find_by_thread(&thread).await.unwrap();
    assert_eq!(on_thread.len(), 2);
    assert_eq!(
        on_thread.iter().filter(|w| w.workflow_type() == WorkflowType::Base).count(),
        1
    );
    assert_eq!(h.workflow(id).await.status(), WorkflowStatus::Completed);
    let profile = h.profiles.get_profile(&user(), &org()).await.unwrap().unwrap();
    assert_eq!(profile.total_completed(), 1);
}

#[tokio::test]
async fn unknown_workflow_and_step_are_not_found() {
    let h = Harness::new();
    let err = h
        .respond_to(WorkflowId::new(), StepId::new(), "hi")
        .await
        .unwrap_err();
    assert!(matches!(err, WorkflowEngineError::WorkflowNotFound(_)));

    let id = h.start(ThreadId::new(), WorkflowType::Newsletter).await;
    let err = h
        .respond_to(id, StepId::new(), "hi")
        .await
        .unwrap_err();
    assert!(matches!(err, WorkflowEngineError::StepNotFound(_)));
}

// =============================================================================
// Cross-workflow switching
// =============================================================================

#[tokio::test]
async fn social_post_request_switches_with_carryover() {
    let h = Harness::new();
    let thread = ThreadId::new();
    let blog_id = h.start(thread, WorkflowType::BlogArticle).await;
    h.ai.push_response(dialog_reply(
        "Nice to meet you, Acme.",
        false,
        json!({"companyInfo": {"name": "Acme", "industry": "Bakery"}}),
    ));
    h.respond(blog_id, "We are Acme, a bakery").await.unwrap();
    h.ai.push_response("Sure, let's do that.");

    let result = h.respond(blog_id, "now do a social post").await.unwrap();

    let created = result.new_workflow.unwrap();
    assert_eq!(created.reason, NewWorkflowReason::Switch);
    assert_eq!(created.workflow_type, WorkflowType::SocialPost);
    assert!(created.carryover_applied);
    assert!(result.workflow_completed);

    let blog = h.workflow(blog_id).await;
    assert_eq!(blog.status(), WorkflowStatus::Completed);
    assert_eq!(blog.current_step_id(), None);
    assert_eq!(
        blog.step_by_name(INFORMATION_COLLECTION).unwrap().status(),
        StepStatus::Complete
    );

    let social = h.workflow(created.workflow_id).await;
    assert_eq!(social.thread_id(), thread);
    let collection = social.step_by_name(INFORMATION_COLLECTION).unwrap();
    let meta = collection.metadata();
    assert_eq!(meta.carryover_from_workflow, Some(blog_id));
    assert_eq!(meta.collected["companyInfo"]["name"], json!("Acme"));
    assert!(meta.carryover_note.as_deref().unwrap().contains("Blog Article"));

    // Exactly the switch target, no renewal
    assert_eq!(h.repo.find_by_thread(&thread).await.unwrap().len(), 2);
    // Created silently
    assert!(h.delivery.messages_for(&thread).await.is_empty());
}

#[tokio::test]
async fn switch_without_company_starts_cold() {
    let h = Harness::new();
    let id = h.start(ThreadId::new(), WorkflowType::Newsletter).await;
    h.ai.push_response("Happy to help.");

    let result = h.respond(id, "actually, write a press release").await.unwrap();

    let created = result.new_workflow.unwrap();
    assert_eq!(created.workflow_type, WorkflowType::PressRelease);
    assert!(!created.carryover_applied);
    let release = h.workflow(created.workflow_id).await;
    assert!(release.first_dialog_step().unwrap().metadata().carryover.is_none());
}

#[tokio::test]
async fn carryover_is_sanitized() {
    let h = Harness::new();
    let blog_id = h.start(ThreadId::new(), WorkflowType::BlogArticle).await;
    h.ai.push_response(dialog_reply(
        "Noted.",
        false,
        json!({"companyInfo": {"name": "Acme", "contact": "ceo@acme.example.com"}}),
    ));
    h.respond(blog_id, "We are Acme").await.unwrap();
    h.ai.push_response("OK.");

    let result = h.respond(blog_id, "now do a social post").await.unwrap();

    let social = h.workflow(result.new_workflow.unwrap().workflow_id).await;
    let carried = social.first_dialog_step().unwrap().metadata().carryover.clone().unwrap();
    assert_eq!(carried["companyInfo"]["name"], json!("Acme"));
    assert!(!carried.to_string().contains("ceo@acme.example.com"));
}

// =============================================================================
// Degradation
// =============================================================================

#[tokio::test]
async fn search_failure_still_returns_reply_with_empty_context() {
    let h = Harness::new();
    h.search.set_unavailable(true);
    let id = h.start(ThreadId::new(), WorkflowType::EmailCampaign).await;
    h.ai.push_response(dialog_reply("What is the goal?", false, json!({})));

    let result = h.respond(id, "spring campaign").await.unwrap();

    assert_eq!(result.reply, "What is the goal?");
    assert!(!result.context_used);
    assert!(!result.degraded);
}

#[tokio::test]
async fn enhanced_failure_falls_back_to_baseline() {
    let h = Harness::new();
    let id = h.start(ThreadId::new(), WorkflowType::EmailCampaign).await;
    h.ai.push_error(MockError::Unavailable {
        message: "overloaded".to_string(),
    });
    h.ai.push_response(dialog_reply("Baseline answer.", false, json!({})));

    let result = h.respond(id, "hello").await.unwrap();

    assert!(result.degraded);
    assert_eq!(result.reply, "Baseline answer.");
    let call = h.ai.last_call().unwrap();
    assert!(!call.system_prompt.unwrap().contains("## Session context"));
}

#[tokio::test]
async fn double_failure_asks_to_retry_without_transition() {
    let h = Harness::new();
    let id = h.start(ThreadId::new(), WorkflowType::EmailCampaign).await;
    let before = h.workflow(id).await;
    for _ in 0..2 {
        h.ai.push_error(MockError::Network {
            message: "reset".to_string(),
        });
    }

    let result = h.respond(id, "hello").await.unwrap();

    assert_eq!(result.reply, TRY_AGAIN_REPLY);
    assert!(!result.step_completed);
    assert_eq!(h.workflow(id).await, before);
}

// =============================================================================
// Consistency
// =============================================================================

#[tokio::test]
async fn interrupted_transition_is_recovered() {
    let h = Harness::new();
    let registry = TemplateRegistry::builtin();
    let mut workflow = Workflow::instantiate(
        registry.for_type(WorkflowType::BlogArticle).unwrap(),
        ThreadId::new(),
    );
    let collection = workflow.current_step_id().unwrap();
    // Crash after the step commit, before the next step started.
    workflow
        .apply_step_patch(
            collection,
            StepPatch::transition(StepStatus::InProgress, StepStatus::Complete),
        )
        .unwrap();
    h.repo.insert(workflow.clone()).await;

    let err = h.respond_to(workflow.id(), collection, "hello").await.unwrap_err();

    assert!(err.is_conflict());
    let recovered = h.workflow(workflow.id()).await;
    assert!(!recovered.needs_recovery());
    assert_eq!(recovered.current_step().unwrap().name(), ASSET_REVIEW);
    assert!(recovered.check_invariants().is_ok());
}

#[tokio::test]
async fn invariant_violation_rejects_and_leaves_state() {
    let h = Harness::new();
    let registry = TemplateRegistry::builtin();
    let mut workflow = Workflow::instantiate(
        registry.for_type(WorkflowType::BlogArticle).unwrap(),
        ThreadId::new(),
    );
    let outline = workflow.step_by_name("Outline").unwrap().id();
    workflow
        .apply_step_patch(outline, StepPatch::transition(StepStatus::Pending, StepStatus::InProgress))
        .unwrap();
    h.repo.insert(workflow.clone()).await;

    let err = h
        .respond_to(workflow.id(), workflow.current_step_id().unwrap(), "hello")
        .await
        .unwrap_err();

    assert!(matches!(err, WorkflowEngineError::InvariantViolation { .. }));
    assert_eq!(h.workflow(workflow.id()).await, workflow);
    assert_eq!(h.ai.call_count(), 0);
}

// =============================================================================
// Security
// =============================================================================

#[tokio::test]
async fn sensitive_data_never_reaches_the_prompt() {
    let h = Harness::new();
    h.search
        .index(IndexedContent {
            content: "Spring rye launch went well, ask jane@acme.example.com".to_string(),
            source: SourceMetadata {
                source_id: "conv-1".to_string(),
                content_type: SearchContentType::Conversation,
                asset_type: AssetType::Conversation,
                declared_level: None,
                global: false,
            },
            organization_id: Some(org()),
            user_id: Some(user()),
        })
        .await;
    h.search
        .index(IndexedContent {
            content: "Spring rye launch salary review for bakers".to_string(),
            source: SourceMetadata {
                source_id: "hr-1".to_string(),
                content_type: SearchContentType::Document,
                asset_type: AssetType::HumanResources,
                declared_level: None,
                global: false,
            },
            organization_id: Some(org()),
            user_id: None,
        })
        .await;
    let id = h.start(ThreadId::new(), WorkflowType::SocialPost).await;
    h.ai.push_response(dialog_reply("Tell me more.", false, json!({})));

    let result = h
        .respond(id, "Spring rye launch, call me at 555-123-4567")
        .await
        .unwrap();

    assert!(result.context_used);
    let call = h.ai.last_call().unwrap();
    let prompt = call.system_prompt.clone().unwrap();
    assert!(prompt.contains("Spring rye launch went well"));
    assert!(!prompt.contains("jane@acme.example.com"));
    assert!(!prompt.contains("salary review"));
    assert!(!call.last_user_message().unwrap().contains("555-123-4567"));
}

// =============================================================================
// Start, status and learning
// =============================================================================

#[tokio::test]
async fn non_silent_start_posts_initial_prompt() {
    let h = Harness::new();
    let thread = ThreadId::new();

    let result = StartWorkflowHandler::new(h.engine.clone())
        .handle(StartWorkflowCommand {
            thread_id: thread,
            workflow_type: WorkflowType::Newsletter,
            user_id: user(),
            organization_id: org(),
            silent: false,
        })
        .await
        .unwrap();

    let opening = result.opening_message.unwrap();
    assert_eq!(h.delivery.messages_for(&thread).await, vec![opening]);
    assert_eq!(result.current_step.as_deref(), Some(INFORMATION_COLLECTION));
    assert!(result.auto_executed.is_empty());
}

#[tokio::test]
async fn status_query_reports_progress() {
    let h = Harness::new();
    let id = h.start(ThreadId::new(), WorkflowType::BlogArticle).await;
    h.ai.push_response(dialog_reply("Writing.", true, json!({"companyInfo": {"name": "Acme"}})));
    h.respond(id, "Acme").await.unwrap();

    let view = GetWorkflowStatusHandler::new(Arc::new(h.repo.clone()))
        .handle(GetWorkflowStatusQuery { workflow_id: id })
        .await
        .unwrap();

    assert_eq!(view.workflow_type, WorkflowType::BlogArticle);
    assert_eq!(view.current_step.as_deref(), Some(ASSET_REVIEW));
    assert_eq!(
        view.completed_steps,
        vec![INFORMATION_COLLECTION.to_string(), "Outline".to_string(), "Draft".to_string()]
    );
}

#[tokio::test]
async fn preferences_are_learned_only_after_repeated_use() {
    let h = Harness::new();

    h.complete_social_post(ThreadId::new(), "Acme").await;
    let profile = h.profiles.get_profile(&user(), &org()).await.unwrap().unwrap();
    assert_eq!(profile.total_completed(), 1);
    assert_eq!(profile.company_name(), None);

    h.complete_social_post(ThreadId::new(), "Acme").await;
    let profile = h.profiles.get_profile(&user(), &org()).await.unwrap().unwrap();
    assert_eq!(profile.total_completed(), 2);
    assert_eq!(profile.company_name(), Some("Acme"));
    assert_eq!(profile.tone(), Some("warm"));
}

#[tokio::test]
async fn learning_failure_does_not_fail_the_request() {
    let h = Harness::new();
    h.profiles.set_unavailable(true);

    let id = h.complete_social_post(ThreadId::new(), "Acme").await;

    assert_eq!(h.workflow(id).await.status(), WorkflowStatus::Completed);
    assert_eq!(h.profiles.profile_count().await, 0);
}
