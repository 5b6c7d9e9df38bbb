//! Learning recorder.
//!
//! Distills a finished workflow into signals and folds them into the
//! user's knowledge profile. Failures here never reach the caller of the
//! workflow operation; they are logged and dropped.

use std::sync::Arc;

use crate::config::{LearningConfig, LearningMode};
use crate::domain::foundation::{DomainError, OrganizationId, UserId};
use crate::domain::learning::{LearningSignals, UserKnowledgeProfile};
use crate::domain::workflow::Workflow;
use crate::ports::ProfileStore;

/// What one recording did to the profile.
#[derive(Debug, Clone, PartialEq)]
pub struct LearningOutcome {
    pub confidence: f32,
    pub preferences_applied: bool,
    pub usage_recorded: bool,
}

#[derive(Clone)]
pub struct LearningRecorder {
    profiles: Arc<dyn ProfileStore>,
    config: LearningConfig,
    mode: LearningMode,
}

impl LearningRecorder {
    pub fn new(profiles: Arc<dyn ProfileStore>, config: LearningConfig) -> Self {
        Self {
            profiles,
            config,
            mode: LearningMode::default(),
        }
    }

    pub fn with_mode(mut self, mode: LearningMode) -> Self {
        self.mode = mode;
        self
    }

    /// Records the workflow according to the configured mode.
    ///
    /// Inline mode awaits the profile write; background mode hands it to
    /// the runtime and returns at once.
    pub async fn dispatch(&self, workflow: &Workflow, user_id: &UserId, organization_id: &OrganizationId) {
        match self.mode {
            LearningMode::Inline => {
                self.record_logged(workflow, user_id, organization_id).await;
            }
            LearningMode::Background => {
                let recorder = self.clone();
                let workflow = workflow.clone();
                let user_id = user_id.clone();
                let organization_id = organization_id.clone();
                tokio::spawn(async move {
                    recorder
                        .record_logged(&workflow, &user_id, &organization_id)
                        .await;
                });
            }
        }
    }

    async fn record_logged(&self, workflow: &Workflow, user_id: &UserId, organization_id: &OrganizationId) {
        match self.record(workflow, user_id, organization_id).await {
            Ok(outcome) => tracing::debug!(
                workflow_id = %workflow.id(),
                user_id = %user_id,
                confidence = outcome.confidence,
                preferences_applied = outcome.preferences_applied,
                "Learning recorded"
            ),
            Err(err) => tracing::warn!(
                workflow_id = %workflow.id(),
                user_id = %user_id,
                error = %err,
                "Learning recording failed"
            ),
        }
    }

    /// Updates the profile from one workflow.
    ///
    /// Usage statistics are always recorded for completed workflows.
    /// Preference fields are overwritten only when confidence exceeds the
    /// configured threshold.
    pub async fn record(
        &self,
        workflow: &Workflow,
        user_id: &UserId,
        organization_id: &OrganizationId,
    ) -> Result<LearningOutcome, DomainError> {
        // 1. Load or create the profile
        let mut profile = self
            .profiles
            .get_profile(user_id, organization_id)
            .await?
            .unwrap_or_else(|| UserKnowledgeProfile::new(user_id.clone(), organization_id.clone()));

        // 2. Score the signals against prior history
        let signals = LearningSignals::from_workflow(workflow);
        let prior = profile.total_completed();
        let confidence = signals.confidence(prior, self.config.frequent_after);

        // 3. Apply
        let usage_recorded = signals.completed;
        if usage_recorded {
            profile.record_usage(signals.workflow_type, signals.completion_secs);
        }
        let preferences_applied = confidence > self.config.confidence_threshold;
        if preferences_applied {
            profile.apply_preferences(&signals);
        }

        // 4. Persist
        self.profiles.upsert_profile(&profile).await?;

        Ok(LearningOutcome {
            confidence,
            preferences_applied,
            usage_recorded,
        })
    }
}
