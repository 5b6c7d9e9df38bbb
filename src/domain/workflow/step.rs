//! Workflow step entity and its metadata.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::domain::foundation::{
    DomainError, ErrorCode, StateMachine, StepId, StepStatus, Timestamp, WorkflowId,
};

use super::{StepKind, StepSpec};

/// Who spoke in a stored chat turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TurnRole {
    User,
    Assistant,
}

/// One stored exchange line. User turns are stored already sanitized.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatTurn {
    pub role: TurnRole,
    pub content: String,
}

impl ChatTurn {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: TurnRole::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: TurnRole::Assistant,
            content: content.into(),
        }
    }
}

/// Free-form step state persisted alongside the step.
///
/// Serialized in camelCase since it is shared with the chat front end.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StepMetadata {
    pub base_instructions: String,
    #[serde(default)]
    pub auto_execute: bool,
    /// Structured data gathered by a dialog step.
    #[serde(default)]
    pub collected: Map<String, Value>,
    /// Latest artifact produced by a generation or review step.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generated_artifact: Option<String>,
    #[serde(default)]
    pub history: Vec<ChatTurn>,
    /// Data forwarded from a previous workflow on the same thread.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub carryover: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub carryover_from_workflow: Option<WorkflowId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub carryover_note: Option<String>,
    /// True once any turn of this step ran with a non-empty context bundle.
    #[serde(default)]
    pub context_used: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub started_at: Option<Timestamp>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<Timestamp>,
}

impl StepMetadata {
    /// Shallow-merges `incoming` into the collected data; nested objects are
    /// merged one level deep so partial updates keep earlier fields.
    pub fn merge_collected(&mut self, incoming: &Map<String, Value>) {
        for (key, value) in incoming {
            match (self.collected.get_mut(key), value) {
                (Some(Value::Object(existing)), Value::Object(update)) => {
                    for (k, v) in update {
                        existing.insert(k.clone(), v.clone());
                    }
                }
                _ => {
                    self.collected.insert(key.clone(), value.clone());
                }
            }
        }
    }

    /// User turns recorded in this step, oldest first.
    pub fn user_turns(&self) -> impl Iterator<Item = &str> {
        self.history
            .iter()
            .filter(|t| t.role == TurnRole::User)
            .map(|t| t.content.as_str())
    }
}

/// One unit of work inside a workflow. Owned exclusively by its workflow.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkflowStep {
    id: StepId,
    workflow_id: WorkflowId,
    name: String,
    kind: StepKind,
    order: u32,
    dependencies: Vec<String>,
    status: StepStatus,
    metadata: StepMetadata,
}

impl WorkflowStep {
    /// Creates a pending step from its template definition.
    pub fn from_spec(workflow_id: WorkflowId, order: u32, spec: &StepSpec) -> Self {
        Self {
            id: StepId::new(),
            workflow_id,
            name: spec.name.clone(),
            kind: spec.kind,
            order,
            dependencies: spec.depends_on.clone(),
            status: StepStatus::Pending,
            metadata: StepMetadata {
                base_instructions: spec.instructions.clone(),
                auto_execute: spec.auto_execute,
                ..StepMetadata::default()
            },
        }
    }

    pub fn id(&self) -> StepId {
        self.id
    }

    pub fn workflow_id(&self) -> WorkflowId {
        self.workflow_id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> StepKind {
        self.kind
    }

    pub fn order(&self) -> u32 {
        self.order
    }

    pub fn dependencies(&self) -> &[String] {
        &self.dependencies
    }

    pub fn status(&self) -> StepStatus {
        self.status
    }

    pub fn metadata(&self) -> &StepMetadata {
        &self.metadata
    }

    pub fn is_auto_execute(&self) -> bool {
        self.metadata.auto_execute
    }

    pub(crate) fn metadata_mut(&mut self) -> &mut StepMetadata {
        &mut self.metadata
    }

    /// Starts a fresh step when its workflow is instantiated.
    pub(crate) fn begin(&mut self) {
        if self.status == StepStatus::Pending {
            self.status = StepStatus::InProgress;
            self.metadata.started_at = Some(Timestamp::now());
        }
    }

    /// Applies a patch atomically: either every field changes or none does.
    ///
    /// # Errors
    ///
    /// - `ConcurrentModification` if `expected_status` does not match
    /// - `InvalidStateTransition` if the status change is not allowed
    pub fn apply_patch(&mut self, patch: StepPatch) -> Result<(), DomainError> {
        if let Some(expected) = patch.expected_status {
            if self.status != expected {
                return Err(DomainError::new(
                    ErrorCode::ConcurrentModification,
                    format!(
                        "Step '{}' is {} but {} was expected",
                        self.name, self.status, expected
                    ),
                )
                .with_detail("step_id", self.id.to_string()));
            }
        }

        let status = match patch.status {
            Some(target) if target != self.status => {
                self.status.transition_to(target).map_err(|e| {
                    DomainError::new(ErrorCode::InvalidStateTransition, e.to_string())
                        .with_detail("step_id", self.id.to_string())
                })?
            }
            _ => self.status,
        };

        let mut metadata = patch.metadata.unwrap_or_else(|| self.metadata.clone());
        if status != self.status {
            match status {
                StepStatus::InProgress => metadata.started_at = Some(Timestamp::now()),
                StepStatus::Complete => metadata.completed_at = Some(Timestamp::now()),
                StepStatus::Pending => {}
            }
        }

        self.status = status;
        self.metadata = metadata;
        Ok(())
    }
}

/// Partial update for a step, applied as one atomic write.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StepPatch {
    /// Compare-and-set guard on the current status.
    pub expected_status: Option<StepStatus>,
    pub status: Option<StepStatus>,
    pub metadata: Option<StepMetadata>,
}

impl StepPatch {
    /// Replaces metadata only.
    pub fn metadata(metadata: StepMetadata) -> Self {
        Self {
            metadata: Some(metadata),
            ..Self::default()
        }
    }

    /// Moves the step from `from` to `to`, failing if it is no longer `from`.
    pub fn transition(from: StepStatus, to: StepStatus) -> Self {
        Self {
            expected_status: Some(from),
            status: Some(to),
            metadata: None,
        }
    }

    pub fn expecting(mut self, status: StepStatus) -> Self {
        self.expected_status = Some(status);
        self
    }

    pub fn with_metadata(mut self, metadata: StepMetadata) -> Self {
        self.metadata = Some(metadata);
        self
    }
}
