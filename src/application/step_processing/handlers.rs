//! Per-kind step behaviour.
//!
//! Each [`StepKind`] has one handler. Handlers are pure: they build the
//! instructions for a turn and interpret the model's output, while the
//! processors own all I/O. Adding a step kind means adding a handler and a
//! match arm in [`handler_for`].

use serde_json::Value;

use crate::domain::workflow::{
    is_approval, ChatTurn, DialogOutput, StepKind, StepMetadata, Workflow, WorkflowStep,
    DIALOG_PROTOCOL,
};

/// Everything a handler may look at for one turn.
#[derive(Debug, Clone, Copy)]
pub struct StepTurn<'a> {
    pub workflow: &'a Workflow,
    pub step: &'a WorkflowStep,
    /// Sanitized user input. Meaningless when `sentinel` is set.
    pub input: &'a str,
    /// The engine runs this turn without a user message.
    pub sentinel: bool,
}

/// Result of one turn, before persistence.
#[derive(Debug, Clone, PartialEq)]
pub struct StepOutcome {
    pub reply: String,
    pub complete: bool,
    pub metadata: StepMetadata,
}

impl StepOutcome {
    /// Builds an outcome whose metadata records the turn in step history.
    pub fn recorded(turn: &StepTurn<'_>, mut metadata: StepMetadata, reply: String, complete: bool) -> Self {
        if !turn.sentinel {
            metadata.history.push(ChatTurn::user(turn.input));
        }
        metadata.history.push(ChatTurn::assistant(reply.clone()));
        Self {
            reply,
            complete,
            metadata,
        }
    }
}

pub trait StepHandler: Send + Sync {
    fn kind(&self) -> StepKind;

    /// Resolves the turn without a model call when the input allows it.
    fn shortcut(&self, _turn: &StepTurn<'_>) -> Option<StepOutcome> {
        None
    }

    /// Base instructions for the model, before any context is injected.
    fn instructions(&self, turn: &StepTurn<'_>) -> String;

    fn interpret(&self, turn: &StepTurn<'_>, model_output: &str) -> StepOutcome;
}

/// Handler for the given kind.
pub fn handler_for(kind: StepKind) -> &'static dyn StepHandler {
    match kind {
        StepKind::Dialog => &DialogHandler,
        StepKind::Generation => &GenerationHandler,
        StepKind::Review => &ReviewHandler,
    }
}

fn pretty(value: &Value) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
}

/// Collects structured data through conversation.
pub struct DialogHandler;

impl StepHandler for DialogHandler {
    fn kind(&self) -> StepKind {
        StepKind::Dialog
    }

    fn instructions(&self, turn: &StepTurn<'_>) -> String {
        let meta = turn.step.metadata();
        let mut out = meta.base_instructions.clone();

        if let Some(carryover) = &meta.carryover {
            out.push_str("\n\n");
            if let Some(note) = &meta.carryover_note {
                out.push_str(note);
                out.push('\n');
            }
            out.push_str("Already known from that work (do not ask for it again):\n");
            out.push_str(&pretty(carryover));
        }
        if !meta.collected.is_empty() {
            out.push_str("\n\nCollected so far:\n");
            out.push_str(&pretty(&Value::Object(meta.collected.clone())));
        }

        out.push_str("\n\n");
        out.push_str(DIALOG_PROTOCOL);
        out
    }

    fn interpret(&self, turn: &StepTurn<'_>, model_output: &str) -> StepOutcome {
        let parsed = DialogOutput::parse(model_output);
        let mut metadata = turn.step.metadata().clone();
        metadata.merge_collected(&parsed.collected);

        let reply = match (parsed.reply.is_empty(), parsed.complete) {
            (false, _) => parsed.reply,
            (true, true) => "Thanks, I have everything I need.".to_string(),
            (true, false) => "Could you tell me a little more?".to_string(),
        };
        StepOutcome::recorded(turn, metadata, reply, parsed.complete)
    }
}

/// Produces an artifact in a single model call.
pub struct GenerationHandler;

impl StepHandler for GenerationHandler {
    fn kind(&self) -> StepKind {
        StepKind::Generation
    }

    fn instructions(&self, turn: &StepTurn<'_>) -> String {
        let mut out = turn.step.metadata().base_instructions.clone();

        let collected = turn.workflow.collected_data();
        if !collected.is_empty() {
            out.push_str("\n\nInformation collected from the user:\n");
            out.push_str(&pretty(&Value::Object(collected)));
        }
        if let Some(previous) = turn.workflow.latest_artifact() {
            out.push_str("\n\nPrevious output to build on:\n");
            out.push_str(previous);
        }
        out
    }

    fn interpret(&self, turn: &StepTurn<'_>, model_output: &str) -> StepOutcome {
        let artifact = model_output.trim().to_string();
        let mut metadata = turn.step.metadata().clone();
        metadata.generated_artifact = Some(artifact.clone());
        StepOutcome::recorded(turn, metadata, artifact, true)
    }
}

const REVIEW_PROMPT: &str = "Reply \"approve\" to finish, or tell me what to change.";

/// Presents the latest artifact and loops on revisions until approved.
pub struct ReviewHandler;

impl StepHandler for ReviewHandler {
    fn kind(&self) -> StepKind {
        StepKind::Review
    }

    fn shortcut(&self, turn: &StepTurn<'_>) -> Option<StepOutcome> {
        let metadata = turn.step.metadata().clone();
        let artifact = metadata
            .generated_artifact
            .clone()
            .or_else(|| turn.workflow.latest_artifact().map(str::to_string));

        if turn.sentinel {
            let Some(artifact) = artifact else {
                return Some(StepOutcome::recorded(
                    turn,
                    metadata,
                    "There is nothing to review yet.".to_string(),
                    true,
                ));
            };
            let reply = format!("Here is the draft for review:\n\n{}\n\n{}", artifact, REVIEW_PROMPT);
            return Some(StepOutcome::recorded(turn, metadata, reply, false));
        }

        if is_approval(turn.input) {
            let mut metadata = metadata;
            metadata.generated_artifact = artifact;
            let reply = format!(
                "Approved. Your {} is final.",
                turn.workflow.workflow_type().display_name().to_lowercase()
            );
            return Some(StepOutcome::recorded(turn, metadata, reply, true));
        }
        None
    }

    fn instructions(&self, turn: &StepTurn<'_>) -> String {
        let meta = turn.step.metadata();
        let mut out = meta.base_instructions.clone();
        let draft = meta
            .generated_artifact
            .as_deref()
            .or_else(|| turn.workflow.latest_artifact());
        if let Some(draft) = draft {
            out.push_str("\n\nCurrent draft:\n");
            out.push_str(draft);
        }
        out
    }

    fn interpret(&self, turn: &StepTurn<'_>, model_output: &str) -> StepOutcome {
        let revised = model_output.trim().to_string();
        let mut metadata = turn.step.metadata().clone();
        metadata.generated_artifact = Some(revised.clone());
        let reply = format!("{}\n\n{}", revised, REVIEW_PROMPT);
        StepOutcome::recorded(turn, metadata, reply, false)
    }
}
