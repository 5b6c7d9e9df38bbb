use once_cell::sync::Lazy;
use regex::Regex;

use crate::domain::workflow::WorkflowType;

/// Alternation of every alias and display name, longest first so
/// "blog article" wins over "blog".
fn alias_alternation() -> String {
    let mut phrases: Vec<String> = WorkflowType::ALL
        .iter()
        .filter(|t| t.is_content_creation())
        .flat_map(|t| {
            t.aliases()
                .iter()
                .map(|a| a.to_string())
                .chain(std::iter::once(t.display_name().to_lowercase()))
        })
        .collect();
    phrases.sort_by(|a, b| b.len().cmp(&a.len()).then_with(|| a.cmp(b)));
    phrases.dedup();
    phrases
        .iter()
        .map(|p| regex::escape(p).replace(' ', r"\s+"))
        .collect::<Vec<_>>()
        .join("|")
}

/// "now do a social post", "can you write a press release", "switch to newsletter".
static USER_REQUEST: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(
        r"(?i)\b(?:do|write|create|make|draft|start|generate|produce|prepare|want|need|switch\s+to|move\s+on\s+to)(?:\s+(?:me|us))?(?:\s+(?:a|an|another|new))*\s+({})\b",
        alias_alternation()
    ))
    .unwrap()
});

/// "I'll start a new Social Post workflow for you."
static MODEL_PROPOSAL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(
        r"(?i)\b(?:start|starting|begin|beginning|open|opening|launch|launching|kick\s+off|set\s+up|switch(?:ing)?\s+to|mov(?:e|ing)\s+on\s+to)\s+(?:(?:a|an|the|your)\s+)?(?:new\s+)?({})\s+workflow\b",
        alias_alternation()
    ))
    .unwrap()
});

/// Explicit marker a model may emit: `[[start_workflow: social_post]]`.
static WORKFLOW_MARKER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\[\[\s*(?:start|switch)_workflow\s*:\s*([a-z_ ]+?)\s*\]\]").unwrap()
});

/// Which path produced a detection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntentSource {
    UserRequest,
    ModelProposal,
}

/// A detected request to move to another workflow type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CrossWorkflowIntent {
    pub target: WorkflowType,
    pub source: IntentSource,
}

/// Pattern-based cross-workflow intent detector.
#[derive(Debug, Clone, Default)]
pub struct IntentDetector;

impl IntentDetector {
    pub fn new() -> Self {
        Self
    }

    /// Returns the requested workflow type when it differs from `current`.
    ///
    /// The user's explicit request is checked before the model's proposal.
    pub fn detect(
        &self,
        model_output: &str,
        user_input: &str,
        current: WorkflowType,
    ) -> Option<CrossWorkflowIntent> {
        self.from_user_input(user_input, current)
            .map(|target| CrossWorkflowIntent {
                target,
                source: IntentSource::UserRequest,
            })
            .or_else(|| {
                self.from_model_output(model_output, current)
                    .map(|target| CrossWorkflowIntent {
                        target,
                        source: IntentSource::ModelProposal,
                    })
            })
    }

    /// Detection path (b): the user names a different content type.
    pub fn from_user_input(&self, user_input: &str, current: WorkflowType) -> Option<WorkflowType> {
        USER_REQUEST
            .captures_iter(user_input)
            .filter_map(|c| c.get(1))
            .filter_map(|m| WorkflowType::from_alias(&normalize(m.as_str())))
            .find(|t| *t != current)
    }

    /// Detection path (a): the model proposes starting a named workflow.
    pub fn from_model_output(&self, model_output: &str, current: WorkflowType) -> Option<WorkflowType> {
        let marked = WORKFLOW_MARKER
            .captures_iter(model_output)
            .filter_map(|c| c.get(1))
            .filter_map(|m| m.as_str().parse::<WorkflowType>().ok());
        let proposed = MODEL_PROPOSAL
            .captures_iter(model_output)
            .filter_map(|c| c.get(1))
            .filter_map(|m| WorkflowType::from_alias(&normalize(m.as_str())));

        marked
            .chain(proposed)
            .find(|t| *t != current && t.is_content_creation())
    }
}

fn normalize(phrase: &str) -> String {
    phrase.split_whitespace().collect::<Vec<_>>().join(" ")
}
