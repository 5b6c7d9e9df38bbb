//! Signals harvested from a finished workflow.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::domain::foundation::Timestamp;
use crate::domain::workflow::{StepKind, Workflow, WorkflowType};

/// Average words per user turn below which input counts as brief.
const BRIEF_MAX_WORDS: f32 = 8.0;
/// Average words per user turn at or above which input counts as detailed.
const DETAILED_MIN_WORDS: f32 = 40.0;

/// How the user tends to write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InputStyle {
    Brief,
    Conversational,
    Detailed,
}

impl InputStyle {
    /// Classifies by mean word count; `None` without any turn.
    pub fn classify<'a>(turns: impl IntoIterator<Item = &'a str>) -> Option<InputStyle> {
        let counts: Vec<usize> = turns
            .into_iter()
            .map(|t| t.split_whitespace().count())
            .collect();
        if counts.is_empty() {
            return None;
        }
        let mean = counts.iter().sum::<usize>() as f32 / counts.len() as f32;
        Some(if mean < BRIEF_MAX_WORDS {
            InputStyle::Brief
        } else if mean < DETAILED_MIN_WORDS {
            InputStyle::Conversational
        } else {
            InputStyle::Detailed
        })
    }
}

/// Preference values observed in collected data.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PreferenceCandidates {
    pub company_name: Option<String>,
    pub industry: Option<String>,
    pub role: Option<String>,
    pub tone: Option<String>,
}

impl PreferenceCandidates {
    fn from_collected(collected: &Map<String, Value>) -> Self {
        let company_info = collected.get("companyInfo").and_then(Value::as_object);
        let nested = |key: &str| company_info.and_then(|info| text(info.get(key)));
        Self {
            company_name: nested("name").or_else(|| text(collected.get("companyName"))),
            industry: nested("industry").or_else(|| text(collected.get("industry"))),
            role: text(collected.get("role")).or_else(|| text(collected.get("userRole"))),
            tone: text(collected.get("tone")).or_else(|| text(collected.get("brandTone"))),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.company_name.is_none()
            && self.industry.is_none()
            && self.role.is_none()
            && self.tone.is_none()
    }
}

/// Light-weight facts about one finished workflow.
#[derive(Debug, Clone, PartialEq)]
pub struct LearningSignals {
    pub workflow_type: WorkflowType,
    pub input_style: Option<InputStyle>,
    pub context_used: bool,
    /// 0.0 to 1.0, weighted by step kind.
    pub step_complexity: f32,
    pub completion_secs: u64,
    pub completed: bool,
    pub preferences: PreferenceCandidates,
}

impl LearningSignals {
    pub fn from_workflow(workflow: &Workflow) -> Self {
        let turns = workflow
            .steps()
            .iter()
            .flat_map(|s| s.metadata().user_turns());
        let weight: f32 = workflow
            .steps()
            .iter()
            .map(|s| match s.kind() {
                StepKind::Dialog => 1.0,
                StepKind::Generation => 2.0,
                StepKind::Review => 1.5,
            })
            .sum();
        let finished_at = workflow.completed_at().unwrap_or_else(Timestamp::now);

        Self {
            workflow_type: workflow.workflow_type(),
            input_style: InputStyle::classify(turns),
            context_used: workflow.context_used(),
            step_complexity: (weight / 10.0).min(1.0),
            completion_secs: finished_at.secs_since(&workflow.created_at()),
            completed: !workflow.is_active(),
            preferences: PreferenceCandidates::from_collected(&workflow.collected_data()),
        }
    }

    /// Confidence that these signals should overwrite stored preferences.
    ///
    /// Weighted by outcome, by how often the user has completed workflows
    /// (`prior_completed` plus this one, saturating at `frequent_after`),
    /// by whether preferences were observed at all and by context use.
    pub fn confidence(&self, prior_completed: u32, frequent_after: u32) -> f32 {
        let outcome = if self.completed { 0.3 } else { 0.1 };
        let interactions = (prior_completed + 1) as f32;
        let frequency = 0.4 * (interactions / frequent_after.max(1) as f32).min(1.0);
        let richness = if self.preferences.is_empty() { 0.0 } else { 0.2 };
        let context = if self.context_used { 0.1 } else { 0.0 };
        (outcome + frequency + richness + context).clamp(0.0, 1.0)
    }

    #[cfg(test)]
    pub(crate) fn for_tests(workflow_type: WorkflowType) -> Self {
        Self {
            workflow_type,
            input_style: None,
            context_used: false,
            step_complexity: 0.0,
            completion_secs: 0,
            completed: true,
            preferences: PreferenceCandidates::default(),
        }
    }
}

fn text(value: Option<&Value>) -> Option<String> {
    value
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}
