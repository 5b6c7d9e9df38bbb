//! Data forwarded from a finished workflow into the next one on a thread.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::Workflow;

const COMPANY_INFO: &str = "companyInfo";
const COMPANY_NAME_KEYS: [&str; 3] = ["companyName", "company_name", "company"];
const TOPIC_KEYS: [&str; 3] = ["announcementTopic", "announcement", "topic"];
const TONE_KEYS: [&str; 3] = ["tone", "brandTone", "voice"];

/// Subset of a workflow's collected and generated data worth reusing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CarryoverContext {
    /// Always contains a non-empty `name`.
    pub company_info: Map<String, Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latest_artifact: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub announcement_topic: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tone: Option<String>,
}

impl CarryoverContext {
    /// Extracts carryover from a workflow, or `None` when no company name
    /// can be recovered.
    pub fn extract(workflow: &Workflow) -> Option<Self> {
        let collected = workflow.collected_data();

        let mut company_info = match collected.get(COMPANY_INFO) {
            Some(Value::Object(info)) => info.clone(),
            _ => Map::new(),
        };
        if !has_name(&company_info) {
            let name = COMPANY_NAME_KEYS
                .iter()
                .find_map(|key| non_empty_str(collected.get(*key)))?;
            company_info.insert("name".to_string(), Value::String(name));
        }
        if !company_info.contains_key("industry") {
            if let Some(industry) = non_empty_str(collected.get("industry")) {
                company_info.insert("industry".to_string(), Value::String(industry));
            }
        }

        Some(Self {
            company_info,
            latest_artifact: workflow.latest_artifact().map(str::to_string),
            announcement_topic: TOPIC_KEYS
                .iter()
                .find_map(|key| non_empty_str(collected.get(*key))),
            tone: TONE_KEYS
                .iter()
                .find_map(|key| non_empty_str(collected.get(*key))),
        })
    }

    pub fn company_name(&self) -> Option<&str> {
        self.company_info.get("name").and_then(Value::as_str)
    }

    pub fn to_json(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}

fn has_name(info: &Map<String, Value>) -> bool {
    non_empty_str(info.get("name")).is_some()
}

fn non_empty_str(value: Option<&Value>) -> Option<String> {
    value
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::{StepStatus, ThreadId};
    use crate::domain::workflow::{StepPatch, TemplateRegistry, WorkflowType, INFORMATION_COLLECTION};
    use serde_json::json;

    fn blog_with(collected: Value) -> Workflow {
        let registry = TemplateRegistry::builtin();
        let mut workflow = Workflow::instantiate(
            registry.for_type(WorkflowType::BlogArticle).unwrap(),
            ThreadId::new(),
        );
        let step = workflow.step_by_name(INFORMATION_COLLECTION).unwrap();
        let id = step.id();
        let mut meta = step.metadata().clone();
        meta.merge_collected(collected.as_object().unwrap());
        workflow
            .apply_step_patch(
                id,
                StepPatch::transition(StepStatus::InProgress, StepStatus::Complete).with_metadata(meta),
            )
            .unwrap();
        workflow
    }

    #[test]
    fn extracts_company_info_topic_and_tone() {
        let w = blog_with(json!({
            "companyInfo": {"name": "Acme", "industry": "Bakery"},
            "topic": "Spring menu",
            "tone": "warm"
        }));
        let c = CarryoverContext::extract(&w).unwrap();
        assert_eq!(c.company_name(), Some("Acme"));
        assert_eq!(c.company_info["industry"], "Bakery");
        assert_eq!(c.announcement_topic.as_deref(), Some("Spring menu"));
        assert_eq!(c.tone.as_deref(), Some("warm"));
    }

    #[test]
    fn flat_company_name_is_lifted_into_company_info() {
        let w = blog_with(json!({"companyName": "Acme", "industry": "Retail"}));
        let c = CarryoverContext::extract(&w).unwrap();
        assert_eq!(c.company_info["name"], "Acme");
        assert_eq!(c.company_info["industry"], "Retail");
    }

    #[test]
    fn no_company_name_means_no_carryover() {
        let w = blog_with(json!({"topic": "Spring menu", "companyInfo": {"name": "  "}}));
        assert!(CarryoverContext::extract(&w).is_none());
    }

    #[test]
    fn json_form_is_camel_case() {
        let w = blog_with(json!({"companyInfo": {"name": "Acme"}}));
        let v = CarryoverContext::extract(&w).unwrap().to_json();
        assert_eq!(v["companyInfo"]["name"], "Acme");
        assert!(v.get("latestArtifact").is_none());
    }
}
