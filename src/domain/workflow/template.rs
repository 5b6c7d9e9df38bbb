//! Workflow templates - immutable step definitions.

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

use crate::domain::foundation::{TemplateId, ValidationError};

use super::{StepKind, WorkflowType};

/// Definition of one step inside a template.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepSpec {
    /// Unique within the template.
    pub name: String,
    pub kind: StepKind,
    /// Names of steps that must be complete before this one may start.
    #[serde(default)]
    pub depends_on: Vec<String>,
    /// Base instructions handed to the model for this step.
    #[serde(default)]
    pub instructions: String,
    /// Run without waiting for a user turn once the step becomes current.
    #[serde(default)]
    pub auto_execute: bool,
}

impl StepSpec {
    pub fn new(name: impl Into<String>, kind: StepKind) -> Self {
        Self {
            name: name.into(),
            kind,
            depends_on: Vec::new(),
            instructions: String::new(),
            auto_execute: false,
        }
    }

    pub fn depends_on(mut self, name: impl Into<String>) -> Self {
        self.depends_on.push(name.into());
        self
    }

    pub fn with_instructions(mut self, instructions: impl Into<String>) -> Self {
        self.instructions = instructions.into();
        self
    }

    pub fn auto_execute(mut self) -> Self {
        self.auto_execute = true;
        self
    }
}

/// Immutable definition of a workflow: ordered steps plus an opening prompt.
///
/// Step order in `steps` is the default sequencing; dependencies gate it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkflowTemplate {
    #[serde(default)]
    pub id: TemplateId,
    pub workflow_type: WorkflowType,
    pub name: String,
    /// Message shown when the workflow is started non-silently.
    #[serde(default)]
    pub initial_prompt: Option<String>,
    pub steps: Vec<StepSpec>,
}

impl WorkflowTemplate {
    /// Creates and validates a template.
    pub fn new(
        id: TemplateId,
        workflow_type: WorkflowType,
        name: impl Into<String>,
        steps: Vec<StepSpec>,
    ) -> Result<Self, ValidationError> {
        let template = Self {
            id,
            workflow_type,
            name: name.into(),
            initial_prompt: None,
            steps,
        };
        template.validate()?;
        Ok(template)
    }

    pub fn with_initial_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.initial_prompt = Some(prompt.into());
        self
    }

    /// Checks structural rules: at least one step, unique names, known
    /// dependencies, no self-dependency and no dependency cycle.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.name.trim().is_empty() {
            return Err(ValidationError::empty_field("name"));
        }
        if self.steps.is_empty() {
            return Err(ValidationError::invalid_format(
                "steps",
                format!("template '{}' has no steps", self.name),
            ));
        }

        let mut names = HashSet::new();
        for step in &self.steps {
            if step.name.trim().is_empty() {
                return Err(ValidationError::empty_field("steps.name"));
            }
            if !names.insert(step.name.as_str()) {
                return Err(ValidationError::invalid_format(
                    "steps",
                    format!("duplicate step name '{}'", step.name),
                ));
            }
        }

        for step in &self.steps {
            for dep in &step.depends_on {
                if dep == &step.name {
                    return Err(ValidationError::invalid_format(
                        "depends_on",
                        format!("step '{}' depends on itself", step.name),
                    ));
                }
                if !names.contains(dep.as_str()) {
                    return Err(ValidationError::invalid_format(
                        "depends_on",
                        format!("step '{}' depends on unknown step '{}'", step.name, dep),
                    ));
                }
            }
        }

        self.check_acyclic()
    }

    /// Kahn's algorithm over the dependency graph.
    fn check_acyclic(&self) -> Result<(), ValidationError> {
        let mut remaining: HashMap<&str, usize> = self
            .steps
            .iter()
            .map(|s| {
                let distinct: HashSet<&String> = s.depends_on.iter().collect();
                (s.name.as_str(), distinct.len())
            })
            .collect();
        let mut ready: Vec<&str> = remaining
            .iter()
            .filter(|(_, n)| **n == 0)
            .map(|(name, _)| *name)
            .collect();
        let mut resolved = 0;

        while let Some(name) = ready.pop() {
            resolved += 1;
            for step in &self.steps {
                if step.depends_on.iter().any(|d| d == name) {
                    if let Some(count) = remaining.get_mut(step.name.as_str()) {
                        *count -= 1;
                        if *count == 0 {
                            ready.push(step.name.as_str());
                        }
                    }
                }
            }
        }

        if resolved == self.steps.len() {
            Ok(())
        } else {
            Err(ValidationError::invalid_format(
                "depends_on",
                format!("template '{}' has a dependency cycle", self.name),
            ))
        }
    }

    pub fn step(&self, name: &str) -> Option<&StepSpec> {
        self.steps.iter().find(|s| s.name == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dialog(name: &str) -> StepSpec {
        StepSpec::new(name, StepKind::Dialog)
    }

    fn template(steps: Vec<StepSpec>) -> Result<WorkflowTemplate, ValidationError> {
        WorkflowTemplate::new(TemplateId::new(), WorkflowType::BlogArticle, "Blog", steps)
    }

    #[test]
    fn valid_template_passes() {
        let t = template(vec![
            dialog("A"),
            StepSpec::new("B", StepKind::Generation).depends_on("A").auto_execute(),
        ]);
        assert!(t.is_ok());
    }

    #[test]
    fn empty_template_is_rejected() {
        assert!(template(vec![]).is_err());
    }

    #[test]
    fn duplicate_names_are_rejected() {
        assert!(template(vec![dialog("A"), dialog("A")]).is_err());
    }

    #[test]
    fn unknown_dependency_is_rejected() {
        assert!(template(vec![dialog("A").depends_on("Z")]).is_err());
    }

    #[test]
    fn self_dependency_is_rejected() {
        assert!(template(vec![dialog("A").depends_on("A")]).is_err());
    }

    #[test]
    fn cycle_is_rejected() {
        let err = template(vec![
            dialog("A").depends_on("C"),
            dialog("B").depends_on("A"),
            dialog("C").depends_on("B"),
        ])
        .unwrap_err();
        assert!(err.to_string().contains("cycle"));
    }

    #[test]
    fn deserializes_from_yaml_with_defaults() {
        let yaml = r#"
workflow_type: social_post
name: Social Post
steps:
  - name: Information Collection
    kind: dialog
  - name: Post Generation
    kind: generation
    depends_on: [Information Collection]
    auto_execute: true
"#;
        let t: WorkflowTemplate = serde_yaml::from_str(yaml).unwrap();
        assert!(t.validate().is_ok());
        assert_eq!(t.steps[1].depends_on, vec!["Information Collection".to_string()]);
        assert!(t.steps[1].auto_execute);
        assert!(t.initial_prompt.is_none());
    }
}
