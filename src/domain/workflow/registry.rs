//! Explicit template lookup, injected wherever templates are needed.

use std::collections::HashMap;

use crate::domain::foundation::{DomainError, ErrorCode, TemplateId};

use super::{WorkflowTemplate, WorkflowType};

/// Lookup table from workflow type and template id to template.
///
/// Holds at most one template per workflow type.
#[derive(Debug, Clone, Default)]
pub struct TemplateRegistry {
    by_type: HashMap<WorkflowType, WorkflowTemplate>,
    type_by_id: HashMap<TemplateId, WorkflowType>,
}

impl TemplateRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a registry, validating each template.
    ///
    /// # Errors
    ///
    /// `ValidationFailed` on an invalid template or a second template for
    /// the same workflow type.
    pub fn from_templates(
        templates: impl IntoIterator<Item = WorkflowTemplate>,
    ) -> Result<Self, DomainError> {
        let mut registry = Self::new();
        for template in templates {
            registry.register(template)?;
        }
        Ok(registry)
    }

    pub fn register(&mut self, template: WorkflowTemplate) -> Result<(), DomainError> {
        template.validate()?;
        if self.by_type.contains_key(&template.workflow_type) {
            return Err(DomainError::validation(
                "workflow_type",
                format!(
                    "a template for {} is already registered",
                    template.workflow_type
                ),
            ));
        }
        self.type_by_id.insert(template.id, template.workflow_type);
        self.by_type.insert(template.workflow_type, template);
        Ok(())
    }

    pub fn for_type(&self, workflow_type: WorkflowType) -> Option<&WorkflowTemplate> {
        self.by_type.get(&workflow_type)
    }

    pub fn get(&self, id: &TemplateId) -> Option<&WorkflowTemplate> {
        self.type_by_id.get(id).and_then(|t| self.by_type.get(t))
    }

    /// Like [`for_type`](Self::for_type) but returns `TemplateNotFound`.
    pub fn require(&self, workflow_type: WorkflowType) -> Result<&WorkflowTemplate, DomainError> {
        self.for_type(workflow_type).ok_or_else(|| {
            DomainError::new(
                ErrorCode::TemplateNotFound,
                format!("No template registered for {}", workflow_type),
            )
        })
    }

    pub fn contains(&self, workflow_type: WorkflowType) -> bool {
        self.by_type.contains_key(&workflow_type)
    }

    pub fn len(&self) -> usize {
        self.by_type.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_type.is_empty()
    }
}
