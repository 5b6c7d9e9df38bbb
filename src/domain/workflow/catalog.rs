//! Built-in template catalog, used when no YAML catalog is configured.

use uuid::Uuid;

use crate::domain::foundation::TemplateId;

use super::{StepKind, StepSpec, TemplateRegistry, WorkflowTemplate, WorkflowType};

pub const INFORMATION_COLLECTION: &str = "Information Collection";
pub const ASSET_REVIEW: &str = "Asset Review";

const COLLECT_INSTRUCTIONS: &str = "Gather what is needed to write the piece: company name, \
industry, audience, goal, key message and tone. Ask one short question at a time and never \
ask for something already known.";

const REVIEW_INSTRUCTIONS: &str = "Revise the draft according to the user's feedback. Keep \
everything the user did not ask to change and return the full revised text.";

/// Stable ids so persisted workflows keep resolving across restarts.
fn builtin_id(workflow_type: WorkflowType) -> TemplateId {
    let suffix = WorkflowType::ALL
        .iter()
        .position(|t| *t == workflow_type)
        .unwrap_or(0) as u128;
    TemplateId::from_uuid(Uuid::from_u128(0x5eed_0000_0000_4000_8000_0000_0000_0000 + suffix))
}

fn content_template(
    workflow_type: WorkflowType,
    generation_steps: &[(&str, &str)],
    initial_prompt: &str,
) -> WorkflowTemplate {
    let mut steps =
        vec![StepSpec::new(INFORMATION_COLLECTION, StepKind::Dialog).with_instructions(COLLECT_INSTRUCTIONS)];
    let mut previous = INFORMATION_COLLECTION;
    for (name, instructions) in generation_steps {
        steps.push(
            StepSpec::new(*name, StepKind::Generation)
                .depends_on(previous)
                .with_instructions(*instructions)
                .auto_execute(),
        );
        previous = *name;
    }
    steps.push(
        StepSpec::new(ASSET_REVIEW, StepKind::Review)
            .depends_on(previous)
            .with_instructions(REVIEW_INSTRUCTIONS),
    );

    WorkflowTemplate {
        id: builtin_id(workflow_type),
        workflow_type,
        name: workflow_type.display_name().to_string(),
        initial_prompt: Some(initial_prompt.to_string()),
        steps,
    }
}

/// One template per workflow type.
pub fn builtin_templates() -> Vec<WorkflowTemplate> {
    vec![
        WorkflowTemplate {
            id: builtin_id(WorkflowType::Base),
            workflow_type: WorkflowType::Base,
            name: "Assistant".to_string(),
            initial_prompt: None,
            steps: vec![StepSpec::new("Conversation", StepKind::Dialog).with_instructions(
                "Help the user with their content questions. When they want a specific piece \
                 of content, name the workflow you can start for it.",
            )],
        },
        content_template(
            WorkflowType::BlogArticle,
            &[
                ("Outline", "Write a structured outline for the blog article from the collected information."),
                ("Draft", "Write the full blog article following the outline."),
            ],
            "Let's write a blog article. What is your company and what should the article be about?",
        ),
        content_template(
            WorkflowType::SocialPost,
            &[("Post Generation", "Write the social post, respecting the platform's length limits.")],
            "Let's create a social post. What should it announce or promote?",
        ),
        content_template(
            WorkflowType::PressRelease,
            &[("Release Draft", "Write a press release in standard format with headline, dateline and boilerplate.")],
            "Let's draft a press release. What are you announcing?",
        ),
        content_template(
            WorkflowType::Newsletter,
            &[("Newsletter Draft", "Write the newsletter with a subject line and short sections.")],
            "Let's put together a newsletter. Who is it for and what is new?",
        ),
        content_template(
            WorkflowType::EmailCampaign,
            &[("Email Sequence", "Write the campaign emails, each with subject line and call to action.")],
            "Let's plan an email campaign. What is the goal of the campaign?",
        ),
    ]
}

impl TemplateRegistry {
    /// Registry populated with [`builtin_templates`].
    pub fn builtin() -> Self {
        let mut registry = TemplateRegistry::new();
        for template in builtin_templates() {
            if let Err(err) = registry.register(template) {
                tracing::error!(error = %err, "Built-in template failed validation");
            }
        }
        registry
    }
}
