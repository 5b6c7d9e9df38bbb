//! Prompt context injector - prepends a bounded context header to step
//! instructions.
//!
//! The header is built only from a [`ContextBundle`], which holds sanitized
//! content exclusively. Base instructions are appended unmodified.

use crate::domain::workflow::WorkflowType;

use super::ContextBundle;

/// Header may use up to this share of the base instructions' length,
/// which keeps it near 20% of the final prompt.
const DEFAULT_HEADER_RATIO: f32 = 0.25;

/// Floor for the header budget so identity and rules always fit.
const DEFAULT_MIN_HEADER_CHARS: usize = 900;

/// Longest snippet rendered from a single context item.
const MAX_SNIPPET_CHARS: usize = 240;

const ACTION_RULES: [&str; 3] = [
    "- If the user wants to stop, exit or cancel, acknowledge it and stop asking questions.",
    "- If the user asks which step you are on or how far along they are, answer from the workflow line above.",
    "- If the user asks for a different kind of content, say you will start a new workflow for it and name that workflow.",
];

const COMPANY_FACTS_RULE: &str =
    "- Company and industry above are already known. Use them and do not ask for them again.";

const PII_RULE: &str =
    "- Parts of the user's message were redacted. Never repeat, guess or ask for the redacted data.";

/// Builds augmented step instructions.
#[derive(Debug, Clone)]
pub struct PromptContextInjector {
    header_ratio: f32,
    min_header_chars: usize,
}

impl Default for PromptContextInjector {
    fn default() -> Self {
        Self {
            header_ratio: DEFAULT_HEADER_RATIO,
            min_header_chars: DEFAULT_MIN_HEADER_CHARS,
        }
    }
}

impl PromptContextInjector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_budget(mut self, header_ratio: f32, min_header_chars: usize) -> Self {
        self.header_ratio = header_ratio.max(0.0);
        self.min_header_chars = min_header_chars;
        self
    }

    /// Maximum header length for the given base instructions.
    pub fn header_budget(&self, base_instructions: &str) -> usize {
        let proportional = (base_instructions.len() as f32 * self.header_ratio) as usize;
        proportional.max(self.min_header_chars)
    }

    /// Returns `header + "\n\n" + base_instructions`.
    pub fn inject(
        &self,
        base_instructions: &str,
        bundle: &ContextBundle,
        workflow_type: WorkflowType,
        step_name: &str,
    ) -> String {
        let header = self.build_header(base_instructions, bundle, workflow_type, step_name);
        format!("{}\n\n{}", header, base_instructions)
    }

    /// Builds the header alone, never longer than [`header_budget`](Self::header_budget).
    pub fn build_header(
        &self,
        base_instructions: &str,
        bundle: &ContextBundle,
        workflow_type: WorkflowType,
        step_name: &str,
    ) -> String {
        let budget = self.header_budget(base_instructions);
        let mut header = HeaderWriter::new(budget);

        header.push("## Session context");
        if let Some(line) = profile_line(bundle) {
            header.push(&line);
        }
        header.push(&format!(
            "Current workflow: {}. Current step: {}.",
            workflow_type.display_name(),
            step_name
        ));

        header.push("Rules:");
        for rule in ACTION_RULES {
            header.push(rule);
        }
        if workflow_type.is_content_creation() && bundle.user_profile.has_company_facts() {
            header.push(COMPANY_FACTS_RULE);
        }
        if bundle.input_has_pii() {
            header.push(PII_RULE);
        }

        let items = bundle.ranked_items();
        if !items.is_empty() && header.fits("Relevant prior work:") {
            header.push("Relevant prior work:");
            for item in items {
                let snippet = format!("- {}", truncate_chars(item.content.trim(), MAX_SNIPPET_CHARS));
                if !header.push_if_fits(&snippet) {
                    break;
                }
            }
        }

        if !bundle.suggestions.is_empty() && header.fits("Suggestions:") {
            header.push("Suggestions:");
            for suggestion in &bundle.suggestions {
                if !header.push_if_fits(&format!("- {}", suggestion)) {
                    break;
                }
            }
        }

        header.finish()
    }
}

/// Accumulates header lines under a character budget.
struct HeaderWriter {
    lines: Vec<String>,
    used: usize,
    budget: usize,
}

impl HeaderWriter {
    fn new(budget: usize) -> Self {
        Self {
            lines: Vec::new(),
            used: 0,
            budget,
        }
    }

    fn cost(&self, line: &str) -> usize {
        line.len() + usize::from(!self.lines.is_empty())
    }

    fn fits(&self, line: &str) -> bool {
        self.used + self.cost(line) <= self.budget
    }

    /// Mandatory lines are truncated to the remaining budget rather than dropped.
    fn push(&mut self, line: &str) {
        let remaining = self.budget.saturating_sub(self.used + usize::from(!self.lines.is_empty()));
        if remaining == 0 {
            return;
        }
        let line = truncate_bytes(line, remaining);
        self.used += self.cost(line);
        self.lines.push(line.to_string());
    }

    fn push_if_fits(&mut self, line: &str) -> bool {
        if self.fits(line) {
            self.used += self.cost(line);
            self.lines.push(line.to_string());
            true
        } else {
            false
        }
    }

    fn finish(self) -> String {
        self.lines.join("\n")
    }
}

fn profile_line(bundle: &ContextBundle) -> Option<String> {
    let profile = &bundle.user_profile;
    let parts: Vec<String> = [
        ("Role", &profile.role),
        ("Company", &profile.company_name),
        ("Industry", &profile.industry),
        ("Preferred tone", &profile.tone),
    ]
    .iter()
    .filter_map(|(label, value)| {
        value
            .as_deref()
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(|v| format!("{}: {}", label, v))
    })
    .collect();

    if parts.is_empty() {
        None
    } else {
        Some(format!("User profile: {}.", parts.join("; ")))
    }
}

fn truncate_chars(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let cut: String = text.chars().take(max_chars.saturating_sub(3)).collect();
    format!("{}...", cut.trim_end())
}

fn truncate_bytes(text: &str, max_bytes: usize) -> &str {
    if text.len() <= max_bytes {
        return text;
    }
    let mut end = max_bytes;
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    &text[..end]
}
