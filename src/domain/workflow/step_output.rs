//! Interpreting what a model or user said during a step.

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{Map, Value};
use std::ops::Range;

/// Input used when the engine runs a step without a user turn.
pub const AUTO_EXECUTE_SENTINEL: &str = "[auto-execute]";

/// Appended to dialog instructions so the model reports progress in a
/// machine-readable block.
pub const DIALOG_PROTOCOL: &str = "After your reply, append a fenced ```json block of the form \
{\"complete\": <true|false>, \"collected\": {<fields gathered so far>}}. \
Set complete to true only once everything this step needs is known. \
Use the key companyInfo for an object with the company's name and industry, \
and the keys announcementTopic and tone where they apply.";

static APPROVAL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)\b(?:approved?|approving|looks\s+(?:good|great|perfect)|lgtm|perfect|ship\s+it|publish\s+it|good\s+to\s+go|that\s+works|all\s+good|i\s+love\s+it|sounds\s+good)\b",
    )
    .unwrap()
});

static REVISION_HINT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)\b(?:but|change|revise|rewrite|edit|tweak|shorter|longer|instead|except|however|add|remove|replace|fix|not)\b",
    )
    .unwrap()
});

/// Negations flip an approval phrase: "I don't approve", "never publish it".
static NEGATION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)\b(?:no|nope|nah|never|dont|doesnt|isnt|cant|wont|reject(?:ed)?|disapproved?|unapproved)\b|\w+n['’]t\b",
    )
    .unwrap()
});

/// True when the user approves the presented artifact without asking for
/// any change.
pub fn is_approval(input: &str) -> bool {
    APPROVAL.is_match(input) && !REVISION_HINT.is_match(input) && !NEGATION.is_match(input)
}

/// A dialog reply split into user-visible text and the progress block.
#[derive(Debug, Clone, PartialEq)]
pub struct DialogOutput {
    /// Model output with the progress block removed, trimmed.
    pub reply: String,
    pub complete: bool,
    pub collected: Map<String, Value>,
}

impl DialogOutput {
    /// Splits model output. Without a progress block the step is not
    /// complete and nothing is collected.
    pub fn parse(output: &str) -> Self {
        let found = last_fenced_block(output).or_else(|| last_bare_block(output));
        match found {
            Some((range, block)) => {
                let reply = format!("{}{}", &output[..range.start], &output[range.end..]);
                Self {
                    reply: reply.trim().to_string(),
                    complete: block.get("complete").and_then(Value::as_bool).unwrap_or(false),
                    collected: block
                        .get("collected")
                        .and_then(Value::as_object)
                        .cloned()
                        .unwrap_or_default(),
                }
            }
            None => Self {
                reply: output.trim().to_string(),
                complete: false,
                collected: Map::new(),
            },
        }
    }
}

fn as_progress_block(text: &str) -> Option<Map<String, Value>> {
    let value: Value = serde_json::from_str(text.trim()).ok()?;
    let object = value.as_object()?;
    if object.contains_key("complete") || object.contains_key("collected") {
        Some(object.clone())
    } else {
        None
    }
}

/// Last ```` ``` ```` or ```` ```json ```` fence whose body is a progress block.
fn last_fenced_block(s: &str) -> Option<(Range<usize>, Map<String, Value>)> {
    let mut found = None;
    let mut cursor = 0;
    while let Some(offset) = s[cursor..].find("```") {
        let open = cursor + offset;
        let mut body_start = open + 3;
        if s[body_start..].starts_with("json") {
            body_start += 4;
        }
        let Some(close_offset) = s[body_start..].find("```") else {
            break;
        };
        let close = body_start + close_offset;
        let end = close + 3;
        if let Some(block) = as_progress_block(&s[body_start..close]) {
            found = Some((open..end, block));
        }
        cursor = end;
    }
    found
}

/// Last balanced `{...}` that parses as a progress block.
fn last_bare_block(s: &str) -> Option<(Range<usize>, Map<String, Value>)> {
    let mut found = None;
    let mut cursor = 0;
    while let Some(offset) = s[cursor..].find('{') {
        let start = cursor + offset;
        match balanced_end(s, start) {
            Some(end) => {
                if let Some(block) = as_progress_block(&s[start..end]) {
                    found = Some((start..end, block));
                    cursor = end;
                } else {
                    cursor = start + 1;
                }
            }
            None => break,
        }
    }
    found
}

/// Byte index just past the brace closing the one at `start`.
fn balanced_end(s: &str, start: usize) -> Option<usize> {
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escape_next = false;

    for (i, c) in s[start..].char_indices() {
        if escape_next {
            escape_next = false;
            continue;
        }
        match c {
            '\\' if in_string => escape_next = true,
            '"' => in_string = !in_string,
            _ if in_string => {}
            '{' => depth += 1,
            '}' => {
                depth = depth.checked_sub(1)?;
                if depth == 0 {
                    return Some(start + i + 1);
                }
            }
            _ => {}
        }
    }
    None
}
