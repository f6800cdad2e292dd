// Shared prompt constants and prompt-building utilities.
// Each service that needs LLM calls defines its own prompts.rs alongside it.
// This file contains cross-cutting prompt fragments.

use std::sync::LazyLock;

use regex::{Captures, Regex};

static PLACEHOLDER: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\{([a-z_]+)\}").unwrap());

/// System prompt fragment that enforces JSON-only output.
pub const JSON_ONLY_SYSTEM: &str = "You MUST respond with valid JSON only. \
    Do NOT include any text outside the JSON object. \
    Do NOT use markdown code fences. \
    Do NOT include explanations, reasoning or apologies.";

/// Instruction that keeps every call independent of earlier conversations.
pub const FRESH_CONTEXT_INSTRUCTION: &str =
    "Ignore any previous conversation. Base your answer ONLY on the material below.";

/// Composes a role description with the JSON-only contract.
pub fn json_system(role: &str) -> String {
    format!("{role} {JSON_ONLY_SYSTEM}")
}

/// Fills `{name}` placeholders in a single pass, so substituted text is never re-expanded.
/// Unknown placeholders are left untouched.
pub fn render(template: &str, values: &[(&str, &str)]) -> String {
    PLACEHOLDER
        .replace_all(template, |caps: &Captures| {
            let key = &caps[1];
            values
                .iter()
                .find(|(name, _)| *name == key)
                .map(|(_, value)| value.to_string())
                .unwrap_or_else(|| caps[0].to_string())
        })
        .into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_replaces_every_placeholder() {
        let out = render("{a} and {b} and {a}", &[("a", "x"), ("b", "y")]);
        assert_eq!(out, "x and y and x");
    }

    #[test]
    fn test_render_does_not_expand_substituted_text() {
        let out = render("{resume} / {job}", &[("resume", "I wrote {job}"), ("job", "SRE")]);
        assert_eq!(out, "I wrote {job} / SRE");
    }

    #[test]
    fn test_render_leaves_json_braces_alone() {
        let out = render(r#"{"name": "{name}"}"#, &[("name", "Ada")]);
        assert_eq!(out, r#"{"name": "Ada"}"#);
    }

    #[test]
    fn test_json_system_appends_contract() {
        let system = json_system("You are a recruiter.");
        assert!(system.starts_with("You are a recruiter."));
        assert!(system.contains("valid JSON only"));
    }
}
