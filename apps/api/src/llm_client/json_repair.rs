//! Tolerant decoding of JSON embedded in model output.
//!
//! Models wrap JSON in code fences, prepend commentary, leave trailing commas or
//! use single quotes. Decoding runs three passes and keeps the first success:
//! 1. direct parse after fence/BOM/control-character cleanup
//! 2. candidate extraction (fenced block, outer object, outer array) + syntax repair
//! 3. bare outer-object extraction

use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;
use tracing::{debug, warn};

static FENCED_JSON: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)```json\s*(.*?)\s*```").unwrap());
static FENCED_ANY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)```\s*(.*?)\s*```").unwrap());
static OUTER_OBJECT: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?s)\{.*\}").unwrap());
static OUTER_ARRAY: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?s)\[.*\]").unwrap());

static CONTROL_CHARS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[\x00-\x1f\x7f-\x9f]").unwrap());
static SINGLE_QUOTED_KEY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"'([^']*)'\s*:").unwrap());
static SINGLE_QUOTED_VALUE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r":\s*'([^']*)'").unwrap());
static TRAILING_COMMA: LazyLock<Regex> = LazyLock::new(|| Regex::new(r",(\s*[}\]])").unwrap());

/// Decodes the JSON value carried by an LLM reply, or `None` when no pass succeeds.
pub fn parse_llm_json(text: &str) -> Option<Value> {
    let cleaned = clean_response(text);
    match serde_json::from_str(&cleaned) {
        Ok(value) => return Some(value),
        Err(e) => debug!("Direct JSON parse failed at line {} column {}: {e}", e.line(), e.column()),
    }

    if let Some(value) = repair_candidates(text) {
        debug!("JSON recovered after syntax repair");
        return Some(value);
    }

    if let Some(found) = OUTER_OBJECT.find(text.trim()) {
        let extracted = strip_control_chars(found.as_str(), true);
        if let Ok(value) = serde_json::from_str(&extracted) {
            debug!("JSON recovered by object extraction");
            return Some(value);
        }
    }

    warn!(
        "Could not decode JSON from LLM output: {:?}",
        text.chars().take(200).collect::<String>()
    );
    None
}

/// Basic cleanup: whitespace, BOM, code fences and stray control characters.
fn clean_response(text: &str) -> String {
    let text = text.trim();
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);
    let text = strip_json_fences(text);
    strip_control_chars(text, true)
}

/// Strips ```json ... ``` or ``` ... ``` code fences from LLM output.
pub fn strip_json_fences(text: &str) -> &str {
    let text = text.trim();
    if let Some(stripped) = text.strip_prefix("```json") {
        stripped
            .trim_start()
            .strip_suffix("```")
            .map(|s| s.trim())
            .unwrap_or(stripped.trim_start())
    } else if let Some(stripped) = text.strip_prefix("```") {
        stripped
            .trim_start()
            .strip_suffix("```")
            .map(|s| s.trim())
            .unwrap_or(stripped.trim_start())
    } else {
        text
    }
}

/// Removes control characters. `keep_whitespace` preserves `\n`, `\r` and `\t`.
fn strip_control_chars(text: &str, keep_whitespace: bool) -> String {
    text.chars()
        .filter(|c| !c.is_control() || (keep_whitespace && matches!(c, '\n' | '\r' | '\t')))
        .collect()
}

fn repair_candidates(text: &str) -> Option<Value> {
    let text = text.trim();
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);

    let candidates = [
        FENCED_JSON
            .captures(text)
            .and_then(|c| c.get(1))
            .map(|m| m.as_str()),
        FENCED_ANY
            .captures(text)
            .and_then(|c| c.get(1))
            .map(|m| m.as_str()),
        OUTER_OBJECT.find(text).map(|m| m.as_str()),
        OUTER_ARRAY.find(text).map(|m| m.as_str()),
    ];

    candidates
        .into_iter()
        .flatten()
        .map(|candidate| fix_common_issues(candidate.trim()))
        .find_map(|fixed| serde_json::from_str(&fixed).ok())
}

/// Repairs the syntax mistakes models commonly make.
fn fix_common_issues(content: &str) -> String {
    let content = CONTROL_CHARS.replace_all(content, " ");
    let content = SINGLE_QUOTED_KEY.replace_all(&content, "\"${1}\":");
    let content = SINGLE_QUOTED_VALUE.replace_all(&content, ": \"${1}\"");
    let content = TRAILING_COMMA.replace_all(&content, "${1}");
    quote_bare_keys(content.trim())
}

/// Quotes unquoted object keys (`{key: 1}`). String literals are copied
/// untouched so values such as `"a, b: c"` survive.
fn quote_bare_keys(content: &str) -> String {
    let chars: Vec<char> = content.chars().collect();
    let mut out = String::with_capacity(content.len() + 16);
    let mut in_string = false;
    let mut escaped = false;
    let mut expect_key = false;
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        if in_string {
            out.push(c);
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == '"' {
                in_string = false;
            }
            i += 1;
            continue;
        }

        if expect_key && (c.is_ascii_alphabetic() || c == '_') {
            let start = i;
            while i < chars.len() && (chars[i].is_ascii_alphanumeric() || chars[i] == '_') {
                i += 1;
            }
            let mut lookahead = i;
            while lookahead < chars.len() && chars[lookahead].is_whitespace() {
                lookahead += 1;
            }
            let ident: String = chars[start..i].iter().collect();
            if chars.get(lookahead) == Some(&':') {
                out.push('"');
                out.push_str(&ident);
                out.push('"');
            } else {
                out.push_str(&ident);
            }
            expect_key = false;
            continue;
        }

        match c {
            '"' => {
                in_string = true;
                expect_key = false;
            }
            '{' | ',' => expect_key = true,
            c if c.is_whitespace() => {}
            _ => expect_key = false,
        }
        out.push(c);
        i += 1;
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_strip_json_fences_with_json_tag() {
        let input = "```json\n{\"key\": \"value\"}\n```";
        assert_eq!(strip_json_fences(input), "{\"key\": \"value\"}");
    }

    #[test]
    fn test_strip_json_fences_without_tag() {
        let input = "```\n{\"key\": \"value\"}\n```";
        assert_eq!(strip_json_fences(input), "{\"key\": \"value\"}");
    }

    #[test]
    fn test_strip_json_fences_no_fences() {
        let input = "{\"key\": \"value\"}";
        assert_eq!(strip_json_fences(input), "{\"key\": \"value\"}");
    }

    #[test]
    fn test_plain_json_parses() {
        let value = parse_llm_json(r#"{"question": "Tell me about yourself"}"#).unwrap();
        assert_eq!(value["question"], "Tell me about yourself");
    }

    #[test]
    fn test_bom_and_fences_are_removed() {
        let value = parse_llm_json("\u{feff}```json\n{\"score\": 0.7}\n```").unwrap();
        assert_eq!(value, json!({"score": 0.7}));
    }

    #[test]
    fn test_json_surrounded_by_commentary() {
        let text = "Sure! Here is the analysis:\n{\"match_level\": \"good\"}\nLet me know.";
        let value = parse_llm_json(text).unwrap();
        assert_eq!(value["match_level"], "good");
    }

    #[test]
    fn test_trailing_commas_are_repaired() {
        let text = r#"{"skills": ["rust", "sql",], "level": "senior",}"#;
        let value = parse_llm_json(text).unwrap();
        assert_eq!(value["skills"], json!(["rust", "sql"]));
    }

    #[test]
    fn test_single_quotes_are_repaired() {
        let text = "{'decision': 'hire'}";
        let value = parse_llm_json(text).unwrap();
        assert_eq!(value["decision"], "hire");
    }

    #[test]
    fn test_bare_keys_are_quoted() {
        let text = r#"{should_follow_up: true, reason: "vague answer"}"#;
        let value = parse_llm_json(text).unwrap();
        assert_eq!(value["should_follow_up"], true);
    }

    #[test]
    fn test_repair_leaves_colons_inside_strings_alone() {
        let text = r#"{"note": "a, b: c", "tags": ["x, y: z"],}"#;
        let value = parse_llm_json(text).unwrap();
        assert_eq!(value["note"], "a, b: c");
        assert_eq!(value["tags"], json!(["x, y: z"]));
    }

    #[test]
    fn test_bare_keys_next_to_quoted_values_with_colons() {
        let text = r#"{reason: "vague: no numbers, weak", should_follow_up: true,}"#;
        let value = parse_llm_json(text).unwrap();
        assert_eq!(value["reason"], "vague: no numbers, weak");
        assert_eq!(value["should_follow_up"], true);
    }

    #[test]
    fn test_raw_newline_inside_string_is_repaired() {
        let text = "{\"summary\": \"line one\nline two\"}";
        let value = parse_llm_json(text).unwrap();
        assert!(value["summary"].as_str().unwrap().contains("line one"));
    }

    #[test]
    fn test_array_reply_is_accepted() {
        let value = parse_llm_json("Result: [1, 2, 3]").unwrap();
        assert_eq!(value, json!([1, 2, 3]));
    }

    #[test]
    fn test_no_json_returns_none() {
        assert!(parse_llm_json("no structured content here").is_none());
    }
}
