//! Response Parser
//!
//! Recovers a single JSON object from a free-text model reply. The reply is first
//! stripped of a surrounding code fence, then each entry of [`STRATEGIES`] is tried
//! in order until one yields an object:
//!
//! 1. `Direct` - the text as-is
//! 2. `BraceSpan` - first `{` through last `}`
//! 3. `Repaired` - the brace span after quote/comma repair
//!
//! When all of them fail the caller substitutes a templated object; that last step
//! lives with the use cases because only they know the shape.

use std::borrow::Cow;

use serde_json::Value;
use strum_macros::Display;
use thiserror::Error;

use crate::log_debug;

/// Which step produced the final value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "snake_case")]
pub enum ParseStrategy {
    Direct,
    BraceSpan,
    Repaired,
    TemplateFallback,
}

/// A JSON object recovered from a reply
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedReply {
    pub value: Value,
    pub strategy: ParseStrategy,
}

/// Every strategy failed; one entry per attempt
#[derive(Debug, Error)]
#[error("no JSON object could be recovered ({})", .attempts.join("; "))]
pub struct ParseFailure {
    pub attempts: Vec<String>,
}

struct Strategy {
    kind: ParseStrategy,
    candidate: fn(&str) -> Option<Cow<'_, str>>,
}

const STRATEGIES: &[Strategy] = &[
    Strategy {
        kind: ParseStrategy::Direct,
        candidate: direct_candidate,
    },
    Strategy {
        kind: ParseStrategy::BraceSpan,
        candidate: brace_span_candidate,
    },
    Strategy {
        kind: ParseStrategy::Repaired,
        candidate: repaired_candidate,
    },
];

fn direct_candidate(text: &str) -> Option<Cow<'_, str>> {
    Some(Cow::Borrowed(text))
}

fn brace_span_candidate(text: &str) -> Option<Cow<'_, str>> {
    extract_brace_span(text).map(Cow::Borrowed)
}

fn repaired_candidate(text: &str) -> Option<Cow<'_, str>> {
    let span = extract_brace_span(text).unwrap_or(text);
    Some(Cow::Owned(repair_json(span)))
}

/// Response parser for model replies that should contain one JSON object
#[derive(Clone, Debug, Default)]
pub struct ResponseParser;

impl ResponseParser {
    pub fn new() -> Self {
        Self
    }

    /// Run the strategy chain over `reply`
    pub fn parse(&self, reply: &str) -> Result<ParsedReply, ParseFailure> {
        log_debug!("Parser: parsing reply - {} chars", reply.len());
        let text = strip_code_fence(reply);
        let mut attempts = Vec::new();

        for strategy in STRATEGIES {
            let Some(candidate) = (strategy.candidate)(text) else {
                attempts.push(format!("{}: no candidate found", strategy.kind));
                continue;
            };

            match serde_json::from_str::<Value>(&candidate) {
                Ok(value @ Value::Object(_)) => {
                    log_debug!("Parser: {} succeeded", strategy.kind);
                    return Ok(ParsedReply {
                        value,
                        strategy: strategy.kind,
                    });
                }
                Ok(other) => attempts.push(format!(
                    "{}: expected a JSON object, found {}",
                    strategy.kind,
                    json_type_name(&other)
                )),
                Err(e) => attempts.push(format!("{}: {e}", strategy.kind)),
            }
        }

        log_debug!("Parser: all strategies failed: {}", attempts.join("; "));
        Err(ParseFailure { attempts })
    }
}

/// Remove a surrounding code fence.
///
/// A leading "```json" (7 chars) or bare "```" (3 chars) and a trailing "```" are
/// dropped. Other language tags are left in place for the brace-span step.
pub fn strip_code_fence(reply: &str) -> &str {
    let mut text = reply.trim();
    if let Some(rest) = text.strip_prefix("```json") {
        text = rest;
    } else if let Some(rest) = text.strip_prefix("```") {
        text = rest;
    }
    if let Some(rest) = text.strip_suffix("```") {
        text = rest;
    }
    text.trim()
}

/// First `{` through last `}`; not nesting-aware
pub fn extract_brace_span(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    (end > start).then(|| &text[start..=end])
}

/// Apply both textual repairs: interior quotes first so string tracking is
/// reliable when trailing commas are removed
pub fn repair_json(text: &str) -> String {
    strip_trailing_commas(&escape_interior_quotes(text))
}

/// Drop commas that directly precede `}` or `]` outside of strings
pub fn strip_trailing_commas(text: &str) -> String {
    let chars: Vec<char> = text.chars().collect();
    let mut out = String::with_capacity(text.len());
    let mut in_string = false;
    let mut escaped = false;

    for (i, &c) in chars.iter().enumerate() {
        if in_string {
            out.push(c);
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == '"' {
                in_string = false;
            }
            continue;
        }

        match c {
            '"' => {
                in_string = true;
                out.push(c);
            }
            ',' if next_significant(&chars, i + 1).is_some_and(|n| n == '}' || n == ']') => {}
            _ => out.push(c),
        }
    }

    out
}

/// Escape double quotes that sit inside a string value.
///
/// A quote only closes a string when the next non-space character is `,` `:` `}`
/// `]` or the end of input; any other quote is escaped. Raw newlines, carriage
/// returns and tabs inside strings are escaped as well. Text that is already
/// valid JSON comes back unchanged.
pub fn escape_interior_quotes(text: &str) -> String {
    let chars: Vec<char> = text.chars().collect();
    let mut out = String::with_capacity(text.len() + 16);
    let mut in_string = false;
    let mut escaped = false;

    for (i, &c) in chars.iter().enumerate() {
        if !in_string {
            if c == '"' {
                in_string = true;
            }
            out.push(c);
            continue;
        }

        if escaped {
            escaped = false;
            out.push(c);
            continue;
        }

        match c {
            '\\' => {
                escaped = true;
                out.push(c);
            }
            '"' => {
                let closes = next_significant(&chars, i + 1)
                    .is_none_or(|n| matches!(n, ',' | ':' | '}' | ']'));
                if closes {
                    in_string = false;
                    out.push(c);
                } else {
                    out.push_str("\\\"");
                }
            }
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            _ => out.push(c),
        }
    }

    out
}

fn next_significant(chars: &[char], from: usize) -> Option<char> {
    chars
        .get(from..)?
        .iter()
        .copied()
        .find(|c| !c.is_whitespace())
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_strip_code_fence_variants() {
        assert_eq!(strip_code_fence("```json\n{\"a\": 1}\n```"), "{\"a\": 1}");
        assert_eq!(strip_code_fence("```\n{\"a\": 1}\n```"), "{\"a\": 1}");
        assert_eq!(strip_code_fence("  {\"a\": 1}  "), "{\"a\": 1}");
    }

    #[test]
    fn test_brace_span_is_greedy() {
        let text = "first {\"a\": 1} then {\"b\": 2} done";
        assert_eq!(
            extract_brace_span(text),
            Some("{\"a\": 1} then {\"b\": 2}")
        );
        assert_eq!(extract_brace_span("} backwards {"), None);
        assert_eq!(extract_brace_span("no braces"), None);
    }

    #[test]
    fn test_valid_json_survives_repair_unchanged() {
        let valid = r#"{"title": "A \"quoted\" word", "tags": ["x", "y"], "n": {"k": ":"}}"#;
        assert_eq!(repair_json(valid), valid);
    }

    #[test]
    fn test_interior_quotes_are_escaped() {
        let broken = r#"{"improved_outcome": "Students will "design" a parser", "score": 7}"#;
        let repaired = escape_interior_quotes(broken);
        let value: Value = serde_json::from_str(&repaired).expect("repaired JSON should parse");
        assert_eq!(
            value["improved_outcome"],
            json!("Students will \"design\" a parser")
        );
    }

    #[test]
    fn test_trailing_commas_inside_strings_are_kept() {
        let text = r#"{"note": "a, }", "list": [1, 2,],}"#;
        let value: Value =
            serde_json::from_str(&strip_trailing_commas(text)).expect("should parse");
        assert_eq!(value, json!({"note": "a, }", "list": [1, 2]}));
    }

    #[test]
    fn test_strategy_order_is_reported() {
        let parser = ResponseParser::new();
        let direct = parser.parse(r#"{"a": 1}"#).expect("direct");
        assert_eq!(direct.strategy, ParseStrategy::Direct);

        let span = parser.parse("Sure! {\"a\": 1} Hope that helps.").expect("span");
        assert_eq!(span.strategy, ParseStrategy::BraceSpan);

        let repaired = parser.parse("{\"a\": 1,}").expect("repaired");
        assert_eq!(repaired.strategy, ParseStrategy::Repaired);
    }

    #[test]
    fn test_non_object_json_is_rejected() {
        let failure = ResponseParser::new()
            .parse("[1, 2, 3]")
            .expect_err("arrays are not accepted");
        assert_eq!(failure.attempts.len(), 3);
        assert!(failure.attempts[0].contains("expected a JSON object"));
    }
}
