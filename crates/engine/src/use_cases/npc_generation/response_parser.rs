//! Extraction of the generated record list from raw service output.
//!
//! The service may wrap its JSON in commentary or code fences. The payload
//! is recovered by slicing, never repaired: unbalanced braces or trailing
//! commas fail.

use serde_json::Value;

/// Envelope key accepted around the record array.
const RECORDS_KEY: &str = "npcs";

/// The raw text could not be turned into a record list.
#[derive(Debug, Clone, thiserror::Error)]
#[error("Failed to parse generated records: {reason}")]
pub struct ParseError {
    pub reason: String,
    /// The text that failed to parse, kept for manual recovery.
    pub raw: String,
}

impl ParseError {
    fn new(reason: impl Into<String>, raw: &str) -> Self {
        Self {
            reason: reason.into(),
            raw: raw.to_string(),
        }
    }
}

/// Parse raw service output into a list of untyped records.
///
/// A top-level array is returned as is. An object with an `npcs` array is
/// unwrapped. Any other object becomes a one-element list.
pub fn parse_generated_records(raw: &str) -> Result<Vec<Value>, ParseError> {
    let trimmed = raw.trim();
    let first_brace = trimmed.find('{');
    let mut last_error = None;

    // Arrays opening before the first object, read up to their own close.
    for (open, _) in trimmed.match_indices('[') {
        if first_brace.is_some_and(|brace| open > brace) {
            break;
        }
        match first_value(&trimmed[open..]) {
            Ok(Value::Array(records)) if holds_records(&records) => return Ok(records),
            Ok(_) => {}
            Err(e) => last_error = Some(e.to_string()),
        }
    }

    if let (Some(open), Some(close)) = (first_brace, trimmed.rfind('}')) {
        if open < close {
            match serde_json::from_str::<Value>(&trimmed[open..=close]) {
                Ok(value) => return Ok(into_records(value)),
                Err(e) => last_error = Some(e.to_string()),
            }
        }
    }

    let reason = last_error.unwrap_or_else(|| "no JSON object found".to_string());
    tracing::warn!(raw = %raw, error = %reason, "Could not parse generated records");
    Err(ParseError::new(reason, raw))
}

/// First complete JSON value at the start of `text`, ignoring what follows.
fn first_value(text: &str) -> Result<Value, serde_json::Error> {
    serde_json::Deserializer::from_str(text)
        .into_iter::<Value>()
        .next()
        .unwrap_or_else(|| serde_json::from_str(text))
}

/// Bracketed asides such as `[2]` are not record lists.
fn holds_records(values: &[Value]) -> bool {
    values.is_empty() || values.iter().any(Value::is_object)
}

fn into_records(value: Value) -> Vec<Value> {
    match value {
        Value::Array(records) => records,
        Value::Object(mut obj) => match obj.remove(RECORDS_KEY) {
            Some(Value::Array(records)) => records,
            Some(other) => {
                obj.insert(RECORDS_KEY.to_string(), other);
                vec![Value::Object(obj)]
            }
            None => vec![Value::Object(obj)],
        },
        other => vec![other],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn extracts_object_from_surrounding_text() {
        let records = parse_generated_records("preamble {\"a\":1} postscript").expect("parses");
        assert_eq!(records, vec![json!({"a": 1})]);
    }

    #[test]
    fn bare_object_becomes_one_element_list() {
        let records = parse_generated_records(r#"{"name": "Solo"}"#).expect("parses");
        assert_eq!(records, vec![json!({"name": "Solo"})]);
    }

    #[test]
    fn no_braces_is_parse_error() {
        let err = parse_generated_records("I cannot help with that.").expect_err("no json");
        assert_eq!(err.raw, "I cannot help with that.");
        assert!(err.reason.contains("no JSON object"));
    }

    #[test]
    fn top_level_array_is_kept() {
        let records =
            parse_generated_records(r#"  [{"name": "A"}, {"name": "B"}]  "#).expect("parses");
        assert_eq!(records.len(), 2);
    }

    #[test]
    fn array_with_commentary_is_sliced() {
        let records = parse_generated_records("Here you go:\n[{\"name\": \"A\"}, {\"name\": \"B\"}]\nEnjoy!")
            .expect("parses");
        assert_eq!(records.len(), 2);
    }

    #[test]
    fn array_with_trailing_commentary_is_read() {
        let raw = "[{\"name\": \"A\"}, {\"name\": \"B\"}]\nHope this helps!";
        let records = parse_generated_records(raw).expect("parses");
        assert_eq!(records, vec![json!({"name": "A"}), json!({"name": "B"})]);
    }

    #[test]
    fn bracketed_preamble_is_skipped() {
        let raw = "Here are [2] NPCs:\n[{\"name\": \"A\"}, {\"name\": \"B\"}]";
        let records = parse_generated_records(raw).expect("parses");
        assert_eq!(records.len(), 2);
        assert_eq!(records[1], json!({"name": "B"}));
    }

    #[test]
    fn fenced_array_is_read() {
        let raw = "```json\n[{\"name\": \"A\"}]\n```";
        let records = parse_generated_records(raw).expect("parses");
        assert_eq!(records, vec![json!({"name": "A"})]);
    }

    #[test]
    fn fenced_envelope_is_unwrapped() {
        let raw = "```json\n{\"npcs\": [{\"name\": \"A\"}, {\"name\": \"B\"}]}\n```";
        let records = parse_generated_records(raw).expect("parses");
        assert_eq!(records, vec![json!({"name": "A"}), json!({"name": "B"})]);
    }

    #[test]
    fn trailing_comma_is_not_repaired() {
        let err = parse_generated_records(r#"{"name": "A",}"#).expect_err("invalid json");
        assert_eq!(err.raw, r#"{"name": "A",}"#);
    }

    #[test]
    fn unbalanced_braces_fail() {
        assert!(parse_generated_records(r#"{"name": {"first": "A"}"#).is_err());
        assert!(parse_generated_records("} backwards {").is_err());
    }
}
