//! Total extraction helpers for untrusted generated JSON.
//!
//! None of these functions fail: a field that is missing or has the wrong
//! shape yields `None` (or an empty collection) and the caller supplies
//! the default.

use serde_json::{Map, Value};

/// First of `keys` that is present and not null.
pub fn field<'a>(obj: &'a Map<String, Value>, keys: &[&str]) -> Option<&'a Value> {
    keys.iter()
        .filter_map(|key| obj.get(*key))
        .find(|value| !value.is_null())
}

/// Non-blank, trimmed string from the first matching key.
pub fn string_field(obj: &Map<String, Value>, keys: &[&str]) -> Option<String> {
    field(obj, keys).and_then(non_blank_string)
}

pub fn non_blank_string(value: &Value) -> Option<String> {
    value
        .as_str()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// Integer from a number, a numeric string, or an object with a `value` key.
///
/// Strings that do not parse whole fall back to their leading integer, so
/// "45 (6d8 + 18)" reads as 45.
pub fn int_value(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.is_finite()).map(|f| f.round() as i64)),
        Value::String(s) => {
            let s = s.trim();
            s.parse::<f64>()
                .ok()
                .filter(|f| f.is_finite())
                .map(|f| f.round() as i64)
                .or_else(|| leading_int(s))
        }
        Value::Object(obj) => obj.get("value").and_then(int_value),
        _ => None,
    }
}

fn leading_int(s: &str) -> Option<i64> {
    let (sign, digits) = match s.strip_prefix('-') {
        Some(rest) => (-1, rest),
        None => (1, s),
    };
    let end = digits
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(digits.len());
    digits[..end].parse::<i64>().ok().map(|n| sign * n)
}

/// Loose truthiness for proficiency flags.
pub fn truthy(value: &Value) -> bool {
    match value {
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f > 0.0),
        Value::String(s) => {
            let s = s.trim().to_lowercase();
            !(s.is_empty() || s == "false" || s == "0" || s == "no")
        }
        Value::Null => false,
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Name of a bare string entry or an object entry with a `name` field.
pub fn entry_name(value: &Value) -> Option<String> {
    match value {
        Value::String(_) => non_blank_string(value),
        Value::Object(obj) => string_field(obj, &["name"]),
        _ => None,
    }
}

/// Array at the first matching key, or an empty slice.
pub fn array_field<'a>(obj: &'a Map<String, Value>, keys: &[&str]) -> &'a [Value] {
    field(obj, keys)
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or(&[])
}

/// Key/value pairs from either an object or an array of keys.
///
/// Array entries are paired with `true`; object entries keep their value.
pub fn keyed_entries(value: &Value) -> Vec<(String, Value)> {
    match value {
        Value::Object(obj) => obj.iter().map(|(k, v)| (k.clone(), v.clone())).collect(),
        Value::Array(items) => items
            .iter()
            .filter_map(entry_name)
            .map(|name| (name, Value::Bool(true)))
            .collect(),
        Value::String(s) => s
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|s| (s.to_string(), Value::Bool(true)))
            .collect(),
        _ => Vec::new(),
    }
}
