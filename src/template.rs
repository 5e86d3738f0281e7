//! `{{ var }}` placeholder resolution against the extracted fields store.

use std::sync::OnceLock;

use regex::Regex;
use serde_json::{Map, Value};

use crate::errors::{Result, RunnerError};
use crate::fields::ExtractedFields;

fn placeholder_regex() -> &'static Regex {
    static PLACEHOLDER: OnceLock<Regex> = OnceLock::new();
    PLACEHOLDER.get_or_init(|| {
        Regex::new(r"\{\{\s*(\S+?)\s*\}\}").expect("placeholder pattern is a valid regex")
    })
}

/// Returns true if `s` contains at least one placeholder.
pub fn has_placeholders(s: &str) -> bool {
    placeholder_regex().is_match(s)
}

/// Returns the variable name if `s` is exactly one placeholder and nothing else.
pub fn sole_placeholder(s: &str) -> Option<&str> {
    let caps = placeholder_regex().captures(s)?;
    let whole = caps.get(0)?;
    if whole.start() == 0 && whole.end() == s.len() {
        caps.get(1).map(|m| m.as_str())
    } else {
        None
    }
}

/// Replaces every placeholder in `s` with its stored value.
///
/// Strings are inserted without quotes, every other value as compact JSON. The
/// first placeholder without a stored value fails the whole call, so callers never
/// see a partially substituted string.
pub fn resolve(s: &str, fields: &ExtractedFields) -> Result<String> {
    let regex = placeholder_regex();
    if !regex.is_match(s) {
        return Ok(s.to_string());
    }

    let mut out = String::with_capacity(s.len());
    let mut last = 0;
    for caps in regex.captures_iter(s) {
        let (Some(whole), Some(var)) = (caps.get(0), caps.get(1)) else {
            continue;
        };
        let value = fields
            .get(var.as_str())
            .ok_or_else(|| RunnerError::MissingTemplateValue(var.as_str().to_string()))?;
        out.push_str(&s[last..whole.start()]);
        out.push_str(&stringify(value));
        last = whole.end();
    }
    out.push_str(&s[last..]);
    Ok(out)
}

/// Resolves placeholders inside every string of a JSON document.
///
/// A string consisting of a single placeholder is replaced by the stored value
/// itself, keeping its JSON type; any other string containing placeholders is
/// resolved textually. Object keys are resolved textually as well.
pub fn resolve_value(value: &Value, fields: &ExtractedFields) -> Result<Value> {
    match value {
        Value::String(s) => match sole_placeholder(s) {
            Some(var) => fields
                .get(var)
                .cloned()
                .ok_or_else(|| RunnerError::MissingTemplateValue(var.to_string())),
            None => Ok(Value::String(resolve(s, fields)?)),
        },
        Value::Array(items) => items
            .iter()
            .map(|item| resolve_value(item, fields))
            .collect::<Result<Vec<_>>>()
            .map(Value::Array),
        Value::Object(map) => {
            let mut resolved = Map::with_capacity(map.len());
            for (key, child) in map {
                resolved.insert(resolve(key, fields)?, resolve_value(child, fields)?);
            }
            Ok(Value::Object(resolved))
        }
        Value::Null | Value::Bool(_) | Value::Number(_) => Ok(value.clone()),
    }
}

/// Renders a stored value the way it appears inside a resolved string.
pub fn stringify(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
