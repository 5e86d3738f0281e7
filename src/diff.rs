//! Structural comparison of decoded JSON payloads.
//!
//! [`Differ`] walks the actual and expected values side by side and reports every
//! difference with the path where it occurred. Paths are rendered the same way as
//! extracted field keys (`user.roles[0].name`), so a path from a failure message
//! can be pasted straight into a `{{ }}` placeholder.

use std::collections::BTreeSet;
use std::fmt;

use serde_json::{Map, Number, Value};

/// One step of a path into a JSON document.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Segment {
    Key(String),
    Index(usize),
}

/// What differs at a given path.
#[derive(Clone, Debug, PartialEq)]
pub enum DiffKind {
    /// Same JSON type, different value.
    Value { actual: Value, expected: Value },
    /// Different JSON types.
    Type { actual: Value, expected: Value },
    /// Key present in the expected object only.
    MissingKey { expected: Value },
    /// Key present in the actual object only.
    ExtraKey { actual: Value },
    /// Arrays of different lengths; elements are not compared.
    Length { actual: usize, expected: usize },
}

impl fmt::Display for DiffKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiffKind::Value { actual, expected } => write!(f, "{} != {}", actual, expected),
            DiffKind::Type { actual, expected } => write!(
                f,
                "type mismatch: {} {} != {} {}",
                type_name(actual),
                actual,
                type_name(expected),
                expected
            ),
            DiffKind::MissingKey { expected } => {
                write!(f, "<does not have key> != {}", expected)
            }
            DiffKind::ExtraKey { actual } => write!(f, "{} != <does not have key>", actual),
            DiffKind::Length { actual, expected } => {
                write!(f, "array length {} != {}", actual, expected)
            }
        }
    }
}

/// A single difference between actual and expected.
#[derive(Clone, Debug, PartialEq)]
pub struct Diff {
    pub path: Vec<Segment>,
    pub kind: DiffKind,
}

impl Diff {
    /// Renders the path below `label`, e.g. `getUser.roles[0].name`.
    pub fn field_path(&self, label: &str) -> String {
        let mut out = label.to_string();
        for segment in &self.path {
            match segment {
                Segment::Key(key) if out.is_empty() => out.push_str(key),
                Segment::Key(key) => {
                    out.push('.');
                    out.push_str(key);
                }
                Segment::Index(index) => out.push_str(&format!("[{}]", index)),
            }
        }
        out
    }

    /// Renders `<field-path>: <description>`.
    pub fn describe(&self, label: &str) -> String {
        let path = self.field_path(label);
        if path.is_empty() {
            self.kind.to_string()
        } else {
            format!("{}: {}", path, self.kind)
        }
    }

    fn touches_any(&self, names: &BTreeSet<String>) -> bool {
        self.path
            .iter()
            .any(|segment| matches!(segment, Segment::Key(key) if names.contains(key)))
    }
}

/// Deep comparison with an ignore list of field names.
///
/// Ignored names are plain text matched against object keys at any depth; a
/// difference is dropped when any key along its path is ignored.
#[derive(Clone, Debug, Default)]
pub struct Differ {
    ignored: BTreeSet<String>,
}

impl Differ {
    pub fn new<I, S>(ignored_fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            ignored: ignored_fields.into_iter().map(Into::into).collect(),
        }
    }

    /// Returns every difference that does not involve an ignored field.
    pub fn diff(&self, actual: &Value, expected: &Value) -> Vec<Diff> {
        let mut diffs = Vec::new();
        let mut path = Vec::new();
        compare(actual, expected, &mut path, &mut diffs);
        diffs.retain(|diff| !diff.touches_any(&self.ignored));
        diffs
    }

    /// Same as [`Differ::diff`] but rendered as `<label>.<path>: <description>`.
    pub fn describe(&self, actual: &Value, expected: &Value, label: &str) -> Vec<String> {
        self.diff(actual, expected)
            .iter()
            .map(|diff| diff.describe(label))
            .collect()
    }
}

fn compare(actual: &Value, expected: &Value, path: &mut Vec<Segment>, out: &mut Vec<Diff>) {
    match (actual, expected) {
        (Value::Object(a), Value::Object(e)) => compare_objects(a, e, path, out),
        (Value::Array(a), Value::Array(e)) => {
            if a.len() != e.len() {
                out.push(Diff {
                    path: path.clone(),
                    kind: DiffKind::Length {
                        actual: a.len(),
                        expected: e.len(),
                    },
                });
                return;
            }
            for (index, (a_item, e_item)) in a.iter().zip(e).enumerate() {
                path.push(Segment::Index(index));
                compare(a_item, e_item, path, out);
                path.pop();
            }
        }
        (Value::Number(a), Value::Number(e)) => {
            if !numbers_equal(a, e) {
                out.push(value_diff(path, actual, expected));
            }
        }
        (Value::String(a), Value::String(e)) if a != e => {
            out.push(value_diff(path, actual, expected));
        }
        (Value::Bool(a), Value::Bool(e)) if a != e => {
            out.push(value_diff(path, actual, expected));
        }
        (Value::String(_), Value::String(_))
        | (Value::Bool(_), Value::Bool(_))
        | (Value::Null, Value::Null) => {}
        _ => out.push(Diff {
            path: path.clone(),
            kind: DiffKind::Type {
                actual: actual.clone(),
                expected: expected.clone(),
            },
        }),
    }
}

fn compare_objects(
    actual: &Map<String, Value>,
    expected: &Map<String, Value>,
    path: &mut Vec<Segment>,
    out: &mut Vec<Diff>,
) {
    for (key, e_value) in expected {
        path.push(Segment::Key(key.clone()));
        match actual.get(key) {
            Some(a_value) => compare(a_value, e_value, path, out),
            None => out.push(Diff {
                path: path.clone(),
                kind: DiffKind::MissingKey {
                    expected: e_value.clone(),
                },
            }),
        }
        path.pop();
    }
    for (key, a_value) in actual {
        if expected.contains_key(key) {
            continue;
        }
        path.push(Segment::Key(key.clone()));
        out.push(Diff {
            path: path.clone(),
            kind: DiffKind::ExtraKey {
                actual: a_value.clone(),
            },
        });
        path.pop();
    }
}

fn value_diff(path: &[Segment], actual: &Value, expected: &Value) -> Diff {
    Diff {
        path: path.to_vec(),
        kind: DiffKind::Value {
            actual: actual.clone(),
            expected: expected.clone(),
        },
    }
}

/// Integers compare exactly; as soon as a float is involved both sides compare as f64.
fn numbers_equal(a: &Number, e: &Number) -> bool {
    if a.is_f64() || e.is_f64() {
        a.as_f64() == e.as_f64()
    } else {
        a == e
    }
}

/// Short JSON type name used in type mismatch descriptions.
pub fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
