//! Flattening of JSON values into path/value pairs.
//!
//! Object keys compose with `.` and array indices with `[i]`, so
//! `{"items": [{"id": 1}]}` flattens to `items[0].id = 1`. Scalars terminate a
//! path; empty objects and arrays contribute nothing.

use serde_json::Value;

/// Flattens `value` into `(path, scalar)` pairs in document order.
///
/// A scalar at the top level yields a single pair with an empty path.
pub fn flatten(value: &Value) -> Vec<(String, Value)> {
    let mut out = Vec::new();
    flatten_into(value, String::new(), &mut out);
    out
}

fn flatten_into(value: &Value, path: String, out: &mut Vec<(String, Value)>) {
    match value {
        Value::Object(map) => {
            for (key, child) in map {
                flatten_into(child, join_path(&path, key), out);
            }
        }
        Value::Array(items) => {
            for (index, child) in items.iter().enumerate() {
                flatten_into(child, format!("{}[{}]", path, index), out);
            }
        }
        Value::Null | Value::Bool(_) | Value::Number(_) | Value::String(_) => {
            out.push((path, value.clone()));
        }
    }
}

/// Joins a path prefix and a relative path.
///
/// Index segments attach directly (`a` + `[0]` is `a[0]`), everything else is
/// separated with a dot. Empty sides are dropped.
pub fn join_path(prefix: &str, path: &str) -> String {
    if prefix.is_empty() {
        path.to_string()
    } else if path.is_empty() {
        prefix.to_string()
    } else if path.starts_with('[') {
        format!("{}{}", prefix, path)
    } else {
        format!("{}.{}", prefix, path)
    }
}
