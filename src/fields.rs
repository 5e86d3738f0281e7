//! The extracted fields store shared by the tests of one suite.

use std::collections::BTreeMap;

use serde_json::Value;
use tracing::trace;

use crate::flatten::{flatten, join_path};

/// Values captured from request bodies, response bodies and response headers.
///
/// Keys are `<testName>.<path>`. The store only ever grows during a suite run:
/// entries are inserted or overwritten, never removed. One store is created per
/// suite execution and handed to each test case by `&mut`.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ExtractedFields {
    values: BTreeMap<String, Value>,
}

impl ExtractedFields {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    pub fn insert(&mut self, key: impl Into<String>, value: Value) {
        let key = key.into();
        trace!("extracted {} = {}", key, value);
        self.values.insert(key, value);
    }

    /// Flattens `value` and records every leaf under `namespace`.
    pub fn extend_flattened(&mut self, namespace: &str, value: &Value) {
        for (path, leaf) in flatten(value) {
            self.insert(join_path(namespace, &path), leaf);
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.values.iter()
    }
}

impl<K: Into<String>> FromIterator<(K, Value)> for ExtractedFields {
    fn from_iter<I: IntoIterator<Item = (K, Value)>>(iter: I) -> Self {
        let mut fields = ExtractedFields::new();
        for (key, value) in iter {
            fields.insert(key, value);
        }
        fields
    }
}
