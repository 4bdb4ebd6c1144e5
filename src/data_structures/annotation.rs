//! On-screen annotation (tooltip) attached to a mark.
//!
//! Rows are keyed by their flattened key and updated in place, so repeated
//! tracking updates never duplicate rows or reorder them.

use serde_json::{Map, Value};

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Annotation {
    /// Shown as the visual's title, normally the tracked object's id.
    pub title: String,
    /// Extra short label drawn next to the mark (e.g. an AprilTag number).
    pub label: Option<String>,
    pub hidden: bool,
    rows: Vec<(String, String)>,
}

impl Annotation {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Default::default()
        }
    }

    /// Updates the row with `key`, appending it if it does not exist yet.
    pub fn upsert(&mut self, key: &str, value: String) {
        match self.rows.iter_mut().find(|(k, _)| k == key) {
            Some((_, existing)) => *existing = value,
            None => self.rows.push((key.to_string(), value)),
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.rows
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn rows(&self) -> &[(String, String)] {
        &self.rows
    }
}

/// Flattens one level of nesting into `parent.child` keys. Arrays nest by
/// index. Values deeper than one level are shown as compact JSON.
pub fn flatten_persistent_data(data: &Map<String, Value>) -> Vec<(String, String)> {
    data.iter()
        .flat_map(|(key, value)| match value {
            Value::Object(nested) => nested
                .iter()
                .map(|(nested_key, nested_value)| {
                    (format!("{key}.{nested_key}"), display(nested_value))
                })
                .collect::<Vec<_>>(),
            Value::Array(items) => items
                .iter()
                .enumerate()
                .map(|(idx, item)| (format!("{key}.{idx}"), display(item)))
                .collect(),
            other => vec![(key.clone(), display(other))],
        })
        .collect()
}

fn display(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
