//! Structural validation of raw (JSON) form data.
//!
//! Validators walk a `serde_json::Value` and collect every independent
//! problem they find instead of stopping at the first one, so a settings UI
//! can show all of them at once. Each problem is a [`ValidationIssue`]
//! carrying a dotted path (`fields.2.input.options.0.value`) and, inside a
//! field list, the position of the offending field.

mod field;
mod form;
mod input;

use std::fmt;

use serde::Serialize;
use serde_json::{Map, Value};
use thiserror::Error;

pub use field::{validate_field, validate_fields, FieldError};
pub use form::{parse_form_v1, parse_template_block};
pub use input::{validate_input, InputError};

pub(crate) use field::validate_fields_at;

/// A single structural problem found while validating raw data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationIssue {
    pub message: String,
    /// Dotted location of the offending value; empty for the root.
    pub path: String,
    /// Position of the failing field inside a field list.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub index: Option<usize>,
}

impl ValidationIssue {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            path: path.into(),
            index: None,
        }
    }

    pub fn at_index(mut self, index: usize) -> Self {
        self.index = Some(index);
        self
    }
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.path.is_empty() {
            f.write_str(&self.message)
        } else {
            write!(f, "{}: {}", self.path, self.message)
        }
    }
}

/// Structural validation failure with the full list of issues.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{}", summarize(.issues))]
pub struct SchemaError {
    pub issues: Vec<ValidationIssue>,
}

impl SchemaError {
    pub fn new(issues: Vec<ValidationIssue>) -> Self {
        Self { issues }
    }

    pub fn single(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(vec![ValidationIssue::new(path, message)])
    }
}

/// Human-readable one-line summary of an issue list.
pub fn summarize(issues: &[ValidationIssue]) -> String {
    match issues {
        [] => "validation failed".to_string(),
        [only] => only.to_string(),
        many => format!(
            "{} issues: {}",
            many.len(),
            many.iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join("; ")
        ),
    }
}

pub(crate) fn join_path(base: &str, key: &str) -> String {
    if base.is_empty() {
        key.to_string()
    } else {
        format!("{base}.{key}")
    }
}

pub(crate) fn describe(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Reads typed keys out of a JSON object while recording every failure.
///
/// Readers return `None` on failure (after recording an issue) and also for
/// absent optional keys; callers check [`ObjectReader::is_valid`] before
/// assembling the typed value.
pub(crate) struct ObjectReader<'a> {
    object: Option<&'a Map<String, Value>>,
    path: String,
    issues: Vec<ValidationIssue>,
}

impl<'a> ObjectReader<'a> {
    pub(crate) fn new(value: &'a Value, path: &str) -> Self {
        let mut reader = Self {
            object: value.as_object(),
            path: path.to_string(),
            issues: Vec::new(),
        };
        if reader.object.is_none() {
            reader.issues.push(ValidationIssue::new(
                path,
                format!("expected an object, received {}", describe(value)),
            ));
        }
        reader
    }

    pub(crate) fn is_object(&self) -> bool {
        self.object.is_some()
    }

    pub(crate) fn is_valid(&self) -> bool {
        self.issues.is_empty()
    }

    pub(crate) fn path(&self) -> &str {
        &self.path
    }

    pub(crate) fn key_path(&self, key: &str) -> String {
        join_path(&self.path, key)
    }

    pub(crate) fn get(&self, key: &str) -> Option<&'a Value> {
        self.object.and_then(|object| object.get(key))
    }

    /// Present and not `null`.
    fn present(&self, key: &str) -> Option<&'a Value> {
        self.get(key).filter(|value| !value.is_null())
    }

    pub(crate) fn push(&mut self, key: &str, message: impl Into<String>) {
        let path = self.key_path(key);
        self.issues.push(ValidationIssue::new(path, message));
    }

    pub(crate) fn extend(&mut self, issues: impl IntoIterator<Item = ValidationIssue>) {
        self.issues.extend(issues);
    }

    pub(crate) fn string(&mut self, key: &str) -> Option<String> {
        if !self.is_object() {
            return None;
        }
        match self.present(key) {
            Some(Value::String(text)) => Some(text.clone()),
            Some(other) => {
                let message = format!("expected a string, received {}", describe(other));
                self.push(key, message);
                None
            }
            None => {
                self.push(key, "is required");
                None
            }
        }
    }

    /// Required string that is non-empty after trimming. The original,
    /// untrimmed text is returned.
    pub(crate) fn non_empty_string(&mut self, key: &str) -> Option<String> {
        let text = self.string(key)?;
        if text.trim().is_empty() {
            self.push(key, "must not be empty");
            return None;
        }
        Some(text)
    }

    pub(crate) fn optional_string(&mut self, key: &str) -> Option<String> {
        match self.present(key) {
            Some(Value::String(text)) => Some(text.clone()),
            Some(other) => {
                let message = format!("expected a string, received {}", describe(other));
                self.push(key, message);
                None
            }
            None => None,
        }
    }

    pub(crate) fn optional_bool(&mut self, key: &str) -> Option<bool> {
        match self.present(key) {
            Some(Value::Bool(flag)) => Some(*flag),
            Some(other) => {
                let message = format!("expected a boolean, received {}", describe(other));
                self.push(key, message);
                None
            }
            None => None,
        }
    }

    pub(crate) fn required_bool(&mut self, key: &str) -> Option<bool> {
        if self.is_object() && self.present(key).is_none() {
            self.push(key, "is required");
            return None;
        }
        self.optional_bool(key)
    }

    pub(crate) fn number(&mut self, key: &str) -> Option<f64> {
        if !self.is_object() {
            return None;
        }
        match self.present(key) {
            Some(Value::Number(number)) => match number.as_f64() {
                Some(value) => Some(value),
                None => {
                    self.push(key, "number is out of range");
                    None
                }
            },
            Some(other) => {
                let message = format!("expected a number, received {}", describe(other));
                self.push(key, message);
                None
            }
            None => {
                self.push(key, "is required");
                None
            }
        }
    }

    pub(crate) fn array(&mut self, key: &str) -> Option<&'a Vec<Value>> {
        if !self.is_object() {
            return None;
        }
        match self.present(key) {
            Some(Value::Array(items)) => Some(items),
            Some(other) => {
                let message = format!("expected an array, received {}", describe(other));
                self.push(key, message);
                None
            }
            None => {
                self.push(key, "is required");
                None
            }
        }
    }

    /// Checks that `key` holds exactly the string `expected`.
    pub(crate) fn literal(&mut self, key: &str, expected: &str) -> bool {
        if !self.is_object() {
            return false;
        }
        match self.present(key) {
            Some(Value::String(text)) if text == expected => true,
            Some(Value::String(text)) => {
                self.push(key, format!("expected \"{expected}\", received \"{text}\""));
                false
            }
            Some(other) => {
                let message = format!("expected \"{expected}\", received {}", describe(other));
                self.push(key, message);
                false
            }
            None => {
                self.push(key, format!("expected \"{expected}\""));
                false
            }
        }
    }

    pub(crate) fn into_issues(self) -> Vec<ValidationIssue> {
        self.issues
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn reader_collects_every_failure() {
        let raw = json!({ "title": "", "count": "three" });
        let mut reader = ObjectReader::new(&raw, "form");
        assert!(reader.non_empty_string("title").is_none());
        assert!(reader.number("count").is_none());
        assert!(reader.string("name").is_none());
        let issues = reader.into_issues();
        let paths: Vec<_> = issues.iter().map(|issue| issue.path.as_str()).collect();
        assert_eq!(paths, vec!["form.title", "form.count", "form.name"]);
    }

    #[test]
    fn non_object_reports_once() {
        let raw = json!([1, 2]);
        let mut reader = ObjectReader::new(&raw, "");
        assert!(reader.string("name").is_none());
        let issues = reader.into_issues();
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].message, "expected an object, received array");
    }

    #[test]
    fn summary_lists_issues() {
        let error = SchemaError::new(vec![
            ValidationIssue::new("name", "is required"),
            ValidationIssue::new("", "broken"),
        ]);
        assert_eq!(error.to_string(), "2 issues: name: is required; broken");
    }
}
