use serde::{Deserialize, Serialize};

use mform_domain::{FieldValue, FormData};

use crate::frontmatter::frontmatter_block;
use crate::select::select_keys;
use crate::template::{execute_template, parse_template, TemplateParseError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResultStatus {
    Ok,
    Cancelled,
}

/// Outcome of a form session together with the submitted data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormResult {
    pub status: ResultStatus,
    pub data: FormData,
}

impl FormResult {
    pub fn ok(data: FormData) -> Self {
        Self {
            status: ResultStatus::Ok,
            data,
        }
    }

    pub fn cancelled() -> Self {
        Self {
            status: ResultStatus::Cancelled,
            data: FormData::new(),
        }
    }

    pub fn is_ok(&self) -> bool {
        self.status == ResultStatus::Ok
    }

    pub fn get(&self, key: &str) -> Option<&FieldValue> {
        self.data.get(key)
    }

    pub fn pick<S: AsRef<str>>(&self, keys: &[S]) -> Self {
        Self {
            status: self.status,
            data: select_keys(&self.data, keys, &[]),
        }
    }

    pub fn omit<S: AsRef<str>>(&self, keys: &[S]) -> Self {
        Self {
            status: self.status,
            data: select_keys(&self.data, &[], keys),
        }
    }

    pub fn as_frontmatter_string(&self) -> String {
        frontmatter_block(&self.data)
    }

    /// One inline `key:: value` property per line.
    pub fn as_dataview_properties(&self) -> String {
        self.lines(|key, value| format!("{key}:: {value}"))
    }

    pub fn as_bullet_list(&self) -> String {
        self.lines(|key, value| format!("- {key}: {value}"))
    }

    /// Parses `template` and renders it against the data.
    pub fn as_string(&self, template: &str) -> Result<String, TemplateParseError> {
        let parsed = parse_template(template)?;
        Ok(execute_template(&parsed, &self.data))
    }

    fn lines(&self, render: impl Fn(&str, &FieldValue) -> String) -> String {
        self.data
            .iter()
            .map(|(key, value)| render(key, value))
            .collect::<Vec<_>>()
            .join("\n")
    }
}
