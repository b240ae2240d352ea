use std::fmt;

use serde::{de::Deserializer, Deserialize, Serialize};
use serde_json::Value;

use mform_core::{example_form, FormOrError};
use mform_domain::FormDefinition;

/// Settings object shared with the host application.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    pub editor_position: EditorPosition,
    /// Usable forms and forms that still need a manual fix, in file order.
    pub form_definitions: Vec<FormOrError>,
}

impl Settings {
    /// Fresh settings holding only the example form.
    pub fn with_example() -> Self {
        Self {
            editor_position: EditorPosition::default(),
            form_definitions: vec![FormOrError::Form(example_form())],
        }
    }

    pub fn forms(&self) -> impl Iterator<Item = &FormDefinition> {
        mform_core::valid_forms(&self.form_definitions)
    }

    pub fn find_form(&self, name: &str) -> Option<&FormDefinition> {
        mform_core::find_form(&self.form_definitions, name)
    }

    /// Adds `form`, replacing an entry with the same name.
    pub fn upsert_form(&mut self, form: FormDefinition) {
        match self
            .form_definitions
            .iter_mut()
            .find(|entry| entry.name() == form.name)
        {
            Some(entry) => *entry = FormOrError::Form(form),
            None => self.form_definitions.push(FormOrError::Form(form)),
        }
    }
}

/// On-disk shape before migration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RawSettings {
    #[serde(default)]
    pub editor_position: EditorPosition,
    #[serde(default)]
    pub form_definitions: Vec<Value>,
}

/// Where the host opens the form editor.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub enum EditorPosition {
    #[serde(rename = "left")]
    Left,
    #[default]
    #[serde(rename = "right")]
    Right,
    #[serde(rename = "mainView")]
    MainView,
}

impl EditorPosition {
    pub fn as_str(self) -> &'static str {
        match self {
            EditorPosition::Left => "left",
            EditorPosition::Right => "right",
            EditorPosition::MainView => "mainView",
        }
    }

    /// Unknown values fall back to the default.
    pub fn parse_lenient(value: &str) -> Self {
        match value.trim() {
            "left" => EditorPosition::Left,
            "mainView" => EditorPosition::MainView,
            _ => EditorPosition::Right,
        }
    }
}

impl fmt::Display for EditorPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for EditorPosition {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Option::<Value>::deserialize(deserializer)?;
        Ok(value
            .as_ref()
            .and_then(Value::as_str)
            .map(EditorPosition::parse_lenient)
            .unwrap_or_default())
    }
}
