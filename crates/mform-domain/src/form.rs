use serde::{Deserialize, Serialize};

use crate::common::{Displayable, NamedEntity};
use crate::field::FieldDefinition;
use crate::template::ParsedTemplate;

/// Schema version stamped on every current form definition.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum FormVersion {
    #[default]
    #[serde(rename = "1")]
    V1,
}

impl FormVersion {
    pub const CURRENT: FormVersion = FormVersion::V1;

    pub fn as_str(self) -> &'static str {
        match self {
            FormVersion::V1 => "1",
        }
    }
}

/// A validated form at the current schema version.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormDefinition {
    pub title: String,
    /// Unique key of the form inside its collection.
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_classname: Option<String>,
    pub version: FormVersion,
    pub fields: Vec<FieldDefinition>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template: Option<FormTemplate>,
}

impl FormDefinition {
    pub fn new(
        name: impl Into<String>,
        title: impl Into<String>,
        fields: Vec<FieldDefinition>,
    ) -> Self {
        Self {
            title: title.into(),
            name: name.into(),
            custom_classname: None,
            version: FormVersion::CURRENT,
            fields,
            template: None,
        }
    }

    pub fn with_template(mut self, template: FormTemplate) -> Self {
        self.template = Some(template);
        self
    }

    pub fn field(&self, name: &str) -> Option<&FieldDefinition> {
        self.fields.iter().find(|field| field.name == name)
    }

    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|field| field.name.as_str())
    }
}

impl NamedEntity for FormDefinition {
    fn name(&self) -> &str {
        &self.name
    }
}

impl Displayable for FormDefinition {
    fn display_label(&self) -> String {
        format!("{} [{}]", self.title, self.name)
    }
}

/// Note template attached to a form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormTemplate {
    /// Whether the host registers a "create note from this form" command.
    pub create_command: bool,
    pub parsed_template: ParsedTemplate,
}
