//! Input kinds a form field can use, and their kind-specific payloads.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::value::serialize_number;

/// Concrete configuration of a field's input.
///
/// The `type` tag selects the variant; `select` and `multiselect` carry a
/// second `source` tag that picks the shape of their option source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum InputDefinition {
    Text(BasicInput),
    Number(BasicInput),
    Date(BasicInput),
    Time(BasicInput),
    Datetime(BasicInput),
    Textarea(BasicInput),
    Toggle(BasicInput),
    Email(BasicInput),
    Tel(BasicInput),
    Tag(TagInput),
    Slider(SliderInput),
    Note(NoteInput),
    Folder,
    Dataview(DataviewInput),
    Select(SelectInput),
    Multiselect(MultiselectInput),
    DocumentBlock(DocumentBlockInput),
}

/// Shared payload of the tag-only input kinds.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BasicInput {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hidden: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagInput {
    /// Regular expression; tags matching it are not offered.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exclude: Option<String>,
}

/// Numeric range input. `min > max` is accepted as-is.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SliderInput {
    #[serde(serialize_with = "serialize_number")]
    pub min: f64,
    #[serde(serialize_with = "serialize_number")]
    pub max: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoteInput {
    pub folder: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataviewInput {
    pub query: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentBlockInput {
    pub body: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "source", rename_all = "lowercase")]
pub enum SelectInput {
    Notes { folder: String },
    Fixed { options: Vec<SelectOption> },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectOption {
    pub value: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

impl SelectOption {
    pub fn new(value: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            label: Some(label.into()),
        }
    }

    /// Label shown to the user; the value when no label was given.
    pub fn display(&self) -> &str {
        self.label
            .as_deref()
            .filter(|label| !label.trim().is_empty())
            .unwrap_or(&self.value)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "source", rename_all = "lowercase")]
pub enum MultiselectInput {
    Notes {
        folder: String,
    },
    Fixed {
        multi_select_options: Vec<String>,
        #[serde(default, rename = "allowUnknownValues")]
        allow_unknown_values: bool,
    },
    Dataview {
        query: String,
        #[serde(default, rename = "allowUnknownValues")]
        allow_unknown_values: bool,
    },
}

/// Closed set of input kinds, one per `type` tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum InputKind {
    Text,
    Number,
    Date,
    Time,
    Datetime,
    Textarea,
    Toggle,
    Email,
    Tel,
    Tag,
    Slider,
    Note,
    Folder,
    Dataview,
    Select,
    Multiselect,
    DocumentBlock,
}

impl InputKind {
    pub const ALL: [InputKind; 17] = [
        InputKind::Text,
        InputKind::Number,
        InputKind::Date,
        InputKind::Time,
        InputKind::Datetime,
        InputKind::Textarea,
        InputKind::Toggle,
        InputKind::Email,
        InputKind::Tel,
        InputKind::Tag,
        InputKind::Slider,
        InputKind::Note,
        InputKind::Folder,
        InputKind::Dataview,
        InputKind::Select,
        InputKind::Multiselect,
        InputKind::DocumentBlock,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            InputKind::Text => "text",
            InputKind::Number => "number",
            InputKind::Date => "date",
            InputKind::Time => "time",
            InputKind::Datetime => "datetime",
            InputKind::Textarea => "textarea",
            InputKind::Toggle => "toggle",
            InputKind::Email => "email",
            InputKind::Tel => "tel",
            InputKind::Tag => "tag",
            InputKind::Slider => "slider",
            InputKind::Note => "note",
            InputKind::Folder => "folder",
            InputKind::Dataview => "dataview",
            InputKind::Select => "select",
            InputKind::Multiselect => "multiselect",
            InputKind::DocumentBlock => "document_block",
        }
    }

    pub fn from_tag(tag: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.as_str() == tag)
    }

    /// Kinds whose value is a list of strings.
    pub fn is_list(self) -> bool {
        matches!(self, InputKind::Multiselect | InputKind::Tag)
    }

    /// Kinds whose textual input is coerced to a number when possible.
    pub fn is_numeric(self) -> bool {
        matches!(self, InputKind::Number | InputKind::Slider)
    }
}

impl fmt::Display for InputKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl InputDefinition {
    pub fn basic(kind: InputKind) -> Option<Self> {
        let basic = BasicInput::default();
        let input = match kind {
            InputKind::Text => InputDefinition::Text(basic),
            InputKind::Number => InputDefinition::Number(basic),
            InputKind::Date => InputDefinition::Date(basic),
            InputKind::Time => InputDefinition::Time(basic),
            InputKind::Datetime => InputDefinition::Datetime(basic),
            InputKind::Textarea => InputDefinition::Textarea(basic),
            InputKind::Toggle => InputDefinition::Toggle(basic),
            InputKind::Email => InputDefinition::Email(basic),
            InputKind::Tel => InputDefinition::Tel(basic),
            _ => return None,
        };
        Some(input)
    }

    pub fn kind(&self) -> InputKind {
        match self {
            InputDefinition::Text(_) => InputKind::Text,
            InputDefinition::Number(_) => InputKind::Number,
            InputDefinition::Date(_) => InputKind::Date,
            InputDefinition::Time(_) => InputKind::Time,
            InputDefinition::Datetime(_) => InputKind::Datetime,
            InputDefinition::Textarea(_) => InputKind::Textarea,
            InputDefinition::Toggle(_) => InputKind::Toggle,
            InputDefinition::Email(_) => InputKind::Email,
            InputDefinition::Tel(_) => InputKind::Tel,
            InputDefinition::Tag(_) => InputKind::Tag,
            InputDefinition::Slider(_) => InputKind::Slider,
            InputDefinition::Note(_) => InputKind::Note,
            InputDefinition::Folder => InputKind::Folder,
            InputDefinition::Dataview(_) => InputKind::Dataview,
            InputDefinition::Select(_) => InputKind::Select,
            InputDefinition::Multiselect(_) => InputKind::Multiselect,
            InputDefinition::DocumentBlock(_) => InputKind::DocumentBlock,
        }
    }

    /// Payload shared by basic inputs, `None` for every other kind.
    pub fn as_basic(&self) -> Option<&BasicInput> {
        match self {
            InputDefinition::Text(basic)
            | InputDefinition::Number(basic)
            | InputDefinition::Date(basic)
            | InputDefinition::Time(basic)
            | InputDefinition::Datetime(basic)
            | InputDefinition::Textarea(basic)
            | InputDefinition::Toggle(basic)
            | InputDefinition::Email(basic)
            | InputDefinition::Tel(basic) => Some(basic),
            _ => None,
        }
    }

    pub fn is_hidden(&self) -> bool {
        self.as_basic()
            .and_then(|basic| basic.hidden)
            .unwrap_or(false)
    }
}
