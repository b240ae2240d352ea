//! Field definitions and the visibility conditions they may declare.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::common::{Displayable, NamedEntity};
use crate::input::InputDefinition;
use crate::value::serialize_number;

/// One field of a form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldDefinition {
    /// Result key and template variable name.
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default)]
    pub description: String,
    pub input: InputDefinition,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_required: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub condition: Option<Condition>,
}

impl FieldDefinition {
    pub fn new(name: impl Into<String>, input: InputDefinition) -> Self {
        Self {
            name: name.into(),
            label: None,
            description: String::new(),
            input,
            is_required: None,
            condition: None,
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn required(mut self) -> Self {
        self.is_required = Some(true);
        self
    }

    pub fn with_condition(mut self, condition: Condition) -> Self {
        self.condition = Some(condition);
        self
    }

    pub fn is_required(&self) -> bool {
        self.is_required.unwrap_or(false)
    }

    /// Label when present and non-blank, otherwise the name.
    pub fn label_or_name(&self) -> &str {
        self.label
            .as_deref()
            .filter(|label| !label.trim().is_empty())
            .unwrap_or(&self.name)
    }
}

impl NamedEntity for FieldDefinition {
    fn name(&self) -> &str {
        &self.name
    }
}

impl Displayable for FieldDefinition {
    fn display_label(&self) -> String {
        format!("{} ({})", self.label_or_name(), self.input.kind())
    }
}

/// Gates a field's visibility on the current value of another field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Condition {
    pub dependency_name: String,
    #[serde(flatten)]
    pub predicate: ConditionPredicate,
}

impl Condition {
    pub fn new(dependency_name: impl Into<String>, predicate: ConditionPredicate) -> Self {
        Self {
            dependency_name: dependency_name.into(),
            predicate,
        }
    }

    pub fn condition_type(&self) -> ConditionType {
        self.predicate.condition_type()
    }
}

/// Comparison and its expected value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ConditionPredicate {
    IsSet,
    StartsWith { value: String },
    Contains { value: String },
    Above {
        #[serde(serialize_with = "serialize_number")]
        value: f64,
    },
    Below {
        #[serde(serialize_with = "serialize_number")]
        value: f64,
    },
    Boolean { value: bool },
}

impl ConditionPredicate {
    pub fn condition_type(&self) -> ConditionType {
        match self {
            ConditionPredicate::IsSet => ConditionType::IsSet,
            ConditionPredicate::StartsWith { .. } => ConditionType::StartsWith,
            ConditionPredicate::Contains { .. } => ConditionType::Contains,
            ConditionPredicate::Above { .. } => ConditionType::Above,
            ConditionPredicate::Below { .. } => ConditionType::Below,
            ConditionPredicate::Boolean { .. } => ConditionType::Boolean,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ConditionType {
    IsSet,
    StartsWith,
    Contains,
    Above,
    Below,
    Boolean,
}

impl ConditionType {
    pub const ALL: [ConditionType; 6] = [
        ConditionType::IsSet,
        ConditionType::StartsWith,
        ConditionType::Contains,
        ConditionType::Above,
        ConditionType::Below,
        ConditionType::Boolean,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ConditionType::IsSet => "isSet",
            ConditionType::StartsWith => "startsWith",
            ConditionType::Contains => "contains",
            ConditionType::Above => "above",
            ConditionType::Below => "below",
            ConditionType::Boolean => "boolean",
        }
    }

    pub fn from_tag(tag: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.as_str() == tag)
    }
}

impl fmt::Display for ConditionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
