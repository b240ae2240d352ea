//! Forward migration of persisted form definitions.
//!
//! Loading never drops a user-authored form: anything that still has the
//! basic shape but cannot be brought up to the current schema becomes a
//! [`MigrationError`] that serializes back to the exact raw input.

use serde::{Serialize, Serializer};
use serde_json::{Map, Value};
use thiserror::Error;
use tracing::{debug, info, warn};

use mform_domain::{FormDefinition, FormVersion, NamedEntity};

use crate::schema::{parse_form_v1, summarize, ObjectReader, SchemaError, ValidationIssue};

/// Minimal shape every form ever persisted has had.
#[derive(Debug, Clone, PartialEq)]
pub struct FormDefinitionBasic {
    pub title: String,
    pub name: String,
    pub custom_classname: Option<String>,
    pub fields: Vec<Value>,
    /// The untouched input this was parsed from.
    pub raw: Value,
}

impl FormDefinitionBasic {
    pub fn parse(raw: &Value) -> Result<Self, SchemaError> {
        let mut reader = ObjectReader::new(raw, "");
        let title = reader.string("title");
        let name = reader.string("name");
        let custom_classname = reader.optional_string("customClassname");
        let fields = reader.array("fields").cloned();

        match (title, name, fields) {
            (Some(title), Some(name), Some(fields)) if reader.is_valid() => Ok(Self {
                title,
                name,
                custom_classname,
                fields,
                raw: raw.clone(),
            }),
            _ => Err(SchemaError::new(reader.into_issues())),
        }
    }
}

/// A form that has the basic shape but fails the current schema.
///
/// Serializes as the original raw form so load/save cycles are lossless.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("Form \"{}\" needs a manual fix: {error}", .form.name)]
pub struct MigrationError {
    pub form: FormDefinitionBasic,
    pub error: SchemaError,
}

impl MigrationError {
    pub fn issues(&self) -> &[ValidationIssue] {
        &self.error.issues
    }

    pub fn raw(&self) -> &Value {
        &self.form.raw
    }
}

impl Serialize for MigrationError {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.form.raw.serialize(serializer)
    }
}

/// Input that does not even have the basic form shape.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("Invalid form data: {error}")]
pub struct InvalidData {
    pub raw: Value,
    pub error: SchemaError,
}

impl InvalidData {
    /// Best-effort name for reporting; `None` when the entry has none.
    pub fn name_hint(&self) -> Option<&str> {
        self.raw
            .get("name")
            .and_then(Value::as_str)
            .or_else(|| self.raw.get("title").and_then(Value::as_str))
    }
}

/// One entry of a loaded form collection.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FormOrError {
    Form(FormDefinition),
    MigrationError(MigrationError),
}

impl FormOrError {
    pub fn as_form(&self) -> Option<&FormDefinition> {
        match self {
            FormOrError::Form(form) => Some(form),
            FormOrError::MigrationError(_) => None,
        }
    }

    pub fn into_form(self) -> Option<FormDefinition> {
        match self {
            FormOrError::Form(form) => Some(form),
            FormOrError::MigrationError(_) => None,
        }
    }

    pub fn as_migration_error(&self) -> Option<&MigrationError> {
        match self {
            FormOrError::MigrationError(error) => Some(error),
            FormOrError::Form(_) => None,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            FormOrError::Form(form) => &form.name,
            FormOrError::MigrationError(error) => &error.form.name,
        }
    }

    pub fn title(&self) -> &str {
        match self {
            FormOrError::Form(form) => &form.title,
            FormOrError::MigrationError(error) => &error.form.title,
        }
    }

    pub fn is_form(&self) -> bool {
        matches!(self, FormOrError::Form(_))
    }
}

impl NamedEntity for FormOrError {
    fn name(&self) -> &str {
        FormOrError::name(self)
    }
}

/// Brings `raw` up to the current schema version.
///
/// Already-current forms come back unchanged. Legacy forms get the version
/// stamped and their fields re-validated; if that fails the form is kept as
/// a [`MigrationError`]. Anything without the basic shape is
/// [`InvalidData`].
pub fn migrate_to_latest(raw: &Value) -> Result<FormOrError, InvalidData> {
    let strict_error = match parse_form_v1(raw) {
        Ok(form) => {
            debug!(form = %form.name, "form already at current version");
            return Ok(FormOrError::Form(form));
        }
        Err(err) => err,
    };

    let basic = match FormDefinitionBasic::parse(raw) {
        Ok(basic) => basic,
        Err(error) => {
            warn!(%error, "form data is not a form");
            return Err(InvalidData {
                raw: raw.clone(),
                error,
            });
        }
    };

    match parse_form_v1(&stamp_version(&basic)) {
        Ok(form) => {
            info!(form = %form.name, version = FormVersion::CURRENT.as_str(), "migrated form");
            Ok(FormOrError::Form(form))
        }
        Err(error) => {
            warn!(
                form = %basic.name,
                issues = error.issues.len(),
                strict = %summarize(&strict_error.issues),
                "form needs a manual fix"
            );
            Ok(FormOrError::MigrationError(MigrationError { form: basic, error }))
        }
    }
}

/// Legacy forms carry no version; the only known step stamps `"1"`.
fn stamp_version(basic: &FormDefinitionBasic) -> Value {
    let mut object = basic.raw.as_object().cloned().unwrap_or_else(Map::new);
    object.insert(
        "version".to_string(),
        Value::String(FormVersion::CURRENT.as_str().to_string()),
    );
    Value::Object(object)
}

/// True when `raw` does not already satisfy the current schema.
pub fn form_needs_migration(raw: &Value) -> bool {
    parse_form_v1(raw).is_err()
}

/// Only the entries that are usable forms, in order.
pub fn valid_forms<'a, I>(entries: I) -> impl Iterator<Item = &'a FormDefinition>
where
    I: IntoIterator<Item = &'a FormOrError>,
{
    entries.into_iter().filter_map(FormOrError::as_form)
}

/// Looks a usable form up by name.
pub fn find_form<'a>(entries: &'a [FormOrError], name: &str) -> Option<&'a FormDefinition> {
    valid_forms(entries).find(|form| form.name == name)
}
