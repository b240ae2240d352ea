use mform_domain::{FormDefinition, FormTemplate, FormVersion, ParsedTemplate};
use serde_json::Value;

use super::field::validate_fields_at;
use super::{ObjectReader, SchemaError, ValidationIssue};

/// Parses a form against the current (`version: "1"`) schema.
pub fn parse_form_v1(raw: &Value) -> Result<FormDefinition, SchemaError> {
    let mut reader = ObjectReader::new(raw, "");
    let title = reader.non_empty_string("title");
    let name = reader.non_empty_string("name");
    let custom_classname = reader.optional_string("customClassname");
    let version_ok = reader.literal("version", FormVersion::CURRENT.as_str());

    let fields = match reader.array("fields") {
        Some(items) => match validate_fields_at(items, "fields") {
            Ok(fields) => Some(fields),
            Err(issues) => {
                reader.extend(issues);
                None
            }
        },
        None => None,
    };

    let template = match reader.get("template").filter(|value| !value.is_null()) {
        Some(value) => match parse_template_block(value) {
            Ok(template) => Some(template),
            Err(err) => {
                reader.extend(err.issues);
                None
            }
        },
        None => None,
    };

    match (title, name, fields) {
        (Some(title), Some(name), Some(fields)) if version_ok && reader.is_valid() => {
            Ok(FormDefinition {
                title,
                name,
                custom_classname,
                version: FormVersion::CURRENT,
                fields,
                template,
            })
        }
        _ => Err(SchemaError::new(reader.into_issues())),
    }
}

/// Parses a `{ createCommand, parsedTemplate }` block.
pub fn parse_template_block(raw: &Value) -> Result<FormTemplate, SchemaError> {
    let mut reader = ObjectReader::new(raw, "template");
    let create_command = reader.required_bool("createCommand");
    let parsed_template = match reader.get("parsedTemplate") {
        Some(tokens) => match serde_json::from_value::<ParsedTemplate>(tokens.clone()) {
            Ok(template) => Some(template),
            Err(err) => {
                reader.push("parsedTemplate", format!("invalid template tokens: {err}"));
                None
            }
        },
        None => {
            if reader.is_object() {
                reader.push("parsedTemplate", "is required");
            }
            None
        }
    };

    match (create_command, parsed_template) {
        (Some(create_command), Some(parsed_template)) if reader.is_valid() => Ok(FormTemplate {
            create_command,
            parsed_template,
        }),
        _ => {
            let issues: Vec<ValidationIssue> = reader.into_issues();
            Err(SchemaError::new(issues))
        }
    }
}
