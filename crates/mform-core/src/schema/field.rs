use std::collections::HashMap;

use mform_domain::{Condition, ConditionPredicate, ConditionType, FieldDefinition};
use serde_json::Value;
use thiserror::Error;

use super::input::validate_input_at;
use super::{describe, join_path, summarize, ObjectReader, ValidationIssue};

/// A field definition failed validation.
///
/// Lists every independently failing subfield, not only the first.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Invalid field{}: {}", quoted_name(.field_name), summarize(.issues))]
pub struct FieldError {
    /// Name of the field, when it could be read.
    pub field_name: Option<String>,
    pub issues: Vec<ValidationIssue>,
}

fn quoted_name(name: &Option<String>) -> String {
    name.as_deref()
        .map(|name| format!(" \"{name}\""))
        .unwrap_or_default()
}

pub fn validate_field(raw: &Value) -> Result<FieldDefinition, FieldError> {
    validate_field_at(raw, "")
}

fn validate_field_at(raw: &Value, path: &str) -> Result<FieldDefinition, FieldError> {
    let mut reader = ObjectReader::new(raw, path);
    let name = reader.non_empty_string("name");
    let label = reader.optional_string("label");
    let description = reader.optional_string("description").unwrap_or_default();
    let is_required = reader.optional_bool("isRequired");

    let input = if reader.is_object() {
        let input_path = reader.key_path("input");
        match reader.get("input") {
            Some(value) => match validate_input_at(value, &input_path) {
                Ok(input) => Some(input),
                Err(err) => {
                    reader.extend(err.into_issues(&input_path));
                    None
                }
            },
            None => {
                reader.push("input", "is required");
                None
            }
        }
    } else {
        None
    };

    let condition = match reader.get("condition").filter(|value| !value.is_null()) {
        Some(value) => {
            let condition_path = reader.key_path("condition");
            match parse_condition(value, &condition_path) {
                Ok(condition) => Some(condition),
                Err(issues) => {
                    reader.extend(issues);
                    None
                }
            }
        }
        None => None,
    };

    match (name.clone(), input) {
        (Some(name), Some(input)) if reader.is_valid() => Ok(FieldDefinition {
            name,
            label,
            description,
            input,
            is_required,
            condition,
        }),
        _ => Err(FieldError {
            field_name: name.or_else(|| {
                reader
                    .get("name")
                    .and_then(Value::as_str)
                    .filter(|name| !name.trim().is_empty())
                    .map(str::to_string)
            }),
            issues: reader.into_issues(),
        }),
    }
}

fn parse_condition(raw: &Value, path: &str) -> Result<Condition, Vec<ValidationIssue>> {
    let mut reader = ObjectReader::new(raw, path);
    let dependency_name = reader.non_empty_string("dependencyName");
    let kind = match reader.string("type") {
        Some(tag) => match ConditionType::from_tag(&tag) {
            Some(kind) => Some(kind),
            None => {
                reader.push("type", format!("unknown condition type \"{tag}\""));
                None
            }
        },
        None => None,
    };

    let predicate = kind.and_then(|kind| match kind {
        ConditionType::IsSet => Some(ConditionPredicate::IsSet),
        ConditionType::StartsWith => reader
            .string("value")
            .map(|value| ConditionPredicate::StartsWith { value }),
        ConditionType::Contains => reader
            .string("value")
            .map(|value| ConditionPredicate::Contains { value }),
        ConditionType::Above => reader
            .number("value")
            .map(|value| ConditionPredicate::Above { value }),
        ConditionType::Below => reader
            .number("value")
            .map(|value| ConditionPredicate::Below { value }),
        ConditionType::Boolean => condition_bool(&mut reader)
            .map(|value| ConditionPredicate::Boolean { value }),
    });

    match (dependency_name, predicate) {
        (Some(dependency_name), Some(predicate)) if reader.is_valid() => Ok(Condition {
            dependency_name,
            predicate,
        }),
        _ => Err(reader.into_issues()),
    }
}

fn condition_bool(reader: &mut ObjectReader<'_>) -> Option<bool> {
    match reader.get("value") {
        Some(Value::Bool(flag)) => Some(*flag),
        Some(other) => {
            let message = format!("expected a boolean, received {}", describe(other));
            reader.push("value", message);
            None
        }
        None => {
            reader.push("value", "is required");
            None
        }
    }
}

/// Validates a list of raw field definitions.
///
/// Every issue carries the index of the field it belongs to. Two fields
/// sharing a name are rejected since they would collide in the result map.
pub fn validate_fields(raw: &[Value]) -> Result<Vec<FieldDefinition>, Vec<ValidationIssue>> {
    validate_fields_at(raw, "")
}

pub(crate) fn validate_fields_at(
    raw: &[Value],
    path: &str,
) -> Result<Vec<FieldDefinition>, Vec<ValidationIssue>> {
    let mut fields = Vec::with_capacity(raw.len());
    let mut issues = Vec::new();
    let mut seen: HashMap<String, usize> = HashMap::new();

    for (index, item) in raw.iter().enumerate() {
        let item_path = join_path(path, &index.to_string());
        match validate_field_at(item, &item_path) {
            Ok(field) => {
                if let Some(first) = seen.get(&field.name) {
                    issues.push(
                        ValidationIssue::new(
                            join_path(&item_path, "name"),
                            format!(
                                "duplicate field name \"{}\" (already used by field {first})",
                                field.name
                            ),
                        )
                        .at_index(index),
                    );
                } else {
                    seen.insert(field.name.clone(), index);
                }
                fields.push(field);
            }
            Err(err) => issues.extend(err.issues.into_iter().map(|issue| issue.at_index(index))),
        }
    }

    if issues.is_empty() {
        Ok(fields)
    } else {
        Err(issues)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mform_domain::{BasicInput, InputDefinition};
    use serde_json::json;

    #[test]
    fn minimal_field() {
        let field = validate_field(&json!({
            "name": "title",
            "input": { "type": "text" }
        }))
        .unwrap();
        assert_eq!(
            field,
            FieldDefinition::new("title", InputDefinition::Text(BasicInput::default()))
        );
    }

    #[test]
    fn full_field_with_condition() {
        let field = validate_field(&json!({
            "name": "details",
            "label": "Details",
            "description": "More about it",
            "isRequired": false,
            "input": { "type": "textarea" },
            "condition": { "dependencyName": "kind", "type": "startsWith", "value": "bug" }
        }))
        .unwrap();
        assert_eq!(field.label.as_deref(), Some("Details"));
        assert_eq!(field.is_required, Some(false));
        assert_eq!(
            field.condition,
            Some(Condition::new(
                "kind",
                ConditionPredicate::StartsWith {
                    value: "bug".into()
                }
            ))
        );
    }

    #[test]
    fn reports_every_failing_subfield() {
        let err = validate_field(&json!({
            "name": "  ",
            "label": 3,
            "isRequired": "yes",
            "input": { "type": "slider" }
        }))
        .unwrap_err();
        let paths: Vec<_> = err.issues.iter().map(|issue| issue.path.as_str()).collect();
        assert_eq!(
            paths,
            vec!["name", "label", "isRequired", "input.min", "input.max"]
        );
        assert_eq!(err.field_name, None);
    }

    #[test]
    fn unknown_input_tag_is_reported_under_input() {
        let err = validate_field(&json!({ "name": "x", "input": { "type": "color" } }))
            .unwrap_err();
        assert_eq!(err.field_name.as_deref(), Some("x"));
        assert_eq!(err.issues[0].path, "input.type");
        assert_eq!(
            err.to_string(),
            "Invalid field \"x\": input.type: unknown input type \"color\""
        );
    }

    #[test]
    fn condition_value_must_match_type() {
        let err = validate_field(&json!({
            "name": "x",
            "input": { "type": "text" },
            "condition": { "dependencyName": "age", "type": "above", "value": "ten" }
        }))
        .unwrap_err();
        assert_eq!(err.issues[0].path, "condition.value");

        let is_set = validate_field(&json!({
            "name": "x",
            "input": { "type": "text" },
            "condition": { "dependencyName": "age", "type": "isSet" }
        }))
        .unwrap();
        assert_eq!(
            is_set.condition.map(|c| c.condition_type()),
            Some(ConditionType::IsSet)
        );
    }

    #[test]
    fn list_issues_carry_index() {
        let issues = validate_fields(&[
            json!({ "name": "ok", "input": { "type": "text" } }),
            json!({ "name": "bad", "input": { "type": "note" } }),
        ])
        .unwrap_err();
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].index, Some(1));
        assert_eq!(issues[0].path, "1.input.folder");
    }

    #[test]
    fn duplicate_names_are_rejected() {
        let issues = validate_fields(&[
            json!({ "name": "a", "input": { "type": "text" } }),
            json!({ "name": "a", "input": { "type": "number" } }),
        ])
        .unwrap_err();
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].index, Some(1));
        assert_eq!(issues[0].path, "1.name");
        assert!(issues[0].message.contains("duplicate field name \"a\""));
    }
}
