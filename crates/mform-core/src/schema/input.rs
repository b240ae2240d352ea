use mform_domain::{
    BasicInput, DataviewInput, DocumentBlockInput, InputDefinition, InputKind, MultiselectInput,
    NoteInput, SelectInput, SelectOption, SliderInput, TagInput,
};
use regex::Regex;
use serde_json::Value;
use thiserror::Error;

use super::{describe, join_path, summarize, ObjectReader, SchemaError, ValidationIssue};

/// Why a raw value is not a valid [`InputDefinition`].
#[derive(Debug, Clone, PartialEq, Error)]
pub enum InputError {
    /// Not even an object with a string `type`.
    #[error("Invalid input definition: {0}")]
    Structure(SchemaError),
    /// The `type` tag is not one of the known input kinds.
    #[error("Invalid input type \"{0}\"")]
    InvalidInputType(String),
    /// Known kind, invalid payload.
    #[error("Invalid {kind} input: {}", summarize(.issues))]
    InvalidInput {
        kind: InputKind,
        issues: Vec<ValidationIssue>,
    },
}

impl InputError {
    /// Flattens the error into issues located under `path`.
    pub fn into_issues(self, path: &str) -> Vec<ValidationIssue> {
        match self {
            InputError::Structure(error) => error.issues,
            InputError::InvalidInputType(tag) => vec![ValidationIssue::new(
                join_path(path, "type"),
                format!("unknown input type \"{tag}\""),
            )],
            InputError::InvalidInput { issues, .. } => issues,
        }
    }
}

/// Validates a raw input definition.
pub fn validate_input(raw: &Value) -> Result<InputDefinition, InputError> {
    validate_input_at(raw, "")
}

pub(crate) fn validate_input_at(raw: &Value, path: &str) -> Result<InputDefinition, InputError> {
    let Some(object) = raw.as_object() else {
        return Err(InputError::Structure(SchemaError::single(
            path,
            format!("expected an object, received {}", describe(raw)),
        )));
    };
    let tag = match object.get("type") {
        Some(Value::String(tag)) => tag.as_str(),
        Some(other) => {
            return Err(InputError::Structure(SchemaError::single(
                join_path(path, "type"),
                format!("expected a string, received {}", describe(other)),
            )))
        }
        None => {
            return Err(InputError::Structure(SchemaError::single(
                join_path(path, "type"),
                "is required",
            )))
        }
    };
    let kind =
        InputKind::from_tag(tag).ok_or_else(|| InputError::InvalidInputType(tag.to_string()))?;

    let mut reader = ObjectReader::new(raw, path);
    let parsed = match kind {
        InputKind::Text => basic(&mut reader).map(InputDefinition::Text),
        InputKind::Number => basic(&mut reader).map(InputDefinition::Number),
        InputKind::Date => basic(&mut reader).map(InputDefinition::Date),
        InputKind::Time => basic(&mut reader).map(InputDefinition::Time),
        InputKind::Datetime => basic(&mut reader).map(InputDefinition::Datetime),
        InputKind::Textarea => basic(&mut reader).map(InputDefinition::Textarea),
        InputKind::Toggle => basic(&mut reader).map(InputDefinition::Toggle),
        InputKind::Email => basic(&mut reader).map(InputDefinition::Email),
        InputKind::Tel => basic(&mut reader).map(InputDefinition::Tel),
        InputKind::Tag => tag_input(&mut reader).map(InputDefinition::Tag),
        InputKind::Slider => slider(&mut reader).map(InputDefinition::Slider),
        InputKind::Note => reader
            .non_empty_string("folder")
            .map(|folder| InputDefinition::Note(NoteInput { folder })),
        InputKind::Folder => Some(InputDefinition::Folder),
        InputKind::Dataview => reader
            .non_empty_string("query")
            .map(|query| InputDefinition::Dataview(DataviewInput { query })),
        InputKind::Select => {
            first_match(raw, &mut reader, SELECT_SHAPES).map(InputDefinition::Select)
        }
        InputKind::Multiselect => {
            first_match(raw, &mut reader, MULTISELECT_SHAPES).map(InputDefinition::Multiselect)
        }
        InputKind::DocumentBlock => reader
            .string("body")
            .map(|body| InputDefinition::DocumentBlock(DocumentBlockInput { body })),
    };

    match parsed {
        Some(input) if reader.is_valid() => Ok(input),
        _ => Err(InputError::InvalidInput {
            kind,
            issues: reader.into_issues(),
        }),
    }
}

fn basic(reader: &mut ObjectReader<'_>) -> Option<BasicInput> {
    let hidden = reader.optional_bool("hidden");
    Some(BasicInput { hidden })
}

fn tag_input(reader: &mut ObjectReader<'_>) -> Option<TagInput> {
    let exclude = reader.optional_string("exclude");
    if let Some(pattern) = &exclude {
        if let Err(err) = Regex::new(pattern) {
            reader.push("exclude", format!("invalid regular expression: {err}"));
            return None;
        }
    }
    Some(TagInput { exclude })
}

fn slider(reader: &mut ObjectReader<'_>) -> Option<SliderInput> {
    let min = reader.number("min");
    let max = reader.number("max");
    Some(SliderInput { min: min?, max: max? })
}

/// One candidate shape of a `source`-tagged input.
type Shape<T> = (&'static str, fn(&mut ObjectReader<'_>) -> Option<T>);

const SELECT_SHAPES: &[Shape<SelectInput>] = &[
    ("notes", |reader| {
        reader
            .non_empty_string("folder")
            .map(|folder| SelectInput::Notes { folder })
    }),
    ("fixed", |reader| {
        select_options(reader).map(|options| SelectInput::Fixed { options })
    }),
];

const MULTISELECT_SHAPES: &[Shape<MultiselectInput>] = &[
    ("notes", |reader| {
        reader
            .non_empty_string("folder")
            .map(|folder| MultiselectInput::Notes { folder })
    }),
    ("fixed", |reader| {
        let options = string_list(reader, "multi_select_options");
        let allow_unknown_values = reader.optional_bool("allowUnknownValues").unwrap_or(false);
        Some(MultiselectInput::Fixed {
            multi_select_options: options?,
            allow_unknown_values,
        })
    }),
    ("dataview", |reader| {
        let query = reader.non_empty_string("query");
        let allow_unknown_values = reader.optional_bool("allowUnknownValues").unwrap_or(false);
        Some(MultiselectInput::Dataview {
            query: query?,
            allow_unknown_values,
        })
    }),
];

/// Tries every shape in declared order; the first one that validates wins.
///
/// When none does, the issues reported are those of the shape whose
/// `source` literal matched, or of the first declared shape otherwise.
fn first_match<T>(
    raw: &Value,
    reader: &mut ObjectReader<'_>,
    shapes: &[Shape<T>],
) -> Option<T> {
    let source = reader.get("source").and_then(Value::as_str);
    let mut reported: Option<Vec<ValidationIssue>> = None;
    let mut reported_matches_source = false;

    for (literal, validate) in shapes {
        let mut attempt = ObjectReader::new(raw, reader.path());
        let source_ok = attempt.literal("source", literal);
        let parsed = validate(&mut attempt);
        match parsed {
            Some(value) if source_ok && attempt.is_valid() => return Some(value),
            _ => {
                let matches_source = source == Some(*literal);
                if reported.is_none() || (matches_source && !reported_matches_source) {
                    reported = Some(attempt.into_issues());
                    reported_matches_source = matches_source;
                }
            }
        }
    }

    reader.extend(reported.unwrap_or_default());
    None
}

/// `{ value, label? }` pairs; values are coerced to trimmed strings.
fn select_options(reader: &mut ObjectReader<'_>) -> Option<Vec<SelectOption>> {
    let items = reader.array("options")?;
    let base = reader.key_path("options");
    let mut options = Vec::with_capacity(items.len());
    let mut issues = Vec::new();

    for (index, item) in items.iter().enumerate() {
        let mut option = ObjectReader::new(item, &join_path(&base, &index.to_string()));
        let value = match option.get("value") {
            Some(Value::String(text)) => Some(text.trim().to_string()),
            Some(Value::Number(number)) => Some(number.to_string()),
            Some(Value::Bool(flag)) => Some(flag.to_string()),
            Some(other) if option.is_object() => {
                let message = format!("expected a string, received {}", describe(other));
                option.push("value", message);
                None
            }
            None if option.is_object() => {
                option.push("value", "is required");
                None
            }
            _ => None,
        };
        if let Some(text) = &value {
            if text.is_empty() {
                option.push("value", "must not be empty");
            }
        }
        let label = option.optional_string("label");
        match value {
            Some(value) if option.is_valid() => options.push(SelectOption { value, label }),
            _ => issues.extend(option.into_issues()),
        }
    }

    if issues.is_empty() {
        Some(options)
    } else {
        reader.extend(issues);
        None
    }
}

fn string_list(reader: &mut ObjectReader<'_>, key: &str) -> Option<Vec<String>> {
    let items = reader.array(key)?;
    let base = reader.key_path(key);
    let mut values = Vec::with_capacity(items.len());
    let mut issues = Vec::new();
    for (index, item) in items.iter().enumerate() {
        match item {
            Value::String(text) => values.push(text.clone()),
            other => issues.push(ValidationIssue::new(
                join_path(&base, &index.to_string()),
                format!("expected a string, received {}", describe(other)),
            )),
        }
    }
    if issues.is_empty() {
        Some(values)
    } else {
        reader.extend(issues);
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn basic_kinds_need_only_the_tag() {
        for tag in [
            "text", "number", "date", "time", "datetime", "textarea", "toggle", "email", "tel",
        ] {
            let input = validate_input(&json!({ "type": tag })).expect(tag);
            assert_eq!(input.kind().as_str(), tag);
        }
        let hidden = validate_input(&json!({ "type": "text", "hidden": true })).unwrap();
        assert!(hidden.is_hidden());
    }

    #[test]
    fn unknown_tag_is_invalid_input_type() {
        let err = validate_input(&json!({ "type": "checkbox" })).unwrap_err();
        assert_eq!(err, InputError::InvalidInputType("checkbox".into()));
        assert_eq!(err.to_string(), "Invalid input type \"checkbox\"");
    }

    #[test]
    fn missing_tag_is_structural() {
        let err = validate_input(&json!({ "folder": "x" })).unwrap_err();
        assert!(matches!(err, InputError::Structure(_)));
        assert!(err.to_string().contains("type: is required"));
    }

    #[test]
    fn slider_needs_both_bounds_but_not_ordering() {
        let err = validate_input(&json!({ "type": "slider", "min": 1 })).unwrap_err();
        match err {
            InputError::InvalidInput { kind, issues } => {
                assert_eq!(kind, InputKind::Slider);
                assert_eq!(issues.len(), 1);
                assert_eq!(issues[0].path, "max");
            }
            other => panic!("unexpected error: {other:?}"),
        }

        let inverted = validate_input(&json!({ "type": "slider", "min": 10, "max": 1 })).unwrap();
        assert_eq!(
            inverted,
            InputDefinition::Slider(SliderInput {
                min: 10.0,
                max: 1.0
            })
        );
    }

    #[test]
    fn blank_strings_are_rejected_but_not_trimmed() {
        let err = validate_input(&json!({ "type": "note", "folder": "   " })).unwrap_err();
        assert!(err.to_string().contains("folder: must not be empty"));

        let ok = validate_input(&json!({ "type": "note", "folder": " notes/ " })).unwrap();
        assert_eq!(
            ok,
            InputDefinition::Note(NoteInput {
                folder: " notes/ ".into()
            })
        );
    }

    #[test]
    fn select_fixed_coerces_option_values() {
        let input = validate_input(&json!({
            "type": "select",
            "source": "fixed",
            "options": [
                { "value": "  a ", "label": "A" },
                { "value": 2 }
            ]
        }))
        .unwrap();
        assert_eq!(
            input,
            InputDefinition::Select(SelectInput::Fixed {
                options: vec![
                    SelectOption::new("a", "A"),
                    SelectOption {
                        value: "2".into(),
                        label: None
                    },
                ]
            })
        );
    }

    #[test]
    fn select_reports_the_shape_matching_source() {
        let err = validate_input(&json!({ "type": "select", "source": "fixed" })).unwrap_err();
        let issues = err.into_issues("");
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].path, "options");
    }

    #[test]
    fn select_without_source_reports_first_shape() {
        let err = validate_input(&json!({ "type": "select" })).unwrap_err();
        let paths: Vec<_> = err
            .into_issues("")
            .into_iter()
            .map(|issue| issue.path)
            .collect();
        assert_eq!(paths, vec!["source", "folder"]);
    }

    #[test]
    fn multiselect_shapes() {
        let fixed = validate_input(&json!({
            "type": "multiselect",
            "source": "fixed",
            "multi_select_options": ["a", "b"],
            "allowUnknownValues": true
        }))
        .unwrap();
        assert_eq!(
            fixed,
            InputDefinition::Multiselect(MultiselectInput::Fixed {
                multi_select_options: vec!["a".into(), "b".into()],
                allow_unknown_values: true,
            })
        );

        let dataview = validate_input(&json!({
            "type": "multiselect",
            "source": "dataview",
            "query": "dv.pages()"
        }))
        .unwrap();
        assert!(matches!(
            dataview,
            InputDefinition::Multiselect(MultiselectInput::Dataview {
                allow_unknown_values: false,
                ..
            })
        ));

        let err = validate_input(&json!({
            "type": "multiselect",
            "source": "fixed",
            "multi_select_options": ["a", 3]
        }))
        .unwrap_err();
        assert!(err
            .to_string()
            .contains("multi_select_options.1: expected a string, received number"));
    }

    #[test]
    fn tag_exclude_must_be_a_regex() {
        assert!(validate_input(&json!({ "type": "tag", "exclude": "^draft" })).is_ok());
        let err = validate_input(&json!({ "type": "tag", "exclude": "(" })).unwrap_err();
        assert!(err.to_string().contains("invalid regular expression"));
    }

    #[test]
    fn nested_paths_are_prefixed() {
        let err = validate_input_at(&json!({ "type": "dataview" }), "input").unwrap_err();
        let issues = err.into_issues("input");
        assert_eq!(issues[0].path, "input.query");
    }
}
