use mform_domain::{ConditionPredicate, ConditionType, FieldValue, InputDefinition, InputKind};

/// Condition kinds a field may declare on a dependency of this input kind.
pub fn available_conditions_for_input(input: &InputDefinition) -> &'static [ConditionType] {
    available_conditions_for_kind(input.kind())
}

pub fn available_conditions_for_kind(kind: InputKind) -> &'static [ConditionType] {
    use ConditionType::*;

    // No wildcard arm: a new input kind must be placed in this table.
    match kind {
        InputKind::Text
        | InputKind::Textarea
        | InputKind::Email
        | InputKind::Tel
        | InputKind::Folder
        | InputKind::Note => &[IsSet, StartsWith, Contains],
        InputKind::Slider | InputKind::Number => &[IsSet, Above, Below],
        InputKind::Toggle => &[Boolean],
        InputKind::Date | InputKind::Time | InputKind::Datetime => &[IsSet],
        InputKind::Select
        | InputKind::Multiselect
        | InputKind::Tag
        | InputKind::Dataview
        | InputKind::DocumentBlock => &[],
    }
}

/// Whether `value` satisfies `predicate`. An absent value never does.
pub fn value_meets_condition(predicate: &ConditionPredicate, value: Option<&FieldValue>) -> bool {
    let Some(value) = value else {
        return false;
    };
    match predicate {
        ConditionPredicate::IsSet => !matches!(value, FieldValue::Text(text) if text.is_empty()),
        ConditionPredicate::StartsWith { value: prefix } => value
            .as_str()
            .is_some_and(|text| text.starts_with(prefix.as_str())),
        ConditionPredicate::Contains { value: needle } => value
            .as_str()
            .is_some_and(|text| text.contains(needle.as_str())),
        ConditionPredicate::Above { value: bound } => {
            value.as_number().is_some_and(|number| number > *bound)
        }
        ConditionPredicate::Below { value: bound } => {
            value.as_number().is_some_and(|number| number < *bound)
        }
        ConditionPredicate::Boolean { value: expected } => value.as_bool() == Some(*expected),
    }
}
