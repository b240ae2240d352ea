use std::collections::BTreeMap;
use std::fmt;

use mform_domain::{FieldValue, FormData, InputKind};

/// Lifecycle of one form session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FormStatus {
    #[default]
    Draft,
    Submitted,
    Cancelled,
}

impl FormStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            FormStatus::Draft => "draft",
            FormStatus::Submitted => "submitted",
            FormStatus::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for FormStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Validation rule attached to a registered field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldRule {
    Required { message: String },
}

impl FieldRule {
    /// `'<label>' is required`.
    pub fn required(label: &str) -> Self {
        FieldRule::Required {
            message: format!("'{label}' is required"),
        }
    }

    pub fn check(&self, value: Option<&FieldValue>) -> Result<(), String> {
        match self {
            FieldRule::Required { message } => match value {
                Some(value) if !value.is_empty() => Ok(()),
                _ => Err(message.clone()),
            },
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct FieldState {
    pub value: Option<FieldValue>,
    pub rule: Option<FieldRule>,
    pub errors: Vec<String>,
}

/// Everything a session knows, keyed by field name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FormState {
    pub status: FormStatus,
    pub fields: BTreeMap<String, FieldState>,
}

impl FormState {
    pub fn value(&self, name: &str) -> Option<&FieldValue> {
        self.fields.get(name).and_then(|field| field.value.as_ref())
    }

    pub fn errors(&self, name: &str) -> &[String] {
        self.fields
            .get(name)
            .map(|field| field.errors.as_slice())
            .unwrap_or_default()
    }

    pub fn is_valid(&self) -> bool {
        self.fields.values().all(|field| field.errors.is_empty())
    }

    /// Flat result map; unset and empty values are left out.
    pub fn data(&self) -> FormData {
        self.fields
            .iter()
            .filter_map(|(name, field)| match &field.value {
                Some(value) if !value.is_empty() => Some((name.clone(), value.clone())),
                _ => None,
            })
            .collect()
    }

    pub(crate) fn set_value(&mut self, name: &str, value: Option<FieldValue>) -> bool {
        match self.fields.get_mut(name) {
            Some(field) => {
                field.value = value;
                field.errors.clear();
                true
            }
            None => false,
        }
    }

    /// Runs every rule, replacing each field's errors. Returns whether all
    /// rules passed.
    pub(crate) fn validate(&mut self) -> bool {
        let mut valid = true;
        for field in self.fields.values_mut() {
            field.errors = match &field.rule {
                Some(rule) => match rule.check(field.value.as_ref()) {
                    Ok(()) => Vec::new(),
                    Err(message) => {
                        valid = false;
                        vec![message]
                    }
                },
                None => Vec::new(),
            };
        }
        valid
    }
}

/// Numeric inputs store parsed numbers; anything unparseable stays as typed.
pub(crate) fn coerce_value(kind: InputKind, value: FieldValue) -> FieldValue {
    if !kind.is_numeric() {
        return value;
    }
    match value {
        FieldValue::Text(text) => match text.trim().parse::<f64>() {
            Ok(number) if number.is_finite() => FieldValue::Number(number),
            _ => FieldValue::Text(text),
        },
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn required_rule_uses_emptiness_by_kind() {
        let rule = FieldRule::required("Name");
        assert_eq!(rule.check(None), Err("'Name' is required".to_string()));
        assert!(rule.check(Some(&"".into())).is_err());
        assert!(rule.check(Some(&FieldValue::List(Vec::new()))).is_err());
        assert!(rule.check(Some(&0.into())).is_ok());
        assert!(rule.check(Some(&false.into())).is_ok());
    }

    #[test]
    fn numeric_coercion() {
        assert_eq!(
            coerce_value(InputKind::Number, "19.99".into()),
            FieldValue::Number(19.99)
        );
        assert_eq!(
            coerce_value(InputKind::Slider, " 4 ".into()),
            FieldValue::Number(4.0)
        );
        assert_eq!(
            coerce_value(InputKind::Number, "not-a-number".into()),
            FieldValue::from("not-a-number")
        );
        assert_eq!(
            coerce_value(InputKind::Number, "NaN".into()),
            FieldValue::from("NaN")
        );
        assert_eq!(
            coerce_value(InputKind::Text, "42".into()),
            FieldValue::from("42")
        );
    }

    #[test]
    fn data_omits_unset_and_empty_fields() {
        let mut state = FormState::default();
        state.fields.insert(
            "a".into(),
            FieldState {
                value: Some("x".into()),
                ..FieldState::default()
            },
        );
        state.fields.insert("b".into(), FieldState::default());
        for (name, value) in [("c", "".into()), ("d", FieldValue::List(Vec::new()))] {
            state.fields.insert(
                name.into(),
                FieldState {
                    value: Some(value),
                    ..FieldState::default()
                },
            );
        }
        state.fields.insert(
            "e".into(),
            FieldState {
                value: Some(false.into()),
                ..FieldState::default()
            },
        );
        let data = state.data();
        assert_eq!(data.len(), 2);
        assert_eq!(data.get("a"), Some(&FieldValue::from("x")));
        assert_eq!(data.get("e"), Some(&FieldValue::from(false)));
    }
}
