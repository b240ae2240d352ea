//! Parsed note templates.

use std::fmt;

use serde::{Deserialize, Serialize};

/// One segment of a parsed template.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "tag", rename_all = "kebab-case")]
pub enum TemplateToken {
    Text {
        value: String,
    },
    Variable {
        value: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        transformation: Option<Transformation>,
    },
    FrontmatterCommand {
        #[serde(default)]
        pick: Vec<String>,
        #[serde(default)]
        omit: Vec<String>,
    },
}

impl TemplateToken {
    pub fn text(value: impl Into<String>) -> Self {
        TemplateToken::Text {
            value: value.into(),
        }
    }

    pub fn variable(name: impl Into<String>) -> Self {
        TemplateToken::Variable {
            value: name.into(),
            transformation: None,
        }
    }

    pub fn frontmatter(pick: Vec<String>, omit: Vec<String>) -> Self {
        TemplateToken::FrontmatterCommand { pick, omit }
    }
}

/// String transformation applied to a variable when it is rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Transformation {
    Upper,
    Lower,
    Trim,
}

impl Transformation {
    pub const ALL: [Transformation; 3] = [
        Transformation::Upper,
        Transformation::Lower,
        Transformation::Trim,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Transformation::Upper => "upper",
            Transformation::Lower => "lower",
            Transformation::Trim => "trim",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|item| item.as_str() == name)
    }

    pub fn apply(self, input: &str) -> String {
        match self {
            Transformation::Upper => input.to_uppercase(),
            Transformation::Lower => input.to_lowercase(),
            Transformation::Trim => input.trim().to_string(),
        }
    }
}

impl fmt::Display for Transformation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Ordered token list; immutable once parsed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ParsedTemplate(Vec<TemplateToken>);

impl ParsedTemplate {
    pub fn new(tokens: Vec<TemplateToken>) -> Self {
        Self(tokens)
    }

    pub fn tokens(&self) -> &[TemplateToken] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn into_tokens(self) -> Vec<TemplateToken> {
        self.0
    }
}

impl From<Vec<TemplateToken>> for ParsedTemplate {
    fn from(tokens: Vec<TemplateToken>) -> Self {
        Self(tokens)
    }
}

impl<'a> IntoIterator for &'a ParsedTemplate {
    type Item = &'a TemplateToken;
    type IntoIter = std::slice::Iter<'a, TemplateToken>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn tokens_use_kebab_case_tags() {
        let template = ParsedTemplate::new(vec![
            TemplateToken::text("Hi "),
            TemplateToken::variable("name"),
            TemplateToken::frontmatter(vec!["name".into()], Vec::new()),
        ]);
        assert_eq!(
            serde_json::to_value(&template).unwrap(),
            json!([
                { "tag": "text", "value": "Hi " },
                { "tag": "variable", "value": "name" },
                { "tag": "frontmatter-command", "pick": ["name"], "omit": [] }
            ])
        );
    }

    #[test]
    fn transformations_apply() {
        assert_eq!(Transformation::Upper.apply("abc"), "ABC");
        assert_eq!(Transformation::Lower.apply("AbC"), "abc");
        assert_eq!(Transformation::Trim.apply("  x "), "x");
        assert_eq!(Transformation::from_name("shout"), None);
    }
}
