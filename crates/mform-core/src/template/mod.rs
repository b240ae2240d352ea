//! Note templates: parsing, rendering and cross-checks against a form.

mod executor;
mod parser;

use mform_domain::{FieldDefinition, ParsedTemplate, TemplateToken};

pub use executor::{execute_template, render_note_body};
pub use parser::{parse_template, TemplateErrorKind, TemplateParseError};

/// Rebuilds editable source text from parsed tokens.
///
/// Parsing the result yields the same tokens, unless a text token itself
/// contains `{{` or `{#`.
pub fn template_source(template: &ParsedTemplate) -> String {
    let mut out = String::new();
    for token in template {
        match token {
            TemplateToken::Text { value } => out.push_str(value),
            TemplateToken::Variable {
                value,
                transformation: Some(transformation),
            } => out.push_str(&format!("{{{{ {value} | {transformation} }}}}")),
            TemplateToken::Variable { value, .. } => out.push_str(&format!("{{{{{value}}}}}")),
            TemplateToken::FrontmatterCommand { pick, omit } => {
                out.push_str("{# frontmatter");
                if !pick.is_empty() {
                    out.push_str(" pick: ");
                    out.push_str(&pick.join(", "));
                }
                if !omit.is_empty() {
                    out.push_str(" omit: ");
                    out.push_str(&omit.join(", "));
                }
                out.push_str(" #}");
            }
        }
    }
    out
}

/// Every name the template reads (variables and frontmatter keys), in order
/// of first appearance.
pub fn template_variables(template: &ParsedTemplate) -> Vec<&str> {
    let mut names: Vec<&str> = Vec::new();
    for token in template {
        let referenced: Vec<&str> = match token {
            TemplateToken::Text { .. } => Vec::new(),
            TemplateToken::Variable { value, .. } => vec![value.as_str()],
            TemplateToken::FrontmatterCommand { pick, omit } => {
                pick.iter().chain(omit).map(String::as_str).collect()
            }
        };
        for name in referenced {
            if !names.contains(&name) {
                names.push(name);
            }
        }
    }
    names
}

/// Names the template reads that no field provides.
pub fn unknown_template_variables<'a>(
    template: &'a ParsedTemplate,
    fields: &[FieldDefinition],
) -> Vec<&'a str> {
    template_variables(template)
        .into_iter()
        .filter(|name| !fields.iter().any(|field| field.name == *name))
        .collect()
}
