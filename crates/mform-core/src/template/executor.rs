use mform_domain::{FormData, FormDefinition, ParsedTemplate, TemplateToken};

use crate::frontmatter::frontmatter_block;
use crate::select::select_keys;

/// Renders `template` against submitted data.
///
/// Variables missing from `data` render as an empty string.
pub fn execute_template(template: &ParsedTemplate, data: &FormData) -> String {
    let mut out = String::new();
    for token in template {
        match token {
            TemplateToken::Text { value } => out.push_str(value),
            TemplateToken::Variable {
                value,
                transformation,
            } => {
                let rendered = data.get(value).map(ToString::to_string).unwrap_or_default();
                match transformation {
                    Some(transformation) => out.push_str(&transformation.apply(&rendered)),
                    None => out.push_str(&rendered),
                }
            }
            TemplateToken::FrontmatterCommand { pick, omit } => {
                out.push_str(&frontmatter_block(&select_keys(data, pick, omit)));
            }
        }
    }
    out
}

/// Note body for a form that declares a template, `None` otherwise.
pub fn render_note_body(form: &FormDefinition, data: &FormData) -> Option<String> {
    form.template
        .as_ref()
        .map(|template| execute_template(&template.parsed_template, data))
}
