//! YAML frontmatter rendering of submitted form data.

use std::fmt::Display;

use serde::Serialize;

use mform_domain::{FieldValue, FormData};

/// Renders `data` as a `---` delimited YAML block, one key per line.
///
/// Lists become block sequences indented under their key; an empty list is
/// written as `[]`.
pub fn frontmatter_block(data: &FormData) -> String {
    let mut out = String::from("---\n");
    out.push_str(&yaml_lines(data));
    out.push_str("---\n");
    out
}

/// The body of [`frontmatter_block`] without the delimiters.
pub fn yaml_lines(data: &FormData) -> String {
    let mut out = String::new();
    for (key, value) in data {
        out.push_str(&yaml_scalar(key, key));
        match value {
            FieldValue::List(items) if items.is_empty() => out.push_str(": []\n"),
            FieldValue::List(items) => {
                out.push_str(":\n");
                for item in items {
                    out.push_str("  - ");
                    out.push_str(&indent_continuation(&yaml_scalar(item, item), "    "));
                    out.push('\n');
                }
            }
            scalar => {
                out.push_str(": ");
                out.push_str(&yaml_scalar(scalar, scalar));
                out.push('\n');
            }
        }
    }
    out
}

fn yaml_scalar<T: Serialize + ?Sized>(value: &T, fallback: &dyn Display) -> String {
    match serde_yaml::to_string(value) {
        Ok(text) => text.trim_end().to_string(),
        Err(err) => {
            tracing::warn!(%err, "falling back to plain text in frontmatter");
            fallback.to_string()
        }
    }
}

fn indent_continuation(text: &str, indent: &str) -> String {
    text.lines()
        .enumerate()
        .map(|(index, line)| {
            if index == 0 || line.is_empty() {
                line.to_string()
            } else {
                format!("{indent}{line}")
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scalars_and_lists() {
        let data: FormData = [
            ("name".to_string(), FieldValue::from("John")),
            ("age".to_string(), FieldValue::from(18)),
            ("price".to_string(), FieldValue::from(19.99)),
            ("done".to_string(), FieldValue::from(false)),
            ("tags".to_string(), FieldValue::from(vec!["a", "b"])),
            ("empty".to_string(), FieldValue::List(Vec::new())),
        ]
        .into();
        insta::assert_snapshot!(frontmatter_block(&data), @r###"
        ---
        age: 18
        done: false
        empty: []
        name: John
        price: 19.99
        tags:
          - a
          - b
        ---
        "###);
    }

    #[test]
    fn ambiguous_strings_are_quoted() {
        let data: FormData = [("answer".to_string(), FieldValue::from("true"))].into();
        assert_eq!(frontmatter_block(&data), "---\nanswer: 'true'\n---\n");
    }

    #[test]
    fn empty_data_is_just_delimiters() {
        assert_eq!(frontmatter_block(&FormData::new()), "---\n---\n");
    }
}
