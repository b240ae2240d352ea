use std::io::BufRead;

use dialoguer::{theme::ColorfulTheme, Confirm, Input, MultiSelect, Select};

use mform_domain::{
    Displayable, FieldDefinition, FieldValue, InputDefinition, MultiselectInput, SelectInput,
};

use crate::cli::output;
use crate::errors::FormCoreResult;

/// Typed in place of an answer to abandon the form.
pub const CANCEL_KEYWORD: &str = ":cancel";

/// What the runner knows about the field being asked for.
pub struct PromptContext<'a> {
    pub field: &'a FieldDefinition,
    pub current: Option<&'a FieldValue>,
    /// Errors left by the last submit attempt.
    pub errors: &'a [String],
    pub index: usize,
    pub total: usize,
}

impl PromptContext<'_> {
    pub fn label(&self) -> String {
        let mut label = self.field.label_or_name().to_string();
        if self.field.is_required() {
            label.push_str(" *");
        }
        label
    }
}

/// Raw answer for one field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PromptResponse {
    Value(String),
    /// Answer from a multiple choice list.
    Items(Vec<String>),
    /// Leave the field as it is.
    Skip,
    /// Abandon the whole form.
    Cancel,
}

/// Terminal or I/O failures are errors; only the user abandoning the form
/// is a [`PromptResponse::Cancel`].
pub trait FieldPrompter {
    fn prompt_field(&mut self, context: &PromptContext<'_>) -> FormCoreResult<PromptResponse>;

    /// Shows a problem with the last answer before the field is asked again.
    fn reject(&mut self, context: &PromptContext<'_>, reason: &str);

    fn confirm(&mut self, summary: &[String]) -> FormCoreResult<bool>;
}

/// Prompts on the terminal with `dialoguer`.
pub struct DialoguerPrompter {
    theme: ColorfulTheme,
}

impl DialoguerPrompter {
    pub fn new() -> Self {
        Self {
            theme: ColorfulTheme::default(),
        }
    }

    fn text(&self, context: &PromptContext<'_>) -> FormCoreResult<PromptResponse> {
        let mut input = Input::<String>::with_theme(&self.theme)
            .with_prompt(context.label())
            .allow_empty(true);
        if let Some(current) = context.current {
            input = input.with_initial_text(current.to_string());
        }
        Ok(text_response(input.interact_text()?))
    }

    fn toggle(&self, context: &PromptContext<'_>) -> FormCoreResult<PromptResponse> {
        let current = context
            .current
            .and_then(FieldValue::as_bool)
            .unwrap_or(false);
        let answer = Confirm::with_theme(&self.theme)
            .with_prompt(context.label())
            .default(current)
            .interact_opt()?;
        Ok(match answer {
            Some(flag) => PromptResponse::Value(flag.to_string()),
            None => PromptResponse::Cancel,
        })
    }

    fn select(
        &self,
        context: &PromptContext<'_>,
        values: &[String],
        labels: &[String],
    ) -> FormCoreResult<PromptResponse> {
        let current = context.current.and_then(FieldValue::as_str);
        let default = current
            .and_then(|value| values.iter().position(|option| option == value))
            .unwrap_or(0);
        let chosen = Select::with_theme(&self.theme)
            .with_prompt(context.label())
            .items(labels)
            .default(default)
            .interact_opt()?;
        Ok(match chosen {
            Some(index) => values
                .get(index)
                .map(|value| PromptResponse::Value(value.clone()))
                .unwrap_or(PromptResponse::Skip),
            None => PromptResponse::Cancel,
        })
    }

    fn multiselect(
        &self,
        context: &PromptContext<'_>,
        options: &[String],
    ) -> FormCoreResult<PromptResponse> {
        let chosen = context.current.and_then(FieldValue::as_list).unwrap_or(&[]);
        let defaults: Vec<bool> = options
            .iter()
            .map(|option| chosen.contains(option))
            .collect();
        let picked = MultiSelect::with_theme(&self.theme)
            .with_prompt(context.label())
            .items(options)
            .defaults(&defaults)
            .interact_opt()?;
        Ok(match picked {
            Some(indexes) => PromptResponse::Items(
                indexes
                    .into_iter()
                    .filter_map(|index| options.get(index).cloned())
                    .collect(),
            ),
            None => PromptResponse::Cancel,
        })
    }
}

impl Default for DialoguerPrompter {
    fn default() -> Self {
        Self::new()
    }
}

impl FieldPrompter for DialoguerPrompter {
    fn prompt_field(&mut self, context: &PromptContext<'_>) -> FormCoreResult<PromptResponse> {
        if !context.field.description.trim().is_empty() {
            output::info(&context.field.description);
        }
        for error in context.errors {
            output::warning(error);
        }
        match &context.field.input {
            InputDefinition::Toggle(_) => self.toggle(context),
            InputDefinition::Select(SelectInput::Fixed { options }) if !options.is_empty() => {
                let values: Vec<String> =
                    options.iter().map(|option| option.value.clone()).collect();
                let labels: Vec<String> = options
                    .iter()
                    .map(|option| option.display().to_string())
                    .collect();
                self.select(context, &values, &labels)
            }
            InputDefinition::Multiselect(MultiselectInput::Fixed {
                multi_select_options,
                allow_unknown_values: false,
            }) if !multi_select_options.is_empty() => {
                self.multiselect(context, multi_select_options)
            }
            _ => self.text(context),
        }
    }

    fn reject(&mut self, context: &PromptContext<'_>, reason: &str) {
        output::warning(format!("{}: {reason}", context.field.display_label()));
    }

    fn confirm(&mut self, summary: &[String]) -> FormCoreResult<bool> {
        output::section("Review");
        for line in summary {
            output::info(line);
        }
        let answer = Confirm::with_theme(&self.theme)
            .with_prompt("Submit?")
            .default(true)
            .interact_opt()?;
        Ok(answer.unwrap_or(false))
    }
}

/// Reads one answer per line, for scripted runs and tests.
///
/// End of input cancels the form and read failures are errors. Nothing is
/// asked for confirmation.
pub struct ScriptPrompter<R> {
    input: R,
}

impl<R: BufRead> ScriptPrompter<R> {
    pub fn new(input: R) -> Self {
        Self { input }
    }
}

impl<R: BufRead> FieldPrompter for ScriptPrompter<R> {
    fn prompt_field(&mut self, context: &PromptContext<'_>) -> FormCoreResult<PromptResponse> {
        output::prompt(format!(
            "[{}/{}] {}",
            context.index + 1,
            context.total,
            context.label()
        ));
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(PromptResponse::Cancel);
        }
        Ok(text_response(
            line.trim_end_matches(['\r', '\n']).to_string(),
        ))
    }

    fn reject(&mut self, context: &PromptContext<'_>, reason: &str) {
        output::warning(format!("{}: {reason}", context.field.display_label()));
    }

    fn confirm(&mut self, _summary: &[String]) -> FormCoreResult<bool> {
        Ok(true)
    }
}

fn text_response(answer: String) -> PromptResponse {
    let trimmed = answer.trim();
    if trimmed == CANCEL_KEYWORD {
        PromptResponse::Cancel
    } else if trimmed.is_empty() {
        PromptResponse::Skip
    } else {
        PromptResponse::Value(answer)
    }
}
