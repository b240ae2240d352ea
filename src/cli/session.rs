use std::cell::RefCell;
use std::rc::Rc;

use tracing::{debug, info};

use mform_core::{EngineOptions, FieldHandle, FormEngine, FormResult};
use mform_domain::{
    format_number, FieldValue, FormData, FormDefinition, InputDefinition, MultiselectInput,
    SelectInput,
};

use crate::cli::output;
use crate::cli::prompt::{FieldPrompter, PromptContext, PromptResponse};
use crate::errors::{FormCoreError, FormCoreResult};

const TRUE_WORDS: [&str; 5] = ["y", "yes", "true", "1", "on"];
const FALSE_WORDS: [&str; 5] = ["n", "no", "false", "0", "off"];

/// Walks a form field by field until it is submitted or cancelled.
///
/// Every answer is written through the field's value cell, so visibility of
/// later fields follows what was typed. Fields hidden by their condition are
/// skipped. When a submit fails, only the fields whose rule failed are asked
/// again.
pub fn run_form<P: FieldPrompter>(
    form: &FormDefinition,
    defaults: FormData,
    prompter: &mut P,
) -> FormCoreResult<FormResult> {
    let outcome: Rc<RefCell<Option<FormResult>>> = Rc::new(RefCell::new(None));
    let submitted = Rc::clone(&outcome);
    let cancelled = Rc::clone(&outcome);
    let options = EngineOptions::new()
        .form_name(form.name.clone())
        .default_values(defaults)
        .on_submit(move |data| *submitted.borrow_mut() = Some(FormResult::ok(data)))
        .on_cancel(move || *cancelled.borrow_mut() = Some(FormResult::cancelled()));
    let (engine, fields) = FormEngine::for_form(form, options);
    info!(form = %form.name, session = %engine.session_id(), "filling form");

    let total = fields.len();
    let mut retry = false;
    loop {
        let mut asked = 0;
        for (index, handle) in fields.iter().enumerate() {
            if let InputDefinition::DocumentBlock(block) = &handle.definition.input {
                if !retry {
                    output::info(&block.body);
                }
                continue;
            }
            match handle.is_visible.get() {
                Ok(true) => {}
                Ok(false) => continue,
                Err(message) => {
                    output::warning(message);
                    continue;
                }
            }
            let errors = handle.errors.get();
            if retry && errors.is_empty() {
                continue;
            }
            asked += 1;
            if !ask_field(prompter, handle, &errors, index, total)? {
                engine.trigger_cancel();
                return Ok(take_outcome(&outcome));
            }
        }

        if retry && asked == 0 {
            return Err(FormCoreError::Message(format!(
                "Form \"{}\" cannot be submitted: a required field is hidden",
                form.name
            )));
        }

        let summary: Vec<String> = engine
            .values()
            .iter()
            .map(|(name, value)| format!("{name}: {value}"))
            .collect();
        if !prompter.confirm(&summary)? {
            engine.trigger_cancel();
            return Ok(take_outcome(&outcome));
        }
        if engine.trigger_submit() {
            return Ok(take_outcome(&outcome));
        }

        for handle in &fields {
            for error in handle.errors.get() {
                output::warning(error);
            }
        }
        debug!(form = %form.name, "submit rejected, asking failed fields again");
        retry = true;
    }
}

fn take_outcome(outcome: &Rc<RefCell<Option<FormResult>>>) -> FormResult {
    outcome
        .borrow_mut()
        .take()
        .unwrap_or_else(FormResult::cancelled)
}

/// Returns `false` when the user abandoned the form.
fn ask_field<P: FieldPrompter>(
    prompter: &mut P,
    handle: &FieldHandle,
    errors: &[String],
    index: usize,
    total: usize,
) -> FormCoreResult<bool> {
    loop {
        let current = handle.value.get();
        let context = PromptContext {
            field: &handle.definition,
            current: current.as_ref(),
            errors,
            index,
            total,
        };
        let parsed = match prompter.prompt_field(&context)? {
            PromptResponse::Cancel => return Ok(false),
            PromptResponse::Skip => return Ok(true),
            PromptResponse::Value(raw) => parse_text(&handle.definition.input, &raw),
            PromptResponse::Items(items) => parse_items(&handle.definition.input, items),
        };
        match parsed {
            Ok(value) => {
                handle.value.set(value);
                return Ok(true);
            }
            Err(reason) => prompter.reject(&context, &reason),
        }
    }
}

/// Turns a typed answer into the value stored for `input`.
pub fn parse_text(input: &InputDefinition, raw: &str) -> Result<FieldValue, String> {
    if input.kind().is_list() {
        return parse_items(input, split_items(raw));
    }
    match input {
        InputDefinition::Toggle(_) => parse_flag(raw)
            .map(FieldValue::Bool)
            .ok_or_else(|| "expected yes or no".to_string()),
        InputDefinition::Number(_) => parse_number(raw).map(FieldValue::Number),
        InputDefinition::Slider(slider) => {
            let number = parse_number(raw)?;
            let (low, high) = (slider.min.min(slider.max), slider.min.max(slider.max));
            if number < low || number > high {
                return Err(format!(
                    "expected a number between {} and {}",
                    format_number(slider.min),
                    format_number(slider.max)
                ));
            }
            Ok(FieldValue::Number(number))
        }
        InputDefinition::Select(SelectInput::Fixed { options }) if !options.is_empty() => {
            let wanted = raw.trim();
            options
                .iter()
                .find(|option| {
                    option.value == wanted || option.display().eq_ignore_ascii_case(wanted)
                })
                .map(|option| FieldValue::Text(option.value.clone()))
                .ok_or_else(|| {
                    let choices: Vec<&str> =
                        options.iter().map(|option| option.value.as_str()).collect();
                    format!("expected one of: {}", choices.join(", "))
                })
        }
        _ => Ok(FieldValue::Text(raw.to_string())),
    }
}

fn parse_items(input: &InputDefinition, items: Vec<String>) -> Result<FieldValue, String> {
    if let InputDefinition::Multiselect(MultiselectInput::Fixed {
        multi_select_options,
        allow_unknown_values: false,
    }) = input
    {
        if let Some(unknown) = items
            .iter()
            .find(|item| !multi_select_options.contains(item))
        {
            return Err(format!("unknown option \"{unknown}\""));
        }
    }
    if input.kind().is_list() {
        Ok(FieldValue::List(items))
    } else {
        Ok(FieldValue::Text(items.join(",")))
    }
}

fn split_items(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}

fn parse_flag(raw: &str) -> Option<bool> {
    let word = raw.trim().to_ascii_lowercase();
    if TRUE_WORDS.contains(&word.as_str()) {
        Some(true)
    } else if FALSE_WORDS.contains(&word.as_str()) {
        Some(false)
    } else {
        None
    }
}

fn parse_number(raw: &str) -> Result<f64, String> {
    match raw.trim().parse::<f64>() {
        Ok(number) if number.is_finite() => Ok(number),
        _ => Err(format!("\"{}\" is not a number", raw.trim())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;
    use std::io;

    use mform_domain::{
        BasicInput, Condition, ConditionPredicate, FieldDefinition, SelectOption, SliderInput,
    };

    struct MockPrompter {
        responses: VecDeque<PromptResponse>,
        asked: Vec<String>,
        rejections: Vec<String>,
        confirm: bool,
        terminal_gone: bool,
    }

    impl MockPrompter {
        fn new(responses: Vec<PromptResponse>) -> Self {
            Self {
                responses: responses.into(),
                asked: Vec::new(),
                rejections: Vec::new(),
                confirm: true,
                terminal_gone: false,
            }
        }
    }

    impl FieldPrompter for MockPrompter {
        fn prompt_field(&mut self, context: &PromptContext<'_>) -> FormCoreResult<PromptResponse> {
            self.asked.push(context.field.name.clone());
            if self.terminal_gone {
                return Err(io::Error::new(io::ErrorKind::NotConnected, "not a terminal").into());
            }
            Ok(self.responses.pop_front().unwrap_or(PromptResponse::Cancel))
        }

        fn reject(&mut self, _context: &PromptContext<'_>, reason: &str) {
            self.rejections.push(reason.to_string());
        }

        fn confirm(&mut self, _summary: &[String]) -> FormCoreResult<bool> {
            Ok(self.confirm)
        }
    }

    fn value(raw: &str) -> PromptResponse {
        PromptResponse::Value(raw.to_string())
    }

    fn book_form() -> FormDefinition {
        FormDefinition::new(
            "book",
            "Book",
            vec![
                FieldDefinition::new("title", InputDefinition::Text(BasicInput::default()))
                    .with_label("Title")
                    .required(),
                FieldDefinition::new("finished", InputDefinition::Toggle(BasicInput::default())),
                FieldDefinition::new("review", InputDefinition::Textarea(BasicInput::default()))
                    .with_condition(Condition::new(
                        "finished",
                        ConditionPredicate::Boolean { value: true },
                    )),
            ],
        )
    }

    #[test]
    fn answers_flow_through_conditions() {
        let mut prompter = MockPrompter::new(vec![value("Dune"), value("yes"), value("Great")]);
        let result = run_form(&book_form(), FormData::new(), &mut prompter).unwrap();
        assert!(result.is_ok());
        assert_eq!(result.get("finished"), Some(&FieldValue::Bool(true)));
        assert_eq!(result.get("review"), Some(&FieldValue::from("Great")));
        assert_eq!(prompter.asked, vec!["title", "finished", "review"]);
    }

    #[test]
    fn hidden_fields_are_not_asked() {
        let mut prompter = MockPrompter::new(vec![value("Dune"), value("no")]);
        let result = run_form(&book_form(), FormData::new(), &mut prompter).unwrap();
        assert!(result.is_ok());
        assert_eq!(prompter.asked, vec!["title", "finished"]);
        assert_eq!(result.get("review"), None);
    }

    #[test]
    fn failed_required_field_is_asked_again() {
        let mut prompter = MockPrompter::new(vec![
            PromptResponse::Skip,
            value("no"),
            value("Dune"),
        ]);
        let result = run_form(&book_form(), FormData::new(), &mut prompter).unwrap();
        assert!(result.is_ok());
        assert_eq!(prompter.asked, vec!["title", "finished", "title"]);
        assert_eq!(result.get("title"), Some(&FieldValue::from("Dune")));
    }

    #[test]
    fn bad_answers_are_rejected_in_place() {
        let form = FormDefinition::new(
            "rating",
            "Rating",
            vec![FieldDefinition::new(
                "score",
                InputDefinition::Slider(SliderInput { min: 1.0, max: 5.0 }),
            )],
        );
        let mut prompter = MockPrompter::new(vec![value("lots"), value("9"), value("4")]);
        let result = run_form(&form, FormData::new(), &mut prompter).unwrap();
        assert_eq!(result.get("score"), Some(&FieldValue::Number(4.0)));
        assert_eq!(
            prompter.rejections,
            vec![
                "\"lots\" is not a number".to_string(),
                "expected a number between 1 and 5".to_string()
            ]
        );
    }

    #[test]
    fn cancel_and_declined_review_both_cancel() {
        let mut prompter = MockPrompter::new(vec![PromptResponse::Cancel]);
        let result = run_form(&book_form(), FormData::new(), &mut prompter).unwrap();
        assert_eq!(result, FormResult::cancelled());

        let mut prompter = MockPrompter::new(vec![value("Dune"), value("no")]);
        prompter.confirm = false;
        let result = run_form(&book_form(), FormData::new(), &mut prompter).unwrap();
        assert_eq!(result, FormResult::cancelled());
    }

    #[test]
    fn prompt_failures_are_errors_not_cancellations() {
        let mut prompter = MockPrompter::new(Vec::new());
        prompter.terminal_gone = true;
        let err = run_form(&book_form(), FormData::new(), &mut prompter).unwrap_err();
        assert!(matches!(err, FormCoreError::Io(_)), "{err:?}");
        assert_eq!(prompter.asked, vec!["title"]);
    }

    #[test]
    fn defaults_prefill_the_session() {
        let defaults: FormData = [("title".to_string(), FieldValue::from("Dune"))].into();
        let mut prompter = MockPrompter::new(vec![PromptResponse::Skip, value("no")]);
        let result = run_form(&book_form(), defaults, &mut prompter).unwrap();
        assert_eq!(result.get("title"), Some(&FieldValue::from("Dune")));
    }

    #[test]
    fn select_and_list_answers_are_typed() {
        let select = InputDefinition::Select(SelectInput::Fixed {
            options: vec![SelectOption::new("tea", "Green tea"), SelectOption::new("coffee", "")],
        });
        assert_eq!(parse_text(&select, "green TEA"), Ok(FieldValue::from("tea")));
        assert_eq!(parse_text(&select, "coffee"), Ok(FieldValue::from("coffee")));
        assert_eq!(
            parse_text(&select, "milk"),
            Err("expected one of: tea, coffee".to_string())
        );

        let multi = InputDefinition::Multiselect(MultiselectInput::Fixed {
            multi_select_options: vec!["a".into(), "b".into()],
            allow_unknown_values: false,
        });
        assert_eq!(
            parse_text(&multi, " a, b ,"),
            Ok(FieldValue::List(vec!["a".into(), "b".into()]))
        );
        assert_eq!(parse_text(&multi, "c"), Err("unknown option \"c\"".to_string()));

        let tags = InputDefinition::Tag(Default::default());
        assert_eq!(
            parse_text(&tags, "x,y"),
            Ok(FieldValue::List(vec!["x".into(), "y".into()]))
        );
        assert_eq!(
            parse_text(&InputDefinition::Toggle(BasicInput::default()), "maybe"),
            Err("expected yes or no".to_string())
        );
    }
}
