use std::fs;
use std::path::{Path, PathBuf};

use tracing::info;

use mform_config::{ConfigManager, LoadReport, Settings};
use mform_core::{
    parse_template, render_note_body, template_source, unknown_template_variables, FormOrError,
    FormResult,
};
use mform_domain::{Displayable, FormData, FormDefinition, FormVersion};

use crate::cli::args::OutputFormat;
use crate::cli::output;
use crate::cli::prompt::FieldPrompter;
use crate::cli::session::run_form;
use crate::errors::{FormCoreError, FormCoreResult};

const MIGRATION_BACKUP_NOTE: &str = "before migration";
const INIT_BACKUP_NOTE: &str = "before init";

/// Reports every form of a settings file; with `write`, saves the migrated
/// collection after backing up the original.
pub fn check(settings: &Path, write: bool) -> FormCoreResult<()> {
    let manager = existing_settings(settings)?;
    let report = manager.load()?;

    output::section(format!("Forms in {}", settings.display()));
    for entry in &report.settings.form_definitions {
        match entry {
            FormOrError::Form(form) if report.migrated.contains(&form.name) => {
                output::success(format!(
                    "{}: migrated to version {}",
                    form.display_label(),
                    FormVersion::CURRENT.as_str()
                ))
            }
            FormOrError::Form(form) => {
                output::success(format!("{}: ok", form.display_label()))
            }
            FormOrError::MigrationError(error) => output::warning(error),
        }
    }
    for invalid in &report.invalid {
        output::error(invalid);
    }

    let usable = report.settings.forms().count();
    let broken = report.broken_forms().count();
    output::info(format!(
        "{usable} usable, {broken} need a manual fix, {} invalid",
        report.invalid.len()
    ));

    if !report.needs_migration {
        return Ok(());
    }
    if write {
        let backup = manager.backup(Some(MIGRATION_BACKUP_NOTE))?;
        manager.save(&report.settings)?;
        output::success(format!("Saved migrated settings (backup {backup})."));
    } else {
        output::info("Run again with --write to save the migrated forms.");
    }
    Ok(())
}

/// Runs an interactive session for `form_name` and prints the result.
pub fn fill<P: FieldPrompter>(
    settings: &Path,
    form_name: &str,
    format: OutputFormat,
    defaults: Option<&Path>,
    prompter: &mut P,
) -> FormCoreResult<()> {
    let form = load_form(settings, form_name)?;
    let defaults = match defaults {
        Some(path) => read_data(path)?,
        None => FormData::new(),
    };

    let result = run_form(&form, defaults, prompter)?;
    if !result.is_ok() {
        output::warning(format!("Form \"{}\" was cancelled.", form.name));
        return Ok(());
    }
    info!(form = %form.name, fields = result.data.len(), "form submitted");
    output::document(&format_result(&form, &result, format)?);
    Ok(())
}

pub fn format_result(
    form: &FormDefinition,
    result: &FormResult,
    format: OutputFormat,
) -> FormCoreResult<String> {
    let text = match format {
        OutputFormat::Frontmatter => result.as_frontmatter_string(),
        OutputFormat::Dataview => result.as_dataview_properties(),
        OutputFormat::Bullets => result.as_bullet_list(),
        OutputFormat::Json => serde_json::to_string_pretty(result)?,
        OutputFormat::Template => render_note_body(form, &result.data)
            .unwrap_or_else(|| result.as_frontmatter_string()),
    };
    Ok(text)
}

/// Renders the form's template against a JSON object of values.
pub fn render(settings: &Path, form_name: &str, data: &Path) -> FormCoreResult<()> {
    let form = load_form(settings, form_name)?;
    let data = read_data(data)?;
    let body = render_note_body(&form, &data)
        .ok_or_else(|| FormCoreError::MissingTemplate(form.name.clone()))?;
    output::document(&body);
    Ok(())
}

/// Parses a template and prints its tokens as JSON.
///
/// With a form, variables that no field of the form provides are reported.
pub fn template(source: &str, form: Option<(&Path, &str)>) -> FormCoreResult<()> {
    let text = match source.strip_prefix('@') {
        Some(path) => fs::read_to_string(path)?,
        None => source.to_string(),
    };
    let parsed = parse_template(&text)?;
    output::document(&serde_json::to_string_pretty(&parsed)?);
    output::info(format!("Normalized: {:?}", template_source(&parsed)));

    if let Some((settings, form_name)) = form {
        let form = load_form(settings, form_name)?;
        let unknown = unknown_template_variables(&parsed, &form.fields);
        if unknown.is_empty() {
            output::success(format!("Every variable is a field of \"{}\".", form.name));
        } else {
            output::warning(format!(
                "Not fields of \"{}\": {}",
                form.name,
                unknown.join(", ")
            ));
        }
    }
    Ok(())
}

/// Writes settings holding the example form.
pub fn init(path: Option<PathBuf>, force: bool) -> FormCoreResult<()> {
    let manager = match path {
        Some(path) => ConfigManager::for_file(path),
        None => ConfigManager::default_location()?,
    };
    if manager.exists() {
        if !force {
            return Err(FormCoreError::Message(format!(
                "{} already exists; pass --force to replace it",
                manager.settings_path().display()
            )));
        }
        let backup = manager.backup(Some(INIT_BACKUP_NOTE))?;
        output::info(format!("Backed up the previous settings to {backup}."));
    }
    manager.save(&Settings::with_example())?;
    output::success(format!(
        "Created {} with the example form.",
        manager.settings_path().display()
    ));
    Ok(())
}

fn existing_settings(path: &Path) -> FormCoreResult<ConfigManager> {
    let manager = ConfigManager::for_file(path.to_path_buf());
    if !manager.exists() {
        return Err(FormCoreError::Message(format!(
            "No settings file at {}",
            path.display()
        )));
    }
    Ok(manager)
}

fn load_settings(path: &Path) -> FormCoreResult<LoadReport> {
    let report = existing_settings(path)?.load()?;
    if report.needs_migration {
        output::warning(format!(
            "{} holds forms that need migrating; run `check --write`.",
            path.display()
        ));
    }
    Ok(report)
}

fn load_form(settings: &Path, name: &str) -> FormCoreResult<FormDefinition> {
    let report = load_settings(settings)?;
    match report
        .settings
        .form_definitions
        .into_iter()
        .find(|entry| entry.name() == name)
    {
        Some(FormOrError::Form(form)) => Ok(form),
        Some(FormOrError::MigrationError(_)) => Err(FormCoreError::BrokenForm {
            name: name.to_string(),
        }),
        None => Err(FormCoreError::UnknownForm(name.to_string())),
    }
}

fn read_data(path: &Path) -> FormCoreResult<FormData> {
    let text = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&text)?)
}
