pub mod args;
pub mod commands;
pub mod output;
pub mod prompt;
pub mod session;

use std::io;

use clap::Parser;

use crate::errors::FormCoreResult;
use args::{Cli, Command};
use output::OutputPreferences;
use prompt::{DialoguerPrompter, ScriptPrompter};

/// Answers are read line by line from stdin when this variable is set.
pub const SCRIPT_ENV: &str = "FORM_CORE_CLI_SCRIPT";

pub fn run_cli() -> FormCoreResult<()> {
    run(Cli::parse())
}

pub fn run(cli: Cli) -> FormCoreResult<()> {
    output::set_preferences(OutputPreferences {
        plain: cli.plain,
        quiet: cli.quiet,
    });

    match cli.command {
        Command::Check { settings, write } => commands::check(&settings, write),
        Command::Fill {
            settings,
            form,
            format,
            defaults,
        } => {
            let defaults = defaults.as_deref();
            if std::env::var_os(SCRIPT_ENV).is_some() {
                let mut prompter = ScriptPrompter::new(io::stdin().lock());
                commands::fill(&settings, &form, format, defaults, &mut prompter)
            } else {
                let mut prompter = DialoguerPrompter::new();
                commands::fill(&settings, &form, format, defaults, &mut prompter)
            }
        }
        Command::Render {
            settings,
            form,
            data,
        } => commands::render(&settings, &form, &data),
        Command::Template {
            source,
            settings,
            form,
        } => {
            commands::template(&source, settings.as_deref().zip(form.as_deref()))
        }
        Command::Init { path, force } => commands::init(path, force),
    }
}
