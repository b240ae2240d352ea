use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

#[derive(Parser, Debug, Clone)]
#[command(name = "form_core_cli", version, about = "Fill and render note forms")]
pub struct Cli {
    /// Disable colored output.
    #[arg(long, global = true)]
    pub plain: bool,

    /// Only print warnings and errors.
    #[arg(long, short, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Load a settings file and report the state of every form.
    Check {
        /// Settings file (JSON).
        settings: PathBuf,

        /// Back up the file, then save the migrated forms.
        #[arg(long)]
        write: bool,
    },

    /// Fill a form interactively and print the result.
    Fill {
        settings: PathBuf,

        /// Form name.
        form: String,

        #[arg(long, value_enum, default_value_t = OutputFormat::Template)]
        format: OutputFormat,

        /// JSON object of initial values.
        #[arg(long)]
        defaults: Option<PathBuf>,
    },

    /// Render a form's template against a JSON data file.
    Render {
        settings: PathBuf,
        form: String,
        data: PathBuf,
    },

    /// Parse a template and print its tokens.
    Template {
        /// Template text, or `@path` to read it from a file.
        source: String,

        /// Settings file and form name to cross-check variables against.
        #[arg(long, requires = "form")]
        settings: Option<PathBuf>,

        #[arg(long)]
        form: Option<String>,
    },

    /// Create a settings file holding the example form.
    Init {
        /// Defaults to the per-user config location.
        path: Option<PathBuf>,

        /// Replace an existing file (a backup is taken first).
        #[arg(long)]
        force: bool,
    },
}

/// How `fill` prints a submitted form.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Frontmatter,
    Dataview,
    Bullets,
    Json,
    /// The form's own template, frontmatter when it has none.
    Template,
}
