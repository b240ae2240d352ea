use thiserror::Error;

use mform_config::ConfigError;
use mform_core::TemplateParseError;

/// Error type surfaced by the CLI front end.
#[derive(Debug, Error)]
pub enum FormCoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
    #[error("Settings error: {0}")]
    Config(#[from] ConfigError),
    #[error("Template error: {0}")]
    Template(#[from] TemplateParseError),
    #[error("Prompt error: {0}")]
    Prompt(#[from] dialoguer::Error),
    #[error("Unknown form \"{0}\"")]
    UnknownForm(String),
    #[error("Form \"{name}\" needs a manual fix before it can be used")]
    BrokenForm { name: String },
    #[error("Form \"{0}\" has no template")]
    MissingTemplate(String),
    #[error("{0}")]
    Message(String),
}

pub type FormCoreResult<T> = Result<T, FormCoreError>;
