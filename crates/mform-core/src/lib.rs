//! mform-core
//!
//! Form schema validation and migration, visibility conditions, the runtime
//! form engine, and the note template parser/executor.
//! Depends on mform-domain. No terminal I/O, no file access.

pub mod condition;
pub mod engine;
pub mod example;
pub mod frontmatter;
pub mod migration;
pub mod result;
pub mod schema;
pub mod select;
pub mod template;

pub use condition::{
    available_conditions_for_input, available_conditions_for_kind, value_meets_condition,
};
pub use engine::{
    Derived, EngineOptions, FieldHandle, FieldRule, FieldState, FormEngine, FormState,
    FormStatus, Subscription, ValueCell, Visibility,
};
pub use frontmatter::frontmatter_block;
pub use example::example_form;
pub use migration::{
    find_form, form_needs_migration, migrate_to_latest, valid_forms, FormDefinitionBasic,
    FormOrError, InvalidData, MigrationError,
};
pub use result::{FormResult, ResultStatus};
pub use schema::{
    parse_form_v1, parse_template_block, validate_field, validate_fields, validate_input,
    FieldError, InputError, SchemaError, ValidationIssue,
};
pub use select::select_keys;
pub use template::{
    execute_template, parse_template, render_note_body, template_source, template_variables,
    unknown_template_variables, TemplateErrorKind, TemplateParseError,
};

#[cfg(test)]
mod tests;
