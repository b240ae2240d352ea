//! mform-domain
//!
//! Pure data types for user-authored forms: input kinds, fields, conditions,
//! versioned form definitions, submitted values and parsed templates.
//! No validation, no I/O. Those live in mform-core and mform-config.

pub mod common;
pub mod field;
pub mod form;
pub mod input;
pub mod template;
pub mod value;

pub use common::*;
pub use field::*;
pub use form::*;
pub use input::*;
pub use template::*;
pub use value::*;
