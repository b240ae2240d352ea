#![doc(test(attr(deny(warnings))))]

//! Form Core loads, migrates and fills note forms: form definitions are
//! validated, brought up to the current version, bound to a reactive session
//! engine and rendered into notes through templates.

pub mod cli;
pub mod errors;
pub mod utils;

use std::sync::Once;

static INIT_TRACING: Once = Once::new();

/// Initializes global tracing and emits a startup info log.
pub fn init() {
    INIT_TRACING.call_once(|| {
        utils::init_tracing();
        tracing::info!("Form Core tracing initialized.");
    });
}
