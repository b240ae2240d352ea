//! mform-config
//!
//! Persisted plugin settings: the editor position and the collection of form
//! definitions. Loading runs every form through the migration engine;
//! saving is atomic and backups are timestamped.

pub mod error;
pub mod manager;
pub mod model;

pub use error::ConfigError;
pub use manager::{migrate_settings, ConfigManager, LoadReport};
pub use model::{EditorPosition, Settings};
