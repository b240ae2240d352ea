use std::{
    cmp::Reverse,
    fs::{self, File},
    io::Write,
    path::{Path, PathBuf},
};

use chrono::{DateTime, Utc};
use serde_json::Value;
use tracing::{info, warn};

use mform_core::{form_needs_migration, migrate_to_latest, FormOrError, InvalidData};

use crate::model::RawSettings;
use crate::{ConfigError, Settings};

const APP_DIR: &str = "form_core";
const SETTINGS_FILE: &str = "settings.json";
const BACKUP_PREFIX: &str = "settings";
const BACKUP_EXTENSION: &str = "json";
const BACKUP_TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M";
const TMP_SUFFIX: &str = "tmp";

/// Outcome of loading a settings file.
#[derive(Debug, Clone, Default)]
pub struct LoadReport {
    pub settings: Settings,
    /// Entries that are not forms at all. They are left out of `settings`.
    pub invalid: Vec<InvalidData>,
    /// Names of forms brought up to the current version while loading.
    pub migrated: Vec<String>,
    /// Whether saving `settings` back would change the file.
    pub needs_migration: bool,
}

impl LoadReport {
    /// Forms kept as migration errors, waiting for a manual fix.
    pub fn broken_forms(&self) -> impl Iterator<Item = &FormOrError> {
        self.settings
            .form_definitions
            .iter()
            .filter(|entry| !entry.is_form())
    }
}

/// Loads, saves and backs up [`Settings`].
#[derive(Debug, Clone)]
pub struct ConfigManager {
    settings_path: PathBuf,
    backups_dir: PathBuf,
}

impl ConfigManager {
    pub fn new(settings_path: PathBuf, backups_dir: PathBuf) -> Self {
        Self {
            settings_path,
            backups_dir,
        }
    }

    /// `<base>/settings.json` with backups under `<base>/backups`.
    pub fn with_base_dir(base: PathBuf) -> Result<Self, ConfigError> {
        fs::create_dir_all(&base)?;
        let backups_dir = base.join("backups");
        let settings_path = base.join(SETTINGS_FILE);
        Ok(Self::new(settings_path, backups_dir))
    }

    /// Manager for an existing settings file; backups go next to it.
    pub fn for_file(settings_path: PathBuf) -> Self {
        let backups_dir = settings_path
            .parent()
            .map(|parent| parent.join("backups"))
            .unwrap_or_else(|| PathBuf::from("backups"));
        Self::new(settings_path, backups_dir)
    }

    /// The per-user location, under the platform config directory.
    pub fn default_location() -> Result<Self, ConfigError> {
        let base = dirs::config_dir()
            .or_else(dirs::home_dir)
            .unwrap_or_else(|| PathBuf::from("."));
        Self::with_base_dir(base.join(APP_DIR))
    }

    pub fn settings_path(&self) -> &Path {
        &self.settings_path
    }

    pub fn backups_dir(&self) -> &Path {
        &self.backups_dir
    }

    pub fn exists(&self) -> bool {
        self.settings_path.exists()
    }

    /// Reads the settings and migrates every form.
    ///
    /// A missing file yields default settings. One bad form never prevents
    /// its siblings from loading.
    pub fn load(&self) -> Result<LoadReport, ConfigError> {
        if !self.settings_path.exists() {
            return Ok(LoadReport::default());
        }
        let data = fs::read_to_string(&self.settings_path)?;
        let raw: Value = serde_json::from_str(&data)?;
        Ok(migrate_settings(raw)?)
    }

    pub fn save(&self, settings: &Settings) -> Result<(), ConfigError> {
        if let Some(parent) = self.settings_path.parent() {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(settings)?;
        let tmp = tmp_path(&self.settings_path);
        write_atomic(&tmp, &json)?;
        fs::rename(&tmp, &self.settings_path)?;
        info!(path = %self.settings_path.display(), "settings saved");
        Ok(())
    }

    /// Copies the current settings file, untouched, into the backups folder.
    pub fn backup(&self, note: Option<&str>) -> Result<String, ConfigError> {
        if !self.settings_path.exists() {
            return Err(ConfigError::Backup(format!(
                "no settings file at {}",
                self.settings_path.display()
            )));
        }
        fs::create_dir_all(&self.backups_dir)?;
        let timestamp = Utc::now().format(BACKUP_TIMESTAMP_FORMAT).to_string();
        let mut name = format!("{BACKUP_PREFIX}_{timestamp}");
        if let Some(label) = sanitize_note(note) {
            name.push('_');
            name.push_str(&label);
        }
        name.push_str(&format!(".{BACKUP_EXTENSION}"));

        let contents = fs::read_to_string(&self.settings_path)?;
        write_atomic(&self.backups_dir.join(&name), &contents)?;
        info!(backup = %name, "settings backed up");
        Ok(name)
    }

    /// Puts a backup back in place and loads it.
    pub fn restore(&self, backup_name: &str) -> Result<LoadReport, ConfigError> {
        let path = self.backups_dir.join(backup_name);
        if !path.exists() {
            return Err(ConfigError::Backup(format!(
                "settings backup `{backup_name}` not found"
            )));
        }
        let contents = fs::read_to_string(&path)?;
        let tmp = tmp_path(&self.settings_path);
        write_atomic(&tmp, &contents)?;
        fs::rename(&tmp, &self.settings_path)?;
        self.load()
    }

    /// Backup file names, newest first.
    pub fn list_backups(&self) -> Result<Vec<String>, ConfigError> {
        if !self.backups_dir.is_dir() {
            return Ok(Vec::new());
        }
        let suffix = format!(".{BACKUP_EXTENSION}");
        let mut names = Vec::new();
        for dir_entry in fs::read_dir(&self.backups_dir)? {
            let name = dir_entry?.file_name();
            match name.to_str() {
                Some(name) if name.ends_with(&suffix) => names.push(name.to_owned()),
                _ => {}
            }
        }
        names.sort_by_cached_key(|name| {
            (Reverse(parse_timestamp(name)), Reverse(name.clone()))
        });
        Ok(names)
    }
}

/// Runs the migration engine over an already-parsed settings document.
pub fn migrate_settings(raw: Value) -> Result<LoadReport, serde_json::Error> {
    let raw: RawSettings = serde_json::from_value(raw)?;
    let mut report = LoadReport {
        settings: Settings {
            editor_position: raw.editor_position,
            form_definitions: Vec::with_capacity(raw.form_definitions.len()),
        },
        ..LoadReport::default()
    };

    for form in &raw.form_definitions {
        let stale = form_needs_migration(form);
        match migrate_to_latest(form) {
            Ok(FormOrError::Form(migrated)) => {
                if stale {
                    report.migrated.push(migrated.name.clone());
                }
                report.settings.form_definitions.push(FormOrError::Form(migrated));
            }
            Ok(entry) => report.settings.form_definitions.push(entry),
            Err(invalid) => {
                warn!(
                    name = invalid.name_hint().unwrap_or("<unnamed>"),
                    "dropping entry that is not a form"
                );
                report.invalid.push(invalid);
            }
        }
    }

    report.needs_migration = !report.migrated.is_empty() || !report.invalid.is_empty();
    Ok(report)
}

fn sanitize_note(note: Option<&str>) -> Option<String> {
    let words: Vec<String> = note?
        .split(|ch: char| !ch.is_ascii_alphanumeric())
        .filter(|word| !word.is_empty())
        .map(str::to_ascii_lowercase)
        .collect();
    (!words.is_empty()).then(|| words.join("-"))
}

/// `settings_YYYYMMDD_HHMM[_note].json`
fn parse_timestamp(name: &str) -> Option<DateTime<Utc>> {
    let stem = name.strip_suffix(&format!(".{BACKUP_EXTENSION}"))?;
    let rest = stem.strip_prefix(&format!("{BACKUP_PREFIX}_"))?;
    let mut segments = rest.split('_');
    let date = segments.next()?;
    let time = segments.next()?;
    if date.len() != 8 || time.len() != 4 {
        return None;
    }
    chrono::NaiveDateTime::parse_from_str(&format!("{date}{time}"), "%Y%m%d%H%M")
        .ok()
        .map(|naive| DateTime::from_naive_utc_and_offset(naive, Utc))
}

/// Sibling path the new contents are written to before the rename.
fn tmp_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(".");
    name.push(TMP_SUFFIX);
    PathBuf::from(name)
}

fn write_atomic(path: &Path, data: &str) -> Result<(), ConfigError> {
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir)?;
    }
    let mut out = File::create(path)?;
    out.write_all(data.as_bytes())?;
    out.sync_all()?;
    Ok(())
}
