use colored::Colorize;
use std::fmt;
use std::sync::{OnceLock, RwLock};

/// What a line of CLI output is about; decides its icon, color and stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageKind {
    Info,
    Success,
    Warning,
    Error,
    Prompt,
    Section,
}

impl MessageKind {
    fn icon(self) -> &'static str {
        match self {
            MessageKind::Info => "[i]",
            MessageKind::Success => "[ok]",
            MessageKind::Warning => "[!]",
            MessageKind::Error => "[x]",
            MessageKind::Prompt => ">",
            MessageKind::Section => "",
        }
    }

    fn is_problem(self) -> bool {
        matches!(self, MessageKind::Warning | MessageKind::Error)
    }

    fn paint(self, line: String) -> String {
        match self {
            MessageKind::Info => line,
            MessageKind::Success => line.bright_green().to_string(),
            MessageKind::Warning => line.bright_yellow().to_string(),
            MessageKind::Error => line.bright_red().to_string(),
            MessageKind::Prompt => line.bright_cyan().to_string(),
            MessageKind::Section => line.bold().to_string(),
        }
    }
}

#[derive(Clone, Copy, Debug, Default)]
pub struct OutputPreferences {
    /// No colors or bold text.
    pub plain: bool,
    /// Only warnings and errors.
    pub quiet: bool,
}

static OUTPUT_PREFERENCES: OnceLock<RwLock<OutputPreferences>> = OnceLock::new();

fn preferences_lock() -> &'static RwLock<OutputPreferences> {
    OUTPUT_PREFERENCES.get_or_init(RwLock::default)
}

pub fn set_preferences(prefs: OutputPreferences) {
    if let Ok(mut current) = preferences_lock().write() {
        *current = prefs;
    }
}

fn current_preferences() -> OutputPreferences {
    preferences_lock()
        .read()
        .map(|current| *current)
        .unwrap_or_default()
}

pub(crate) fn format_message(
    kind: MessageKind,
    message: impl fmt::Display,
    prefs: &OutputPreferences,
) -> String {
    let line = match kind {
        MessageKind::Section => format!("== {} ==", message.to_string().trim()),
        _ => format!("{} {message}", kind.icon()),
    };
    if prefs.plain {
        line
    } else {
        kind.paint(line)
    }
}

pub fn print(kind: MessageKind, message: impl fmt::Display) {
    let prefs = current_preferences();
    if prefs.quiet && !kind.is_problem() {
        return;
    }
    let line = format_message(kind, message, &prefs);
    match kind {
        MessageKind::Error => eprintln!("{line}"),
        MessageKind::Section => println!("\n{line}"),
        _ => println!("{line}"),
    }
}

pub fn info(message: impl fmt::Display) {
    print(MessageKind::Info, message)
}

pub fn success(message: impl fmt::Display) {
    print(MessageKind::Success, message)
}

pub fn warning(message: impl fmt::Display) {
    print(MessageKind::Warning, message)
}

/// Goes to stderr.
pub fn error(message: impl fmt::Display) {
    print(MessageKind::Error, message)
}

pub fn prompt(message: impl fmt::Display) {
    print(MessageKind::Prompt, message)
}

pub fn section(title: impl fmt::Display) {
    print(MessageKind::Section, title)
}

/// Rendered documents go to stdout untouched, whatever the preferences.
pub fn document(text: &str) {
    if text.ends_with('\n') {
        print!("{text}");
    } else {
        println!("{text}");
    }
}
