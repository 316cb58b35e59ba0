use colored::{ColoredString, Colorize};
use std::sync::OnceLock;

pub const TRACE: i64 = 10;
pub const DEBUG: i64 = 20;
pub const INFO: i64 = 30;
pub const WARN: i64 = 40;
pub const ERROR: i64 = 50;
pub const FATAL: i64 = 60;

/// Canonical level names, ascending severity.
pub const NAME_FROM_LEVEL: [(i64, &str); 6] = [
    (TRACE, "trace"),
    (DEBUG, "debug"),
    (INFO, "info"),
    (WARN, "warn"),
    (ERROR, "error"),
    (FATAL, "fatal"),
];

pub fn name_from_level(level: i64) -> Option<&'static str> {
    NAME_FROM_LEVEL
        .iter()
        .find(|(code, _)| *code == level)
        .map(|(_, name)| *name)
}

/// Numeric code for a `tracing` level. `tracing` has no fatal level.
pub fn from_tracing(level: &tracing::Level) -> i64 {
    match *level {
        tracing::Level::TRACE => TRACE,
        tracing::Level::DEBUG => DEBUG,
        tracing::Level::INFO => INFO,
        tracing::Level::WARN => WARN,
        tracing::Level::ERROR => ERROR,
    }
}

/// Colored, uppercase labels for the canonical levels.
///
/// Built once per process and never mutated afterwards. Whether the
/// escape codes are actually emitted is decided by `colored` at render
/// time.
#[derive(Debug)]
pub struct LevelLabels {
    labels: Vec<(i64, ColoredString)>,
}

impl LevelLabels {
    fn build() -> Self {
        let labels = NAME_FROM_LEVEL
            .iter()
            .map(|&(level, name)| (level, paint(level, name.to_uppercase())))
            .collect();
        Self { labels }
    }

    /// Process-wide table.
    pub fn global() -> &'static Self {
        static LABELS: OnceLock<LevelLabels> = OnceLock::new();
        LABELS.get_or_init(Self::build)
    }

    pub fn get(&self, level: i64) -> Option<&ColoredString> {
        self.labels
            .iter()
            .find(|(code, _)| *code == level)
            .map(|(_, label)| label)
    }

    /// Rendered label for `level`; unknown levels fall back to a bold
    /// `LVL <level>` without any severity color.
    pub fn render(&self, level: i64) -> String {
        match self.get(level) {
            Some(label) => label.to_string(),
            None => format!("LVL {level}").as_str().bold().to_string(),
        }
    }
}

fn paint(level: i64, text: String) -> ColoredString {
    let text = text.as_str();
    match level {
        DEBUG => text.yellow(),
        INFO => text.cyan(),
        WARN => text.magenta(),
        ERROR => text.red(),
        FATAL => text.reversed(),
        _ => text.white(),
    }
}
