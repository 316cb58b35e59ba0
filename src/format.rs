use crate::level::LevelLabels;
use crate::record::{is_reserved, is_truthy, LogRecord, ERROR_FIELD};
use crate::source::to_source;
use chrono::{DateTime, Local, TimeZone};
use colored::Colorize;
use serde_json::{Map, Value};
use std::fmt::Display;

/// Pattern used for the leading timestamp, e.g. `2024-03-05 01:02:03.004 PM`.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %I:%M:%S%.3f %p";

/// Error sub-fields kept when an error is projected into metadata.
pub const ERROR_KEYS: [&str; 5] = ["code", "details", "message", "name", "signal"];

/// Output of formatting one record: the primary line and the optional
/// stack line, each without a line terminator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormattedRecord {
    pub line: String,
    pub stack: Option<String>,
}

/// Shape of an error's `stack` value, resolved once per record.
#[derive(Debug, Clone, PartialEq)]
pub enum StackContent {
    Lines(Vec<Value>),
    Raw(String),
    Opaque(Value),
}

impl StackContent {
    /// `None` when the stack is absent or falsy.
    pub fn resolve(stack: Option<&Value>) -> Option<Self> {
        let stack = stack.filter(|s| is_truthy(s))?;
        Some(match stack {
            Value::Array(lines) => Self::Lines(lines.clone()),
            Value::String(raw) => Self::Raw(raw.clone()),
            other => Self::Opaque(other.clone()),
        })
    }

    pub fn render(&self) -> String {
        match self {
            Self::Lines(lines) => lines
                .iter()
                .map(|line| match line {
                    Value::String(s) => s.clone(),
                    Value::Null => String::new(),
                    other => other.to_string(),
                })
                .collect::<Vec<_>>()
                .join("\n"),
            Self::Raw(raw) => raw.clone(),
            Self::Opaque(value) => to_source(value),
        }
    }
}

/// Project an error value onto the fixed five-key shape. Sub-fields the
/// error does not carry are left out; anything else it carries is dropped.
pub fn normalize_error(error: &Value) -> Map<String, Value> {
    let mut normalized = Map::new();
    if let Value::Object(fields) = error {
        for key in ERROR_KEYS {
            if let Some(value) = fields.get(key) {
                normalized.insert(key.to_string(), value.clone());
            }
        }
    }
    normalized
}

pub fn format_timestamp<Tz>(time: &DateTime<Tz>) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    time.format(TIMESTAMP_FORMAT).to_string()
}

/// Split record fields into rendered metadata and optional stack content.
fn partition(fields: &Map<String, Value>) -> (Map<String, Value>, Option<StackContent>) {
    let mut metadata = Map::new();
    let mut stack = None;

    for (key, value) in fields {
        if key == ERROR_FIELD {
            if is_truthy(value) {
                metadata.insert(key.clone(), Value::Object(normalize_error(value)));
                stack = StackContent::resolve(value.get("stack"));
            }
        } else if !is_reserved(key) {
            metadata.insert(key.clone(), value.clone());
        }
    }

    (metadata, stack)
}

/// Renders [`LogRecord`]s as console lines:
///
/// ```text
/// [2024-03-05 01:02:03.004 PM] INFO: hello {
///     user: 'ada'
/// }
/// ```
#[derive(Debug, Clone, Copy)]
pub struct RecordFormatter {
    labels: &'static LevelLabels,
}

impl Default for RecordFormatter {
    fn default() -> Self {
        Self::new()
    }
}

impl RecordFormatter {
    pub fn new() -> Self {
        Self {
            labels: LevelLabels::global(),
        }
    }

    pub fn format(&self, record: &LogRecord) -> FormattedRecord {
        // An empty message gets no emphasis codes at all.
        let msg = if record.msg.is_empty() {
            String::new()
        } else {
            record.msg.as_str().bold().to_string()
        };
        let mut line = format!(
            "[{}] {}: {}",
            format_timestamp(&record.time.with_timezone(&Local)),
            self.labels.render(record.level),
            msg,
        );

        let (metadata, stack) = partition(&record.fields);
        if !metadata.is_empty() {
            line.push(' ');
            line.push_str(&to_source(&Value::Object(metadata)));
        }

        FormattedRecord {
            line,
            stack: stack.map(|s| s.render()).filter(|s| !s.is_empty()),
        }
    }
}
