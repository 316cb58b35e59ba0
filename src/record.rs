use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::{Map, Value};

/// Keys consumed by the logging layer itself. They are never echoed as
/// metadata.
pub const RESERVED_FIELDS: [&str; 7] = ["hostname", "level", "msg", "name", "pid", "time", "v"];

/// Key holding an error object on a record.
pub const ERROR_FIELD: &str = "error";

/// A single structured log event as delivered by the host logger.
///
/// `level`, `time` and `msg` are typed; every other key (including
/// `name`, `pid`, `hostname`, `v` and `error`) lives in `fields` in the
/// order it was recorded. Serializes back to the flat JSON shape
/// [`LogRecord::from_json`] reads.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LogRecord {
    pub level: i64,
    pub time: DateTime<Utc>,
    pub msg: String,
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl LogRecord {
    /// Build a record stamped with the current time.
    pub fn new(level: i64, msg: impl Into<String>) -> Self {
        Self {
            level,
            time: Utc::now(),
            msg: msg.into(),
            fields: Map::new(),
        }
    }

    pub fn with_time(mut self, time: DateTime<Utc>) -> Self {
        self.time = time;
        self
    }

    /// Append a field. Re-inserting an existing key keeps its position.
    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(key.into(), value.into());
        self
    }

    pub fn with_error(self, error: impl Into<Value>) -> Self {
        self.with_field(ERROR_FIELD, error)
    }

    /// Decode a serialized record, e.g. one JSON line from a logger.
    ///
    /// Only input that is not a JSON object is rejected. Structural fields
    /// degrade instead: a missing or non-integer `level` becomes `0`, a
    /// missing or unparseable `time` becomes now, and a missing or null
    /// `msg` becomes empty.
    pub fn from_json(line: &str) -> Result<Self, serde_json::Error> {
        let mut fields: Map<String, Value> = serde_json::from_str(line)?;

        let level = fields.remove("level").and_then(|v| v.as_i64()).unwrap_or(0);
        let time = fields
            .remove("time")
            .and_then(|v| parse_time(&v))
            .unwrap_or_else(Utc::now);
        let msg = match fields.remove("msg") {
            None | Some(Value::Null) => String::new(),
            Some(Value::String(s)) => s,
            Some(other) => other.to_string(),
        };

        Ok(Self {
            level,
            time,
            msg,
            fields,
        })
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    pub fn error(&self) -> Option<&Value> {
        self.fields.get(ERROR_FIELD)
    }
}

/// RFC 3339 strings or epoch milliseconds.
fn parse_time(value: &Value) -> Option<DateTime<Utc>> {
    match value {
        Value::String(s) => DateTime::parse_from_rfc3339(s)
            .ok()
            .map(|t| t.with_timezone(&Utc)),
        Value::Number(n) => n.as_i64().and_then(DateTime::from_timestamp_millis),
        _ => None,
    }
}

pub fn is_reserved(key: &str) -> bool {
    RESERVED_FIELDS.contains(&key)
}

/// Loose truthiness used when deciding whether an `error` or `stack`
/// value is present: null, `false`, numeric zero and `""` are falsy,
/// everything else (including empty objects and arrays) is truthy.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map_or(true, |f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}
