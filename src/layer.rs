use crate::level;
use crate::record::{LogRecord, ERROR_FIELD};
use crate::stream::RecordStream;
use chrono::Utc;
use serde_json::{json, Map, Value};
use std::error::Error;
use std::fmt;
use std::sync::Arc;
use tracing::field::{Field, Visit};
use tracing::{Event, Subscriber};
use tracing_subscriber::layer::{Context, Layer};
use tracing_subscriber::registry::LookupSpan;

/// `tracing_subscriber` layer that turns every event it sees into a
/// [`LogRecord`] and writes it to a [`RecordStream`] on the calling
/// thread.
///
/// Filtering is left to the rest of the subscriber stack (for example an
/// `EnvFilter`); this layer formats whatever reaches it.
pub struct RecordLayer {
    stream: Arc<dyn RecordStream>,
    name: String,
    pid: u32,
}

impl RecordLayer {
    /// **Parameters**
    /// - `stream`: destination for the records built from events.
    /// - `name`: logger name stamped on every record.
    pub fn new(stream: Arc<dyn RecordStream>, name: impl Into<String>) -> Self {
        Self {
            stream,
            name: name.into(),
            pid: std::process::id(),
        }
    }

    fn build_record(&self, event: &Event<'_>) -> LogRecord {
        let mut fields = Map::new();
        fields.insert("name".to_string(), Value::from(self.name.as_str()));
        fields.insert("pid".to_string(), Value::from(self.pid));

        let mut message = None;
        let mut visitor = FieldVisitor {
            fields: &mut fields,
            message: &mut message,
        };
        event.record(&mut visitor);
        fields.insert("v".to_string(), Value::from(0));

        LogRecord {
            level: level::from_tracing(event.metadata().level()),
            time: Utc::now(),
            msg: message.unwrap_or_default(),
            fields,
        }
    }
}

impl<S> Layer<S> for RecordLayer
where
    S: Subscriber + for<'span> LookupSpan<'span>,
{
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let record = self.build_record(event);
        if let Err(e) = self.stream.write(&record) {
            eprintln!("error writing log record: {}", e);
        }
    }
}

/// Collects event fields into record metadata, in emission order.
pub struct FieldVisitor<'a> {
    pub fields: &'a mut Map<String, Value>,
    pub message: &'a mut Option<String>,
}

impl<'a> FieldVisitor<'a> {
    fn insert(&mut self, field: &Field, value: Value) {
        self.fields.insert(field.name().to_string(), value);
    }

    /// Text fields. An `error` logged as `%err` or `?err` keeps its text
    /// as the error message.
    fn insert_text(&mut self, field: &Field, text: String) {
        if field.name() == ERROR_FIELD {
            self.insert(field, json!({ "message": text }));
        } else {
            self.insert(field, Value::String(text));
        }
    }
}

impl<'a> Visit for FieldVisitor<'a> {
    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == "message" {
            *self.message = Some(value.to_string());
        } else {
            self.insert_text(field, value.to_string());
        }
    }

    fn record_i64(&mut self, field: &Field, value: i64) {
        self.insert(field, Value::from(value));
    }

    fn record_u64(&mut self, field: &Field, value: u64) {
        self.insert(field, Value::from(value));
    }

    fn record_f64(&mut self, field: &Field, value: f64) {
        self.insert(field, Value::from(value));
    }

    fn record_bool(&mut self, field: &Field, value: bool) {
        self.insert(field, Value::from(value));
    }

    fn record_error(&mut self, field: &Field, value: &(dyn Error + 'static)) {
        self.insert(field, error_to_value(value));
    }

    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        if field.name() == "message" {
            *self.message = Some(format!("{:?}", value));
        } else {
            self.insert_text(field, format!("{:?}", value));
        }
    }
}

/// Error object for a field recorded as `dyn Error`, e.g.
/// `error!(error = &err as &dyn Error, "call failed")`: the display
/// message and a stack made of the error and its source chain.
///
/// ```text
/// Error: request failed
/// Caused by: connection reset
/// ```
pub fn error_to_value(error: &(dyn Error + 'static)) -> Value {
    let mut stack = vec![Value::String(format!("Error: {}", error))];
    let mut source = error.source();
    while let Some(cause) = source {
        stack.push(Value::String(format!("Caused by: {}", cause)));
        source = cause.source();
    }

    json!({
        "message": error.to_string(),
        "name": "Error",
        "stack": stack,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::console::CaptureConsole;
    use crate::stream::ConsoleStream;
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::Registry;

    #[derive(Debug)]
    struct Wrapped(std::io::Error);

    impl fmt::Display for Wrapped {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "request failed")
        }
    }

    impl Error for Wrapped {
        fn source(&self) -> Option<&(dyn Error + 'static)> {
            Some(&self.0)
        }
    }

    #[test]
    fn error_chain_becomes_stack_lines() {
        let err = Wrapped(std::io::Error::new(std::io::ErrorKind::Other, "connection reset"));
        let value = error_to_value(&err);

        assert_eq!(value["message"], "request failed");
        assert_eq!(value["name"], "Error");
        assert_eq!(
            value["stack"],
            json!(["Error: request failed", "Caused by: connection reset"])
        );
    }

    #[test]
    fn events_are_written_through_the_stream() {
        let console = CaptureConsole::new();
        let stream = Arc::new(ConsoleStream::new(console.clone()));
        let subscriber = Registry::default().with(RecordLayer::new(stream, "test"));

        tracing::subscriber::with_default(subscriber, || {
            tracing::info!(user = "ada", attempts = 3u64, "signed in");
        });

        let writes = console.take();
        assert_eq!(writes.len(), 1);
        assert!(writes[0].contains("signed in"));
        assert!(writes[0].ends_with(" {\n    user: 'ada',\n    attempts: 3\n}\n"));
        assert!(!writes[0].contains("pid"));
    }

    #[test]
    fn error_fields_emit_stack_line() {
        let console = CaptureConsole::new();
        let stream = Arc::new(ConsoleStream::new(console.clone()));
        let subscriber = Registry::default().with(RecordLayer::new(stream, "test"));
        let err = Wrapped(std::io::Error::new(std::io::ErrorKind::Other, "connection reset"));

        tracing::subscriber::with_default(subscriber, || {
            tracing::error!(error = &err as &(dyn Error + 'static), "call failed");
        });

        let writes = console.take();
        assert_eq!(writes.len(), 2);
        assert!(writes[0].ends_with(
            " {\n    error: {\n        message: 'request failed',\n        name: 'Error'\n    }\n}\n"
        ));
        assert_eq!(writes[1], "Error: request failed\nCaused by: connection reset\n");
    }

    #[test]
    fn display_and_debug_errors_keep_their_text() {
        let console = CaptureConsole::new();
        let stream = Arc::new(ConsoleStream::new(console.clone()));
        let subscriber = Registry::default().with(RecordLayer::new(stream, "test"));
        let err = std::io::Error::new(std::io::ErrorKind::Other, "disk full");

        tracing::subscriber::with_default(subscriber, || {
            tracing::error!(error = %err, "save failed");
            tracing::error!(error = ?err, "save failed");
            tracing::error!(error = "disk full", "save failed");
        });

        let writes = console.take();
        assert_eq!(writes.len(), 3);
        assert!(writes[0].ends_with(" {\n    error: {\n        message: 'disk full'\n    }\n}\n"));
        assert!(writes[1].contains("        message: '"));
        assert!(writes[1].contains("disk full"));
        assert!(writes[2].ends_with(" {\n    error: {\n        message: 'disk full'\n    }\n}\n"));
    }

    #[test]
    fn other_text_fields_stay_strings() {
        let console = CaptureConsole::new();
        let stream = Arc::new(ConsoleStream::new(console.clone()));
        let subscriber = Registry::default().with(RecordLayer::new(stream, "test"));

        tracing::subscriber::with_default(subscriber, || {
            tracing::warn!(reason = %"quota", "slow");
        });

        let writes = console.take();
        assert!(writes[0].ends_with(" {\n    reason: 'quota'\n}\n"));
    }
}
