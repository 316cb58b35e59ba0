use crate::console::{Console, StdoutConsole};
use crate::error::StreamError;
use crate::format::RecordFormatter;
use crate::record::LogRecord;

/// Synchronous destination for [`LogRecord`]s emitted by the host logger.
///
/// `write` is called once per record, in emission order, and may be
/// called concurrently from independent log sources.
pub trait RecordStream: Send + Sync {
    /// Render and emit a single record.
    ///
    /// **Returns**
    /// - `Ok(())` once every line for the record has been written.
    /// - `Err(..)` if the underlying output failed.
    fn write(&self, record: &LogRecord) -> Result<(), StreamError>;
}

/// [`RecordStream`] that prints colorized, timestamped lines to a
/// [`Console`].
///
/// A record produces one primary line and, when its `error` carries a
/// stack, a second write holding the stack text. Both go through a single
/// [`Console::log_all`] call so consoles that lock keep them adjacent.
#[derive(Clone, Debug, Default)]
pub struct ConsoleStream<C = StdoutConsole> {
    formatter: RecordFormatter,
    console: C,
}

impl ConsoleStream<StdoutConsole> {
    pub fn stdout() -> Self {
        Self::new(StdoutConsole)
    }
}

impl<C: Console> ConsoleStream<C> {
    pub fn new(console: C) -> Self {
        Self {
            formatter: RecordFormatter::new(),
            console,
        }
    }

    pub fn console(&self) -> &C {
        &self.console
    }

    /// Decode one serialized record and write it.
    pub fn write_json(&self, line: &str) -> Result<(), StreamError> {
        let record = LogRecord::from_json(line)?;
        self.write(&record)
    }
}

impl<C: Console> RecordStream for ConsoleStream<C> {
    fn write(&self, record: &LogRecord) -> Result<(), StreamError> {
        let formatted = self.formatter.format(record);
        match &formatted.stack {
            Some(stack) => self.console.log_all(&[formatted.line.as_str(), stack.as_str()])?,
            None => self.console.log(&formatted.line)?,
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::console::CaptureConsole;
    use serde_json::json;
    use std::io;
    use std::sync::Mutex;

    /// Records the texts of each console call as one batch.
    #[derive(Default)]
    struct BatchConsole {
        batches: Mutex<Vec<Vec<String>>>,
    }

    impl Console for BatchConsole {
        fn log(&self, text: &str) -> io::Result<()> {
            self.log_all(&[text])
        }

        fn log_all(&self, texts: &[&str]) -> io::Result<()> {
            let batch = texts.iter().map(|t| t.to_string()).collect();
            self.batches.lock().unwrap().push(batch);
            Ok(())
        }
    }

    #[test]
    fn stack_line_shares_one_console_call() {
        let stream = ConsoleStream::new(BatchConsole::default());
        stream
            .write(&LogRecord::new(50, "failed").with_error(json!({ "stack": "stack" })))
            .unwrap();
        stream.write(&LogRecord::new(30, "ok")).unwrap();

        let batches = stream.console().batches.lock().unwrap();
        assert_eq!(batches.len(), 2);
        assert_eq!(batches[0].len(), 2);
        assert_eq!(batches[0][1], "stack");
        assert_eq!(batches[1].len(), 1);
    }

    #[test]
    fn writes_primary_then_stack() {
        let stream = ConsoleStream::new(CaptureConsole::new());
        let record = LogRecord::new(50, "failed").with_error(json!({ "stack": "stack" }));

        stream.write(&record).unwrap();

        let writes = stream.console().take();
        assert_eq!(writes.len(), 2);
        assert!(writes[0].ends_with(" {\n    error: {}\n}\n"));
        assert_eq!(writes[1], "stack\n");
    }

    #[test]
    fn write_json_decodes_record() {
        let stream = ConsoleStream::new(CaptureConsole::new());
        stream
            .write_json(r#"{"level":30,"msg":"hi","time":"2024-03-05T13:02:03Z","user":"ada"}"#)
            .unwrap();

        let writes = stream.console().take();
        assert_eq!(writes.len(), 1);
        assert!(writes[0].ends_with(" {\n    user: 'ada'\n}\n"));
    }

    #[test]
    fn write_json_renders_degraded_records() {
        let stream = ConsoleStream::new(CaptureConsole::new());
        stream
            .write_json(r#"{"level":30,"msg":null,"time":"2024-03-05T13:02:03Z"}"#)
            .unwrap();
        stream.write_json(r#"{"level":30,"msg":"x"}"#).unwrap();

        let writes = stream.console().take();
        assert_eq!(writes.len(), 2);
        assert!(writes[0].ends_with("INFO\x1b[0m: \n") || writes[0].ends_with("INFO: \n"));
        assert!(writes[1].contains(": "));
        assert!(writes[1].ends_with("x\x1b[0m\n") || writes[1].ends_with("x\n"));
    }

    #[test]
    fn write_json_rejects_garbage() {
        let stream = ConsoleStream::new(CaptureConsole::new());
        let err = stream.write_json("{").unwrap_err();
        assert!(matches!(err, StreamError::Record(_)));
        assert!(stream.console().writes().is_empty());
    }
}
