use std::io::{self, Write};
use std::sync::{Arc, Mutex, PoisonError};

/// Line-oriented output target for formatted records.
///
/// Every call to [`Console::log`] is one independent write of `text`
/// followed by a newline.
pub trait Console: Send + Sync {
    fn log(&self, text: &str) -> io::Result<()>;

    /// Write several texts back to back, each as its own line. Consoles
    /// that can should keep other writers out until all are written.
    fn log_all(&self, texts: &[&str]) -> io::Result<()> {
        for text in texts {
            self.log(text)?;
        }
        Ok(())
    }
}

/// Writes to the process's standard output.
#[derive(Clone, Copy, Debug, Default)]
pub struct StdoutConsole;

impl Console for StdoutConsole {
    fn log(&self, text: &str) -> io::Result<()> {
        self.log_all(&[text])
    }

    fn log_all(&self, texts: &[&str]) -> io::Result<()> {
        let mut out = io::stdout().lock();
        for text in texts {
            writeln!(out, "{text}")?;
        }
        out.flush()
    }
}

/// In-memory console that keeps every write, newline included.
///
/// Clones share the same buffer, so a handle kept by a test sees what a
/// stream installed elsewhere has written.
#[derive(Clone, Debug, Default)]
pub struct CaptureConsole {
    writes: Arc<Mutex<Vec<String>>>,
}

impl CaptureConsole {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the writes so far.
    pub fn writes(&self) -> Vec<String> {
        self.writes
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Drain and return the writes so far.
    pub fn take(&self) -> Vec<String> {
        std::mem::take(&mut *self.writes.lock().unwrap_or_else(PoisonError::into_inner))
    }
}

impl Console for CaptureConsole {
    fn log(&self, text: &str) -> io::Result<()> {
        self.log_all(&[text])
    }

    fn log_all(&self, texts: &[&str]) -> io::Result<()> {
        let mut writes = self.writes.lock().unwrap_or_else(PoisonError::into_inner);
        writes.extend(texts.iter().map(|text| format!("{text}\n")));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn capture_console_records_each_write() {
        let console = CaptureConsole::new();
        let handle = console.clone();

        console.log("first").unwrap();
        console.log("second\nline").unwrap();

        assert_eq!(handle.writes(), ["first\n", "second\nline\n"]);
        assert_eq!(handle.take().len(), 2);
        assert!(console.writes().is_empty());
    }

    #[test]
    fn log_all_keeps_each_text_as_a_write() {
        let console = CaptureConsole::new();
        console.log_all(&["primary", "stack"]).unwrap();
        assert_eq!(console.writes(), ["primary\n", "stack\n"]);
    }
}
