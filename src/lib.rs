//! Console stream for structured log records.
//!
//! Records are rendered as one colorized, timestamped line, followed by a
//! second line with the error stack when the record carries one:
//!
//! ```text
//! [2024-03-05 01:02:03.004 PM] ERROR: call failed {
//!     error: {
//!         message: 'request failed'
//!     }
//! }
//! Error: request failed
//! ```

pub mod record;
pub mod level;
pub mod source;
pub mod format;
pub mod console;
pub mod stream;
pub mod layer;
pub mod error;
pub mod env;
pub mod init;

pub use error::StreamError;
pub use record::LogRecord;
pub use stream::{ConsoleStream, RecordStream};
