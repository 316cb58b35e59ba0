//! Environment variable names used by this crate for configuring the
//! console logger.
//!
//! These are purely helpers; [`crate::stream::ConsoleStream`] itself never
//! reads the environment.

/// `EnvFilter` directives, e.g. `info` or `my_app=debug,hyper=warn`.
pub const RECORD_STREAM_LOG_ENV: &str = "RECORD_STREAM_LOG";

/// Logger name stamped on every record.
pub const RECORD_STREAM_NAME_ENV: &str = "RECORD_STREAM_NAME";

/// Color mode: `auto`, `always` or `never`.
pub const RECORD_STREAM_COLOR_ENV: &str = "RECORD_STREAM_COLOR";

/// Read an environment variable or fall back to a provided default.
pub fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}
