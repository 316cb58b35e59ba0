/// Errors surfaced by record streams and logger initialisation.
#[derive(thiserror::Error, Debug)]
pub enum StreamError {
    #[error("console write failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid log record: {0}")]
    Record(#[from] serde_json::Error),

    #[error("failed to install global subscriber: {0}")]
    Init(#[from] tracing_subscriber::util::TryInitError),
}
