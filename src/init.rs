use crate::env::{
    env_or, RECORD_STREAM_COLOR_ENV, RECORD_STREAM_LOG_ENV, RECORD_STREAM_NAME_ENV,
};
use crate::error::StreamError;
use crate::layer::RecordLayer;
use crate::stream::ConsoleStream;
use std::str::FromStr;
use std::sync::Arc;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Registry};

/// Whether escape codes are written.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ColorChoice {
    /// Let `colored` decide from `NO_COLOR`, `CLICOLOR` and the terminal.
    #[default]
    Auto,
    Always,
    Never,
}

impl ColorChoice {
    /// Apply the choice process-wide.
    pub fn apply(self) {
        match self {
            Self::Auto => colored::control::unset_override(),
            Self::Always => colored::control::set_override(true),
            Self::Never => colored::control::set_override(false),
        }
    }
}

#[derive(thiserror::Error, Debug, PartialEq, Eq)]
#[error("unknown color choice `{0}`, expected auto, always or never")]
pub struct ParseColorChoiceError(String);

impl FromStr for ColorChoice {
    type Err = ParseColorChoiceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "auto" => Ok(Self::Auto),
            "always" => Ok(Self::Always),
            "never" => Ok(Self::Never),
            _ => Err(ParseColorChoiceError(s.to_string())),
        }
    }
}

/// Console logger configuration.
///
/// **Fields**
/// - `name`: logger name stamped on every record.
/// - `filter`: `EnvFilter` directives used when `RECORD_STREAM_LOG` is
///   not set.
/// - `color`: color mode applied at initialisation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StreamConfig {
    pub name: String,
    pub filter: String,
    pub color: ColorChoice,
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            name: "app".to_string(),
            filter: "info".to_string(),
            color: ColorChoice::Auto,
        }
    }
}

impl StreamConfig {
    /// Defaults overridden by `RECORD_STREAM_NAME` and
    /// `RECORD_STREAM_COLOR`. An unrecognised color value keeps `Auto`.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let color = std::env::var(RECORD_STREAM_COLOR_ENV)
            .ok()
            .and_then(|raw| raw.parse().ok())
            .unwrap_or(defaults.color);

        Self {
            name: env_or(RECORD_STREAM_NAME_ENV, &defaults.name),
            filter: defaults.filter,
            color,
        }
    }

    fn env_filter(&self) -> EnvFilter {
        EnvFilter::try_from_env(RECORD_STREAM_LOG_ENV)
            .unwrap_or_else(|_| EnvFilter::new(&self.filter))
    }
}

/// Install a global `tracing` subscriber that prints every enabled event
/// to stdout through a [`ConsoleStream`].
///
/// **Returns**
/// - `Err(StreamError::Init)` if a global subscriber is already set.
pub fn init_console_logging(config: StreamConfig) -> Result<(), StreamError> {
    config.color.apply();

    let stream = Arc::new(ConsoleStream::stdout());
    Registry::default()
        .with(config.env_filter())
        .with(RecordLayer::new(stream, config.name.clone()))
        .try_init()?;

    tracing::debug!(name = %config.name, filter = %config.filter, "console logging initialized");
    Ok(())
}

/// Equivalent to [`init_console_logging`] with [`StreamConfig::from_env`].
pub fn init_console_logging_default() -> Result<(), StreamError> {
    init_console_logging(StreamConfig::from_env())
}
