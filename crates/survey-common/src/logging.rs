//! Subscriber setup for applications embedding the survey crates.
//!
//! Library code only emits `tracing` events:
//!
//! - `warn`: data-quality problems (unmapped codes, zero-weight cells, singleton strata)
//! - `info`: per-call summaries
//! - `debug`: skipped variables and indicators
//! - `trace`: respondent-level values, redacted unless [`LogConfig::log_data`] is set
//!
//! ```ignore
//! use survey_common::logging::{LogConfig, LogFormat, init_logging};
//!
//! init_logging(&LogConfig::default().with_format(LogFormat::Json))?;
//! ```

use std::fs::OpenOptions;
use std::io;
use std::path::PathBuf;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

use thiserror::Error;
use tracing::Level;
use tracing_subscriber::fmt::{self, MakeWriter};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::{SubscriberInitExt, TryInitError};
use tracing_subscriber::{EnvFilter, Layer, Registry};

static LOG_DATA_ENABLED: AtomicBool = AtomicBool::new(false);

pub const REDACTED_VALUE: &str = "[REDACTED]";

/// `value` when respondent-level logging is on, otherwise [`REDACTED_VALUE`].
pub fn redact_value(value: &str) -> &str {
    if LOG_DATA_ENABLED.load(Ordering::Relaxed) {
        value
    } else {
        REDACTED_VALUE
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    #[default]
    Pretty,
    Compact,
    Json,
}

#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Level for the survey crates; dependencies stay at `warn`.
    pub level: Level,
    pub format: LogFormat,
    pub with_timestamps: bool,
    pub with_ansi: bool,
    /// Append to this file instead of stderr.
    pub log_file: Option<PathBuf>,
    /// Allow respondent-level values in `trace` events.
    pub log_data: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: Level::INFO,
            format: LogFormat::default(),
            with_timestamps: false,
            with_ansi: true,
            log_file: None,
            log_data: false,
        }
    }
}

impl LogConfig {
    #[must_use]
    pub fn with_level(mut self, level: Level) -> Self {
        self.level = level;
        self
    }

    #[must_use]
    pub fn with_format(mut self, format: LogFormat) -> Self {
        self.format = format;
        self
    }

    #[must_use]
    pub fn with_timestamps(mut self, enable: bool) -> Self {
        self.with_timestamps = enable;
        self
    }

    #[must_use]
    pub fn with_ansi(mut self, enable: bool) -> Self {
        self.with_ansi = enable;
        self
    }

    #[must_use]
    pub fn with_log_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.log_file = Some(path.into());
        self
    }

    #[must_use]
    pub fn with_log_data(mut self, enable: bool) -> Self {
        self.log_data = enable;
        self
    }
}

#[derive(Debug, Error)]
pub enum LoggingError {
    #[error("failed to open log file {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("subscriber already set: {0}")]
    AlreadyInitialized(#[source] TryInitError),
}

/// Install the global subscriber. Call once at startup.
///
/// # Errors
///
/// The log file cannot be opened, or a global subscriber is already set.
pub fn init_logging(config: &LogConfig) -> Result<(), LoggingError> {
    match &config.log_file {
        Some(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .map_err(|source| LoggingError::Io {
                    path: path.clone(),
                    source,
                })?;
            init_logging_with_writer(config, Mutex::new(file))
        }
        None => init_logging_with_writer(config, io::stderr),
    }
}

/// Install the global subscriber writing to `writer`.
///
/// # Errors
///
/// A global subscriber is already set.
pub fn init_logging_with_writer<W>(config: &LogConfig, writer: W) -> Result<(), LoggingError>
where
    W: for<'writer> MakeWriter<'writer> + Send + Sync + 'static,
{
    LOG_DATA_ENABLED.store(config.log_data, Ordering::Relaxed);

    let base = fmt::layer().with_writer(writer).with_ansi(config.with_ansi);
    let layer: Box<dyn Layer<Registry> + Send + Sync> =
        match (config.format, config.with_timestamps) {
            (LogFormat::Json, _) => base.json().with_ansi(false).boxed(),
            (LogFormat::Compact, true) => base.compact().boxed(),
            (LogFormat::Compact, false) => base.compact().without_time().boxed(),
            (LogFormat::Pretty, true) => base.boxed(),
            (LogFormat::Pretty, false) => base.without_time().boxed(),
        };

    tracing_subscriber::registry()
        .with(layer)
        .with(env_filter(config.level))
        .try_init()
        .map_err(LoggingError::AlreadyInitialized)
}

/// `RUST_LOG` when set, otherwise `level` for the survey crates only.
fn env_filter(level: Level) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        let directives = [
            "survey_common",
            "survey_config",
            "survey_design",
            "survey_harmonize",
            "survey_indicators",
            "survey_model",
        ]
        .iter()
        .fold("warn".to_string(), |acc, krate| format!("{acc},{krate}={level}"));
        EnvFilter::new(directives.to_lowercase())
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filter_covers_every_survey_crate() {
        let filter = env_filter(Level::DEBUG).to_string();
        if std::env::var_os("RUST_LOG").is_none() {
            assert!(filter.contains("survey_indicators=debug"));
            assert!(filter.contains("survey_model=debug"));
        }
    }

    #[test]
    fn unreadable_log_file_is_reported() {
        let config = LogConfig::default().with_log_file("/nonexistent-dir/survey.log");
        let err = init_logging(&config).unwrap_err();
        assert!(matches!(err, LoggingError::Io { .. }));
        assert!(err.to_string().contains("/nonexistent-dir/survey.log"));
    }
}
