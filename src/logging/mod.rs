// Logging module for structured logging using the tracing crate

use serde::{Deserialize, Serialize};
use std::error::Error;
use tracing_subscriber::EnvFilter;

fn default_level() -> String {
    "info".to_string()
}

/// Output format of log lines
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human readable lines
    #[default]
    Text,
    /// One JSON object per line, for log aggregation systems
    Json,
}

/// The `logging` section of a job profile.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LoggingConfig {
    /// Filter directive, e.g. "info" or "webmark=debug" (default: info)
    #[serde(default = "default_level")]
    pub level: String,

    /// Output format (default: text)
    #[serde(default)]
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_level(),
            format: LogFormat::default(),
        }
    }
}

impl LoggingConfig {
    /// Build the filter. `RUST_LOG`, when set, takes precedence over `level`.
    pub fn env_filter(&self) -> Result<EnvFilter, String> {
        if std::env::var_os(EnvFilter::DEFAULT_ENV).is_some() {
            if let Ok(filter) = EnvFilter::try_from_default_env() {
                return Ok(filter);
            }
        }
        EnvFilter::try_new(&self.level)
            .map_err(|e| format!("Invalid logging level '{}': {}", self.level, e))
    }

    pub fn validate(&self) -> Result<(), String> {
        EnvFilter::try_new(&self.level)
            .map(|_| ())
            .map_err(|e| format!("Invalid logging level '{}': {}", self.level, e))
    }
}

/// Initialize the tracing subscriber with default settings
///
/// Logs at `info` (or per `RUST_LOG`) as text to stdout.
///
/// # Examples
///
/// ```
/// use webmark::logging::init_subscriber;
///
/// init_subscriber().expect("Failed to initialize logging");
/// tracing::info!("Application started");
/// ```
pub fn init_subscriber() -> Result<(), Box<dyn Error>> {
    init_subscriber_with(&LoggingConfig::default())
}

/// Initialize the tracing subscriber from a logging configuration
///
/// Calling this more than once is harmless: if a global subscriber is
/// already installed it is left in place.
///
/// # Errors
///
/// Returns an error if the level directive cannot be parsed.
pub fn init_subscriber_with(config: &LoggingConfig) -> Result<(), Box<dyn Error>> {
    let filter = config.env_filter()?;
    let builder = tracing_subscriber::fmt().with_env_filter(filter);

    let result = match config.format {
        LogFormat::Json => builder.json().try_init(),
        LogFormat::Text => builder.try_init(),
    };

    if let Err(e) = result {
        tracing::debug!(error = %e, "Tracing subscriber already installed");
    }
    Ok(())
}
