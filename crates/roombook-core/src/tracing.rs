//! Logging setup for roombook.
//!
//! Diagnostics go to stderr through a `tracing-subscriber` registry, so
//! command output on stdout stays clean. `RUST_LOG` overrides the level
//! unless an explicit filter is configured.
//!
//! ```ignore
//! use roombook_core::tracing::{init_tracing, LogFormat, TracingConfig};
//!
//! init_tracing(TracingConfig::cli().with_format(LogFormat::Json))?;
//! ```

use std::fmt;
use std::io;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::Level;
use tracing_subscriber::{EnvFilter, fmt as tfmt, prelude::*};

use crate::error::ParseError;

/// Errors that can occur during tracing initialization
#[derive(Debug, Error)]
pub enum TracingError {
    /// Failed to set global subscriber
    #[error("failed to set global tracing subscriber: {0}")]
    SetGlobalSubscriber(#[from] tracing::subscriber::SetGlobalDefaultError),

    /// Failed to parse env filter directive
    #[error("failed to parse env filter: {0}")]
    EnvFilter(#[from] tracing_subscriber::filter::ParseError),
}

/// How log lines are written.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// One short line per event, no timestamp.
    #[default]
    Compact,
    /// Multi-line human-readable output with timestamps.
    Pretty,
    /// One JSON object per line.
    Json,
}

impl LogFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Compact => "compact",
            Self::Pretty => "pretty",
            Self::Json => "json",
        }
    }
}

impl fmt::Display for LogFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LogFormat {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "compact" => Ok(Self::Compact),
            "pretty" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            _ => Err(ParseError::LogFormat(s.to_string())),
        }
    }
}

/// Configuration for tracing initialization
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TracingConfig {
    /// Level for the roombook crates when no filter is given
    pub level: Level,
    /// Output format for log lines
    pub format: LogFormat,
    /// Include module path, file and line in each line
    pub verbose: bool,
    /// Filter directive replacing both `level` and `RUST_LOG`
    pub filter: Option<String>,
}

impl TracingConfig {
    /// Normal CLI usage: only warnings, compact.
    #[must_use]
    pub fn cli() -> Self {
        Self {
            level: Level::WARN,
            format: LogFormat::Compact,
            verbose: false,
            filter: None,
        }
    }

    /// `--debug`: everything from DEBUG up, with source locations.
    #[must_use]
    pub fn cli_debug() -> Self {
        Self {
            level: Level::DEBUG,
            verbose: true,
            ..Self::cli()
        }
    }

    /// Set the output format
    #[must_use]
    pub fn with_format(mut self, format: LogFormat) -> Self {
        self.format = format;
        self
    }

    /// Set a custom filter directive
    #[must_use]
    pub fn with_filter(mut self, filter: impl Into<String>) -> Self {
        self.filter = Some(filter.into());
        self
    }

    fn env_filter(&self) -> Result<EnvFilter, TracingError> {
        match &self.filter {
            Some(filter) => Ok(EnvFilter::try_new(filter)?),
            None => Ok(EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(default_directive(self.level)))),
        }
    }
}

impl Default for TracingConfig {
    fn default() -> Self {
        Self::cli()
    }
}

/// Initialize tracing with the given configuration.
///
/// Call once, before the first command runs.
///
/// # Errors
///
/// Returns an error if the global subscriber has already been set or if
/// the filter directive is invalid.
pub fn init_tracing(config: TracingConfig) -> Result<(), TracingError> {
    let env_filter = config.env_filter()?;
    let verbose = config.verbose;

    let layer = match config.format {
        LogFormat::Compact => tfmt::layer()
            .compact()
            .without_time()
            .with_writer(io::stderr)
            .with_target(verbose)
            .with_file(verbose)
            .with_line_number(verbose)
            .boxed(),
        LogFormat::Pretty => tfmt::layer()
            .pretty()
            .with_writer(io::stderr)
            .with_target(verbose)
            .with_file(verbose)
            .with_line_number(verbose)
            .boxed(),
        LogFormat::Json => tfmt::layer()
            .json()
            .with_writer(io::stderr)
            .with_target(true)
            .with_file(verbose)
            .with_line_number(verbose)
            .boxed(),
    };

    let subscriber = tracing_subscriber::registry().with(env_filter).with(layer);
    tracing::subscriber::set_global_default(subscriber)?;
    Ok(())
}

/// Filter directive covering the roombook crates at `level`.
fn default_directive(level: Level) -> String {
    format!("roombook_core={level},roombook_client={level},roombook={level}")
}
