//! Client configuration.
//!
//! All settings live in a single `config.toml` file at
//! `~/.config/roombook/config.toml` by default. Booking state is kept apart
//! in a storage file under the data directory.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use roombook_core::{BookingPolicy, DEFAULT_MAX_CAPACITY, LogFormat, OutputFormat, TracingConfig};

use crate::feedback::DEFAULT_FEEDBACK_DELAY;

/// Configuration for the roombook client.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Debug mode.
    pub debug: bool,

    /// Room settings.
    pub rooms: RoomSettings,

    /// Booking rules.
    pub booking: BookingSettings,

    /// Storage settings.
    pub storage: StorageSettings,

    /// Display settings.
    pub display: DisplaySettings,

    /// Logging settings.
    pub logging: LoggingSettings,
}

/// Room settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RoomSettings {
    /// Seats per room when nothing is booked.
    pub max_capacity: u32,
}

impl Default for RoomSettings {
    fn default() -> Self {
        Self {
            max_capacity: DEFAULT_MAX_CAPACITY,
        }
    }
}

/// Booking rules.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BookingSettings {
    /// Refuse bookings into a full room instead of warning.
    pub enforce_capacity: bool,

    /// Refuse ranges whose end is not after their start.
    pub reject_inverted_ranges: bool,
}

/// Storage settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageSettings {
    /// Path to the storage file.
    pub path: Option<PathBuf>,
}

/// Display settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplaySettings {
    /// How long feedback messages stay visible, in milliseconds.
    pub feedback_ms: u64,

    /// Default output of `list` and `capacity` (`tty` or `json`).
    pub format: OutputFormat,
}

impl Default for DisplaySettings {
    fn default() -> Self {
        Self {
            feedback_ms: u64::try_from(DEFAULT_FEEDBACK_DELAY.as_millis()).unwrap_or(3000),
            format: OutputFormat::default(),
        }
    }
}

/// Logging settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// Log line format: `compact`, `pretty` or `json`.
    pub format: LogFormat,

    /// Filter directive, e.g. `roombook_core=debug`; replaces `RUST_LOG`.
    pub filter: Option<String>,
}

impl ClientConfig {
    /// Loads configuration from the default path.
    pub fn load() -> Result<Self, String> {
        let path = Self::default_path();
        if path.exists() {
            Self::load_from(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Loads configuration from a specific path.
    pub fn load_from(path: &Path) -> Result<Self, String> {
        let content =
            std::fs::read_to_string(path).map_err(|e| format!("failed to read config: {}", e))?;
        toml::from_str(&content).map_err(|e| format!("failed to parse config: {}", e))
    }

    /// Returns the default configuration file path.
    pub fn default_path() -> PathBuf {
        Self::default_config_dir().join("config.toml")
    }

    /// Returns the default configuration directory.
    pub fn default_config_dir() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("roombook")
    }

    /// Returns the default data directory path.
    pub fn default_data_dir() -> PathBuf {
        dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("roombook")
    }

    /// Returns the storage file path, falling back to the data directory.
    pub fn storage_path(&self) -> PathBuf {
        self.storage
            .path
            .clone()
            .unwrap_or_else(|| Self::default_data_dir().join("storage.json"))
    }

    /// Booking rules for the store.
    pub fn policy(&self) -> BookingPolicy {
        BookingPolicy {
            max_capacity: self.rooms.max_capacity,
            enforce_capacity: self.booking.enforce_capacity,
            reject_inverted_ranges: self.booking.reject_inverted_ranges,
        }
    }

    /// Output format for `list`/`capacity`; `--json` always wins.
    pub fn output_format(&self, json: bool) -> OutputFormat {
        if json {
            OutputFormat::Json
        } else {
            self.display.format
        }
    }

    /// Logging setup, with `debug` and `log_format` from the command line.
    pub fn tracing(&self, debug: bool, log_format: Option<LogFormat>) -> TracingConfig {
        let base = if debug || self.debug {
            TracingConfig::cli_debug()
        } else {
            TracingConfig::cli()
        };
        let config = base.with_format(log_format.unwrap_or(self.logging.format));
        match &self.logging.filter {
            Some(filter) => config.with_filter(filter.clone()),
            None => config,
        }
    }

    /// How long feedback stays visible.
    pub fn feedback_delay(&self) -> Duration {
        Duration::from_millis(self.display.feedback_ms)
    }

    /// Checks values that parse but make no sense.
    pub fn validate(&self) -> Result<(), String> {
        if self.rooms.max_capacity == 0 {
            return Err("rooms.max_capacity must be at least 1".to_string());
        }
        if self.display.feedback_ms == 0 {
            return Err("display.feedback_ms must be at least 1".to_string());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = ClientConfig::default();
        assert_eq!(config.rooms.max_capacity, 10);
        assert_eq!(config.display.feedback_ms, 3000);
        assert_eq!(config.policy(), BookingPolicy::default());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn partial_file_keeps_defaults() {
        let config: ClientConfig = toml::from_str(
            r#"
            [booking]
            enforce_capacity = true

            [storage]
            path = "/tmp/rooms.json"
            "#,
        )
        .unwrap();

        assert!(config.booking.enforce_capacity);
        assert!(!config.booking.reject_inverted_ranges);
        assert_eq!(config.rooms.max_capacity, 10);
        assert_eq!(config.storage_path(), PathBuf::from("/tmp/rooms.json"));
        assert!(config.policy().enforce_capacity);
    }

    #[test]
    fn load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "debug = true\n[rooms]\nmax_capacity = 4\n").unwrap();

        let config = ClientConfig::load_from(&path).unwrap();
        assert!(config.debug);
        assert_eq!(config.policy().max_capacity, 4);
    }

    #[test]
    fn load_from_reports_parse_errors() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[rooms\n").unwrap();

        let err = ClientConfig::load_from(&path).unwrap_err();
        assert!(err.starts_with("failed to parse config"));
    }

    #[test]
    fn roundtrip_through_toml() {
        let mut config = ClientConfig::default();
        config.display.feedback_ms = 1500;
        let text = toml::to_string_pretty(&config).unwrap();
        let parsed: ClientConfig = toml::from_str(&text).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn display_and_logging_sections() {
        let config: ClientConfig = toml::from_str(
            r#"
            [display]
            format = "json"

            [logging]
            format = "pretty"
            filter = "roombook_core=trace"
            "#,
        )
        .unwrap();

        assert_eq!(config.display.feedback_ms, 3000);
        assert_eq!(config.output_format(false), OutputFormat::Json);
        assert_eq!(ClientConfig::default().output_format(false), OutputFormat::Tty);
        assert_eq!(ClientConfig::default().output_format(true), OutputFormat::Json);

        let tracing = config.tracing(false, None);
        assert_eq!(tracing.format, LogFormat::Pretty);
        assert_eq!(tracing.filter.as_deref(), Some("roombook_core=trace"));
        assert!(!tracing.verbose);
    }

    #[test]
    fn command_line_log_format_wins() {
        let config = ClientConfig::default();
        let tracing = config.tracing(true, Some(LogFormat::Json));
        assert_eq!(tracing, TracingConfig::cli_debug().with_format(LogFormat::Json));
        assert_eq!(config.tracing(false, None), TracingConfig::cli());
    }

    #[test]
    fn validate_rejects_zero_capacity() {
        let mut config = ClientConfig::default();
        config.rooms.max_capacity = 0;
        assert!(config.validate().is_err());
    }
}
