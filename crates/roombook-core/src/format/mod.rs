//! Output formatting for bookings.
//!
//! This module provides formatters for displaying the meeting list and the
//! capacity ledger:
//! - **TTY**: one labeled row per meeting, numbered for edit/delete
//! - **JSON**: machine-readable meetings and capacities
//!
//! # Example
//!
//! ```rust
//! use roombook_core::format::{FormatOptions, OutputFormatter};
//!
//! let formatter = OutputFormatter::new(FormatOptions::default());
//! assert_eq!(formatter.format_meetings_tty(&[]), "No meetings booked.");
//! ```

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::capacity::{CapacityDrift, CapacityLedger};
use crate::meeting::Meeting;

/// The output format for `list` and `capacity`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputFormat {
    /// Human-readable terminal output.
    #[default]
    Tty,
    /// Machine-readable JSON output.
    Json,
}

/// Configuration options for output formatting.
#[derive(Debug, Clone)]
pub struct FormatOptions {
    /// Prefix each row with its 1-based position.
    pub numbered: bool,
    /// Text shown when nothing is booked.
    pub empty_text: String,
    /// Show `remaining/maximum` instead of just `remaining`.
    pub show_maximum: bool,
}

impl Default for FormatOptions {
    fn default() -> Self {
        Self {
            numbered: true,
            empty_text: "No meetings booked.".to_string(),
            show_maximum: true,
        }
    }
}

/// JSON document for `list --json`.
#[derive(Debug, Clone, Serialize)]
pub struct JsonOutput<'a> {
    /// Meetings in insertion order.
    pub meetings: &'a [Meeting],
    /// Remaining seats keyed by room identifier.
    pub capacities: BTreeMap<&'static str, u32>,
    /// Seats per room when nothing is booked.
    pub max_capacity: u32,
    /// Rooms whose counter disagrees with the bookings.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub drift: Vec<CapacityDrift>,
}

impl<'a> JsonOutput<'a> {
    /// Builds the document from a meeting list and its ledger.
    pub fn new(meetings: &'a [Meeting], ledger: &CapacityLedger) -> Self {
        Self {
            meetings,
            capacities: ledger.iter().map(|(room, n)| (room.as_str(), n)).collect(),
            max_capacity: ledger.maximum(),
            drift: ledger.drift(meetings),
        }
    }
}

/// Formats meetings and capacities for display.
#[derive(Debug, Clone, Default)]
pub struct OutputFormatter {
    options: FormatOptions,
}

impl OutputFormatter {
    /// Creates a formatter.
    pub fn new(options: FormatOptions) -> Self {
        Self { options }
    }

    /// Creates a formatter with default options.
    pub fn with_defaults() -> Self {
        Self::default()
    }

    /// Renders a single list row.
    pub fn format_row(&self, position: usize, meeting: &Meeting) -> String {
        if self.options.numbered {
            format!("{}. {}", position + 1, meeting)
        } else {
            meeting.to_string()
        }
    }

    /// Renders the meeting list, one row per line.
    pub fn format_meetings_tty(&self, meetings: &[Meeting]) -> String {
        if meetings.is_empty() {
            return self.options.empty_text.clone();
        }
        meetings
            .iter()
            .enumerate()
            .map(|(i, m)| self.format_row(i, m))
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Renders remaining capacity per room.
    pub fn format_capacities_tty(&self, ledger: &CapacityLedger) -> String {
        ledger
            .iter()
            .map(|(room, remaining)| {
                if self.options.show_maximum {
                    format!("{}: {}/{}", room.label(), remaining, ledger.maximum())
                } else {
                    format!("{}: {}", room.label(), remaining)
                }
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Renders the meeting list in `format`.
    ///
    /// JSON output carries the capacities too, so one document describes the
    /// whole store.
    pub fn format_meetings(
        &self,
        format: OutputFormat,
        meetings: &[Meeting],
        ledger: &CapacityLedger,
    ) -> Result<String, serde_json::Error> {
        match format {
            OutputFormat::Tty => Ok(self.format_meetings_tty(meetings)),
            OutputFormat::Json => self.format_json(meetings, ledger),
        }
    }

    /// Renders remaining capacity per room in `format`.
    pub fn format_capacities(
        &self,
        format: OutputFormat,
        ledger: &CapacityLedger,
    ) -> Result<String, serde_json::Error> {
        match format {
            OutputFormat::Tty => Ok(self.format_capacities_tty(ledger)),
            OutputFormat::Json => {
                let capacities: BTreeMap<&str, u32> =
                    ledger.iter().map(|(room, n)| (room.as_str(), n)).collect();
                serde_json::to_string_pretty(&capacities)
            }
        }
    }

    /// Renders meetings and capacities as pretty JSON.
    pub fn format_json(
        &self,
        meetings: &[Meeting],
        ledger: &CapacityLedger,
    ) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(&JsonOutput::new(meetings, ledger))
    }
}
