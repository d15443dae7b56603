//! Time types for bookings.
//!
//! This module provides [`TimeOfDay`], a minute-precision clock time with a
//! total ordering, and [`TimeRange`], a same-day half-open interval used for
//! conflict detection and duration display.

use std::fmt;
use std::str::FromStr;

use chrono::{NaiveDate, NaiveTime, Timelike};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::ParseError;

/// Format used for persisted and displayed times.
const TIME_FORMAT: &str = "%H:%M";

/// Format used for persisted and displayed dates.
const DATE_FORMAT: &str = "%Y-%m-%d";

/// A clock time with minute precision.
///
/// Always rendered zero-padded (`09:05`), so the textual and the numeric
/// ordering agree. Parsing accepts `H:MM`, `HH:MM` and `HH:MM:SS` (seconds
/// are dropped).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TimeOfDay(NaiveTime);

impl TimeOfDay {
    /// Creates a time from hours and minutes, or `None` if out of range.
    pub fn from_hm(hour: u32, minute: u32) -> Option<Self> {
        NaiveTime::from_hms_opt(hour, minute, 0).map(Self)
    }

    /// Hours component (0-23).
    pub fn hour(&self) -> u32 {
        self.0.hour()
    }

    /// Minutes component (0-59).
    pub fn minute(&self) -> u32 {
        self.0.minute()
    }

    /// Minutes elapsed since midnight.
    pub fn minutes_since_midnight(&self) -> i64 {
        i64::from(self.hour()) * 60 + i64::from(self.minute())
    }

    /// Signed number of minutes from `self` until `end` on the same day.
    ///
    /// Negative when `end` is earlier than `self`.
    pub fn minutes_until(&self, end: TimeOfDay) -> i64 {
        end.minutes_since_midnight() - self.minutes_since_midnight()
    }
}

impl fmt::Display for TimeOfDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format(TIME_FORMAT))
    }
}

impl FromStr for TimeOfDay {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        NaiveTime::parse_from_str(trimmed, TIME_FORMAT)
            .or_else(|_| NaiveTime::parse_from_str(trimmed, "%H:%M:%S"))
            .ok()
            .and_then(|t| Self::from_hm(t.hour(), t.minute()))
            .ok_or_else(|| ParseError::Time(s.to_string()))
    }
}

impl Serialize for TimeOfDay {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for TimeOfDay {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// Parses a `YYYY-MM-DD` calendar date.
pub fn parse_date(s: &str) -> Result<NaiveDate, ParseError> {
    NaiveDate::parse_from_str(s.trim(), DATE_FORMAT).map_err(|_| ParseError::Date(s.to_string()))
}

/// Formats the duration between two same-day clock times.
///
/// The output is `"{H} hour(s) {M} minute(s)"`, where `H` is the floor of the
/// minute count divided by 60 and `M` keeps the sign of the minute count.
/// A range that ends before it starts is not rejected here: 09:00 to 08:15
/// renders as `-1 hour(s) -45 minute(s)`.
pub fn format_total_time(start: TimeOfDay, end: TimeOfDay) -> String {
    let minutes = start.minutes_until(end);
    format!(
        "{} hour(s) {} minute(s)",
        minutes.div_euclid(60),
        minutes % 60
    )
}

/// A same-day time range.
///
/// Represents a half-open interval `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeRange {
    /// Start of the range (inclusive).
    pub start: TimeOfDay,
    /// End of the range (exclusive).
    pub end: TimeOfDay,
}

impl TimeRange {
    /// Creates a new range. No ordering is enforced between the endpoints.
    pub fn new(start: TimeOfDay, end: TimeOfDay) -> Self {
        Self { start, end }
    }

    /// Returns true if the range ends after it starts.
    pub fn is_positive(&self) -> bool {
        self.end > self.start
    }

    /// Checks if two ranges overlap.
    ///
    /// They overlap if this range starts before the other ends AND ends after
    /// the other starts. Touching ranges (`a.end == b.start`) do not overlap.
    pub fn overlaps(&self, other: &TimeRange) -> bool {
        self.start < other.end && self.end > other.start
    }

    /// Duration display string, see [`format_total_time`].
    pub fn total_time(&self) -> String {
        format_total_time(self.start, self.end)
    }
}
