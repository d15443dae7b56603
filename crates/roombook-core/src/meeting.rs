//! Meeting records.
//!
//! A [`Meeting`] is one booking of a room for a time range on a date. It has
//! no surrogate key: its identity is the [`MeetingKey`] tuple of room, date,
//! start and end.

use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::room::Room;
use crate::time::{TimeOfDay, TimeRange, format_total_time};

/// The identity of a meeting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MeetingKey {
    pub room: Room,
    pub date: NaiveDate,
    pub start_time: TimeOfDay,
    pub end_time: TimeOfDay,
}

/// A booked meeting.
///
/// Field names follow the persisted layout (`startTime`, `endTime`,
/// `totalTime`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Meeting {
    /// The booked room.
    pub room: Room,
    /// Calendar date of the meeting.
    pub date: NaiveDate,
    /// Start time (inclusive).
    pub start_time: TimeOfDay,
    /// End time (exclusive).
    pub end_time: TimeOfDay,
    /// Display string for the duration, derived when the meeting is created.
    pub total_time: String,
}

impl Meeting {
    /// Creates a meeting, deriving its duration display string.
    pub fn new(room: Room, date: NaiveDate, start_time: TimeOfDay, end_time: TimeOfDay) -> Self {
        Self {
            room,
            date,
            start_time,
            end_time,
            total_time: format_total_time(start_time, end_time),
        }
    }

    /// Returns the identity tuple of this meeting.
    pub fn key(&self) -> MeetingKey {
        MeetingKey {
            room: self.room,
            date: self.date,
            start_time: self.start_time,
            end_time: self.end_time,
        }
    }

    /// Returns true if both meetings share room, date, start and end.
    ///
    /// `total_time` is display data and takes no part in identity.
    pub fn same_identity(&self, other: &Meeting) -> bool {
        self.key() == other.key()
    }

    /// Returns the time range of this meeting.
    pub fn range(&self) -> TimeRange {
        TimeRange::new(self.start_time, self.end_time)
    }

    /// Checks whether a candidate booking clashes with this meeting.
    ///
    /// A clash needs the same room and date, and overlapping half-open time
    /// ranges.
    pub fn conflicts_with(&self, room: Room, date: NaiveDate, range: &TimeRange) -> bool {
        self.room == room && self.date == date && self.range().overlaps(range)
    }
}

impl fmt::Display for Meeting {
    /// Renders the list row: `conference room - 2024-01-01 - 09:00 to 10:00 (1 hour(s) 0 minute(s))`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} - {} - {} to {} ({})",
            self.room.label(),
            self.date,
            self.start_time,
            self.end_time,
            self.total_time
        )
    }
}
