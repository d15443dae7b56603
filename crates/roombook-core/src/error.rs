//! Error types for parsing, persistence, and booking operations.

use std::io;

use thiserror::Error;

use crate::meeting::Meeting;
use crate::room::Room;
use crate::time::TimeOfDay;

/// Result type for storage operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Result type for booking operations.
pub type BookingResult<T> = Result<T, BookingError>;

/// Errors raised when a raw field value cannot be parsed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// Not one of the known room identifiers.
    #[error("unknown room: {0:?}")]
    Room(String),

    /// Not a `HH:MM` time of day.
    #[error("invalid time of day: {0:?} (expected HH:MM)")]
    Time(String),

    /// Not a `YYYY-MM-DD` calendar date.
    #[error("invalid date: {0:?} (expected YYYY-MM-DD)")]
    Date(String),

    /// Not one of the log output formats.
    #[error("unknown log format: {0:?} (expected compact, pretty or json)")]
    LogFormat(String),
}

/// Errors from the key-value store or from decoding what it holds.
#[derive(Debug, Error)]
pub enum StoreError {
    /// IO error reading or writing the backing file.
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// A persisted key holds something that is not the expected JSON shape.
    #[error("corrupt value under key {key:?}: {source}")]
    Corrupt {
        key: String,
        source: serde_json::Error,
    },

    /// A persisted capacity is not a non-negative integer.
    #[error("invalid capacity for {room}: {value:?}")]
    InvalidCapacity { room: String, value: String },

    /// Failed to encode state as JSON.
    #[error("serialization failed: {0}")]
    Encode(#[from] serde_json::Error),
}

impl StoreError {
    /// Creates a corrupt value error for the given key.
    pub fn corrupt(key: impl Into<String>, source: serde_json::Error) -> Self {
        Self::Corrupt {
            key: key.into(),
            source,
        }
    }
}

/// Errors returned by [`BookingStore`](crate::store::BookingStore) operations.
#[derive(Debug, Error)]
pub enum BookingError {
    /// The candidate overlaps a meeting already booked in the same room and date.
    #[error("conflicts with existing meeting: {existing}")]
    Conflict { existing: Box<Meeting> },

    /// No seats left in the room and the policy refuses to overbook.
    #[error("no more capacity for {room}")]
    CapacityExhausted { room: Room },

    /// The referenced meeting is not in the store.
    #[error("meeting not found: {meeting}")]
    NotFound { meeting: Box<Meeting> },

    /// End time is not after start time and the policy rejects such ranges.
    #[error("end time {end} is not after start time {start}")]
    InvalidRange { start: TimeOfDay, end: TimeOfDay },

    /// Persisting the new state failed; in-memory state is unchanged.
    #[error("storage error: {0}")]
    Storage(#[from] StoreError),
}

impl BookingError {
    pub(crate) fn conflict(existing: &Meeting) -> Self {
        Self::Conflict {
            existing: Box::new(existing.clone()),
        }
    }

    pub(crate) fn not_found(meeting: &Meeting) -> Self {
        Self::NotFound {
            meeting: Box::new(meeting.clone()),
        }
    }

    /// Returns true if this is a scheduling conflict.
    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::Conflict { .. })
    }
}
