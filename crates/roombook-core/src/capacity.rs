//! Per-room capacity ledger.
//!
//! The ledger is an independently persisted counter per room. It is kept in
//! lockstep with bookings by [`BookingStore`](crate::store::BookingStore) but
//! is never rebuilt from the meeting list on load, so the two can drift if
//! storage is edited by hand. [`CapacityLedger::drift`] reports such drift
//! and [`CapacityLedger::derived`] rebuilds the counters.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{StoreError, StoreResult};
use crate::meeting::Meeting;
use crate::room::Room;

/// Default number of seats per room.
pub const DEFAULT_MAX_CAPACITY: u32 = 10;

/// Result of consuming one unit of capacity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Consumed {
    /// A unit was taken; `remaining` units are left.
    Taken { remaining: u32 },
    /// The room was already at zero; the counter is unchanged.
    Exhausted,
}

/// A room whose stored counter disagrees with its bookings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CapacityDrift {
    pub room: Room,
    /// Counter value as stored.
    pub stored: u32,
    /// `maximum - count(meetings in room)`, floored at zero.
    pub expected: u32,
}

/// Persisted value of a single capacity entry.
///
/// Capacities are written as strings (`"10"`); plain numbers are accepted on
/// read.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum PersistedCapacity {
    Text(String),
    Number(u64),
}

/// Remaining seats per room.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapacityLedger {
    maximum: u32,
    remaining: BTreeMap<Room, u32>,
}

impl Default for CapacityLedger {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_CAPACITY)
    }
}

impl CapacityLedger {
    /// Creates a ledger with every room at `maximum`.
    pub fn new(maximum: u32) -> Self {
        Self {
            maximum,
            remaining: Room::ALL.into_iter().map(|room| (room, maximum)).collect(),
        }
    }

    /// Rebuilds the ledger from the meeting list.
    pub fn derived(maximum: u32, meetings: &[Meeting]) -> Self {
        let mut ledger = Self::new(maximum);
        for room in Room::ALL {
            ledger.remaining.insert(room, expected(maximum, room, meetings));
        }
        ledger
    }

    /// Decodes the persisted JSON object.
    ///
    /// Rooms missing from the object start at `maximum`; unknown keys are
    /// ignored.
    pub fn from_json(raw: &str, maximum: u32, key: &str) -> StoreResult<Self> {
        let parsed: Option<BTreeMap<String, PersistedCapacity>> =
            serde_json::from_str(raw).map_err(|e| StoreError::corrupt(key, e))?;

        let mut ledger = Self::new(maximum);
        for (name, value) in parsed.unwrap_or_default() {
            let Ok(room) = name.parse::<Room>() else {
                warn!(room = %name, "Ignoring capacity for unknown room");
                continue;
            };
            let count = match value {
                PersistedCapacity::Text(text) => {
                    text.trim()
                        .parse::<u32>()
                        .map_err(|_| StoreError::InvalidCapacity {
                            room: name.clone(),
                            value: text.clone(),
                        })?
                }
                PersistedCapacity::Number(n) => {
                    u32::try_from(n).map_err(|_| StoreError::InvalidCapacity {
                        room: name.clone(),
                        value: n.to_string(),
                    })?
                }
            };
            ledger.remaining.insert(room, count);
        }
        Ok(ledger)
    }

    /// Encodes the ledger in the persisted layout.
    pub fn to_json(&self) -> StoreResult<String> {
        let persisted: BTreeMap<&str, String> = self
            .remaining
            .iter()
            .map(|(room, count)| (room.as_str(), count.to_string()))
            .collect();
        Ok(serde_json::to_string(&persisted)?)
    }

    /// Configured maximum per room.
    pub fn maximum(&self) -> u32 {
        self.maximum
    }

    /// Remaining seats in a room.
    pub fn remaining(&self, room: Room) -> u32 {
        self.remaining.get(&room).copied().unwrap_or(self.maximum)
    }

    /// Iterates rooms and their remaining seats in display order.
    pub fn iter(&self) -> impl Iterator<Item = (Room, u32)> + '_ {
        self.remaining.iter().map(|(room, count)| (*room, *count))
    }

    /// Takes one seat from a room.
    ///
    /// At zero the counter stays at zero and [`Consumed::Exhausted`] is
    /// returned; the caller decides whether that blocks the booking.
    pub fn consume(&mut self, room: Room) -> Consumed {
        let slot = self.remaining.entry(room).or_insert(self.maximum);
        if *slot > 0 {
            *slot -= 1;
            Consumed::Taken { remaining: *slot }
        } else {
            warn!(room = %room, "No more capacity for this room");
            Consumed::Exhausted
        }
    }

    /// Gives one seat back to a room.
    ///
    /// There is no upper bound check: releasing more than was consumed takes
    /// the counter past the maximum.
    pub fn release(&mut self, room: Room) -> u32 {
        let slot = self.remaining.entry(room).or_insert(self.maximum);
        *slot = slot.saturating_add(1);
        if *slot > self.maximum {
            warn!(room = %room, remaining = *slot, maximum = self.maximum, "Capacity exceeds maximum");
        }
        *slot
    }

    /// Lists rooms whose counter differs from `maximum - bookings`.
    pub fn drift(&self, meetings: &[Meeting]) -> Vec<CapacityDrift> {
        Room::ALL
            .into_iter()
            .filter_map(|room| {
                let stored = self.remaining(room);
                let expected = expected(self.maximum, room, meetings);
                (stored != expected).then_some(CapacityDrift {
                    room,
                    stored,
                    expected,
                })
            })
            .collect()
    }
}

fn expected(maximum: u32, room: Room, meetings: &[Meeting]) -> u32 {
    let booked = meetings.iter().filter(|m| m.room == room).count();
    maximum.saturating_sub(u32::try_from(booked).unwrap_or(u32::MAX))
}
