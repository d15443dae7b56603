//! The booking store.
//!
//! [`BookingStore`] is the single owner of the meeting list and the capacity
//! ledger. Every mutation is built on a copy of the state, committed to the
//! [`KeyValueStore`] as one write covering both keys, and only then swapped
//! in. A failed write leaves the in-memory state untouched.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::capacity::{CapacityDrift, CapacityLedger, Consumed, DEFAULT_MAX_CAPACITY};
use crate::error::{BookingError, BookingResult, StoreError, StoreResult};
use crate::meeting::Meeting;
use crate::room::Room;
use crate::storage::{CAPACITIES_KEY, KeyValueStore, MEETINGS_KEY};
use crate::time::{TimeOfDay, TimeRange};

/// Rules applied by the booking operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BookingPolicy {
    /// Seats per room when nothing is booked.
    pub max_capacity: u32,
    /// Refuse bookings into a room with no capacity left instead of warning.
    pub enforce_capacity: bool,
    /// Refuse ranges whose end is not after their start.
    pub reject_inverted_ranges: bool,
}

impl Default for BookingPolicy {
    fn default() -> Self {
        Self {
            max_capacity: DEFAULT_MAX_CAPACITY,
            enforce_capacity: false,
            reject_inverted_ranges: false,
        }
    }
}

/// Non-fatal notice attached to a successful booking.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CapacityWarning {
    /// The room had no capacity left; the booking went through anyway.
    Exhausted { room: Room },
}

/// Outcome of a successful add or update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Booking {
    /// The meeting as stored.
    pub meeting: Meeting,
    /// Set when the room was already at zero capacity.
    pub warning: Option<CapacityWarning>,
}

/// Meetings and capacities, backed by a key-value store.
#[derive(Debug)]
pub struct BookingStore<S> {
    storage: S,
    policy: BookingPolicy,
    meetings: Vec<Meeting>,
    capacity: CapacityLedger,
    needs_repair: bool,
}

impl<S: KeyValueStore> BookingStore<S> {
    /// Loads meetings and capacities from `storage`.
    ///
    /// Missing keys start empty and at full capacity. Values that do not
    /// decode are reported as [`StoreError::Corrupt`].
    pub fn load(storage: S, policy: BookingPolicy) -> StoreResult<Self> {
        let meetings = load_meetings(&storage)?;
        let capacity = match storage.get(CAPACITIES_KEY)? {
            Some(raw) => CapacityLedger::from_json(&raw, policy.max_capacity, CAPACITIES_KEY)?,
            None => CapacityLedger::new(policy.max_capacity),
        };
        Ok(Self::assemble(storage, policy, meetings, capacity, false))
    }

    /// Like [`load`](Self::load), but unreadable capacities are replaced by
    /// values derived from the meetings instead of failing.
    ///
    /// The replacement is only in memory until [`reconcile`](Self::reconcile)
    /// writes it back. Corrupt meetings are still an error.
    pub fn load_for_repair(storage: S, policy: BookingPolicy) -> StoreResult<Self> {
        let meetings = load_meetings(&storage)?;
        let (capacity, needs_repair) = match storage.get(CAPACITIES_KEY)? {
            Some(raw) => match CapacityLedger::from_json(&raw, policy.max_capacity, CAPACITIES_KEY)
            {
                Ok(ledger) => (ledger, false),
                Err(err @ (StoreError::Corrupt { .. } | StoreError::InvalidCapacity { .. })) => {
                    warn!(error = %err, "Discarding unreadable capacities");
                    (CapacityLedger::derived(policy.max_capacity, &meetings), true)
                }
                Err(err) => return Err(err),
            },
            None => (CapacityLedger::new(policy.max_capacity), false),
        };
        Ok(Self::assemble(storage, policy, meetings, capacity, needs_repair))
    }

    fn assemble(
        storage: S,
        policy: BookingPolicy,
        meetings: Vec<Meeting>,
        capacity: CapacityLedger,
        needs_repair: bool,
    ) -> Self {
        let store = Self {
            storage,
            policy,
            meetings,
            capacity,
            needs_repair,
        };
        for drift in store.drift() {
            warn!(
                room = %drift.room,
                stored = drift.stored,
                expected = drift.expected,
                "Capacity does not match bookings"
            );
        }
        debug!(meetings = store.meetings.len(), "Loaded booking store");
        store
    }

    /// Books a room.
    ///
    /// Fails with [`BookingError::Conflict`] if the range overlaps a meeting
    /// in the same room and date, or if the identical meeting already exists.
    /// Takes one unit of the room's capacity; at zero the booking still goes
    /// through with a [`CapacityWarning`] unless the policy enforces capacity.
    pub fn add_meeting(
        &mut self,
        room: Room,
        date: NaiveDate,
        start: TimeOfDay,
        end: TimeOfDay,
    ) -> BookingResult<Booking> {
        self.check_range(start, end)?;
        let meeting = Meeting::new(room, date, start, end);
        if let Some(existing) = self.find_conflict(room, date, start, end, None) {
            debug!(%meeting, %existing, "Booking conflicts");
            return Err(BookingError::conflict(existing));
        }

        let mut capacity = self.capacity.clone();
        let warning = self.consume(&mut capacity, room)?;
        let mut meetings = self.meetings.clone();
        meetings.push(meeting.clone());
        self.commit(meetings, capacity)?;

        info!(%meeting, remaining = self.capacity.remaining(room), "Booked meeting");
        Ok(Booking { meeting, warning })
    }

    /// Replaces `old` with a meeting built from the new fields.
    ///
    /// The new fields are not checked for conflicts; callers check first
    /// with [`check_conflicts_excluding`](Self::check_conflicts_excluding).
    /// Moving to another room releases a unit to the old room and takes one
    /// from the new room.
    pub fn update_meeting(
        &mut self,
        old: &Meeting,
        room: Room,
        date: NaiveDate,
        start: TimeOfDay,
        end: TimeOfDay,
    ) -> BookingResult<Booking> {
        self.check_range(start, end)?;
        let position = self
            .position(old)
            .ok_or_else(|| BookingError::not_found(old))?;

        let meeting = Meeting::new(room, date, start, end);
        let mut meetings = self.meetings.clone();
        meetings.remove(position);
        meetings.push(meeting.clone());

        let mut capacity = self.capacity.clone();
        let mut warning = None;
        if old.room != room {
            capacity.release(old.room);
            warning = self.consume(&mut capacity, room)?;
        }
        self.commit(meetings, capacity)?;

        info!(old = %old, new = %meeting, "Updated meeting");
        Ok(Booking { meeting, warning })
    }

    /// Removes the meeting with the same identity as `meeting`.
    ///
    /// With `release_capacity` the room gets one unit back, with no upper
    /// bound check.
    pub fn delete_meeting(
        &mut self,
        meeting: &Meeting,
        release_capacity: bool,
    ) -> BookingResult<Meeting> {
        let position = self
            .position(meeting)
            .ok_or_else(|| BookingError::not_found(meeting))?;

        let mut meetings = self.meetings.clone();
        let removed = meetings.remove(position);
        let mut capacity = self.capacity.clone();
        if release_capacity {
            capacity.release(removed.room);
        }
        self.commit(meetings, capacity)?;

        info!(meeting = %removed, release_capacity, "Deleted meeting");
        Ok(removed)
    }

    /// Returns true if the candidate does not clash with any stored meeting.
    pub fn check_conflicts(
        &self,
        room: Room,
        date: NaiveDate,
        start: TimeOfDay,
        end: TimeOfDay,
    ) -> bool {
        self.find_conflict(room, date, start, end, None).is_none()
    }

    /// Like [`check_conflicts`](Self::check_conflicts), ignoring `exclude`.
    ///
    /// Used when editing, so a meeting never clashes with itself.
    pub fn check_conflicts_excluding(
        &self,
        room: Room,
        date: NaiveDate,
        start: TimeOfDay,
        end: TimeOfDay,
        exclude: &Meeting,
    ) -> bool {
        self.find_conflict(room, date, start, end, Some(exclude))
            .is_none()
    }

    /// Returns the first stored meeting that clashes with the candidate.
    pub fn find_conflict(
        &self,
        room: Room,
        date: NaiveDate,
        start: TimeOfDay,
        end: TimeOfDay,
        exclude: Option<&Meeting>,
    ) -> Option<&Meeting> {
        let range = TimeRange::new(start, end);
        let candidate = Meeting::new(room, date, start, end);
        self.meetings
            .iter()
            .filter(|m| exclude.is_none_or(|ex| !m.same_identity(ex)))
            .find(|m| m.conflicts_with(room, date, &range) || m.same_identity(&candidate))
    }

    /// Meetings in insertion order.
    pub fn list_meetings(&self) -> &[Meeting] {
        &self.meetings
    }

    /// Remaining seats in a room.
    pub fn capacity(&self, room: Room) -> u32 {
        self.capacity.remaining(room)
    }

    /// The capacity ledger.
    pub fn capacities(&self) -> &CapacityLedger {
        &self.capacity
    }

    /// The active policy.
    pub fn policy(&self) -> &BookingPolicy {
        &self.policy
    }

    /// Rooms whose counter disagrees with the bookings.
    pub fn drift(&self) -> Vec<CapacityDrift> {
        self.capacity.drift(&self.meetings)
    }

    /// True when the persisted capacities could not be read and were
    /// replaced in memory by [`load_for_repair`](Self::load_for_repair).
    pub fn needs_repair(&self) -> bool {
        self.needs_repair
    }

    /// Rebuilds every counter from the bookings and persists the result.
    ///
    /// Returns the drift that was corrected. Unreadable capacities are
    /// rewritten even when no counter drifted.
    pub fn reconcile(&mut self) -> BookingResult<Vec<CapacityDrift>> {
        let drift = self.drift();
        if drift.is_empty() && !self.needs_repair {
            return Ok(drift);
        }
        let capacity = CapacityLedger::derived(self.policy.max_capacity, &self.meetings);
        self.commit(self.meetings.clone(), capacity)?;
        self.needs_repair = false;
        info!(rooms = drift.len(), "Reconciled capacities");
        Ok(drift)
    }

    /// The underlying key-value store.
    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// Consumes the booking store, returning the key-value store.
    pub fn into_storage(self) -> S {
        self.storage
    }

    fn position(&self, meeting: &Meeting) -> Option<usize> {
        self.meetings.iter().position(|m| m.same_identity(meeting))
    }

    fn check_range(&self, start: TimeOfDay, end: TimeOfDay) -> BookingResult<()> {
        if self.policy.reject_inverted_ranges && end <= start {
            return Err(BookingError::InvalidRange { start, end });
        }
        Ok(())
    }

    fn consume(
        &self,
        capacity: &mut CapacityLedger,
        room: Room,
    ) -> BookingResult<Option<CapacityWarning>> {
        if self.policy.enforce_capacity && capacity.remaining(room) == 0 {
            return Err(BookingError::CapacityExhausted { room });
        }
        Ok(match capacity.consume(room) {
            Consumed::Taken { .. } => None,
            Consumed::Exhausted => Some(CapacityWarning::Exhausted { room }),
        })
    }

    fn commit(&mut self, meetings: Vec<Meeting>, capacity: CapacityLedger) -> StoreResult<()> {
        let meetings_json = serde_json::to_string(&meetings)?;
        let capacity_json = capacity.to_json()?;
        self.storage.commit(&[
            (MEETINGS_KEY, meetings_json),
            (CAPACITIES_KEY, capacity_json),
        ])?;
        self.meetings = meetings;
        self.capacity = capacity;
        debug!(meetings = self.meetings.len(), "Committed booking state");
        Ok(())
    }
}

fn load_meetings(storage: &impl KeyValueStore) -> StoreResult<Vec<Meeting>> {
    match storage.get(MEETINGS_KEY)? {
        Some(raw) => Ok(serde_json::from_str::<Option<Vec<Meeting>>>(&raw)
            .map_err(|e| StoreError::corrupt(MEETINGS_KEY, e))?
            .unwrap_or_default()),
        None => Ok(Vec::new()),
    }
}
