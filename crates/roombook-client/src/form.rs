//! Booking form binding.
//!
//! [`MeetingForm`] holds the four raw field values as typed by the user.
//! [`BookingForm`] sits between those fields and the
//! [`BookingStore`]: it validates, checks for conflicts, books or updates,
//! and leaves a message on its [`FeedbackBanner`].
//!
//! Editing is explicit: [`BookingForm::begin_edit`] records the meeting as
//! the pending edit and returns the pre-filled fields; the next submit
//! replaces it. The meeting stays booked until then.

use std::time::{Duration, Instant};

use chrono::NaiveDate;
use thiserror::Error;
use tracing::debug;

use roombook_core::{
    Booking, BookingError, BookingStore, KeyValueStore, Meeting, ParseError, Room, TimeOfDay,
    format_total_time, parse_date,
};

use crate::error::{ClientError, ClientResult};
use crate::feedback::{Feedback, FeedbackBanner};

pub const BOOKED_MESSAGE: &str = "Meeting successfully booked!";
pub const UPDATED_MESSAGE: &str = "Meeting successfully updated!";
pub const CONFLICT_MESSAGE: &str = "There is a conflict with an existing meeting.";
pub const MISSING_FIELDS_MESSAGE: &str = "Please fill in all fields.";
pub const NO_CAPACITY_MESSAGE: &str = "No more capacity for this room.";

/// Errors found before the store is consulted.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// One or more required fields are empty.
    #[error("Please fill in all fields.")]
    MissingFields { fields: Vec<&'static str> },

    /// A field is filled but does not parse.
    #[error(transparent)]
    Invalid(#[from] ParseError),
}

/// Raw form fields.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MeetingForm {
    pub room: String,
    pub date: String,
    pub start: String,
    pub end: String,
}

/// Parsed form fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MeetingFields {
    pub room: Room,
    pub date: NaiveDate,
    pub start: TimeOfDay,
    pub end: TimeOfDay,
}

impl MeetingForm {
    pub fn new(
        room: impl Into<String>,
        date: impl Into<String>,
        start: impl Into<String>,
        end: impl Into<String>,
    ) -> Self {
        Self {
            room: room.into(),
            date: date.into(),
            start: start.into(),
            end: end.into(),
        }
    }

    /// Fields pre-filled from a stored meeting.
    pub fn from_meeting(meeting: &Meeting) -> Self {
        Self::new(
            meeting.room.as_str(),
            meeting.date.to_string(),
            meeting.start_time.to_string(),
            meeting.end_time.to_string(),
        )
    }

    /// Checks that every field is filled, then parses them.
    pub fn validate(&self) -> Result<MeetingFields, ValidationError> {
        let fields: Vec<&'static str> = [
            ("room", &self.room),
            ("date", &self.date),
            ("start", &self.start),
            ("end", &self.end),
        ]
        .into_iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(name, _)| name)
        .collect();
        if !fields.is_empty() {
            return Err(ValidationError::MissingFields { fields });
        }

        Ok(MeetingFields {
            room: self.room.parse()?,
            date: parse_date(&self.date)?,
            start: self.start.parse()?,
            end: self.end.parse()?,
        })
    }

    /// Duration preview shown once both times are filled in.
    pub fn total_time_preview(&self) -> Option<String> {
        let start = self.start.parse::<TimeOfDay>().ok()?;
        let end = self.end.parse::<TimeOfDay>().ok()?;
        Some(format_total_time(start, end))
    }
}

/// Whether submitting books a new meeting or saves an edit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormMode {
    Book,
    Update,
}

impl FormMode {
    /// Label of the submit action.
    pub fn submit_label(&self) -> &'static str {
        match self {
            Self::Book => "Book Meeting",
            Self::Update => "Save Changes",
        }
    }
}

/// Result of a successful submit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submitted {
    /// The stored booking.
    pub booking: Booking,
    /// Green banner message.
    pub feedback: Feedback,
    /// Blocking alert to show before the banner, if any.
    pub alert: Option<&'static str>,
}

/// Form controller over a booking store.
#[derive(Debug)]
pub struct BookingForm<S> {
    store: BookingStore<S>,
    pending_edit: Option<Meeting>,
    banner: FeedbackBanner,
}

impl<S: KeyValueStore> BookingForm<S> {
    /// Creates a controller in booking mode.
    pub fn new(store: BookingStore<S>, feedback_delay: Duration) -> Self {
        Self {
            store,
            pending_edit: None,
            banner: FeedbackBanner::new(feedback_delay),
        }
    }

    /// Current mode.
    pub fn mode(&self) -> FormMode {
        if self.pending_edit.is_some() {
            FormMode::Update
        } else {
            FormMode::Book
        }
    }

    /// The meeting being edited, if any.
    pub fn pending_edit(&self) -> Option<&Meeting> {
        self.pending_edit.as_ref()
    }

    /// The feedback banner.
    pub fn banner(&self) -> &FeedbackBanner {
        &self.banner
    }

    /// Hides the banner, once its message has been shown elsewhere.
    pub fn dismiss_feedback(&mut self) {
        self.banner.dismiss();
    }

    /// The underlying store.
    pub fn store(&self) -> &BookingStore<S> {
        &self.store
    }

    /// Consumes the controller, returning the store.
    pub fn into_store(self) -> BookingStore<S> {
        self.store
    }

    /// Switches to update mode for `meeting` and returns the pre-filled form.
    pub fn begin_edit(&mut self, meeting: &Meeting) -> ClientResult<MeetingForm> {
        let stored = self
            .store
            .list_meetings()
            .iter()
            .find(|m| m.same_identity(meeting))
            .cloned()
            .ok_or_else(|| BookingError::NotFound {
                meeting: Box::new(meeting.clone()),
            })?;
        debug!(meeting = %stored, "Editing meeting");
        let form = MeetingForm::from_meeting(&stored);
        self.pending_edit = Some(stored);
        Ok(form)
    }

    /// Leaves update mode without touching the store.
    pub fn cancel_edit(&mut self) {
        self.pending_edit = None;
    }

    /// Validates, checks conflicts, and books or saves the edit.
    ///
    /// The banner shows the outcome either way. In update mode the pending
    /// meeting is ignored by the conflict check, and a failed submit keeps
    /// the form in update mode.
    pub fn submit(&mut self, form: &MeetingForm, now: Instant) -> ClientResult<Submitted> {
        let result = self.try_submit(form);
        let feedback = match &result {
            Ok(submitted) => submitted.feedback.clone(),
            Err(err) => feedback_for(err),
        };
        self.banner.show(feedback, now);
        result
    }

    /// Deletes a meeting and gives its seat back.
    pub fn delete(&mut self, meeting: &Meeting, release_capacity: bool) -> ClientResult<Meeting> {
        let removed = self.store.delete_meeting(meeting, release_capacity)?;
        if self
            .pending_edit
            .as_ref()
            .is_some_and(|pending| pending.same_identity(&removed))
        {
            self.pending_edit = None;
        }
        Ok(removed)
    }

    fn try_submit(&mut self, form: &MeetingForm) -> ClientResult<Submitted> {
        let MeetingFields {
            room,
            date,
            start,
            end,
        } = form.validate()?;

        if let Some(existing) =
            self.store
                .find_conflict(room, date, start, end, self.pending_edit.as_ref())
        {
            return Err(BookingError::Conflict {
                existing: Box::new(existing.clone()),
            }
            .into());
        }

        let (booking, message) = match self.pending_edit.take() {
            Some(old) => match self.store.update_meeting(&old, room, date, start, end) {
                Ok(booking) => (booking, UPDATED_MESSAGE),
                Err(err) => {
                    self.pending_edit = Some(old);
                    return Err(err.into());
                }
            },
            None => (
                self.store.add_meeting(room, date, start, end)?,
                BOOKED_MESSAGE,
            ),
        };

        Ok(Submitted {
            alert: booking.warning.map(|_| NO_CAPACITY_MESSAGE),
            booking,
            feedback: Feedback::success(message),
        })
    }
}

/// Red banner message for a failed submit.
pub fn feedback_for(err: &ClientError) -> Feedback {
    match err {
        ClientError::Validation(ValidationError::MissingFields { .. }) => {
            Feedback::error(MISSING_FIELDS_MESSAGE)
        }
        ClientError::Booking(BookingError::Conflict { .. }) => Feedback::error(CONFLICT_MESSAGE),
        ClientError::Booking(BookingError::CapacityExhausted { .. }) => {
            Feedback::error(NO_CAPACITY_MESSAGE)
        }
        other => Feedback::error(other.to_string()),
    }
}
