//! Booking commands: book, edit, delete, list, capacity, check, reconcile.

use std::io::Write;
use std::path::PathBuf;
use std::time::Instant;

use tracing::{debug, info};

use roombook_core::{
    BookingError, BookingStore, FileStore, KeyValueStore, Meeting, OutputFormat, OutputFormatter,
    StoreError,
};

use crate::cli::{Cli, EditArgs, MeetingArgs};
use crate::commands::Output;
use crate::config::ClientConfig;
use crate::error::{ClientError, ClientResult};
use crate::feedback::Feedback;
use crate::form::{BookingForm, MeetingForm};

/// Storage path from the command line, falling back to the configuration.
pub fn storage_path(cli: &Cli, config: &ClientConfig) -> PathBuf {
    cli.storage.clone().unwrap_or_else(|| config.storage_path())
}

/// Opens the file-backed booking store.
pub fn open_store(cli: &Cli, config: &ClientConfig) -> ClientResult<BookingStore<FileStore>> {
    let path = storage_path(cli, config);
    debug!(path = %path.display(), "Opening booking store");
    let storage = FileStore::open(path)?;
    Ok(BookingStore::load(storage, config.policy())?)
}

/// Opens the store for `reconcile`, tolerating unreadable capacities.
pub fn open_store_for_repair(
    cli: &Cli,
    config: &ClientConfig,
) -> ClientResult<BookingStore<FileStore>> {
    let path = storage_path(cli, config);
    debug!(path = %path.display(), "Opening booking store for repair");
    let storage = FileStore::open(path)?;
    Ok(BookingStore::load_for_repair(storage, config.policy())?)
}

impl From<&MeetingArgs> for MeetingForm {
    fn from(args: &MeetingArgs) -> Self {
        MeetingForm::new(&args.room, &args.date, &args.start, &args.end)
    }
}

/// Books a new meeting.
pub fn book<S: KeyValueStore, W: Write>(
    ctl: &mut BookingForm<S>,
    args: &MeetingArgs,
    out: &mut Output<W>,
) -> ClientResult<()> {
    submit(ctl, &MeetingForm::from(args), out)
}

/// Edits the meeting at a 1-based list position.
pub fn edit<S: KeyValueStore, W: Write>(
    ctl: &mut BookingForm<S>,
    position: usize,
    changes: &EditArgs,
    out: &mut Output<W>,
) -> ClientResult<()> {
    let meeting = row(ctl.store().list_meetings(), position)?;
    let mut form = ctl.begin_edit(&meeting)?;
    debug!(mode = ctl.mode().submit_label(), %meeting, "Form switched to edit");

    if let Some(room) = &changes.room {
        form.room.clone_from(room);
    }
    if let Some(date) = &changes.date {
        form.date.clone_from(date);
    }
    if let Some(start) = &changes.start {
        form.start.clone_from(start);
    }
    if let Some(end) = &changes.end {
        form.end.clone_from(end);
    }

    let result = submit(ctl, &form, out);
    if result.is_err() {
        ctl.cancel_edit();
    }
    result
}

/// Deletes the meeting at a 1-based list position.
pub fn delete<S: KeyValueStore, W: Write>(
    ctl: &mut BookingForm<S>,
    position: usize,
    keep_capacity: bool,
    out: &mut Output<W>,
) -> ClientResult<()> {
    let meeting = row(ctl.store().list_meetings(), position)?;
    let removed = ctl.delete(&meeting, !keep_capacity)?;
    out.feedback(&Feedback::success(format!("Deleted: {}", removed)))?;
    Ok(())
}

/// Prints the meeting list.
pub fn list<S: KeyValueStore, W: Write>(
    store: &BookingStore<S>,
    format: OutputFormat,
    out: &mut Output<W>,
) -> ClientResult<()> {
    let rendered = OutputFormatter::with_defaults()
        .format_meetings(format, store.list_meetings(), store.capacities())
        .map_err(StoreError::from)?;
    out.line(rendered)?;
    Ok(())
}

/// Prints remaining capacity per room.
pub fn capacity<S: KeyValueStore, W: Write>(
    store: &BookingStore<S>,
    format: OutputFormat,
    out: &mut Output<W>,
) -> ClientResult<()> {
    let rendered = OutputFormatter::with_defaults()
        .format_capacities(format, store.capacities())
        .map_err(StoreError::from)?;
    out.line(rendered)?;
    if format == OutputFormat::Tty {
        for drift in store.drift() {
            out.line(format!(
                "warning: {} has {} left but {} expected from bookings (run `roombook reconcile`)",
                drift.room.label(),
                drift.stored,
                drift.expected
            ))?;
        }
    }
    Ok(())
}

/// Reports whether a booking would conflict.
///
/// A conflict is returned as an error so the exit status reflects it.
pub fn check<S: KeyValueStore, W: Write>(
    store: &BookingStore<S>,
    args: &MeetingArgs,
    out: &mut Output<W>,
) -> ClientResult<()> {
    let form = MeetingForm::from(args);
    let fields = form.validate()?;
    match store.find_conflict(fields.room, fields.date, fields.start, fields.end, None) {
        Some(existing) => Err(BookingError::Conflict {
            existing: Box::new(existing.clone()),
        }
        .into()),
        None => {
            out.feedback(&Feedback::success("No conflict."))?;
            if let Some(total) = form.total_time_preview() {
                out.line(format!("duration: {}", total))?;
            }
            Ok(())
        }
    }
}

/// Rebuilds capacities from the bookings.
pub fn reconcile<S: KeyValueStore, W: Write>(
    store: &mut BookingStore<S>,
    out: &mut Output<W>,
) -> ClientResult<()> {
    let repaired = store.needs_repair();
    let fixed = store.reconcile()?;
    if repaired {
        out.line("Rewrote unreadable capacities from bookings.")?;
    } else if fixed.is_empty() {
        out.line("Capacities already match bookings.")?;
    }
    for drift in &fixed {
        info!(room = %drift.room, from = drift.stored, to = drift.expected, "Capacity reconciled");
        out.line(format!(
            "{}: {} -> {}",
            drift.room.label(),
            drift.stored,
            drift.expected
        ))?;
    }
    Ok(())
}

fn submit<S: KeyValueStore, W: Write>(
    ctl: &mut BookingForm<S>,
    form: &MeetingForm,
    out: &mut Output<W>,
) -> ClientResult<()> {
    let submitted = ctl.submit(form, Instant::now())?;
    if let Some(alert) = submitted.alert {
        out.feedback(&Feedback::error(alert))?;
    }
    if let Some(feedback) = ctl.banner().last() {
        out.feedback(feedback)?;
    }
    ctl.dismiss_feedback();
    out.line(&submitted.booking.meeting)?;
    Ok(())
}

fn row(meetings: &[Meeting], position: usize) -> ClientResult<Meeting> {
    position
        .checked_sub(1)
        .and_then(|index| meetings.get(index))
        .cloned()
        .ok_or(ClientError::NoSuchRow {
            position,
            len: meetings.len(),
        })
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use roombook_core::{BookingPolicy, MemoryStore, Room};

    use super::*;

    fn controller() -> BookingForm<MemoryStore> {
        let store = BookingStore::load(MemoryStore::new(), BookingPolicy::default()).unwrap();
        BookingForm::new(store, Duration::from_millis(3000))
    }

    fn args(room: &str, start: &str, end: &str) -> MeetingArgs {
        MeetingArgs {
            room: room.to_string(),
            date: "2024-01-01".to_string(),
            start: start.to_string(),
            end: end.to_string(),
        }
    }

    fn output() -> Output<Vec<u8>> {
        Output::new(Vec::new(), false)
    }

    fn text(out: Output<Vec<u8>>) -> String {
        String::from_utf8(out.into_inner()).unwrap()
    }

    #[test]
    fn book_prints_feedback_and_row() {
        let mut ctl = controller();
        let mut out = output();
        book(&mut ctl, &args("conference-room", "09:00", "10:00"), &mut out).unwrap();

        insta::assert_snapshot!(text(out).trim_end(), @r"
Meeting successfully booked!
conference room - 2024-01-01 - 09:00 to 10:00 (1 hour(s) 0 minute(s))
");
    }

    #[test]
    fn book_conflict_is_an_error() {
        let mut ctl = controller();
        book(&mut ctl, &args("board-room", "09:00", "10:00"), &mut output()).unwrap();
        let err = book(&mut ctl, &args("board-room", "09:59", "10:30"), &mut output()).unwrap_err();
        assert!(matches!(err, ClientError::Booking(BookingError::Conflict { .. })));
    }

    #[test]
    fn edit_applies_changes() {
        let mut ctl = controller();
        book(&mut ctl, &args("conference-room", "09:00", "10:00"), &mut output()).unwrap();

        let changes = EditArgs {
            room: Some("board-room".to_string()),
            end: Some("09:30".to_string()),
            ..EditArgs::default()
        };
        let mut out = output();
        edit(&mut ctl, 1, &changes, &mut out).unwrap();

        assert!(text(out).starts_with("Meeting successfully updated!"));
        let meetings = ctl.store().list_meetings();
        assert_eq!(meetings.len(), 1);
        assert_eq!(meetings[0].room, Room::BoardRoom);
        assert_eq!(meetings[0].total_time, "0 hour(s) 30 minute(s)");
        assert_eq!(ctl.store().capacity(Room::ConferenceRoom), 10);
        assert_eq!(ctl.store().capacity(Room::BoardRoom), 9);
    }

    #[test]
    fn failed_edit_leaves_edit_mode() {
        let mut ctl = controller();
        book(&mut ctl, &args("conference-room", "09:00", "10:00"), &mut output()).unwrap();

        let changes = EditArgs {
            start: Some(String::new()),
            ..EditArgs::default()
        };
        assert!(edit(&mut ctl, 1, &changes, &mut output()).is_err());
        assert!(ctl.pending_edit().is_none());
    }

    #[test]
    fn positions_are_one_based() {
        let mut ctl = controller();
        book(&mut ctl, &args("free-room", "09:00", "10:00"), &mut output()).unwrap();

        let err = delete(&mut ctl, 0, false, &mut output()).unwrap_err();
        assert!(matches!(err, ClientError::NoSuchRow { position: 0, len: 1 }));
        let err = delete(&mut ctl, 2, false, &mut output()).unwrap_err();
        assert!(matches!(err, ClientError::NoSuchRow { position: 2, len: 1 }));

        delete(&mut ctl, 1, true, &mut output()).unwrap();
        assert!(ctl.store().list_meetings().is_empty());
        assert_eq!(ctl.store().capacity(Room::FreeRoom), 9);
    }

    #[test]
    fn delete_gives_seat_back() {
        let mut ctl = controller();
        book(&mut ctl, &args("board-room", "09:00", "10:00"), &mut output()).unwrap();
        assert_eq!(ctl.store().capacity(Room::BoardRoom), 9);

        let mut out = output();
        delete(&mut ctl, 1, false, &mut out).unwrap();
        assert!(text(out).starts_with("Deleted: board room - 2024-01-01"));
        assert_eq!(ctl.store().capacity(Room::BoardRoom), 10);
    }

    #[test]
    fn submit_consumes_banner() {
        let mut ctl = controller();
        book(&mut ctl, &args("board-room", "09:00", "10:00"), &mut output()).unwrap();
        assert!(ctl.banner().last().is_none());
    }

    #[test]
    fn list_and_capacity_output() {
        let mut ctl = controller();
        book(&mut ctl, &args("free-room", "09:00", "09:45"), &mut output()).unwrap();

        let mut out = output();
        list(ctl.store(), OutputFormat::Tty, &mut out).unwrap();
        insta::assert_snapshot!(text(out).trim_end(), @"1. free room - 2024-01-01 - 09:00 to 09:45 (0 hour(s) 45 minute(s))");

        let mut out = output();
        capacity(ctl.store(), OutputFormat::Json, &mut out).unwrap();
        let value: serde_json::Value = serde_json::from_str(&text(out)).unwrap();
        assert_eq!(value["free-room"], 9);
        assert_eq!(value["board-room"], 10);
    }

    #[test]
    fn check_reports_conflicts() {
        let mut ctl = controller();
        book(&mut ctl, &args("free-room", "09:00", "10:00"), &mut output()).unwrap();

        let mut out = output();
        check(ctl.store(), &args("free-room", "10:00", "11:15"), &mut out).unwrap();
        assert_eq!(text(out), "No conflict.\nduration: 1 hour(s) 15 minute(s)\n");

        let err = check(ctl.store(), &args("free-room", "09:30", "09:45"), &mut output()).unwrap_err();
        assert!(matches!(err, ClientError::Booking(BookingError::Conflict { .. })));
    }

    #[test]
    fn reconcile_on_file_store() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("storage.json");
        std::fs::write(
            &path,
            r#"{"roomCapacities": "{\"board-room\":\"3\"}"}"#,
        )
        .unwrap();

        let storage = FileStore::open(&path).unwrap();
        let mut store = BookingStore::load(storage, BookingPolicy::default()).unwrap();
        let mut out = output();
        reconcile(&mut store, &mut out).unwrap();
        assert_eq!(text(out), "board room: 3 -> 10\n");

        let reopened = FileStore::open(&path).unwrap();
        let store = BookingStore::load(reopened, BookingPolicy::default()).unwrap();
        assert_eq!(store.capacity(Room::BoardRoom), 10);
    }

    #[test]
    fn reconcile_repairs_unreadable_capacity() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("storage.json");
        std::fs::write(
            &path,
            r#"{"roomCapacities": "{\"board-room\":\"-1\"}"}"#,
        )
        .unwrap();

        let err = BookingStore::load(FileStore::open(&path).unwrap(), BookingPolicy::default())
            .unwrap_err();
        assert!(matches!(err, StoreError::InvalidCapacity { .. }));

        let storage = FileStore::open(&path).unwrap();
        let mut store = BookingStore::load_for_repair(storage, BookingPolicy::default()).unwrap();
        let mut out = output();
        reconcile(&mut store, &mut out).unwrap();
        assert_eq!(text(out), "Rewrote unreadable capacities from bookings.\n");

        let reopened = FileStore::open(&path).unwrap();
        let store = BookingStore::load(reopened, BookingPolicy::default()).unwrap();
        assert_eq!(store.capacity(Room::BoardRoom), 10);
    }
}
