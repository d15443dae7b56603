//! Core types: rooms, meetings, capacity ledger, booking store, persistence

pub mod capacity;
pub mod error;
pub mod format;
pub mod meeting;
pub mod room;
pub mod storage;
pub mod store;
pub mod time;
pub mod tracing;

pub use capacity::{CapacityDrift, CapacityLedger, Consumed, DEFAULT_MAX_CAPACITY};
pub use error::{BookingError, BookingResult, ParseError, StoreError, StoreResult};
pub use format::{FormatOptions, JsonOutput, OutputFormat, OutputFormatter};
pub use meeting::{Meeting, MeetingKey};
pub use room::Room;
pub use storage::{CAPACITIES_KEY, FileStore, KeyValueStore, MEETINGS_KEY, MemoryStore};
pub use store::{Booking, BookingPolicy, BookingStore, CapacityWarning};
pub use time::{TimeOfDay, TimeRange, format_total_time, parse_date};
pub use self::tracing::{LogFormat, TracingConfig, TracingError, init_tracing};
