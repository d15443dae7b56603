//! CLI, booking form binding, feedback, output rendering
//!
//! This crate provides the `roombook` command-line interface on top of
//! `roombook-core`.

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod feedback;
pub mod form;

pub use cli::Cli;
pub use error::{ClientError, ClientResult};
pub use feedback::{Feedback, FeedbackBanner, Tone};
pub use form::{BookingForm, FormMode, MeetingForm, ValidationError};
