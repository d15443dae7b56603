//! Transient feedback messages.
//!
//! A [`FeedbackBanner`] shows one message at a time and hides it after a
//! fixed delay. Showing a new message replaces the old one along with its
//! deadline. The clock is passed in so the dismiss is deterministic.

use std::fmt;
use std::time::{Duration, Instant};

/// Default time a message stays visible.
pub const DEFAULT_FEEDBACK_DELAY: Duration = Duration::from_millis(3000);

/// Whether a message reports success or failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    /// Green.
    Success,
    /// Red.
    Error,
}

impl Tone {
    /// Color name used when rendering.
    pub fn color(&self) -> &'static str {
        match self {
            Self::Success => "green",
            Self::Error => "red",
        }
    }

    /// ANSI SGR code for the color.
    fn ansi(&self) -> &'static str {
        match self {
            Self::Success => "32",
            Self::Error => "31",
        }
    }
}

/// A message with its tone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Feedback {
    pub message: String,
    pub tone: Tone,
}

impl Feedback {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            tone: Tone::Success,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            tone: Tone::Error,
        }
    }

    pub fn is_error(&self) -> bool {
        self.tone == Tone::Error
    }

    /// Renders the message wrapped in ANSI color codes.
    pub fn colored(&self) -> String {
        format!("\x1b[{}m{}\x1b[0m", self.tone.ansi(), self.message)
    }
}

impl fmt::Display for Feedback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

/// Single-slot banner with auto-dismiss.
#[derive(Debug, Clone)]
pub struct FeedbackBanner {
    delay: Duration,
    current: Option<(Feedback, Instant)>,
}

impl Default for FeedbackBanner {
    fn default() -> Self {
        Self::new(DEFAULT_FEEDBACK_DELAY)
    }
}

impl FeedbackBanner {
    /// Creates a banner hiding messages after `delay`.
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            current: None,
        }
    }

    /// Shows `feedback` from `now`, superseding any visible message.
    pub fn show(&mut self, feedback: Feedback, now: Instant) {
        self.current = Some((feedback, now + self.delay));
    }

    /// The message visible at `now`, if its delay has not elapsed.
    pub fn visible(&self, now: Instant) -> Option<&Feedback> {
        self.current
            .as_ref()
            .filter(|(_, hide_at)| now < *hide_at)
            .map(|(feedback, _)| feedback)
    }

    /// The last message shown, regardless of expiry.
    pub fn last(&self) -> Option<&Feedback> {
        self.current.as_ref().map(|(feedback, _)| feedback)
    }

    /// Hides the message immediately.
    pub fn dismiss(&mut self) {
        self.current = None;
    }
}
