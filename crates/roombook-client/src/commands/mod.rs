//! Subcommand implementations.

pub mod booking;
pub mod config;

use std::fmt::Display;
use std::io::{self, Write};

use crate::feedback::Feedback;

/// Line-oriented command output.
#[derive(Debug)]
pub struct Output<W> {
    writer: W,
    color: bool,
}

impl<W: Write> Output<W> {
    /// Wraps `writer`; `color` turns on ANSI colors for feedback.
    pub fn new(writer: W, color: bool) -> Self {
        Self { writer, color }
    }

    /// Writes one line.
    pub fn line(&mut self, text: impl Display) -> io::Result<()> {
        writeln!(self.writer, "{}", text)
    }

    /// Writes a feedback message in its tone's color.
    pub fn feedback(&mut self, feedback: &Feedback) -> io::Result<()> {
        if self.color {
            writeln!(self.writer, "{}", feedback.colored())
        } else {
            writeln!(self.writer, "{}", feedback)
        }
    }

    /// Returns the wrapped writer.
    pub fn into_inner(self) -> W {
        self.writer
    }
}
