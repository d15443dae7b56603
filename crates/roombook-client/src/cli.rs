//! Command-line interface definition.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use roombook_core::LogFormat;

/// roombook - Book meeting rooms from the terminal
#[derive(Debug, Parser)]
#[command(name = "roombook")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(long, short, env = "ROOMBOOK_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Path to the storage file (overrides the configuration)
    #[arg(long, env = "ROOMBOOK_STORAGE", global = true)]
    pub storage: Option<PathBuf>,

    /// Enable debug output
    #[arg(long, short = 'v', global = true)]
    pub debug: bool,

    /// Log line format: compact, pretty or json (overrides the configuration)
    #[arg(long, env = "ROOMBOOK_LOG_FORMAT", global = true)]
    pub log_format: Option<LogFormat>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

/// Available commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Book a room
    Book(MeetingArgs),

    /// Change the meeting at a list position
    Edit {
        /// 1-based position as shown by `list`
        position: usize,

        #[command(flatten)]
        changes: EditArgs,
    },

    /// Delete the meeting at a list position
    Delete {
        /// 1-based position as shown by `list`
        position: usize,

        /// Do not give the seat back to the room
        #[arg(long)]
        keep_capacity: bool,
    },

    /// List booked meetings
    List {
        /// Output in JSON format
        #[arg(long)]
        json: bool,
    },

    /// Show remaining capacity per room
    Capacity {
        /// Output in JSON format
        #[arg(long)]
        json: bool,
    },

    /// Check whether a booking would conflict, without booking it
    Check(MeetingArgs),

    /// Rebuild capacities from the booked meetings
    Reconcile,

    /// Configuration commands
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// The four booking fields.
///
/// Values are kept as raw strings so that empty or malformed input is
/// reported by the form validation rather than by the argument parser.
#[derive(Debug, Clone, Args)]
pub struct MeetingArgs {
    /// Room: conference-room, board-room or free-room
    #[arg(long, default_value = "")]
    pub room: String,

    /// Date (YYYY-MM-DD)
    #[arg(long, default_value = "")]
    pub date: String,

    /// Start time (HH:MM)
    #[arg(long, default_value = "")]
    pub start: String,

    /// End time (HH:MM)
    #[arg(long, default_value = "")]
    pub end: String,
}

/// Fields to change when editing; omitted fields keep their value.
#[derive(Debug, Clone, Default, Args)]
pub struct EditArgs {
    /// New room
    #[arg(long)]
    pub room: Option<String>,

    /// New date (YYYY-MM-DD)
    #[arg(long)]
    pub date: Option<String>,

    /// New start time (HH:MM)
    #[arg(long)]
    pub start: Option<String>,

    /// New end time (HH:MM)
    #[arg(long)]
    pub end: Option<String>,
}

/// Configuration actions.
#[derive(Debug, Subcommand)]
pub enum ConfigAction {
    /// Dump current configuration
    Dump,

    /// Validate configuration
    Validate,

    /// Show configuration and storage file paths
    Path,
}
