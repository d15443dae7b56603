//! roombook CLI entry point.

use std::io::{self, IsTerminal};
use std::process::ExitCode;

use clap::Parser;
use tracing::debug;

use roombook_core::tracing::init_tracing;
use roombook_core::{BookingError, CAPACITIES_KEY, StoreError};

use roombook_client::cli::{Cli, Command, ConfigAction};
use roombook_client::commands::{self, Output};
use roombook_client::config::ClientConfig;
use roombook_client::error::{ClientError, ClientResult};
use roombook_client::form::{BookingForm, feedback_for};

const RECONCILE_HINT: &str = "  run `roombook reconcile` to rebuild capacities from bookings";

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Load configuration
    let config = match load_config(&cli) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    // Initialize tracing
    if let Err(e) = init_tracing(config.tracing(cli.debug, cli.log_format)) {
        eprintln!("warning: {}", e);
    }

    // Run the command
    match run(&cli, &config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            report(&e);
            ExitCode::FAILURE
        }
    }
}

fn load_config(cli: &Cli) -> ClientResult<ClientConfig> {
    let config = if let Some(ref path) = cli.config {
        ClientConfig::load_from(path)
    } else {
        ClientConfig::load()
    };
    config.map_err(ClientError::Config)
}

fn run(cli: &Cli, config: &ClientConfig) -> ClientResult<()> {
    let stdout = io::stdout();
    let color = stdout.is_terminal();
    let mut out = Output::new(stdout.lock(), color);

    match &cli.command {
        Some(Command::Book(args)) => {
            let mut ctl = open_form(cli, config)?;
            commands::booking::book(&mut ctl, args, &mut out)
        }
        Some(Command::Edit { position, changes }) => {
            let mut ctl = open_form(cli, config)?;
            commands::booking::edit(&mut ctl, *position, changes, &mut out)
        }
        Some(Command::Delete {
            position,
            keep_capacity,
        }) => {
            let mut ctl = open_form(cli, config)?;
            commands::booking::delete(&mut ctl, *position, *keep_capacity, &mut out)
        }
        Some(Command::List { json }) => {
            let store = commands::booking::open_store(cli, config)?;
            commands::booking::list(&store, config.output_format(*json), &mut out)
        }
        Some(Command::Capacity { json }) => {
            let store = commands::booking::open_store(cli, config)?;
            commands::booking::capacity(&store, config.output_format(*json), &mut out)
        }
        Some(Command::Check(args)) => {
            let store = commands::booking::open_store(cli, config)?;
            commands::booking::check(&store, args, &mut out)
        }
        Some(Command::Reconcile) => {
            let mut store = commands::booking::open_store_for_repair(cli, config)?;
            commands::booking::reconcile(&mut store, &mut out)
        }
        Some(Command::Config { action }) => match action {
            ConfigAction::Dump => commands::config::dump(config, &mut out),
            ConfigAction::Validate => commands::config::validate(config, &mut out),
            ConfigAction::Path => commands::config::path(cli, config, &mut out),
        },
        None => {
            out.line("roombook - Book meeting rooms from the terminal")?;
            out.line("")?;
            out.line("Run 'roombook --help' for usage information.")?;
            out.line("")?;
            out.line("Quick start:")?;
            out.line("  1. Book a room: roombook book --room conference-room --date 2024-01-01 --start 09:00 --end 10:00")?;
            out.line("  2. See bookings: roombook list")?;
            Ok(())
        }
    }
}

fn open_form(
    cli: &Cli,
    config: &ClientConfig,
) -> ClientResult<BookingForm<roombook_core::FileStore>> {
    let store = commands::booking::open_store(cli, config)?;
    Ok(BookingForm::new(store, config.feedback_delay()))
}

/// Prints the user-facing message for a failed command.
fn report(err: &ClientError) {
    let stderr = io::stderr();
    let color = stderr.is_terminal();
    let mut out = Output::new(stderr.lock(), color);
    let _ = out.feedback(&feedback_for(err));
    match err {
        ClientError::Booking(BookingError::Conflict { existing }) => {
            let _ = out.line(format!("  conflicting meeting: {}", existing));
        }
        ClientError::Storage(StoreError::InvalidCapacity { .. }) => {
            let _ = out.line(RECONCILE_HINT);
        }
        ClientError::Storage(StoreError::Corrupt { key, .. }) if key == CAPACITIES_KEY => {
            let _ = out.line(RECONCILE_HINT);
        }
        _ => {}
    }
    debug!(error = %err, "Command failed");
}
