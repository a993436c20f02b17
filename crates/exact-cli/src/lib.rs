//! Runtime for the `exact` operator CLI.
//!
//! The CLI loads layered configuration through `ortho_config`, installs the
//! `tracing` subscriber and then runs one subcommand against the configured
//! EXL server: `listen` streams notifications as JSON lines, `ping` checks
//! liveness and `list` prints the records of a resource listing.

mod cli;
mod commands;
mod config;
mod errors;
mod telemetry;


use std::ffi::OsString;
use std::io::Write;
use std::process::ExitCode;

use clap::Parser;
use exact_client::StopHandle;
use exact_config::Config;
use signal_hook::consts::{SIGINT, SIGTERM};
use tracing::debug;

use crate::cli::{Cli, CliCommand};
use crate::config::{ConfigLoader, OrthoConfigLoader, split_config_arguments};
use crate::errors::AppError;

pub use telemetry::TelemetryError;

/// Parses `args`, runs the selected command and reports failures on
/// `stderr`.
pub fn run<I, W, E>(args: I, stdout: &mut W, stderr: &mut E) -> ExitCode
where
    I: IntoIterator<Item = OsString>,
    W: Write,
    E: Write,
{
    run_with_loader(args, stdout, stderr, &OrthoConfigLoader)
}

pub(crate) fn run_with_loader<I, W, E, L>(
    args: I,
    stdout: &mut W,
    stderr: &mut E,
    loader: &L,
) -> ExitCode
where
    I: IntoIterator<Item = OsString>,
    W: Write,
    E: Write,
    L: ConfigLoader + ?Sized,
{
    let args: Vec<OsString> = args.into_iter().collect();
    match execute(&args, stdout, loader) {
        Ok(()) => ExitCode::SUCCESS,
        Err(AppError::CliUsage(error)) if !error.use_stderr() => {
            if write!(stdout, "{error}").is_err() {
                return ExitCode::FAILURE;
            }
            ExitCode::SUCCESS
        }
        Err(error) => {
            let _ = writeln!(stderr, "exact: {error}");
            ExitCode::FAILURE
        }
    }
}

fn execute<W, L>(args: &[OsString], stdout: &mut W, loader: &L) -> Result<(), AppError>
where
    W: Write,
    L: ConfigLoader + ?Sized,
{
    let split = split_config_arguments(args);
    let cli = Cli::try_parse_from(&split.command_arguments).map_err(AppError::CliUsage)?;
    let config = loader.load(&split.config_arguments)?;
    telemetry::initialise(&config)?;
    debug!(target: "exact", server = %config.server(), "configuration loaded");
    dispatch(&config, cli.command, stdout)
}

fn dispatch<W: Write>(config: &Config, command: CliCommand, stdout: &mut W) -> Result<(), AppError> {
    match command {
        CliCommand::Ping { credentials } => {
            let mut client = commands::open_session(config, &credentials)?;
            commands::ping(&mut client, stdout)?;
            commands::close_session(client, &credentials)
        }
        CliCommand::List {
            resource,
            credentials,
        } => {
            let mut client = commands::open_session(config, &credentials)?;
            commands::list(&mut client, resource, stdout)?;
            commands::close_session(client, &credentials)
        }
        CliCommand::Listen {
            credentials,
            channels,
        } => {
            let mut client = commands::open_session(config, &credentials)?;
            let stop = StopHandle::new();
            let signals = [SIGINT, SIGTERM]
                .into_iter()
                .map(|signal| signal_hook::flag::register(signal, stop.flag()))
                .collect::<Result<Vec<_>, _>>()
                .map_err(AppError::Signal)?;
            let outcome = commands::listen(&mut client, &channels, &stop, stdout);
            for id in signals {
                signal_hook::low_level::unregister(id);
            }
            outcome?;
            commands::close_session(client, &credentials)
        }
    }
}
