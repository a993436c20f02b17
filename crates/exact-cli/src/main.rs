//! Entry point for the `exact` operator CLI.
//!
//! Delegates to [`exact_cli::run`], which loads configuration, connects to
//! the configured EXL server and runs the requested command.

use std::io::{self, StderrLock, StdoutLock};
use std::process::ExitCode;

fn main() -> ExitCode {
    let mut stdout: StdoutLock<'_> = io::stdout().lock();
    let mut stderr: StderrLock<'_> = io::stderr().lock();
    exact_cli::run(std::env::args_os(), &mut stdout, &mut stderr)
}
