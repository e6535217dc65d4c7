//! staffdb CLI entry point
//!
//! Delegates everything to `cli::run` and exits with the returned result
//! code (end of input exits with 255).

use std::process::ExitCode;

use staffdb::cli;

fn main() -> ExitCode {
    ExitCode::from(cli::run().exit_status())
}
