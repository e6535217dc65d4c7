//! CLI module for staffdb
//!
//! One subcommand per roster action. Tables and JSON go to stdout;
//! prompts, messages and log lines go to stderr. The process exits with
//! the action's result code.

mod args;
mod commands;
mod errors;
mod io;

pub use args::{Cli, Command, StateFilter, ViewArgs};
pub use commands::{parse_step, run, run_command, MAX_LOGIN_ATTEMPTS};
pub use errors::{CliError, CliErrorCode, CliResult};
pub use io::{parse_page_action, LinePrompt};
