//! CLI-specific error types
//!
//! Every failure carries the result code the process exits with.

use std::fmt;
use std::io;

use crate::config::ConfigError;
use crate::query::QueryError;
use crate::roster::{ResultCode, RosterError};
use crate::storage::StorageError;

/// CLI error codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CliErrorCode {
    /// Flag values rejected by configuration validation
    ConfigError,
    /// Terminal I/O (stdin/stdout)
    IoError,
    /// Malformed argument (unknown field, bad search step)
    UsageError,
    /// A roster action failed
    ActionFailed,
}

impl CliErrorCode {
    /// Get the error code string
    pub fn code(&self) -> &'static str {
        match self {
            Self::ConfigError => "STAFF_CLI_CONFIG_ERROR",
            Self::IoError => "STAFF_CLI_IO_ERROR",
            Self::UsageError => "STAFF_CLI_USAGE_ERROR",
            Self::ActionFailed => "STAFF_CLI_ACTION_FAILED",
        }
    }
}

/// CLI error
#[derive(Debug)]
pub struct CliError {
    code: CliErrorCode,
    message: String,
    result: ResultCode,
}

impl CliError {
    pub fn new(code: CliErrorCode, result: ResultCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            result,
        }
    }

    pub fn config_error(msg: impl Into<String>) -> Self {
        Self::new(CliErrorCode::ConfigError, ResultCode::Invalid, msg)
    }

    pub fn io_error(msg: impl Into<String>) -> Self {
        Self::new(CliErrorCode::IoError, ResultCode::IoFailure, msg)
    }

    pub fn usage(msg: impl Into<String>) -> Self {
        Self::new(CliErrorCode::UsageError, ResultCode::Invalid, msg)
    }

    pub fn code(&self) -> CliErrorCode {
        self.code
    }

    /// Get the error code string
    pub fn code_str(&self) -> &'static str {
        self.code.code()
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// Result code reported as the exit status
    pub fn result_code(&self) -> ResultCode {
        self.result
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code.code(), self.message)
    }
}

impl std::error::Error for CliError {}

impl From<io::Error> for CliError {
    fn from(e: io::Error) -> Self {
        Self::io_error(e.to_string())
    }
}

impl From<ConfigError> for CliError {
    fn from(e: ConfigError) -> Self {
        Self::config_error(e.0)
    }
}

impl From<RosterError> for CliError {
    fn from(e: RosterError) -> Self {
        Self::new(CliErrorCode::ActionFailed, e.result_code(), e.to_string())
    }
}

impl From<QueryError> for CliError {
    fn from(e: QueryError) -> Self {
        RosterError::from(e).into()
    }
}

impl From<StorageError> for CliError {
    fn from(e: StorageError) -> Self {
        RosterError::from(e).into()
    }
}

/// CLI result type
pub type CliResult<T> = Result<T, CliError>;
