//! Roster errors and the result codes the shell maps them to

use thiserror::Error;

use crate::query::QueryError;
use crate::storage::StorageError;

/// Result type for roster actions
pub type RosterResult<T> = Result<T, RosterError>;

/// Per-action outcome reported to the shell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResultCode {
    Success,
    IoFailure,
    AllocationFailure,
    UserCancel,
    PermissionDenied,
    NotFound,
    Invalid,
    EndOfInput,
}

impl ResultCode {
    pub fn code(&self) -> i32 {
        match self {
            ResultCode::Success => 0,
            ResultCode::IoFailure => 1,
            ResultCode::AllocationFailure => 2,
            ResultCode::UserCancel => 3,
            ResultCode::PermissionDenied => 4,
            ResultCode::NotFound => 5,
            ResultCode::Invalid => 6,
            ResultCode::EndOfInput => -1,
        }
    }

    /// Process exit status; end of input wraps to 255.
    pub fn exit_status(&self) -> u8 {
        self.code() as u8
    }
}

/// Failures of a roster action
#[derive(Debug, Error)]
pub enum RosterError {
    // ==================
    // Storage
    // ==================
    /// Store I/O, allocation or record encoding failure
    #[error(transparent)]
    Storage(#[from] StorageError),

    /// Query pass failed
    #[error(transparent)]
    Query(#[from] QueryError),

    // ==================
    // Caller
    // ==================
    /// Confirmation declined
    #[error("Action cancelled")]
    UserAbort,

    /// Input stream ended
    #[error("End of input")]
    EndOfInput,

    // ==================
    // Access
    // ==================
    /// Actor is not an admin
    #[error("Insufficient permission: {0} requires an admin")]
    PermissionDenied(&'static str),

    /// Login or old-password check failed
    #[error("Password and staff ID do not match")]
    InvalidCredentials,

    // ==================
    // Lookup
    // ==================
    /// An active record already has this ID
    #[error("Staff ID {0} is already in use")]
    DuplicateId(String),

    /// No active record has this ID
    #[error("Staff ID {0} not found")]
    NotFound(String),

    /// Rejected input (password rules, empty batch, mismatched confirmation)
    #[error("Invalid input: {0}")]
    Invalid(String),
}

impl RosterError {
    pub fn result_code(&self) -> ResultCode {
        match self {
            RosterError::Storage(e) if e.is_allocation() => ResultCode::AllocationFailure,
            RosterError::Storage(e) if e.is_io() => ResultCode::IoFailure,
            RosterError::Storage(_) => ResultCode::Invalid,
            RosterError::Query(e) => match e {
                QueryError::Storage(s) if s.is_allocation() => ResultCode::AllocationFailure,
                QueryError::Storage(s) if s.is_io() => ResultCode::IoFailure,
                QueryError::Storage(_) => ResultCode::Invalid,
                QueryError::EndOfInput => ResultCode::EndOfInput,
                QueryError::Output(_) => ResultCode::IoFailure,
                QueryError::InvalidPolicy(_) => ResultCode::Invalid,
            },
            RosterError::UserAbort => ResultCode::UserCancel,
            RosterError::EndOfInput => ResultCode::EndOfInput,
            RosterError::PermissionDenied(_) => ResultCode::PermissionDenied,
            RosterError::InvalidCredentials => ResultCode::PermissionDenied,
            RosterError::DuplicateId(_) => ResultCode::Invalid,
            RosterError::NotFound(_) => ResultCode::NotFound,
            RosterError::Invalid(_) => ResultCode::Invalid,
        }
    }
}

/// Result code of a finished action.
pub fn result_code<T>(result: &RosterResult<T>) -> ResultCode {
    match result {
        Ok(_) => ResultCode::Success,
        Err(e) => e.result_code(),
    }
}
