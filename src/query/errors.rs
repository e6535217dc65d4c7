//! Query engine errors

use std::io;

use thiserror::Error;

use crate::storage::StorageError;

/// Result type for query operations
pub type QueryResult<T> = Result<T, QueryError>;

/// Errors raised while loading, paginating or narrowing a result set
#[derive(Debug, Error)]
pub enum QueryError {
    /// Scan failed (I/O or allocation; see [`StorageError::is_allocation`])
    #[error(transparent)]
    Storage(#[from] StorageError),

    /// The navigator's input stream ended
    #[error("End of input")]
    EndOfInput,

    /// Writing a rendered page failed
    #[error("Failed to write page output: {0}")]
    Output(#[from] io::Error),

    /// Policy cannot be evaluated (zero page size, empty projection)
    #[error("Invalid query policy: {0}")]
    InvalidPolicy(String),
}

impl QueryError {
    /// True when the full record set could not be materialized
    pub fn is_allocation(&self) -> bool {
        matches!(self, QueryError::Storage(e) if e.is_allocation())
    }
}
