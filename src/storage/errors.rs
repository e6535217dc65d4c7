//! Storage error types
//!
//! Error codes:
//! - STAFF_STORAGE_IO_ERROR: open/read/write/seek failure, or a truncated file
//! - STAFF_STORAGE_ALLOCATION_FAILED: the full record set could not be held in memory
//! - STAFF_RECORD_INVALID: a record or offset rejected before touching the file
//!
//! Nothing here is retried. The caller decides whether to abort the
//! enclosing operation.

use std::collections::TryReserveError;
use std::fmt;
use std::io;

/// Storage-specific error codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageErrorCode {
    /// File I/O failure
    StaffStorageIoError,
    /// Materializing the record set failed
    StaffStorageAllocationFailed,
    /// Record or offset failed validation
    StaffRecordInvalid,
}

impl StorageErrorCode {
    /// Returns the string code
    pub fn code(&self) -> &'static str {
        match self {
            StorageErrorCode::StaffStorageIoError => "STAFF_STORAGE_IO_ERROR",
            StorageErrorCode::StaffStorageAllocationFailed => "STAFF_STORAGE_ALLOCATION_FAILED",
            StorageErrorCode::StaffRecordInvalid => "STAFF_RECORD_INVALID",
        }
    }
}

impl fmt::Display for StorageErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Storage error with code, message, optional context and source
#[derive(Debug)]
pub struct StorageError {
    code: StorageErrorCode,
    message: String,
    details: Option<String>,
    source: Option<io::Error>,
}

impl StorageError {
    /// A failed open, read, seek or write.
    pub fn io_error(message: impl Into<String>, source: io::Error) -> Self {
        Self {
            code: StorageErrorCode::StaffStorageIoError,
            message: message.into(),
            details: None,
            source: Some(source),
        }
    }

    /// A file whose length is not a whole number of records
    pub fn truncated(file_len: u64, record_size: usize) -> Self {
        Self {
            code: StorageErrorCode::StaffStorageIoError,
            message: "Storage file ends with a partial record".to_string(),
            details: Some(format!(
                "file_len: {}, record_size: {}, trailing_bytes: {}",
                file_len,
                record_size,
                file_len % record_size as u64
            )),
            source: None,
        }
    }

    /// Create an allocation failure for `count` records
    pub fn allocation_failed(count: usize, source: TryReserveError) -> Self {
        Self {
            code: StorageErrorCode::StaffStorageAllocationFailed,
            message: format!("Failed to reserve memory for {} records", count),
            details: Some(source.to_string()),
            source: None,
        }
    }

    /// Create an invalid record error
    pub fn invalid_record(message: impl Into<String>) -> Self {
        Self {
            code: StorageErrorCode::StaffRecordInvalid,
            message: message.into(),
            details: None,
            source: None,
        }
    }

    /// Create an invalid record error with byte offset context
    pub fn invalid_at_offset(offset: u64, reason: impl Into<String>) -> Self {
        Self {
            code: StorageErrorCode::StaffRecordInvalid,
            message: reason.into(),
            details: Some(format!("byte_offset: {}", offset)),
            source: None,
        }
    }

    pub fn code(&self) -> StorageErrorCode {
        self.code
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// Offset or size context, when the failure has one.
    pub fn details(&self) -> Option<&str> {
        self.details.as_deref()
    }

    /// True for I/O failures (including truncation)
    pub fn is_io(&self) -> bool {
        self.code == StorageErrorCode::StaffStorageIoError
    }

    /// True when the record set could not be materialized
    pub fn is_allocation(&self) -> bool {
        self.code == StorageErrorCode::StaffStorageAllocationFailed
    }
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code.code(), self.message)?;
        if let Some(ref details) = self.details {
            write!(f, " ({})", details)?;
        }
        if let Some(ref source) = self.source {
            write!(f, ": {}", source)?;
        }
        Ok(())
    }
}

impl std::error::Error for StorageError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source.as_ref().map(|e| e as &(dyn std::error::Error + 'static))
    }
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;
