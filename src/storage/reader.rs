//! Full-file scan of the staff store
//!
//! The scan materializes every record with its byte offset so the query
//! engine can index pages in O(1). The file is opened for the scan and
//! closed when it returns, on success and on error alike.

use std::fs::File;
use std::io::{BufReader, ErrorKind, Read};
use std::path::Path;

use super::errors::{StorageError, StorageResult};
use super::record::{StaffRecord, RECORD_SIZE};

/// A record together with where it lives in the file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredRecord {
    /// Byte offset of the record, always a multiple of `RECORD_SIZE`
    pub offset: u64,
    pub record: StaffRecord,
}

/// Every record in file order, plus the file length.
#[derive(Debug, Clone, Default)]
pub struct StoreSnapshot {
    pub entries: Vec<StoredRecord>,
    pub total_bytes: u64,
}

impl StoreSnapshot {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &StoredRecord> {
        self.entries.iter()
    }

    /// First non-deleted record with `id`.
    pub fn find_active(&self, id: &str) -> Option<&StoredRecord> {
        self.entries
            .iter()
            .find(|e| !e.record.is_deleted() && e.record.id.as_str() == id)
    }
}

/// Reads every record from the start of `path`.
///
/// A missing file is an empty roster. A length that is not a whole number
/// of records is reported as an I/O error rather than silently dropping the
/// tail.
pub fn scan_all(path: &Path) -> StorageResult<StoreSnapshot> {
    let file = match File::open(path) {
        Ok(file) => file,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(StoreSnapshot::default()),
        Err(e) => {
            return Err(StorageError::io_error(
                format!("Failed to open staff file: {}", path.display()),
                e,
            ))
        }
    };

    let total_bytes = file
        .metadata()
        .map_err(|e| StorageError::io_error("Failed to read staff file metadata", e))?
        .len();

    if total_bytes % RECORD_SIZE as u64 != 0 {
        return Err(StorageError::truncated(total_bytes, RECORD_SIZE));
    }

    let count = (total_bytes / RECORD_SIZE as u64) as usize;
    let mut entries = Vec::new();
    entries
        .try_reserve_exact(count)
        .map_err(|e| StorageError::allocation_failed(count, e))?;

    let mut reader = BufReader::new(file);
    let mut buf = [0u8; RECORD_SIZE];

    for index in 0..count {
        let offset = (index * RECORD_SIZE) as u64;
        reader.read_exact(&mut buf).map_err(|e| {
            StorageError::io_error(format!("Failed to read record at byte {}", offset), e)
        })?;
        entries.push(StoredRecord {
            offset,
            record: StaffRecord::decode(&buf)?,
        });
    }

    Ok(StoreSnapshot {
        entries,
        total_bytes,
    })
}
