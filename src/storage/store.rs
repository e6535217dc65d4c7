//! `StaffStore`: the record store bound to one data file
//!
//! Holds only the path. Each call opens the file, does its work and closes
//! it again; no handle survives between calls.

use std::path::{Path, PathBuf};

use super::errors::StorageResult;
use super::reader::{self, StoreSnapshot};
use super::record::{Field, StaffRecord};
use super::writer;
use crate::observability::{log_event_with_fields, Event};

/// Record store over a single flat file.
#[derive(Debug, Clone)]
pub struct StaffStore {
    path: PathBuf,
}

impl StaffStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Returns the data file path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Appends a new record and returns its offset.
    pub fn append(&self, record: &StaffRecord) -> StorageResult<u64> {
        let offset = writer::append(&self.path, record)?;
        log_event_with_fields(
            Event::StoreAppend,
            &[
                ("offset", &offset.to_string()),
                ("staff_id", record.id.as_str()),
            ],
        );
        Ok(offset)
    }

    /// Reads every record, in file order, with its offset.
    pub fn scan_all(&self) -> StorageResult<StoreSnapshot> {
        let snapshot = reader::scan_all(&self.path)?;
        log_event_with_fields(
            Event::StoreScan,
            &[
                ("records", &snapshot.len().to_string()),
                ("total_bytes", &snapshot.total_bytes.to_string()),
            ],
        );
        Ok(snapshot)
    }

    /// Rewrites the record at `offset` in place.
    pub fn overwrite_at(&self, offset: u64, record: &StaffRecord) -> StorageResult<()> {
        writer::overwrite_at(&self.path, offset, record)?;
        log_event_with_fields(
            Event::StoreOverwrite,
            &[
                ("offset", &offset.to_string()),
                ("staff_id", record.id.as_str()),
            ],
        );
        Ok(())
    }

    /// Rewrites only the given fields of the record at `offset`.
    pub fn overwrite_fields(
        &self,
        offset: u64,
        record: &StaffRecord,
        fields: &[Field],
    ) -> StorageResult<()> {
        writer::overwrite_fields(&self.path, offset, record, fields)?;
        let names: Vec<&str> = fields.iter().map(|f| f.as_str()).collect();
        log_event_with_fields(
            Event::StoreOverwrite,
            &[
                ("fields", &names.join(",")),
                ("offset", &offset.to_string()),
                ("staff_id", record.id.as_str()),
            ],
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{Credential, StaffId, RECORD_SIZE};
    use chrono::NaiveDate;
    use tempfile::TempDir;

    fn staff(id: &str, name: &str) -> StaffRecord {
        StaffRecord::new(
            StaffId::parse(id).unwrap(),
            name,
            "Clerk",
            "03-1234567",
            "800101-10-1234",
            Credential::from_password(name),
        )
        .unwrap()
    }

    #[test]
    fn test_append_assigns_sequential_offsets() {
        let dir = TempDir::new().unwrap();
        let store = StaffStore::new(dir.path().join("staff.bin"));

        assert_eq!(store.append(&staff("S0001", "Ann")).unwrap(), 0);
        assert_eq!(
            store.append(&staff("S0002", "Ben")).unwrap(),
            RECORD_SIZE as u64
        );

        let snapshot = store.scan_all().unwrap();
        assert_eq!(snapshot.len(), 2);
        assert_eq!(snapshot.total_bytes, 2 * RECORD_SIZE as u64);
        assert_eq!(snapshot.entries[1].offset, RECORD_SIZE as u64);
        assert_eq!(snapshot.entries[1].record.name, "Ben");
    }

    #[test]
    fn test_overwrite_in_place_keeps_length() {
        let dir = TempDir::new().unwrap();
        let store = StaffStore::new(dir.path().join("staff.bin"));
        for (id, name) in [("S0001", "Ann"), ("S0002", "Ben"), ("S0003", "Cat")] {
            store.append(&staff(id, name)).unwrap();
        }

        let snapshot = store.scan_all().unwrap();
        let target = &snapshot.entries[1];
        let tombstoned = target
            .record
            .mark_deleted(NaiveDate::from_ymd_opt(2026, 1, 2).unwrap());
        store.overwrite_at(target.offset, &tombstoned).unwrap();

        let after = store.scan_all().unwrap();
        assert_eq!(after.total_bytes, snapshot.total_bytes);
        assert!(!after.entries[0].record.is_deleted());
        assert!(after.entries[1].record.is_deleted());
        assert!(!after.entries[2].record.is_deleted());
        assert!(after.find_active("S0002").is_none());
        assert!(after.find_active("S0003").is_some());
    }

    #[test]
    fn test_overwrite_rejects_bad_offsets() {
        let dir = TempDir::new().unwrap();
        let store = StaffStore::new(dir.path().join("staff.bin"));
        let record = staff("S0001", "Ann");
        store.append(&record).unwrap();

        assert!(!store.overwrite_at(1, &record).unwrap_err().is_io());
        assert!(store
            .overwrite_at(RECORD_SIZE as u64, &record)
            .unwrap_err()
            .message()
            .contains("past the last record"));
    }

    #[test]
    fn test_overwrite_missing_file_is_io_error() {
        let dir = TempDir::new().unwrap();
        let store = StaffStore::new(dir.path().join("absent.bin"));
        let err = store.overwrite_at(0, &staff("S0001", "Ann")).unwrap_err();
        assert!(err.is_io());
    }
}
