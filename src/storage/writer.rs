//! Append and in-place overwrite of staff records
//!
//! Every write opens the file, writes within exactly one record, fsyncs
//! and closes. A short write surfaces as an I/O error; nothing is resumed.

use std::fs::{File, OpenOptions};
use std::io::{Seek, SeekFrom, Write};
use std::path::Path;

use super::errors::{StorageError, StorageResult};
use super::record::{Field, StaffRecord, RECORD_SIZE};

/// Appends `record` at end of file, creating the file if needed.
///
/// Returns the offset the record was written at.
pub fn append(path: &Path, record: &StaffRecord) -> StorageResult<u64> {
    let bytes = record.encode()?;

    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|e| {
            StorageError::io_error(
                format!("Failed to open staff file for append: {}", path.display()),
                e,
            )
        })?;

    let offset = file
        .metadata()
        .map_err(|e| StorageError::io_error("Failed to read staff file metadata", e))?
        .len();

    if offset % RECORD_SIZE as u64 != 0 {
        return Err(StorageError::truncated(offset, RECORD_SIZE));
    }

    file.write_all(&bytes)
        .map_err(|e| StorageError::io_error("Failed to append staff record", e))?;
    file.sync_all()
        .map_err(|e| StorageError::io_error("Failed to fsync staff file", e))?;

    Ok(offset)
}

/// Rewrites the record at `offset` in place.
///
/// `offset` must be record-aligned and point at an existing record.
pub fn overwrite_at(path: &Path, offset: u64, record: &StaffRecord) -> StorageResult<()> {
    check_aligned(offset)?;
    let bytes = record.encode()?;

    let mut file = open_existing(path, offset)?;
    write_slot(&mut file, offset, &bytes)?;
    file.sync_all()
        .map_err(|e| StorageError::io_error("Failed to fsync staff file", e))
}

/// Rewrites only the slots of `fields` in the record at `offset`.
///
/// Bytes outside those slots are left exactly as they are on disk, even
/// when they do not decode cleanly.
pub fn overwrite_fields(
    path: &Path,
    offset: u64,
    record: &StaffRecord,
    fields: &[Field],
) -> StorageResult<()> {
    check_aligned(offset)?;
    let slots = fields
        .iter()
        .map(|&field| -> StorageResult<(u64, Vec<u8>)> {
            Ok((field.slot().start as u64, record.encode_field(field)?))
        })
        .collect::<StorageResult<Vec<_>>>()?;

    let mut file = open_existing(path, offset)?;
    for (start, bytes) in &slots {
        write_slot(&mut file, offset + start, bytes)?;
    }
    file.sync_all()
        .map_err(|e| StorageError::io_error("Failed to fsync staff file", e))
}

fn check_aligned(offset: u64) -> StorageResult<()> {
    if offset % RECORD_SIZE as u64 != 0 {
        return Err(StorageError::invalid_at_offset(
            offset,
            "Offset is not record-aligned",
        ));
    }
    Ok(())
}

/// Opens for update and checks a whole record exists at `offset`.
fn open_existing(path: &Path, offset: u64) -> StorageResult<File> {
    let file = OpenOptions::new().write(true).open(path).map_err(|e| {
        StorageError::io_error(
            format!("Failed to open staff file for update: {}", path.display()),
            e,
        )
    })?;

    let len = file
        .metadata()
        .map_err(|e| StorageError::io_error("Failed to read staff file metadata", e))?
        .len();

    if offset + RECORD_SIZE as u64 > len {
        return Err(StorageError::invalid_at_offset(
            offset,
            format!("Offset is past the last record (file is {} bytes)", len),
        ));
    }
    Ok(file)
}

fn write_slot(file: &mut File, at: u64, bytes: &[u8]) -> StorageResult<()> {
    file.seek(SeekFrom::Start(at))
        .map_err(|e| StorageError::io_error(format!("Failed to seek to byte {}", at), e))?;
    file.write_all(bytes)
        .map_err(|e| StorageError::io_error("Failed to overwrite staff record", e))
}
