//! Record store for staff records
//!
//! A single flat file of fixed-size records. New records are appended;
//! modify and delete rewrite one record in place. Deletion is a tombstone in
//! the credential word, so records are never physically removed.
//!
//! # Hazards
//!
//! - There is no file lock. Two processes writing the same file can
//!   interleave and corrupt records.
//! - A credential digest whose high 32 bits are zero reads back as a
//!   tombstone (see [`Credential::collides_with_tombstone`]).

mod errors;
mod reader;
mod record;
mod store;
mod writer;

pub use errors::{StorageError, StorageErrorCode, StorageResult};
pub use reader::{StoreSnapshot, StoredRecord};
pub use record::{
    Credential, DeletionDate, Field, StaffId, StaffRecord, ADMIN_POSITION, MAX_NAME_BYTES,
    MAX_NATIONAL_ID_BYTES, MAX_PHONE_BYTES, MAX_POSITION_BYTES, RECORD_SIZE,
};
pub use store::StaffStore;
