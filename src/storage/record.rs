//! Staff record types and the fixed-size on-disk layout
//!
//! ```text
//! offset  size  field
//! ------  ----  -----------------------------------------
//!      0     8  id            (NUL-padded ASCII)
//!      8   128  name          (NUL-padded UTF-8)
//!    136    32  position      (NUL-padded UTF-8)
//!    168    16  phone         (NUL-padded UTF-8)
//!    184    15  national_id   (NUL-padded UTF-8)
//!    199     8  credential    (u64 LE, tombstone-overloaded)
//! ------  ----
//!           207
//! ```
//!
//! Each text field holds at most `size - 1` bytes so a NUL always follows
//! the value. There is no header, footer or padding: record `N` lives at
//! byte `N * RECORD_SIZE`.
//!
//! The credential word is a digest while the record is active. On delete it
//! is overwritten with a tombstone whose high 32 bits are zero. In memory it
//! is always the tagged [`Credential`]; the packed `u64` only exists at this
//! boundary.

use std::borrow::Cow;
use std::fmt;
use std::ops::Range;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use super::errors::{StorageError, StorageResult};
use crate::hash;

const ID_LEN: usize = 8;
const NAME_LEN: usize = 128;
const POSITION_LEN: usize = 32;
const PHONE_LEN: usize = 16;
const NATIONAL_ID_LEN: usize = 15;
const CREDENTIAL_LEN: usize = 8;

const ID_OFFSET: usize = 0;
const NAME_OFFSET: usize = ID_OFFSET + ID_LEN;
const POSITION_OFFSET: usize = NAME_OFFSET + NAME_LEN;
const PHONE_OFFSET: usize = POSITION_OFFSET + POSITION_LEN;
const NATIONAL_ID_OFFSET: usize = PHONE_OFFSET + PHONE_LEN;
const CREDENTIAL_OFFSET: usize = NATIONAL_ID_OFFSET + NATIONAL_ID_LEN;

/// Size of one encoded record in bytes.
pub const RECORD_SIZE: usize = CREDENTIAL_OFFSET + CREDENTIAL_LEN;

/// Longest name in bytes.
pub const MAX_NAME_BYTES: usize = NAME_LEN - 1;
/// Longest position in bytes.
pub const MAX_POSITION_BYTES: usize = POSITION_LEN - 1;
/// Longest phone number in bytes.
pub const MAX_PHONE_BYTES: usize = PHONE_LEN - 1;
/// Longest national ID in bytes.
pub const MAX_NATIONAL_ID_BYTES: usize = NATIONAL_ID_LEN - 1;

/// Position string that grants administrative actions.
pub const ADMIN_POSITION: &str = "ADMIN";

/// Staff identifier: `S` followed by 4 to 6 digits.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StaffId(String);

impl StaffId {
    /// Parses and validates user input.
    pub fn parse(input: &str) -> StorageResult<Self> {
        let mut bytes = input.bytes();
        match bytes.next() {
            Some(b'S') => {}
            Some(b's') => {
                return Err(StorageError::invalid_record(format!(
                    "Staff ID '{}' must start with an uppercase 'S'",
                    input
                )))
            }
            _ => {
                return Err(StorageError::invalid_record(format!(
                    "Invalid staff ID format: '{}'",
                    input
                )))
            }
        }

        let digits = input.len() - 1;
        if !(4..=6).contains(&digits) || !bytes.all(|b| b.is_ascii_digit()) {
            return Err(StorageError::invalid_record(format!(
                "Invalid staff ID format: '{}' (expected S followed by 4-6 digits)",
                input
            )));
        }

        Ok(Self(input.to_string()))
    }

    /// Wraps an ID read back from disk without re-validating it.
    fn from_stored(raw: String) -> Self {
        Self(raw)
    }

    /// Returns the ID as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for StaffId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Date a record was deleted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeletionDate {
    pub year: u16,
    pub month: u8,
    pub day: u8,
}

impl DeletionDate {
    pub fn from_date(date: NaiveDate) -> Self {
        Self {
            year: date.year().clamp(0, u16::MAX as i32) as u16,
            month: date.month() as u8,
            day: date.day() as u8,
        }
    }

    /// `day(8) | month(8) | year(16)`, day in the top byte.
    pub fn pack(&self) -> u32 {
        ((self.day as u32) << 24) | ((self.month as u32) << 16) | self.year as u32
    }

    pub fn unpack(raw: u32) -> Self {
        Self {
            year: (raw & 0xFFFF) as u16,
            month: ((raw >> 16) & 0xFF) as u8,
            day: (raw >> 24) as u8,
        }
    }
}

impl fmt::Display for DeletionDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}-{:02}", self.year, self.month, self.day)
    }
}

/// The credential word of a record, tagged by lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum Credential {
    /// Password digest of an active staff member
    Active { digest: u64 },
    /// Tombstone left by delete
    Deleted { date: DeletionDate },
}

impl Credential {
    /// High half of the packed word; all zero means tombstone.
    pub const TOMBSTONE_MASK: u64 = 0xFFFF_FFFF_0000_0000;

    pub fn from_password(password: &str) -> Self {
        Credential::Active {
            digest: hash::digest_password(password),
        }
    }

    /// Decodes the packed on-disk word.
    pub fn from_packed(raw: u64) -> Self {
        if raw & Self::TOMBSTONE_MASK == 0 {
            Credential::Deleted {
                date: DeletionDate::unpack(raw as u32),
            }
        } else {
            Credential::Active { digest: raw }
        }
    }

    /// Encodes to the packed on-disk word.
    pub fn to_packed(&self) -> u64 {
        match self {
            Credential::Active { digest } => *digest,
            Credential::Deleted { date } => date.pack() as u64,
        }
    }

    /// True when an active digest would be read back as a tombstone.
    ///
    /// Known weakness of the layout, roughly one password in 2^32.
    pub fn collides_with_tombstone(&self) -> bool {
        matches!(self, Credential::Active { digest } if digest & Self::TOMBSTONE_MASK == 0)
    }

    pub fn is_deleted(&self) -> bool {
        matches!(self, Credential::Deleted { .. })
    }

    pub fn verify(&self, password: &str) -> bool {
        match self {
            Credential::Active { digest } => hash::verify_password(password, *digest),
            Credential::Deleted { .. } => false,
        }
    }
}

/// Record fields addressable by search and projection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    Id,
    Name,
    Position,
    Phone,
    NationalId,
    /// Active, or the deletion date
    Status,
}

impl Field {
    /// Every field, in layout order.
    pub const ALL: [Field; 6] = [
        Field::Id,
        Field::Name,
        Field::Position,
        Field::Phone,
        Field::NationalId,
        Field::Status,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Field::Id => "id",
            Field::Name => "name",
            Field::Position => "position",
            Field::Phone => "phone",
            Field::NationalId => "national_id",
            Field::Status => "status",
        }
    }

    pub fn parse(name: &str) -> Option<Self> {
        Self::ALL
            .iter()
            .copied()
            .find(|f| f.as_str().eq_ignore_ascii_case(name))
    }

    /// Byte range of this field within a record. `Status` is the credential word.
    pub(crate) fn slot(&self) -> Range<usize> {
        match self {
            Field::Id => ID_OFFSET..NAME_OFFSET,
            Field::Name => NAME_OFFSET..POSITION_OFFSET,
            Field::Position => POSITION_OFFSET..PHONE_OFFSET,
            Field::Phone => PHONE_OFFSET..NATIONAL_ID_OFFSET,
            Field::NationalId => NATIONAL_ID_OFFSET..CREDENTIAL_OFFSET,
            Field::Status => CREDENTIAL_OFFSET..RECORD_SIZE,
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One staff member as held in memory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StaffRecord {
    pub id: StaffId,
    pub name: String,
    pub position: String,
    pub phone: String,
    pub national_id: String,
    pub credential: Credential,
}

impl StaffRecord {
    /// Creates an active record, checking every field against its cap.
    pub fn new(
        id: StaffId,
        name: impl Into<String>,
        position: impl Into<String>,
        phone: impl Into<String>,
        national_id: impl Into<String>,
        credential: Credential,
    ) -> StorageResult<Self> {
        let record = Self {
            id,
            name: name.into(),
            position: position.into(),
            phone: phone.into(),
            national_id: national_id.into(),
            credential,
        };
        record.validate()?;
        Ok(record)
    }

    /// Checks text fields fit their slots and contain no NUL.
    pub fn validate(&self) -> StorageResult<()> {
        for field in Field::ALL {
            self.check_field(field)?;
        }
        Ok(())
    }

    /// Checks one field against its slot. The credential always fits.
    pub fn check_field(&self, field: Field) -> StorageResult<()> {
        let slot_len = field.slot().len();
        match field {
            Field::Status => Ok(()),
            _ => check_text(field.as_str(), &self.field_text(field), slot_len - 1),
        }
    }

    pub fn is_deleted(&self) -> bool {
        self.credential.is_deleted()
    }

    /// Position string check; there are no permission bits.
    pub fn is_admin(&self) -> bool {
        !self.is_deleted() && self.position.eq_ignore_ascii_case(ADMIN_POSITION)
    }

    /// Text of one field, as searched and displayed.
    pub fn field_text(&self, field: Field) -> Cow<'_, str> {
        match field {
            Field::Id => Cow::Borrowed(self.id.as_str()),
            Field::Name => Cow::Borrowed(&self.name),
            Field::Position => Cow::Borrowed(&self.position),
            Field::Phone => Cow::Borrowed(&self.phone),
            Field::NationalId => Cow::Borrowed(&self.national_id),
            Field::Status => match self.credential {
                Credential::Active { .. } => Cow::Borrowed("active"),
                Credential::Deleted { date } => Cow::Owned(format!("deleted {}", date)),
            },
        }
    }

    /// Copy of this record carrying a tombstone dated `now`.
    pub fn mark_deleted(&self, now: NaiveDate) -> Self {
        Self {
            credential: Credential::Deleted {
                date: DeletionDate::from_date(now),
            },
            ..self.clone()
        }
    }

    /// Encodes to the fixed on-disk layout.
    pub fn encode(&self) -> StorageResult<[u8; RECORD_SIZE]> {
        self.validate()?;

        let mut buf = [0u8; RECORD_SIZE];
        put_text(&mut buf[ID_OFFSET..NAME_OFFSET], self.id.as_str());
        put_text(&mut buf[NAME_OFFSET..POSITION_OFFSET], &self.name);
        put_text(&mut buf[POSITION_OFFSET..PHONE_OFFSET], &self.position);
        put_text(&mut buf[PHONE_OFFSET..NATIONAL_ID_OFFSET], &self.phone);
        put_text(&mut buf[NATIONAL_ID_OFFSET..CREDENTIAL_OFFSET], &self.national_id);
        buf[CREDENTIAL_OFFSET..].copy_from_slice(&self.credential.to_packed().to_le_bytes());

        Ok(buf)
    }

    /// Bytes of one field's slot, NUL-padded, ready to write in place.
    pub fn encode_field(&self, field: Field) -> StorageResult<Vec<u8>> {
        self.check_field(field)?;
        let mut slot = vec![0u8; field.slot().len()];
        match field {
            Field::Status => slot.copy_from_slice(&self.credential.to_packed().to_le_bytes()),
            _ => put_text(&mut slot, &self.field_text(field)),
        }
        Ok(slot)
    }

    /// Decodes one record. `data` must be exactly `RECORD_SIZE` bytes.
    ///
    /// Text is read up to the first NUL; invalid UTF-8 is replaced rather
    /// than rejected so a single damaged name does not hide the roster.
    pub fn decode(data: &[u8]) -> StorageResult<Self> {
        if data.len() != RECORD_SIZE {
            return Err(StorageError::invalid_record(format!(
                "Record must be {} bytes, got {}",
                RECORD_SIZE,
                data.len()
            )));
        }

        let mut credential = [0u8; CREDENTIAL_LEN];
        credential.copy_from_slice(&data[CREDENTIAL_OFFSET..]);

        Ok(Self {
            id: StaffId::from_stored(get_text(&data[ID_OFFSET..NAME_OFFSET])),
            name: get_text(&data[NAME_OFFSET..POSITION_OFFSET]),
            position: get_text(&data[POSITION_OFFSET..PHONE_OFFSET]),
            phone: get_text(&data[PHONE_OFFSET..NATIONAL_ID_OFFSET]),
            national_id: get_text(&data[NATIONAL_ID_OFFSET..CREDENTIAL_OFFSET]),
            credential: Credential::from_packed(u64::from_le_bytes(credential)),
        })
    }
}

fn check_text(field: &str, value: &str, max: usize) -> StorageResult<()> {
    if value.len() > max {
        return Err(StorageError::invalid_record(format!(
            "Field '{}' is {} bytes, limit is {}",
            field,
            value.len(),
            max
        )));
    }
    if value.as_bytes().contains(&0) {
        return Err(StorageError::invalid_record(format!(
            "Field '{}' contains a NUL byte",
            field
        )));
    }
    Ok(())
}

fn put_text(slot: &mut [u8], value: &str) {
    slot[..value.len()].copy_from_slice(value.as_bytes());
}

fn get_text(slot: &[u8]) -> String {
    let end = slot.iter().position(|&b| b == 0).unwrap_or(slot.len());
    String::from_utf8_lossy(&slot[..end]).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> StaffRecord {
        StaffRecord::new(
            StaffId::parse("S000123").unwrap(),
            "John Smith",
            "Receptionist",
            "012-3456789",
            "900101-14-5678",
            Credential::from_password("hunter2"),
        )
        .unwrap()
    }

    #[test]
    fn test_record_size() {
        assert_eq!(RECORD_SIZE, 207);
    }

    #[test]
    fn test_record_roundtrip() {
        let record = sample();
        let encoded = record.encode().unwrap();
        let decoded = StaffRecord::decode(&encoded).unwrap();
        assert_eq!(record, decoded);
    }

    #[test]
    fn test_roundtrip_at_field_limits() {
        let record = StaffRecord::new(
            StaffId::parse("S999999").unwrap(),
            "n".repeat(MAX_NAME_BYTES),
            "p".repeat(MAX_POSITION_BYTES),
            "1".repeat(MAX_PHONE_BYTES),
            "2".repeat(MAX_NATIONAL_ID_BYTES),
            Credential::from_password("x"),
        )
        .unwrap();
        let decoded = StaffRecord::decode(&record.encode().unwrap()).unwrap();
        assert_eq!(record, decoded);
    }

    #[test]
    fn test_roundtrip_empty_fields() {
        let record = StaffRecord::new(
            StaffId::parse("S0001").unwrap(),
            "",
            "",
            "",
            "",
            Credential::from_password(""),
        )
        .unwrap();
        let decoded = StaffRecord::decode(&record.encode().unwrap()).unwrap();
        assert_eq!(record, decoded);
    }

    #[test]
    fn test_field_over_limit_rejected() {
        let result = StaffRecord::new(
            StaffId::parse("S0001").unwrap(),
            "n".repeat(MAX_NAME_BYTES + 1),
            "",
            "",
            "",
            Credential::from_password("x"),
        );
        let err = result.unwrap_err();
        assert!(err.message().contains("name"));
    }

    #[test]
    fn test_nul_in_field_rejected() {
        let result = StaffRecord::new(
            StaffId::parse("S0001").unwrap(),
            "a\0b",
            "",
            "",
            "",
            Credential::from_password("x"),
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_staff_id_parse() {
        assert!(StaffId::parse("S0001").is_ok());
        assert!(StaffId::parse("S000001").is_ok());
        assert!(StaffId::parse("S001").is_err());
        assert!(StaffId::parse("S0000001").is_err());
        assert!(StaffId::parse("s0001").unwrap_err().message().contains("uppercase"));
        assert!(StaffId::parse("X0001").is_err());
        assert!(StaffId::parse("S00a1").is_err());
        assert!(StaffId::parse("").is_err());
    }

    #[test]
    fn test_tombstone_invariant() {
        let record = sample();
        assert!(!record.is_deleted());

        let date = NaiveDate::from_ymd_opt(2026, 10, 19).unwrap();
        let deleted = record.mark_deleted(date);
        assert!(deleted.is_deleted());

        let packed = deleted.credential.to_packed();
        assert_eq!(packed & Credential::TOMBSTONE_MASK, 0);
        assert_eq!(packed, (19u64 << 24) | (10u64 << 16) | 2026);

        let decoded = StaffRecord::decode(&deleted.encode().unwrap()).unwrap();
        assert!(decoded.is_deleted());
        assert_eq!(
            decoded.credential,
            Credential::Deleted {
                date: DeletionDate {
                    year: 2026,
                    month: 10,
                    day: 19
                }
            }
        );
    }

    #[test]
    fn test_deleted_iff_high_bits_zero() {
        for raw in [0u64, 1, 0xFFFF_FFFF, 0x1_0000_0000, u64::MAX] {
            let deleted = Credential::from_packed(raw).is_deleted();
            assert_eq!(deleted, raw >> 32 == 0, "raw = {:#x}", raw);
        }
    }

    #[test]
    fn test_tombstone_collision_flagged() {
        let weak = Credential::Active { digest: 0x0000_0000_1234_5678 };
        assert!(weak.collides_with_tombstone());
        assert!(Credential::from_packed(weak.to_packed()).is_deleted());
        assert!(!Credential::from_password("ADMIN").collides_with_tombstone());
    }

    #[test]
    fn test_mark_deleted_keeps_other_fields() {
        let record = sample();
        let deleted = record.mark_deleted(NaiveDate::from_ymd_opt(2024, 2, 29).unwrap());
        assert_eq!(deleted.id, record.id);
        assert_eq!(deleted.name, record.name);
        assert_eq!(deleted.field_text(Field::Status), "deleted 2024-02-29");
    }

    #[test]
    fn test_deleted_credential_never_verifies() {
        let record = sample();
        assert!(record.credential.verify("hunter2"));
        let deleted = record.mark_deleted(NaiveDate::from_ymd_opt(2025, 1, 1).unwrap());
        assert!(!deleted.credential.verify("hunter2"));
    }

    #[test]
    fn test_is_admin() {
        let mut record = sample();
        assert!(!record.is_admin());
        record.position = "admin".to_string();
        assert!(record.is_admin());
        let deleted = record.mark_deleted(NaiveDate::from_ymd_opt(2025, 1, 1).unwrap());
        assert!(!deleted.is_admin());
    }

    #[test]
    fn test_field_parse() {
        assert_eq!(Field::parse("NAME"), Some(Field::Name));
        assert_eq!(Field::parse("national_id"), Some(Field::NationalId));
        assert_eq!(Field::parse("salary"), None);
    }
}
