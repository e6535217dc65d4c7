//! Roster actions over one data file
//!
//! Each action scans the store afresh, checks the actor and its inputs,
//! and performs at most one write per confirmed record. Writes only ever
//! happen after [`Confirmation::confirm`] returns `true` (add and
//! credential change carry their own password check instead).

use std::io::{self, Write};

use chrono::NaiveDate;
use serde::Serialize;

use super::confirm::Confirmation;
use super::errors::{RosterError, RosterResult};
use crate::config::RosterConfig;
use crate::observability::{log_event_with_fields, Event};
use crate::query::{
    IdList, PageNavigator, QueryEngine, QueryError, QueryPlan, QueryPolicy, SearchOp,
    TextPredicate,
};
use crate::storage::{
    Credential, Field, StaffId, StaffRecord, StaffStore, StorageResult, StoreSnapshot,
    StoredRecord, ADMIN_POSITION,
};

/// Longest accepted password, in bytes.
pub const MAX_PASSWORD_BYTES: usize = 127;

/// ID of the seeded administrator.
pub const BOOTSTRAP_ID: &str = "S000000";

/// Initial password of the seeded administrator.
pub const BOOTSTRAP_PASSWORD: &str = "ADMIN";

/// Details of a staff member to be added.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewStaff {
    pub id: StaffId,
    pub name: String,
    pub position: String,
    pub phone: String,
    pub national_id: String,
}

/// Fields to rewrite on modify; `None` keeps the stored value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StaffChanges {
    pub name: Option<String>,
    pub position: Option<String>,
    pub phone: Option<String>,
    pub national_id: Option<String>,
}

impl StaffChanges {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.position.is_none()
            && self.phone.is_none()
            && self.national_id.is_none()
    }

    /// Fields this change rewrites, in layout order.
    pub fn fields(&self) -> Vec<Field> {
        [
            (Field::Name, self.name.is_some()),
            (Field::Position, self.position.is_some()),
            (Field::Phone, self.phone.is_some()),
            (Field::NationalId, self.national_id.is_some()),
        ]
        .into_iter()
        .filter_map(|(field, set)| set.then_some(field))
        .collect()
    }

    /// Copy of `record` with the changes applied. Only changed fields are
    /// checked; the rest are never rewritten.
    pub fn apply(&self, record: &StaffRecord) -> StorageResult<StaffRecord> {
        let mut updated = record.clone();
        if let Some(name) = &self.name {
            updated.name = name.clone();
        }
        if let Some(position) = &self.position {
            updated.position = position.clone();
        }
        if let Some(phone) = &self.phone {
            updated.phone = phone.clone();
        }
        if let Some(national_id) = &self.national_id {
            updated.national_id = national_id.clone();
        }
        for field in self.fields() {
            updated.check_field(field)?;
        }
        Ok(updated)
    }
}

/// Exported view of a record. The credential digest is never exported.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExportRow {
    pub id: String,
    pub name: String,
    pub position: String,
    pub phone: String,
    pub national_id: String,
    pub deleted_on: Option<String>,
}

impl From<&StaffRecord> for ExportRow {
    fn from(record: &StaffRecord) -> Self {
        Self {
            id: record.id.as_str().to_string(),
            name: record.name.clone(),
            position: record.position.clone(),
            phone: record.phone.clone(),
            national_id: record.national_id.clone(),
            deleted_on: match record.credential {
                Credential::Deleted { date } => Some(date.to_string()),
                Credential::Active { .. } => None,
            },
        }
    }
}

/// Rejects passwords that cannot be entered at the prompt.
pub fn check_password(password: &str) -> RosterResult<()> {
    if password.is_empty() {
        return Err(RosterError::Invalid("password must not be empty".to_string()));
    }
    if password.len() > MAX_PASSWORD_BYTES {
        return Err(RosterError::Invalid(format!(
            "password exceeds {} bytes",
            MAX_PASSWORD_BYTES
        )));
    }
    Ok(())
}

fn require_admin(actor: &StaffRecord, action: &'static str) -> RosterResult<()> {
    if actor.is_admin() {
        return Ok(());
    }
    log_event_with_fields(
        Event::PermissionDenied,
        &[("action", action), ("actor", actor.id.as_str())],
    );
    Err(RosterError::PermissionDenied(action))
}

fn warn_on_collision(record: &StaffRecord) {
    if record.credential.collides_with_tombstone() {
        log_event_with_fields(
            Event::TombstoneCollision,
            &[("staff_id", record.id.as_str())],
        );
    }
}

fn log_cancelled(action: &str, id: &str) {
    log_event_with_fields(Event::ActionCancelled, &[("action", action), ("staff_id", id)]);
}

/// The staff roster bound to one data file.
#[derive(Debug, Clone)]
pub struct Roster {
    engine: QueryEngine,
    page_size: usize,
}

impl Roster {
    pub fn new(engine: QueryEngine, page_size: usize) -> Self {
        Self { engine, page_size }
    }

    pub fn open(config: &RosterConfig) -> Self {
        Self::new(
            QueryEngine::new(StaffStore::new(config.data_file.clone()), config.layout()),
            config.page_size,
        )
    }

    pub fn store(&self) -> &StaffStore {
        self.engine.store()
    }

    pub fn engine(&self) -> &QueryEngine {
        &self.engine
    }

    /// Default policy for this roster: active records, configured page size.
    pub fn policy(&self) -> QueryPolicy {
        QueryPolicy::active(self.page_size)
    }

    fn find_active(&self, id: &str) -> RosterResult<StoredRecord> {
        let snapshot = self.store().scan_all()?;
        snapshot
            .find_active(id)
            .cloned()
            .ok_or_else(|| RosterError::NotFound(id.to_string()))
    }

    /// Seeds the default administrator unless an active admin exists.
    /// Returns whether a record was written.
    pub fn bootstrap_admin(&self) -> RosterResult<bool> {
        let snapshot = self.store().scan_all()?;
        if snapshot.iter().any(|e| e.record.is_admin()) {
            return Ok(false);
        }
        if snapshot.find_active(BOOTSTRAP_ID).is_some() {
            return Err(RosterError::DuplicateId(BOOTSTRAP_ID.to_string()));
        }

        let admin = StaffRecord::new(
            StaffId::parse(BOOTSTRAP_ID)?,
            ADMIN_POSITION,
            ADMIN_POSITION,
            "",
            "",
            Credential::from_password(BOOTSTRAP_PASSWORD),
        )?;
        self.store().append(&admin)?;
        log_event_with_fields(Event::StaffAdded, &[("staff_id", BOOTSTRAP_ID)]);
        Ok(true)
    }

    /// Single login attempt. Deleted records never authenticate.
    pub fn authenticate(&self, id: &str, password: &str) -> RosterResult<StaffRecord> {
        let entry = self.find_active(id)?;
        if entry.record.credential.verify(password) {
            log_event_with_fields(Event::LoginSucceeded, &[("staff_id", id)]);
            Ok(entry.record)
        } else {
            log_event_with_fields(Event::LoginFailed, &[("staff_id", id)]);
            Err(RosterError::InvalidCredentials)
        }
    }

    /// Appends a new staff member. The ID must not be held by an active record.
    pub fn add(
        &self,
        actor: &StaffRecord,
        staff: NewStaff,
        password: &str,
    ) -> RosterResult<StaffRecord> {
        require_admin(actor, "add")?;
        check_password(password)?;

        let snapshot = self.store().scan_all()?;
        if snapshot.find_active(staff.id.as_str()).is_some() {
            return Err(RosterError::DuplicateId(staff.id.to_string()));
        }

        let record = StaffRecord::new(
            staff.id,
            staff.name,
            staff.position,
            staff.phone,
            staff.national_id,
            Credential::from_password(password),
        )?;
        warn_on_collision(&record);

        self.store().append(&record)?;
        log_event_with_fields(
            Event::StaffAdded,
            &[("actor", actor.id.as_str()), ("staff_id", record.id.as_str())],
        );
        Ok(record)
    }

    /// Rewrites an active record's details in place after confirmation.
    pub fn modify(
        &self,
        actor: &StaffRecord,
        id: &str,
        changes: &StaffChanges,
        confirm: &mut dyn Confirmation,
    ) -> RosterResult<StaffRecord> {
        require_admin(actor, "modify")?;
        if changes.is_empty() {
            return Err(RosterError::Invalid("no fields to modify".to_string()));
        }

        let entry = self.find_active(id)?;
        let updated = changes.apply(&entry.record)?;

        if !confirm.confirm(&format!("Save changes to {}?", id))? {
            log_cancelled("modify", id);
            return Err(RosterError::UserAbort);
        }

        self.store()
            .overwrite_fields(entry.offset, &updated, &changes.fields())?;
        log_event_with_fields(
            Event::StaffModified,
            &[("actor", actor.id.as_str()), ("staff_id", id)],
        );
        Ok(updated)
    }

    /// Tombstones one active record after confirmation.
    pub fn delete(
        &self,
        actor: &StaffRecord,
        id: &str,
        today: NaiveDate,
        confirm: &mut dyn Confirmation,
    ) -> RosterResult<StaffRecord> {
        require_admin(actor, "delete")?;
        let entry = self.find_active(id)?;

        if !confirm.confirm(&format!("Delete {} ({})?", id, entry.record.name))? {
            log_cancelled("delete", id);
            return Err(RosterError::UserAbort);
        }
        self.tombstone(actor, &entry, today)
    }

    /// Tombstones every listed active record, asking once per record.
    /// Declined and unknown IDs are skipped. Returns how many were deleted.
    pub fn delete_listed(
        &self,
        actor: &StaffRecord,
        ids: &IdList,
        today: NaiveDate,
        confirm: &mut dyn Confirmation,
    ) -> RosterResult<usize> {
        require_admin(actor, "delete")?;
        if ids.is_empty() {
            return Err(RosterError::Invalid("no staff IDs to delete".to_string()));
        }

        let snapshot = self.store().scan_all()?;
        let mut deleted = 0;
        for id in ids.iter() {
            let Some(entry) = snapshot.find_active(id) else {
                continue;
            };
            if !confirm.confirm(&format!("Delete {} ({})?", id, entry.record.name))? {
                log_cancelled("delete", id);
                continue;
            }
            self.tombstone(actor, entry, today)?;
            deleted += 1;
        }
        Ok(deleted)
    }

    fn tombstone(
        &self,
        actor: &StaffRecord,
        entry: &StoredRecord,
        today: NaiveDate,
    ) -> RosterResult<StaffRecord> {
        let tombstoned = entry.record.mark_deleted(today);
        self.store()
            .overwrite_fields(entry.offset, &tombstoned, &[Field::Status])?;
        log_event_with_fields(
            Event::StaffDeleted,
            &[
                ("actor", actor.id.as_str()),
                ("date", &today.to_string()),
                ("staff_id", entry.record.id.as_str()),
            ],
        );
        Ok(tombstoned)
    }

    /// Replaces a staff member's password after checking the old one.
    pub fn change_credential(
        &self,
        id: &str,
        old_password: &str,
        new_password: &str,
    ) -> RosterResult<()> {
        check_password(new_password)?;
        let entry = self.find_active(id)?;
        if !entry.record.credential.verify(old_password) {
            log_event_with_fields(Event::LoginFailed, &[("staff_id", id)]);
            return Err(RosterError::InvalidCredentials);
        }

        let updated = StaffRecord {
            credential: Credential::from_password(new_password),
            ..entry.record
        };
        warn_on_collision(&updated);
        self.store()
            .overwrite_fields(entry.offset, &updated, &[Field::Status])?;
        log_event_with_fields(Event::CredentialChanged, &[("staff_id", id)]);
        Ok(())
    }

    /// Paginated display. Returns the matched count.
    pub fn display<N, W>(
        &self,
        policy: &mut QueryPolicy,
        navigator: &mut N,
        out: &mut W,
    ) -> RosterResult<usize>
    where
        N: PageNavigator + ?Sized,
        W: Write,
    {
        Ok(self.engine.run(policy, navigator, out)?)
    }

    /// Narrows the policy's ID list. Returns the list length.
    pub fn search(
        &self,
        policy: &mut QueryPolicy,
        predicate: &TextPredicate,
        op: SearchOp,
    ) -> RosterResult<usize> {
        Ok(self.engine.narrow(policy, predicate, op)?)
    }

    /// Writes every record the policy shows as a JSON array, in file order.
    /// Returns how many were written.
    pub fn export<W: Write>(&self, policy: &mut QueryPolicy, out: &mut W) -> RosterResult<usize> {
        let (snapshot, plan) = self.engine.plan(policy)?;
        let rows = visible_rows(&snapshot, &plan);
        serde_json::to_writer_pretty(&mut *out, &rows).map_err(|e| {
            if e.is_io() {
                RosterError::Query(QueryError::Output(io::Error::from(e)))
            } else {
                RosterError::Invalid(format!("export failed: {}", e))
            }
        })?;
        writeln!(out).map_err(QueryError::from)?;
        Ok(rows.len())
    }
}

fn visible_rows(snapshot: &StoreSnapshot, plan: &QueryPlan) -> Vec<ExportRow> {
    plan.visible()
        .iter_ones()
        .map(|i| ExportRow::from(&snapshot.entries[i].record))
        .collect()
}
