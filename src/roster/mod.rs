//! Roster service: the per-action surface the shell calls
//!
//! Every action returns a [`RosterResult`]; [`result_code`] turns it into
//! the small integer the shell reports. Destructive actions take a
//! [`Confirmation`] and write nothing unless it agrees.

mod confirm;
mod errors;
mod service;

pub use confirm::{AssumeYes, Confirmation};
pub use errors::{result_code, ResultCode, RosterError, RosterResult};
pub use service::{
    check_password, ExportRow, NewStaff, Roster, StaffChanges, BOOTSTRAP_ID, BOOTSTRAP_PASSWORD,
    MAX_PASSWORD_BYTES,
};
