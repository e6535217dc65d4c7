//! Typed lifecycle events
//!
//! Every log line the crate emits names one of these.

use std::fmt;

/// Observable events
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    // Store
    /// Full-file scan finished
    StoreScan,
    /// Record appended
    StoreAppend,
    /// Record rewritten in place
    StoreOverwrite,

    // Roster actions
    /// New staff member added
    StaffAdded,
    /// Staff details rewritten
    StaffModified,
    /// Staff record tombstoned
    StaffDeleted,
    /// Password digest replaced
    CredentialChanged,
    /// Credentials accepted
    LoginSucceeded,
    /// Credentials rejected
    LoginFailed,
    /// Caller declined a confirmation
    ActionCancelled,
    /// Action refused for a non-admin actor
    PermissionDenied,

    // Query
    /// Pagination pass finished
    QueryComplete,
    /// Incremental search changed the ID list
    SearchNarrowed,

    // Known weaknesses
    /// New digest has all-zero high bits and will read back as deleted
    TombstoneCollision,

    // CLI
    /// Effective configuration resolved
    ConfigLoaded,
    /// Subcommand starting
    CommandStart,
    /// Subcommand finished
    CommandComplete,
}

impl Event {
    /// Returns the string representation of the event
    pub fn as_str(&self) -> &'static str {
        match self {
            Event::StoreScan => "STORE_SCAN",
            Event::StoreAppend => "STORE_APPEND",
            Event::StoreOverwrite => "STORE_OVERWRITE",

            Event::StaffAdded => "STAFF_ADDED",
            Event::StaffModified => "STAFF_MODIFIED",
            Event::StaffDeleted => "STAFF_DELETED",
            Event::CredentialChanged => "CREDENTIAL_CHANGED",
            Event::LoginSucceeded => "LOGIN_SUCCEEDED",
            Event::LoginFailed => "LOGIN_FAILED",
            Event::ActionCancelled => "ACTION_CANCELLED",
            Event::PermissionDenied => "PERMISSION_DENIED",

            Event::QueryComplete => "QUERY_COMPLETE",
            Event::SearchNarrowed => "SEARCH_NARROWED",

            Event::TombstoneCollision => "TOMBSTONE_COLLISION",

            Event::ConfigLoaded => "CONFIG_LOADED",
            Event::CommandStart => "COMMAND_START",
            Event::CommandComplete => "COMMAND_COMPLETE",
        }
    }

    /// Events logged at WARN rather than INFO
    pub fn is_warning(&self) -> bool {
        matches!(
            self,
            Event::LoginFailed | Event::PermissionDenied | Event::TombstoneCollision
        )
    }

    /// High-volume events logged at TRACE
    pub fn is_trace(&self) -> bool {
        matches!(
            self,
            Event::StoreScan | Event::StoreAppend | Event::StoreOverwrite
        )
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_names_are_upper_snake() {
        let events = [
            Event::StoreScan,
            Event::StoreAppend,
            Event::StoreOverwrite,
            Event::StaffAdded,
            Event::StaffModified,
            Event::StaffDeleted,
            Event::CredentialChanged,
            Event::LoginSucceeded,
            Event::LoginFailed,
            Event::ActionCancelled,
            Event::PermissionDenied,
            Event::QueryComplete,
            Event::SearchNarrowed,
            Event::TombstoneCollision,
            Event::ConfigLoaded,
            Event::CommandStart,
            Event::CommandComplete,
        ];

        for event in events {
            let s = event.as_str();
            assert!(!s.is_empty());
            assert!(s.chars().all(|c| c.is_ascii_uppercase() || c == '_'));
            assert!(!(event.is_trace() && event.is_warning()));
        }
    }

    #[test]
    fn test_warning_events() {
        assert!(Event::TombstoneCollision.is_warning());
        assert!(Event::LoginFailed.is_warning());
        assert!(!Event::StaffAdded.is_warning());
    }

    #[test]
    fn test_event_display() {
        assert_eq!(format!("{}", Event::StaffDeleted), "STAFF_DELETED");
        assert_eq!(format!("{}", Event::CommandStart), "COMMAND_START");
    }
}
