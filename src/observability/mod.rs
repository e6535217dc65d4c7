//! Observability: structured logging and typed events
//!
//! Logging is read-only with respect to the roster: it never fails an
//! operation and never touches the data file.
//!
//! ```ignore
//! use staffdb::observability::{log_event_with_fields, Event};
//!
//! log_event_with_fields(Event::StaffDeleted, &[("staff_id", "S0001")]);
//! ```

mod events;
mod logger;

pub use events::Event;
pub use logger::{Logger, Severity, DEFAULT_THRESHOLD};

/// Severity an event is logged at.
pub fn severity_of(event: Event) -> Severity {
    if event.is_warning() {
        Severity::Warn
    } else if event.is_trace() {
        Severity::Trace
    } else {
        Severity::Info
    }
}

/// Log a lifecycle event with fields
pub fn log_event_with_fields(event: Event, fields: &[(&str, &str)]) {
    Logger::log(severity_of(event), event.as_str(), fields);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_severity_of() {
        assert_eq!(severity_of(Event::TombstoneCollision), Severity::Warn);
        assert_eq!(severity_of(Event::StoreScan), Severity::Trace);
        assert_eq!(severity_of(Event::StaffAdded), Severity::Info);
    }

    #[test]
    fn test_log_event_with_fields() {
        log_event_with_fields(Event::StaffAdded, &[("staff_id", "S0001")]);
    }
}
