//! Structured JSON logger
//!
//! - One JSON object per line, one line per event
//! - `event` first, `severity` second, remaining keys sorted
//! - Synchronous, unbuffered, always stderr (stdout carries rendered tables)
//! - A process-wide threshold drops lines below a chosen severity

use std::fmt;
use std::io::{self, Write};
use std::sync::atomic::{AtomicU8, Ordering};

/// Threshold until `Logger::set_threshold` is called.
pub const DEFAULT_THRESHOLD: Severity = Severity::Warn;

static THRESHOLD: AtomicU8 = AtomicU8::new(DEFAULT_THRESHOLD as u8);

/// Log severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    /// Store scans and page builds
    Trace = 0,
    /// Writes, logins and commands
    Info = 1,
    /// Denied or suspicious actions
    Warn = 2,
    /// Failed commands
    Error = 3,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Trace => "TRACE",
            Severity::Info => "INFO",
            Severity::Warn => "WARN",
            Severity::Error => "ERROR",
        }
    }

    fn from_u8(raw: u8) -> Self {
        match raw {
            0 => Severity::Trace,
            1 => Severity::Info,
            2 => Severity::Warn,
            _ => Severity::Error,
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Writes one JSON line per event to stderr.
pub struct Logger;

impl Logger {
    /// Sets the lowest severity that is written.
    pub fn set_threshold(severity: Severity) {
        THRESHOLD.store(severity as u8, Ordering::Relaxed);
    }

    /// Returns the current threshold.
    pub fn threshold() -> Severity {
        Severity::from_u8(THRESHOLD.load(Ordering::Relaxed))
    }

    /// Returns whether a line at `severity` would be written.
    pub fn enabled(severity: Severity) -> bool {
        severity >= Self::threshold()
    }

    /// Writes `event` with `fields` sorted by key, if `severity` passes
    /// the threshold.
    pub fn log(severity: Severity, event: &str, fields: &[(&str, &str)]) {
        if Self::enabled(severity) {
            Self::log_to_writer(severity, event, fields, &mut io::stderr());
        }
    }

    /// Formats one line and writes it with a single `write_all`.
    fn log_to_writer<W: Write>(
        severity: Severity,
        event: &str,
        fields: &[(&str, &str)],
        writer: &mut W,
    ) {
        let mut line = String::with_capacity(128 + fields.len() * 32);

        line.push_str("{\"event\":");
        Self::push_json_str(&mut line, event);
        line.push_str(",\"severity\":\"");
        line.push_str(severity.as_str());
        line.push('"');

        let mut sorted: Vec<&(&str, &str)> = fields.iter().collect();
        sorted.sort_by_key(|(key, _)| *key);

        for (key, value) in sorted {
            line.push(',');
            Self::push_json_str(&mut line, key);
            line.push(':');
            Self::push_json_str(&mut line, value);
        }

        line.push_str("}\n");

        // Logging never fails the caller.
        let _ = writer.write_all(line.as_bytes());
        let _ = writer.flush();
    }

    /// Appends `s` as a quoted JSON string.
    fn push_json_str(line: &mut String, s: &str) {
        match serde_json::to_string(s) {
            Ok(quoted) => line.push_str(&quoted),
            Err(_) => line.push_str("\"\""),
        }
    }

    /// Logs a failed command.
    pub fn error(event: &str, fields: &[(&str, &str)]) {
        Self::log(Severity::Error, event, fields);
    }
}

#[cfg(test)]
pub fn capture_log(
    severity: Severity,
    event: &str,
    fields: &[(&str, &str)],
) -> String {
    let mut buffer = Vec::new();
    Logger::log_to_writer(severity, event, fields, &mut buffer);
    String::from_utf8(buffer).unwrap()
}
