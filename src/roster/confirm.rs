//! Confirmation step guarding every destructive write

use super::errors::RosterResult;

/// Asks the caller whether a write may go ahead.
///
/// Returning `Ok(false)` cancels the action before anything is written.
/// Implementations report a closed input stream as
/// [`RosterError::EndOfInput`](super::RosterError::EndOfInput).
pub trait Confirmation {
    fn confirm(&mut self, prompt: &str) -> RosterResult<bool>;
}

/// Confirms everything without asking (`--yes`).
#[derive(Debug, Default, Clone, Copy)]
pub struct AssumeYes;

impl Confirmation for AssumeYes {
    fn confirm(&mut self, _prompt: &str) -> RosterResult<bool> {
        Ok(true)
    }
}
