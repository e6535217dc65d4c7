//! Line-oriented terminal input
//!
//! Prompts go to stderr so stdout carries only tables and JSON. Input is
//! read one line at a time; a closed stream is end of input.

use std::io::{self, BufRead, Write};

use super::errors::{CliError, CliResult};
use crate::query::{PageAction, PageNavigator, PageView, QueryError, QueryResult};
use crate::roster::{Confirmation, RosterError, RosterResult};

/// Reads answers from `input`, one per line.
pub struct LinePrompt<R> {
    input: R,
}

impl LinePrompt<io::StdinLock<'static>> {
    pub fn stdin() -> Self {
        Self::new(io::stdin().lock())
    }
}

impl<R: BufRead> LinePrompt<R> {
    pub fn new(input: R) -> Self {
        Self { input }
    }

    /// Shows `prompt` and reads one line without its terminator.
    /// `Ok(None)` when the stream is closed.
    pub fn ask(&mut self, prompt: &str) -> io::Result<Option<String>> {
        let mut stderr = io::stderr();
        write!(stderr, "{}", prompt)?;
        stderr.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        while line.ends_with('\n') || line.ends_with('\r') {
            line.pop();
        }
        Ok(Some(line))
    }

    /// Like [`ask`](Self::ask), with end of input as an error.
    pub fn require(&mut self, prompt: &str) -> CliResult<String> {
        self.ask(prompt)?
            .ok_or_else(|| CliError::from(RosterError::EndOfInput))
    }

    /// Reads a new password twice until both entries agree.
    pub fn new_password(&mut self, label: &str) -> CliResult<String> {
        loop {
            let first = self.require(&format!("{}: ", label))?;
            let second = self.require("Re-enter password: ")?;
            if first == second {
                return Ok(first);
            }
            eprintln!("Passwords do not match!\n");
        }
    }
}

/// Maps a typed answer to a page action; anything unrecognised is "next".
pub fn parse_page_action(answer: &str) -> PageAction {
    match answer.trim().chars().next().map(|c| c.to_ascii_uppercase()) {
        Some('Q') => PageAction::Quit,
        Some('B') => PageAction::Previous,
        _ => PageAction::Next,
    }
}

impl<R: BufRead> PageNavigator for LinePrompt<R> {
    fn next_action(&mut self, view: &PageView) -> QueryResult<PageAction> {
        let answer = self
            .ask("Enter N for next page, B to go back, Q to quit (default=N): ")?
            .ok_or(QueryError::EndOfInput)?;
        let action = parse_page_action(&answer);
        if action == PageAction::Next && view.is_last() {
            eprintln!("Already on the last page.");
        } else if action == PageAction::Previous && view.is_first() {
            eprintln!("Already on the first page.");
        }
        Ok(action)
    }
}

impl<R: BufRead> Confirmation for LinePrompt<R> {
    fn confirm(&mut self, prompt: &str) -> RosterResult<bool> {
        let answer = self
            .ask(&format!("{} [y/N]: ", prompt))
            .map_err(QueryError::from)?
            .ok_or(RosterError::EndOfInput)?;
        Ok(matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn prompt(input: &str) -> LinePrompt<Cursor<Vec<u8>>> {
        LinePrompt::new(Cursor::new(input.as_bytes().to_vec()))
    }

    fn view(page: usize, last_page: usize) -> PageView {
        PageView {
            projection: Vec::new(),
            rows: Vec::new(),
            page,
            last_page,
            matched: 0,
        }
    }

    #[test]
    fn test_parse_page_action() {
        assert_eq!(parse_page_action("q"), PageAction::Quit);
        assert_eq!(parse_page_action("Back"), PageAction::Previous);
        assert_eq!(parse_page_action(""), PageAction::Next);
        assert_eq!(parse_page_action("x"), PageAction::Next);
    }

    #[test]
    fn test_navigator_end_of_input() {
        let mut p = prompt("n\r\n");
        assert_eq!(p.next_action(&view(0, 2)).unwrap(), PageAction::Next);
        assert!(matches!(
            p.next_action(&view(1, 2)),
            Err(QueryError::EndOfInput)
        ));
    }

    #[test]
    fn test_confirm() {
        let mut p = prompt("y\nno\n");
        assert!(p.confirm("Delete?").unwrap());
        assert!(!p.confirm("Delete?").unwrap());
        assert!(matches!(p.confirm("Delete?"), Err(RosterError::EndOfInput)));
    }

    #[test]
    fn test_new_password_retries_until_match() {
        let mut p = prompt("a\nb\nsecret\nsecret\n");
        assert_eq!(p.new_password("Password").unwrap(), "secret");
    }
}
