//! CLI command implementations
//!
//! Each command is a thin shell over one roster action: parse the flags,
//! prompt for passwords and confirmations, print the outcome. All checks
//! and writes happen in [`Roster`].

use std::io::{self, BufRead, Write};

use chrono::Local;

use super::args::{Cli, Command, StateFilter, ViewArgs};
use super::errors::{CliError, CliResult};
use super::io::LinePrompt;
use crate::config::RosterConfig;
use crate::hash;
use crate::observability::{
    log_event_with_fields, Event, Logger, Severity, DEFAULT_THRESHOLD,
};
use crate::query::{
    IdList, NoPrompt, PageNavigator, PaginationMode, QueryPolicy, SearchOp, TextPredicate,
    DEFAULT_PROJECTION,
};
use crate::roster::{
    AssumeYes, Confirmation, NewStaff, ResultCode, Roster, RosterError, StaffChanges,
};
use crate::storage::{Field, StaffId, StaffRecord};

/// Password attempts allowed per login.
pub const MAX_LOGIN_ATTEMPTS: usize = 3;

/// Main CLI entry point
///
/// Parses arguments, runs one command and returns its result code.
/// This is the only function that main.rs should call.
pub fn run() -> ResultCode {
    let cli = Cli::parse_args();
    Logger::set_threshold(if cli.verbose {
        Severity::Trace
    } else if cli.quiet {
        Severity::Error
    } else {
        DEFAULT_THRESHOLD
    });

    let name = cli.command.name();
    log_event_with_fields(Event::CommandStart, &[("command", name)]);

    let code = match execute(cli) {
        Ok(()) => ResultCode::Success,
        Err(e) => {
            Logger::error(e.code_str(), &[("command", name), ("message", e.message())]);
            eprintln!("{}", e);
            e.result_code()
        }
    };

    log_event_with_fields(
        Event::CommandComplete,
        &[("code", &code.code().to_string()), ("command", name)],
    );
    code
}

fn execute(cli: Cli) -> CliResult<()> {
    let config = RosterConfig {
        data_file: cli.data_file,
        page_size: cli.page_size,
        ..RosterConfig::default()
    };
    config.validate()?;
    log_event_with_fields(
        Event::ConfigLoaded,
        &[
            ("data_file", &config.data_file.display().to_string()),
            ("page_size", &config.page_size.to_string()),
        ],
    );

    let roster = Roster::open(&config);
    let mut prompt = LinePrompt::stdin();
    let stdout = io::stdout();
    let mut out = stdout.lock();
    run_command(&roster, cli.command, &mut prompt, &mut out)
}

/// Runs one command against `roster`, reading answers from `prompt`.
pub fn run_command<R: BufRead, W: Write>(
    roster: &Roster,
    command: Command,
    prompt: &mut LinePrompt<R>,
    out: &mut W,
) -> CliResult<()> {
    match command {
        Command::Bootstrap => bootstrap(roster, out),
        Command::Add {
            actor,
            id,
            name,
            position,
            phone,
            national_id,
        } => {
            let staff = NewStaff {
                id: StaffId::parse(&id)?,
                name,
                position,
                phone,
                national_id,
            };
            add(roster, prompt, &actor, staff, out)
        }
        Command::Login { id } => {
            let record = login(roster, prompt, &id)?;
            writeln!(out, "Welcome, {} ({})", record.name, record.position)?;
            Ok(())
        }
        Command::List { view } => {
            let mut policy = view_policy(roster, &view)?;
            display(roster, &mut policy, view.batch, prompt, out)
        }
        Command::Search {
            field,
            pattern,
            ignore_case,
            then,
            view,
        } => search(roster, prompt, &field, &pattern, ignore_case, &then, &view, out),
        Command::Delete { actor, ids, yes } => delete(roster, prompt, &actor, ids, yes, out),
        Command::Modify {
            actor,
            id,
            name,
            position,
            phone,
            national_id,
            yes,
        } => {
            let changes = StaffChanges {
                name,
                position,
                phone,
                national_id,
            };
            modify(roster, prompt, &actor, &id, &changes, yes, out)
        }
        Command::Passwd { id } => passwd(roster, prompt, &id, out),
        Command::Export { state } => export(roster, state, out),
        Command::Hash { text } => {
            writeln!(out, "{:016x}", hash::compute_digest(text.as_bytes()))?;
            Ok(())
        }
    }
}

/// Seed the default administrator
pub fn bootstrap<W: Write>(roster: &Roster, out: &mut W) -> CliResult<()> {
    if roster.bootstrap_admin()? {
        writeln!(out, "Default administrator created.")?;
    } else {
        writeln!(out, "An administrator already exists.")?;
    }
    Ok(())
}

/// Authenticate with up to [`MAX_LOGIN_ATTEMPTS`] password attempts
pub fn login<R: BufRead>(
    roster: &Roster,
    prompt: &mut LinePrompt<R>,
    id: &str,
) -> CliResult<StaffRecord> {
    for remaining in (0..MAX_LOGIN_ATTEMPTS).rev() {
        let password = prompt.require("Password: ")?;
        match roster.authenticate(id, &password) {
            Ok(record) => return Ok(record),
            Err(RosterError::InvalidCredentials) if remaining > 0 => {
                eprintln!("Password incorrect! {} attempts left", remaining);
            }
            Err(e) => return Err(e.into()),
        }
    }
    Err(RosterError::InvalidCredentials.into())
}

/// Add a staff member after the actor logs in
pub fn add<R: BufRead, W: Write>(
    roster: &Roster,
    prompt: &mut LinePrompt<R>,
    actor: &str,
    staff: NewStaff,
    out: &mut W,
) -> CliResult<()> {
    let actor = login(roster, prompt, actor)?;
    let password = prompt.new_password("Password for new staff")?;
    let record = roster.add(&actor, staff, &password)?;
    writeln!(out, "New staff {} saved successfully!", record.id)?;
    Ok(())
}

fn parse_field(name: &str) -> CliResult<Field> {
    Field::parse(name).ok_or_else(|| CliError::usage(format!("unknown field '{}'", name)))
}

fn view_policy(roster: &Roster, view: &ViewArgs) -> CliResult<QueryPolicy> {
    let projection = if view.fields.is_empty() {
        DEFAULT_PROJECTION.to_vec()
    } else {
        view.fields
            .iter()
            .map(|f| parse_field(f))
            .collect::<CliResult<Vec<_>>>()?
    };
    let (show_active, show_deleted) = view.state.visibility();
    Ok(roster
        .policy()
        .with_projection(projection)
        .with_visibility(show_active, show_deleted)
        .at_page(view.page.saturating_sub(1)))
}

fn display<R: BufRead, W: Write>(
    roster: &Roster,
    policy: &mut QueryPolicy,
    batch: bool,
    prompt: &mut LinePrompt<R>,
    out: &mut W,
) -> CliResult<()> {
    let mut no_prompt = NoPrompt;
    let navigator: &mut dyn PageNavigator = if batch {
        policy.pagination = PaginationMode::Batch;
        &mut no_prompt
    } else {
        prompt
    };
    roster.display(policy, navigator, out)?;
    Ok(())
}

/// Parses one `op:field:pattern` narrowing step.
pub fn parse_step(step: &str, ignore_case: bool) -> CliResult<(SearchOp, TextPredicate)> {
    let mut parts = step.splitn(3, ':');
    let (Some(op), Some(field), Some(pattern)) = (parts.next(), parts.next(), parts.next()) else {
        return Err(CliError::usage(format!(
            "search step '{}' is not op:field:pattern",
            step
        )));
    };
    let op = SearchOp::parse(op)
        .ok_or_else(|| CliError::usage(format!("unknown search operation '{}'", op)))?;
    Ok((op, TextPredicate::new(parse_field(field)?, pattern, ignore_case)))
}

/// Search, narrow, then display the listed records
#[allow(clippy::too_many_arguments)]
pub fn search<R: BufRead, W: Write>(
    roster: &Roster,
    prompt: &mut LinePrompt<R>,
    field: &str,
    pattern: &str,
    ignore_case: bool,
    then: &[String],
    view: &ViewArgs,
    out: &mut W,
) -> CliResult<()> {
    let mut policy = view_policy(roster, view)?;

    let first = TextPredicate::new(parse_field(field)?, pattern, ignore_case);
    let steps = then
        .iter()
        .map(|s| parse_step(s, ignore_case))
        .collect::<CliResult<Vec<_>>>()?;

    roster.search(&mut policy, &first, SearchOp::Replace)?;
    for (op, predicate) in &steps {
        roster.search(&mut policy, predicate, *op)?;
    }

    display(roster, &mut policy, view.batch, prompt, out)
}

/// Delete one or more staff members
pub fn delete<R: BufRead, W: Write>(
    roster: &Roster,
    prompt: &mut LinePrompt<R>,
    actor: &str,
    ids: Vec<String>,
    yes: bool,
    out: &mut W,
) -> CliResult<()> {
    let actor = login(roster, prompt, actor)?;
    let today = Local::now().date_naive();
    let mut assume_yes = AssumeYes;
    let confirm: &mut dyn Confirmation = if yes { &mut assume_yes } else { prompt };

    if let [id] = ids.as_slice() {
        roster.delete(&actor, id, today, confirm)?;
        writeln!(out, "Staff {} deleted.", id)?;
    } else {
        let list = IdList::from_ids(ids);
        let deleted = roster.delete_listed(&actor, &list, today, confirm)?;
        writeln!(out, "Deleted {} of {} staff.", deleted, list.len())?;
    }
    Ok(())
}

/// Modify a staff member's details
pub fn modify<R: BufRead, W: Write>(
    roster: &Roster,
    prompt: &mut LinePrompt<R>,
    actor: &str,
    id: &str,
    changes: &StaffChanges,
    yes: bool,
    out: &mut W,
) -> CliResult<()> {
    let actor = login(roster, prompt, actor)?;
    let mut assume_yes = AssumeYes;
    let confirm: &mut dyn Confirmation = if yes { &mut assume_yes } else { prompt };
    let updated = roster.modify(&actor, id, changes, confirm)?;
    writeln!(out, "Staff {} updated.", updated.id)?;
    Ok(())
}

/// Change a password
pub fn passwd<R: BufRead, W: Write>(
    roster: &Roster,
    prompt: &mut LinePrompt<R>,
    id: &str,
    out: &mut W,
) -> CliResult<()> {
    let old = prompt.require("Current password: ")?;
    let new = prompt.new_password("New password")?;
    roster.change_credential(id, &old, &new)?;
    writeln!(out, "Password changed.")?;
    Ok(())
}

/// Export records as JSON
pub fn export<W: Write>(roster: &Roster, state: StateFilter, out: &mut W) -> CliResult<()> {
    let (show_active, show_deleted) = state.visibility();
    let mut policy = roster
        .policy()
        .with_visibility(show_active, show_deleted)
        .batch();
    roster.export(&mut policy, out)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::{ColumnLayout, QueryEngine};
    use crate::roster::{BOOTSTRAP_ID, BOOTSTRAP_PASSWORD};
    use crate::storage::StaffStore;
    use clap::Parser;
    use std::io::Cursor;
    use tempfile::TempDir;

    fn roster(dir: &TempDir) -> Roster {
        let store = StaffStore::new(dir.path().join("staff.bin"));
        Roster::new(QueryEngine::new(store, ColumnLayout::default()), 2)
    }

    fn exec(roster: &Roster, args: &[&str], input: &str) -> CliResult<String> {
        let cli = Cli::try_parse_from(std::iter::once("staffdb").chain(args.iter().copied()))
            .map_err(|e| CliError::usage(e.to_string()))?;
        let mut prompt = LinePrompt::new(Cursor::new(input.as_bytes().to_vec()));
        let mut out = Vec::new();
        run_command(roster, cli.command, &mut prompt, &mut out)?;
        Ok(String::from_utf8_lossy(&out).into_owned())
    }

    fn seeded(dir: &TempDir) -> Roster {
        let roster = roster(dir);
        exec(&roster, &["bootstrap"], "").unwrap();
        for (id, name) in [("S0001", "Alice Tan"), ("S0002", "Bob Lim"), ("S0003", "Alan Goh")] {
            let input = format!("{}\npw\npw\n", BOOTSTRAP_PASSWORD);
            exec(
                &roster,
                &["add", "--actor", BOOTSTRAP_ID, "--id", id, "--name", name, "--position", "CLERK"],
                &input,
            )
            .unwrap();
        }
        roster
    }

    #[test]
    fn test_login_retries_then_fails() {
        let dir = TempDir::new().unwrap();
        let roster = seeded(&dir);
        assert!(exec(&roster, &["login", "--id", "S0001"], "x\npw\n")
            .unwrap()
            .contains("Alice Tan"));

        let err = exec(&roster, &["login", "--id", "S0001"], "a\nb\nc\n").unwrap_err();
        assert_eq!(err.result_code(), ResultCode::PermissionDenied);
    }

    #[test]
    fn test_login_end_of_input() {
        let dir = TempDir::new().unwrap();
        let roster = seeded(&dir);
        let err = exec(&roster, &["login", "--id", "S0001"], "").unwrap_err();
        assert_eq!(err.result_code(), ResultCode::EndOfInput);
    }

    #[test]
    fn test_list_interactive_pages() {
        let dir = TempDir::new().unwrap();
        let roster = seeded(&dir);
        // 4 records, page size 2: next, next (no-op on last page), quit
        let out = exec(&roster, &["list"], "n\nn\nq\n").unwrap();
        assert_eq!(out.matches("(Page 1 of 2)").count(), 1);
        assert_eq!(out.matches("(Page 2 of 2)").count(), 2);
    }

    #[test]
    fn test_search_with_steps() {
        let dir = TempDir::new().unwrap();
        let roster = seeded(&dir);
        let out = exec(
            &roster,
            &[
                "search", "--field", "name", "--pattern", "a%", "--ignore-case", "--then",
                "remove:name:%goh", "--batch",
            ],
            "",
        )
        .unwrap();
        assert!(out.contains("Alice Tan"));
        assert!(!out.contains("Alan Goh"));
        assert!(!out.contains("Bob Lim"));
    }

    #[test]
    fn test_bad_search_step() {
        assert!(parse_step("append:name", false).is_err());
        assert!(parse_step("swap:name:x", false).is_err());
        assert!(parse_step("append:salary:x", false).is_err());
        let (op, predicate) = parse_step("invert:position:a:b", true).unwrap();
        assert_eq!(op, SearchOp::Invert);
        assert_eq!(predicate.pattern, "a:b");
    }

    #[test]
    fn test_delete_declined_then_confirmed() {
        let dir = TempDir::new().unwrap();
        let roster = seeded(&dir);
        let args = ["delete", "--actor", BOOTSTRAP_ID, "--id", "S0002"];

        let err = exec(&roster, &args, &format!("{}\nn\n", BOOTSTRAP_PASSWORD)).unwrap_err();
        assert_eq!(err.result_code(), ResultCode::UserCancel);

        exec(&roster, &args, &format!("{}\ny\n", BOOTSTRAP_PASSWORD)).unwrap();
        let out = exec(&roster, &["list", "--deleted", "--batch", "--fields", "id,status"], "")
            .unwrap();
        assert!(out.contains("S0002"));
        assert!(out.contains("deleted"));
    }

    #[test]
    fn test_hash_prints_hex() {
        let dir = TempDir::new().unwrap();
        let out = exec(&roster(&dir), &["hash", "ADMIN"], "").unwrap();
        assert_eq!(out.trim(), "5fa759654e457c84");
    }

    #[test]
    fn test_unknown_field_is_usage_error() {
        let dir = TempDir::new().unwrap();
        let roster = seeded(&dir);
        let err = exec(&roster, &["list", "--fields", "salary"], "").unwrap_err();
        assert_eq!(err.result_code(), ResultCode::Invalid);
    }
}
