//! CLI argument definitions using clap
//!
//! Commands:
//! - staffdb bootstrap
//! - staffdb add --actor <id> --id <id> --name <name> --position <pos>
//! - staffdb login --id <id>
//! - staffdb list [--deleted | --all] [--fields id,name] [--page N] [--batch]
//! - staffdb search --field <f> --pattern <p> [--then op:field:pattern]...
//! - staffdb delete --actor <id> --id <id>... [--yes]
//! - staffdb modify --actor <id> --id <id> [--name ...] [--yes]
//! - staffdb passwd --id <id>
//! - staffdb export [--deleted | --all]
//! - staffdb hash <text>
//!
//! Passwords and confirmations are read from stdin, one per line.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use crate::config::{DEFAULT_DATA_FILE, DEFAULT_PAGE_SIZE};

/// staffdb - staff roster over a flat binary file
#[derive(Parser, Debug)]
#[command(name = "staffdb")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Staff data file
    #[arg(long, global = true, default_value = DEFAULT_DATA_FILE)]
    pub data_file: PathBuf,

    /// Records per page
    #[arg(long, global = true, default_value_t = DEFAULT_PAGE_SIZE)]
    pub page_size: usize,

    /// Log every event, including store reads and writes
    #[arg(long, global = true, conflicts_with = "quiet")]
    pub verbose: bool,

    /// Log errors only
    #[arg(long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// Which records a listing shows
#[derive(Args, Debug, Clone, Copy, Default)]
pub struct StateFilter {
    /// Show deleted records only
    #[arg(long, conflicts_with = "all")]
    pub deleted: bool,

    /// Show active and deleted records
    #[arg(long)]
    pub all: bool,
}

impl StateFilter {
    /// `(show_active, show_deleted)`
    pub fn visibility(&self) -> (bool, bool) {
        if self.all {
            (true, true)
        } else if self.deleted {
            (false, true)
        } else {
            (true, false)
        }
    }
}

/// Page and column selection
#[derive(Args, Debug, Clone, Default)]
pub struct ViewArgs {
    #[command(flatten)]
    pub state: StateFilter,

    /// Comma-separated fields to show (id, name, position, phone, national_id, status)
    #[arg(long, value_delimiter = ',')]
    pub fields: Vec<String>,

    /// Page to start on, from 1
    #[arg(long, default_value_t = 1)]
    pub page: usize,

    /// Print one page and exit without prompting
    #[arg(long)]
    pub batch: bool,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Seed the default administrator if no admin exists
    Bootstrap,

    /// Add a staff member (admin only)
    Add {
        /// ID of the admin performing the action
        #[arg(long)]
        actor: String,
        #[arg(long)]
        id: String,
        #[arg(long)]
        name: String,
        #[arg(long)]
        position: String,
        #[arg(long, default_value = "")]
        phone: String,
        #[arg(long, default_value = "")]
        national_id: String,
    },

    /// Check a staff member's password
    Login {
        #[arg(long)]
        id: String,
    },

    /// Browse records page by page
    List {
        #[command(flatten)]
        view: ViewArgs,
    },

    /// Search one field with a LIKE pattern (% and _)
    Search {
        #[arg(long)]
        field: String,
        #[arg(long)]
        pattern: String,
        #[arg(long)]
        ignore_case: bool,
        /// Further narrowing steps as op:field:pattern (append, remove, invert)
        #[arg(long = "then")]
        then: Vec<String>,
        #[command(flatten)]
        view: ViewArgs,
    },

    /// Mark staff members deleted (admin only)
    Delete {
        #[arg(long)]
        actor: String,
        #[arg(long = "id", required = true)]
        ids: Vec<String>,
        /// Skip confirmation
        #[arg(long)]
        yes: bool,
    },

    /// Change a staff member's details (admin only)
    Modify {
        #[arg(long)]
        actor: String,
        #[arg(long)]
        id: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        position: Option<String>,
        #[arg(long)]
        phone: Option<String>,
        #[arg(long)]
        national_id: Option<String>,
        /// Skip confirmation
        #[arg(long)]
        yes: bool,
    },

    /// Change your own password
    Passwd {
        #[arg(long)]
        id: String,
    },

    /// Write records as JSON to stdout
    Export {
        #[command(flatten)]
        state: StateFilter,
    },

    /// Print the credential digest of a string
    Hash { text: String },
}

impl Command {
    pub fn name(&self) -> &'static str {
        match self {
            Command::Bootstrap => "bootstrap",
            Command::Add { .. } => "add",
            Command::Login { .. } => "login",
            Command::List { .. } => "list",
            Command::Search { .. } => "search",
            Command::Delete { .. } => "delete",
            Command::Modify { .. } => "modify",
            Command::Passwd { .. } => "passwd",
            Command::Export { .. } => "export",
            Command::Hash { .. } => "hash",
        }
    }
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}
