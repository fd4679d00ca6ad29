//! CLI argument definitions.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use eventdesk::BackendKind;

use crate::commands::auth::AuthCommand;
use crate::commands::codes::CodesCommand;
use crate::commands::events::EventsCommand;
use crate::commands::locations::LocationsCommand;

/// Command-line client for the eventdesk backend.
#[derive(Parser, Debug)]
#[command(name = "eventdesk")]
#[command(author, version = env!("EVENTDESK_VERSION"), about, long_about = None)]
pub struct Cli {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Output logs as JSON
    #[arg(long, global = true)]
    pub json_logs: bool,

    /// Backend base URL
    #[arg(long, env = "EVENTDESK_API_URL", global = true)]
    pub api_url: Option<String>,

    /// Backend variant (legacy or v2)
    #[arg(long, env = "EVENTDESK_BACKEND", default_value = "legacy", global = true)]
    pub backend: BackendKind,

    /// Directory holding the stored session (defaults to the user data dir)
    #[arg(long, env = "EVENTDESK_DATA_DIR", global = true)]
    pub data_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Sign in, sign out and inspect the session
    Auth(AuthCommand),

    /// Organizer events
    Events(EventsCommand),

    /// Discount codes
    Codes(CodesCommand),

    /// Store locations
    Locations(LocationsCommand),
}
