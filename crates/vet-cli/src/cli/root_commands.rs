use clap::{Args, Subcommand};

use crate::cli::subcommands::{AuthCommands, TokenCommands};

/// Top-level command tree.
#[derive(Clone, Debug, Subcommand)]
pub enum Commands {
    /// Log in, log out, and inspect the current session.
    Auth {
        #[command(subcommand)]
        action: AuthCommands,
    },
    /// Offline bearer-token utilities.
    Token {
        #[command(subcommand)]
        action: TokenCommands,
    },
    /// Report what the route gate renders for a protected path.
    Open(OpenArgs),
}

/// Arguments for `vetdesk open`.
#[derive(Clone, Debug, Args)]
pub struct OpenArgs {
    /// Protected path, e.g. `/appointments`.
    pub path: String,
    /// Role required by the route (admin, veterinarian, staff, receptionist, client).
    #[arg(long)]
    pub role: Option<String>,
}
