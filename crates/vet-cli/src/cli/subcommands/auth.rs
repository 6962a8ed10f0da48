use clap::{Args, Subcommand};

/// Authentication commands.
#[derive(Clone, Debug, Subcommand)]
pub enum AuthCommands {
    /// Log in with email and password.
    Login(AuthLoginArgs),
    /// Log out on the server and clear the local session.
    Logout,
    /// Show the local session, stored token and server status.
    Status,
}

#[derive(Clone, Debug, Args)]
pub struct AuthLoginArgs {
    #[arg(long)]
    pub email: String,
    /// Falls back to `VETDESK_PASSWORD`.
    #[arg(long, env = "VETDESK_PASSWORD", hide_env_values = true)]
    pub password: String,
}
