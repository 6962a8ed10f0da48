use clap::{Args, Subcommand};

/// Bearer-token commands. These never touch the network.
#[derive(Clone, Debug, Subcommand)]
pub enum TokenCommands {
    /// Decode a token's payload and report its expiry.
    Inspect(TokenInspectArgs),
}

#[derive(Clone, Debug, Args)]
pub struct TokenInspectArgs {
    pub token: String,
    /// Treat the token as expired this many seconds early. Defaults to
    /// `session.expiry_buffer_secs`.
    #[arg(long)]
    pub buffer_secs: Option<i64>,
}
