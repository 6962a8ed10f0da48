mod login;
mod logout;
mod status;

use vet_auth::{App, AuthApi};

use crate::cli::GlobalFlags;
use crate::cli::subcommands::AuthCommands;

/// Handle `vetdesk auth <subcommand>`.
pub async fn handle<A: AuthApi + 'static>(
    action: &AuthCommands,
    app: &App<A>,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    match action {
        AuthCommands::Login(args) => login::handle(args, app, flags).await,
        AuthCommands::Logout => logout::handle(app, flags).await,
        AuthCommands::Status => status::handle(app, flags).await,
    }
}
