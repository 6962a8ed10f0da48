pub mod auth;
pub mod open;
pub mod token;

use vet_auth::{App, AuthApi};

use crate::cli::{Commands, GlobalFlags};

/// Dispatch a parsed command that needs the mounted app.
pub async fn dispatch<A: AuthApi + 'static>(
    command: Commands,
    app: &App<A>,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    match command {
        Commands::Auth { action } => auth::handle(&action, app, flags).await,
        Commands::Open(args) => open::handle(&args, app, flags).await,
        Commands::Token { .. } => {
            unreachable!("token commands are pre-dispatched in main")
        }
    }
}
