use serde::Serialize;
use vet_auth::{App, AuthApi};

use crate::cli::GlobalFlags;
use crate::cli::subcommands::auth::AuthLoginArgs;
use crate::output::output;

#[derive(Serialize)]
struct AuthLoginResponse {
    authenticated: bool,
    destination: String,
    user_id: String,
    name: String,
    role: String,
    token_stored: bool,
}

pub async fn handle<A: AuthApi + 'static>(
    args: &AuthLoginArgs,
    app: &App<A>,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    let destination = app
        .login(&args.email, &args.password)
        .await
        .map_err(|error| anyhow::anyhow!("auth login: {error}"))?;

    let user = app
        .store()
        .user()
        .ok_or_else(|| anyhow::anyhow!("auth login: session was cleared during login"))?;

    output(
        &AuthLoginResponse {
            authenticated: true,
            destination,
            user_id: user.id.clone(),
            name: user.display_name(),
            role: user.role.to_string(),
            token_stored: app.token_status().present,
        },
        flags.format,
    )
}
