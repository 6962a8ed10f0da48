use serde::Serialize;
use vet_auth::{App, AuthApi};

use crate::cli::GlobalFlags;
use crate::output::output;

#[derive(Serialize)]
struct AuthLogoutResponse {
    cleared: bool,
}

pub async fn handle<A: AuthApi + 'static>(app: &App<A>, flags: &GlobalFlags) -> anyhow::Result<()> {
    app.logout().await;
    output(
        &AuthLogoutResponse {
            cleared: !app.store().is_authenticated(),
        },
        flags.format,
    )
}
