use serde::Serialize;
use vet_auth::{App, AuthApi, TokenStatus};

use crate::cli::GlobalFlags;
use crate::output::output;

#[derive(Serialize)]
struct AuthStatusResponse {
    authenticated: bool,
    user_id: Option<String>,
    name: Option<String>,
    role: Option<String>,
    token: TokenStatus,
    server: Option<ServerStatus>,
    note: Option<String>,
}

#[derive(Serialize)]
struct ServerStatus {
    authenticated: bool,
    error: Option<String>,
}

pub async fn handle<A: AuthApi + 'static>(app: &App<A>, flags: &GlobalFlags) -> anyhow::Result<()> {
    if !app.store().is_authenticated() {
        return output(
            &AuthStatusResponse {
                authenticated: false,
                user_id: None,
                name: None,
                role: None,
                token: app.token_status(),
                server: None,
                note: Some("no local session; run `vetdesk auth login`".into()),
            },
            flags.format,
        );
    }

    let server = match app.server_status().await {
        Ok(status) => ServerStatus {
            authenticated: status.is_authenticated,
            error: None,
        },
        Err(error) => ServerStatus {
            authenticated: false,
            error: Some(error.to_string()),
        },
    };

    // A 401 above has already cleared the session through the root listener.
    let user = app.store().user();
    output(
        &AuthStatusResponse {
            authenticated: app.store().is_authenticated(),
            user_id: user.as_ref().map(|u| u.id.clone()),
            name: user.as_ref().map(vet_core::User::display_name),
            role: user.as_ref().map(|u| u.role.to_string()),
            token: app.token_status(),
            server: Some(server),
            note: None,
        },
        flags.format,
    )
}
