use std::sync::Arc;

use anyhow::Context;
use vet_auth::{App, CredentialStore, FileSessionStorage, HttpAuthService, SystemCredentials};
use vet_config::VetConfig;

pub fn load_config() -> anyhow::Result<VetConfig> {
    VetConfig::load_with_dotenv().context("failed to load vetdesk configuration")
}

/// Wire the production stack: HTTP service, file-backed session, system
/// credential store.
pub fn build_app(config: &VetConfig) -> anyhow::Result<App<HttpAuthService>> {
    let storage_path = config.session.resolved_storage_path().context(
        "no data directory available; set VETDESK_SESSION__STORAGE_PATH to choose where the session is kept",
    )?;
    tracing::debug!(path = %storage_path.display(), "session storage");

    let credentials: Arc<dyn CredentialStore> = Arc::new(SystemCredentials::new());
    let api = HttpAuthService::new(&config.api, Arc::clone(&credentials))?;

    Ok(App::mount(
        &config.session,
        Arc::new(FileSessionStorage::new(storage_path)),
        api,
        credentials,
    ))
}
