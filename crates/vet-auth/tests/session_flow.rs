//! Login, restart, validate and invalidate against file-backed storage.

use std::sync::Arc;

use pretty_assertions::assert_eq;
use serde_json::Map;
use vet_auth::mock::{MockAuthApi, MockFailure};
use vet_auth::{
    App, CredentialStore, FileSessionStorage, GateState, LoginResponse, MemoryCredentials,
    RouteView, SessionPersistence,
};
use vet_config::SessionConfig;
use vet_core::{Role, User, UserPatch};

fn staff() -> User {
    User {
        id: "u_21".into(),
        email: "front@clinic.test".into(),
        first_name: "Jo".into(),
        last_name: "Reyes".into(),
        role: Role::Staff,
        extra: Map::new(),
    }
}

fn api_for(user: User) -> MockAuthApi {
    MockAuthApi::new().with_login(LoginResponse {
        user,
        access_token: None,
    })
}

#[tokio::test]
async fn session_survives_restart() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("auth-storage.json");
    let config = SessionConfig::default();
    let credentials = Arc::new(MemoryCredentials::new());

    let first = App::mount(
        &config,
        Arc::new(FileSessionStorage::new(&path)),
        api_for(staff()),
        credentials.clone(),
    );
    first.login("front@clinic.test", "hunter22").await.unwrap();
    assert!(first.store().update_user(UserPatch {
        role: Some(Role::Admin),
        ..UserPatch::default()
    }));
    drop(first);

    let raw = std::fs::read_to_string(&path).unwrap();
    assert!(raw.contains("\"version\":0"));

    let second = App::mount(
        &config,
        Arc::new(FileSessionStorage::new(&path)),
        MockAuthApi::new(),
        credentials,
    );
    assert!(second.store().is_authenticated());
    assert_eq!(second.store().role(), Some(Role::Admin));

    let outcome = second.open("/settings", Some(Role::Admin)).await;
    assert_eq!(outcome.state, GateState::AuthenticatedOk);
    assert_eq!(outcome.view, RouteView::Children);
}

#[tokio::test]
async fn corrupted_file_starts_logged_out_and_is_cleared() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("auth-storage.json");
    std::fs::write(&path, "{\"state\": {\"isAuthenticated\": tru").unwrap();

    let storage = Arc::new(FileSessionStorage::new(&path));
    let app = App::mount(
        &SessionConfig::default(),
        storage.clone(),
        MockAuthApi::new(),
        Arc::new(MemoryCredentials::new()),
    );
    assert!(!app.store().is_authenticated());
    assert_eq!(storage.load().unwrap(), None);
}

#[tokio::test]
async fn server_invalidation_clears_file_and_token() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("auth-storage.json");
    let credentials = Arc::new(MemoryCredentials::new());
    let api = api_for(staff()).with_status_failure(MockFailure::Unauthorized);
    let app = App::mount(
        &SessionConfig::default(),
        Arc::new(FileSessionStorage::new(&path)),
        api,
        credentials.clone(),
    );
    app.login("front@clinic.test", "hunter22").await.unwrap();
    credentials.store("h.p.s").unwrap();

    let outcome = app.open("/appointments", None).await;
    assert_eq!(outcome.view, RouteView::Loading);
    assert_eq!(outcome.location.path, "/login");
    assert!(!app.store().is_authenticated());
    assert_eq!(credentials.load(), None);
    assert!(!path.exists());
}
