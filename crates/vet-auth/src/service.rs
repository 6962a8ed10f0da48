//! Auth API client.
//!
//! [`AuthApi`] is the seam the store-facing code depends on; [`HttpAuthService`]
//! implements it over `reqwest`. A `401` from any endpoint becomes
//! [`AuthError::Unauthorized`] so callers can tell "session invalid" apart from
//! transport or server failures.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use vet_config::ApiConfig;
use vet_core::User;

use crate::credentials::CredentialStore;
use crate::error::AuthError;

const LOGIN_PATH: &str = "/auth/login";
const LOGOUT_PATH: &str = "/auth/logout";
const STATUS_PATH: &str = "/auth/status";

/// Login form credentials.
#[derive(Clone, Serialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl Credentials {
    #[must_use]
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub user: User,
    #[serde(default, alias = "token")]
    pub access_token: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthStatus {
    pub is_authenticated: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<User>,
}

/// Remote auth endpoints consumed by the session layer.
pub trait AuthApi: Send + Sync {
    fn login(
        &self,
        credentials: &Credentials,
    ) -> impl Future<Output = Result<LoginResponse, AuthError>> + Send;

    fn logout(&self) -> impl Future<Output = Result<(), AuthError>> + Send;

    fn auth_status(&self) -> impl Future<Output = Result<AuthStatus, AuthError>> + Send;
}

/// `reqwest`-backed [`AuthApi`].
#[derive(Clone)]
pub struct HttpAuthService {
    client: reqwest::Client,
    api: ApiConfig,
    credentials: Arc<dyn CredentialStore>,
}

impl HttpAuthService {
    /// # Errors
    ///
    /// Returns `AuthError::Network` if the HTTP client cannot be built.
    pub fn new(api: &ApiConfig, credentials: Arc<dyn CredentialStore>) -> Result<Self, AuthError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(api.timeout_secs))
            .build()
            .map_err(|e| AuthError::Network(format!("build HTTP client: {e}")))?;
        Ok(Self {
            client,
            api: api.clone(),
            credentials,
        })
    }

    fn request(&self, method: reqwest::Method, path: &str) -> reqwest::RequestBuilder {
        let builder = self.client.request(method, self.api.endpoint(path));
        match self.credentials.load() {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    async fn send(
        &self,
        builder: reqwest::RequestBuilder,
        what: &str,
    ) -> Result<reqwest::Response, AuthError> {
        let resp = builder
            .send()
            .await
            .map_err(|e| AuthError::Network(format!("{what}: {e}")))?;
        check_status(resp).await
    }
}

impl std::fmt::Debug for HttpAuthService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpAuthService")
            .field("base_url", &self.api.base_url)
            .finish_non_exhaustive()
    }
}

impl AuthApi for HttpAuthService {
    async fn login(&self, credentials: &Credentials) -> Result<LoginResponse, AuthError> {
        let builder = self
            .client
            .post(self.api.endpoint(LOGIN_PATH))
            .json(credentials);
        let resp = self.send(builder, "login").await?;
        resp.json()
            .await
            .map_err(|e| AuthError::Network(format!("parse login response: {e}")))
    }

    async fn logout(&self) -> Result<(), AuthError> {
        let builder = self.request(reqwest::Method::POST, LOGOUT_PATH);
        self.send(builder, "logout").await?;
        Ok(())
    }

    async fn auth_status(&self) -> Result<AuthStatus, AuthError> {
        let builder = self.request(reqwest::Method::GET, STATUS_PATH);
        let resp = self.send(builder, "auth status").await?;
        resp.json()
            .await
            .map_err(|e| AuthError::Network(format!("parse auth status: {e}")))
    }
}

/// Map non-success responses onto [`AuthError`].
async fn check_status(resp: reqwest::Response) -> Result<reqwest::Response, AuthError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    if status == reqwest::StatusCode::UNAUTHORIZED {
        return Err(AuthError::Unauthorized);
    }
    let body = resp.text().await.unwrap_or_default();
    Err(AuthError::Api {
        status: status.as_u16(),
        message: error_message(&body).unwrap_or_else(|| {
            status
                .canonical_reason()
                .unwrap_or("request failed")
                .to_string()
        }),
    })
}

/// Extract `message` (or `error`) from a JSON error body.
fn error_message(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    ["message", "error"]
        .iter()
        .find_map(|key| value.get(*key).and_then(serde_json::Value::as_str))
        .map(str::to_string)
        .filter(|m| !m.trim().is_empty())
}
