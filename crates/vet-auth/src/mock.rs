//! Scriptable [`AuthApi`] for tests and offline demos.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::Notify;

use crate::error::AuthError;
use crate::service::{AuthApi, AuthStatus, Credentials, LoginResponse};

/// Failure a [`MockAuthApi`] call should produce.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockFailure {
    Unauthorized,
    Network(String),
    Api { status: u16, message: String },
}

impl From<MockFailure> for AuthError {
    fn from(failure: MockFailure) -> Self {
        match failure {
            MockFailure::Unauthorized => Self::Unauthorized,
            MockFailure::Network(message) => Self::Network(message),
            MockFailure::Api { status, message } => Self::Api { status, message },
        }
    }
}

#[derive(Debug)]
pub struct MockAuthApi {
    login: Mutex<Result<LoginResponse, MockFailure>>,
    status: Mutex<Result<AuthStatus, MockFailure>>,
    logout: Mutex<Result<(), MockFailure>>,
    status_gate: Option<Arc<Notify>>,
    login_calls: AtomicUsize,
    logout_calls: AtomicUsize,
    status_calls: AtomicUsize,
    last_credentials: Mutex<Option<Credentials>>,
}

impl Default for MockAuthApi {
    fn default() -> Self {
        Self {
            login: Mutex::new(Err(MockFailure::Unauthorized)),
            status: Mutex::new(Ok(AuthStatus {
                is_authenticated: true,
                user: None,
            })),
            logout: Mutex::new(Ok(())),
            status_gate: None,
            login_calls: AtomicUsize::new(0),
            logout_calls: AtomicUsize::new(0),
            status_calls: AtomicUsize::new(0),
            last_credentials: Mutex::new(None),
        }
    }
}

impl MockAuthApi {
    /// Status reports authenticated, login rejects, logout succeeds.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_login(self, response: LoginResponse) -> Self {
        self.set_login(Ok(response));
        self
    }

    #[must_use]
    pub fn with_login_failure(self, failure: MockFailure) -> Self {
        self.set_login(Err(failure));
        self
    }

    #[must_use]
    pub fn with_status(self, is_authenticated: bool) -> Self {
        self.set_status(Ok(AuthStatus {
            is_authenticated,
            user: None,
        }));
        self
    }

    #[must_use]
    pub fn with_status_failure(self, failure: MockFailure) -> Self {
        self.set_status(Err(failure));
        self
    }

    #[must_use]
    pub fn with_logout_failure(self, failure: MockFailure) -> Self {
        *self.logout.lock().unwrap_or_else(PoisonError::into_inner) = Err(failure);
        self
    }

    /// Make `auth_status` wait until the returned handle is notified.
    #[must_use]
    pub fn with_held_status(mut self) -> (Self, Arc<Notify>) {
        let gate = Arc::new(Notify::new());
        self.status_gate = Some(Arc::clone(&gate));
        (self, gate)
    }

    pub fn set_login(&self, outcome: Result<LoginResponse, MockFailure>) {
        *self.login.lock().unwrap_or_else(PoisonError::into_inner) = outcome;
    }

    pub fn set_status(&self, outcome: Result<AuthStatus, MockFailure>) {
        *self.status.lock().unwrap_or_else(PoisonError::into_inner) = outcome;
    }

    #[must_use]
    pub fn login_calls(&self) -> usize {
        self.login_calls.load(Ordering::SeqCst)
    }

    #[must_use]
    pub fn logout_calls(&self) -> usize {
        self.logout_calls.load(Ordering::SeqCst)
    }

    #[must_use]
    pub fn status_calls(&self) -> usize {
        self.status_calls.load(Ordering::SeqCst)
    }

    #[must_use]
    pub fn last_credentials(&self) -> Option<Credentials> {
        self.last_credentials
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl AuthApi for MockAuthApi {
    async fn login(&self, credentials: &Credentials) -> Result<LoginResponse, AuthError> {
        self.login_calls.fetch_add(1, Ordering::SeqCst);
        *self
            .last_credentials
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = Some(credentials.clone());
        self.login
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
            .map_err(AuthError::from)
    }

    async fn logout(&self) -> Result<(), AuthError> {
        self.logout_calls.fetch_add(1, Ordering::SeqCst);
        self.logout
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
            .map_err(AuthError::from)
    }

    async fn auth_status(&self) -> Result<AuthStatus, AuthError> {
        self.status_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(gate) = &self.status_gate {
            gate.notified().await;
        }
        self.status
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
            .map_err(AuthError::from)
    }
}
