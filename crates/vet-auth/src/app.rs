//! Application root.
//!
//! [`App`] owns the shared context for one process. Mounting it hydrates the
//! store, drops a session whose bearer token has already expired, and
//! installs the root `unauthorized` listener: the only place a detected
//! server-side invalidation turns into `logout()`.

use std::sync::Arc;

use chrono::{DateTime, TimeDelta, Utc};
use serde::Serialize;
use vet_config::SessionConfig;
use vet_core::{Role, Session};

use crate::context::{AuthContext, clear_local_session};
use crate::credentials::{CredentialStore, TokenSource};
use crate::error::AuthError;
use crate::events::{EventBus, Subscription};
use crate::gate::{GateState, ProtectedRoute, RouteView};
use crate::login::{LoginError, LoginForm};
use crate::navigator::{LOGIN_PATH, Location, Navigator};
use crate::persist::SessionPersistence;
use crate::service::{AuthApi, AuthStatus};
use crate::store::AuthStore;
use crate::token;

const ROOT_PATH: &str = "/";

/// Result of opening a protected path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RouteOutcome {
    pub path: String,
    pub state: GateState,
    pub view: RouteView,
    /// Where the navigator ended up.
    pub location: Location,
}

/// Local view of the stored bearer token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TokenStatus {
    pub present: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<TokenSource>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
    pub expired: bool,
    pub expires_soon: bool,
}

pub struct App<A> {
    ctx: AuthContext<A>,
    expiry_buffer: TimeDelta,
    refresh_window: TimeDelta,
    _root_listener: Subscription,
}

impl<A> std::fmt::Debug for App<A> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("App")
            .field("ctx", &self.ctx)
            .field("expiry_buffer", &self.expiry_buffer)
            .finish_non_exhaustive()
    }
}

impl<A: AuthApi + 'static> App<A> {
    /// Hydrate the session from `persistence` and wire the root listener.
    pub fn mount(
        config: &SessionConfig,
        persistence: Arc<dyn SessionPersistence>,
        api: A,
        credentials: Arc<dyn CredentialStore>,
    ) -> Self {
        let ctx = AuthContext {
            store: Arc::new(AuthStore::hydrate(persistence)),
            api: Arc::new(api),
            bus: EventBus::new(),
            navigator: Arc::new(Navigator::new(ROOT_PATH)),
            credentials,
        };
        Self::with_context(config, ctx)
    }

    /// Mount over an existing context. The store is used as-is.
    pub fn with_context(config: &SessionConfig, ctx: AuthContext<A>) -> Self {
        let expiry_buffer = seconds("expiry_buffer_secs", config.expiry_buffer_secs);
        let refresh_window = seconds("refresh_window_secs", config.refresh_window_secs);

        if let Some(stored) = ctx.credentials.load()
            && token::is_expired(&stored, expiry_buffer)
        {
            tracing::info!(
                expires_at = ?token::expires_at(&stored),
                "stored token is expired; clearing session"
            );
            clear_local_session(&ctx.store, ctx.credentials.as_ref());
        }

        // The listener holds the store and token handles only. Capturing the
        // whole context would keep the bus alive through its own registry.
        let store = Arc::clone(&ctx.store);
        let credentials = Arc::clone(&ctx.credentials);
        let root_listener = ctx.bus.on_unauthorized(move || {
            tracing::info!("session invalidated by server");
            clear_local_session(&store, credentials.as_ref());
        });

        Self {
            ctx,
            expiry_buffer,
            refresh_window,
            _root_listener: root_listener,
        }
    }

    #[must_use]
    pub const fn context(&self) -> &AuthContext<A> {
        &self.ctx
    }

    #[must_use]
    pub fn store(&self) -> &AuthStore {
        &self.ctx.store
    }

    #[must_use]
    pub const fn bus(&self) -> &EventBus {
        &self.ctx.bus
    }

    #[must_use]
    pub fn navigator(&self) -> &Navigator {
        &self.ctx.navigator
    }

    #[must_use]
    pub fn session(&self) -> Session {
        self.ctx.store.snapshot()
    }

    /// Mount a gate for `path` and leave it to the caller.
    pub fn mount_route(&self, path: &str, required_role: Option<Role>) -> ProtectedRoute<A> {
        self.ctx.navigator.push(path);
        ProtectedRoute::mount(self.ctx.clone(), path, required_role)
    }

    /// Navigate to `path`, validate once, and report what the gate rendered.
    pub async fn open(&self, path: &str, required_role: Option<Role>) -> RouteOutcome {
        let route = self.mount_route(path, required_role);
        if route.state() == GateState::Pending
            && let Err(error) = route.validate().await
        {
            tracing::warn!(%error, path, "route validation skipped");
        }
        RouteOutcome {
            path: path.to_string(),
            state: route.state(),
            view: route.render(),
            location: self.ctx.navigator.current(),
        }
    }

    /// Submit credentials through the login form.
    ///
    /// # Errors
    ///
    /// See [`LoginForm::submit`].
    pub async fn login(&self, email: &str, password: &str) -> Result<String, LoginError> {
        if self.ctx.navigator.current().path != LOGIN_PATH {
            self.ctx.navigator.push(LOGIN_PATH);
        }
        LoginForm::new(self.ctx.clone())
            .submit(email, password)
            .await
    }

    /// Log out on the server (best effort) and clear everything local.
    pub async fn logout(&self) {
        self.ctx.sign_out().await;
        self.ctx.navigator.replace(LOGIN_PATH, None);
    }

    /// Ask the server for the session status. A 401 is reported on the bus,
    /// which clears the local session.
    ///
    /// # Errors
    ///
    /// Returns the underlying `AuthError` from the service.
    pub async fn server_status(&self) -> Result<AuthStatus, AuthError> {
        self.ctx
            .api
            .auth_status()
            .await
            .inspect_err(|error| {
                self.ctx.bus.report(error);
            })
    }

    #[must_use]
    pub fn token_status(&self) -> TokenStatus {
        self.token_status_at(Utc::now())
    }

    #[must_use]
    pub fn token_status_at(&self, now: DateTime<Utc>) -> TokenStatus {
        let Some(stored) = self.ctx.credentials.load() else {
            return TokenStatus {
                present: false,
                source: None,
                expires_at: None,
                expired: false,
                expires_soon: false,
            };
        };
        TokenStatus {
            present: true,
            source: self.ctx.credentials.source(),
            expires_at: token::expires_at(&stored),
            expired: token::is_expired_at(&stored, self.expiry_buffer, now),
            expires_soon: token::will_expire_soon_at(&stored, self.refresh_window, now),
        }
    }
}

/// Unvalidated configs may carry values past the `TimeDelta` range.
fn seconds(field: &str, secs: i64) -> TimeDelta {
    TimeDelta::try_seconds(secs).unwrap_or_else(|| {
        tracing::warn!(setting = field, secs, "duration out of range; clamping");
        if secs < 0 { TimeDelta::MIN } else { TimeDelta::MAX }
    })
}
