//! Protected-route gate.
//!
//! A [`ProtectedRoute`] is mounted per protected page. It decides what to
//! render from the store, validates the session against the server once per
//! mount, and owns the navigation side of the auth event bus while mounted.
//! It never clears the session itself: a failed validation only emits
//! `unauthorized`, and whoever listens at the app root does the cleanup.

use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};

use serde::Serialize;
use tokio::task::JoinHandle;
use vet_core::{CoreError, Role};

use crate::context::AuthContext;
use crate::error::AuthError;
use crate::events::Subscription;
use crate::navigator::{DASHBOARD_PATH, LOGIN_PATH};
use crate::service::{AuthApi, AuthStatus};

const MACHINE: &str = "route_gate";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GateState {
    /// No local session. Redirects to the login page.
    Unauthenticated,
    /// Mounted with a local session; validation not started.
    Pending,
    /// Waiting on `auth_status`, or the server rejected the session.
    Validating,
    AuthenticatedOk,
    /// Authenticated, but the role does not satisfy the route.
    Forbidden,
}

impl GateState {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Unauthenticated => "unauthenticated",
            Self::Pending => "pending",
            Self::Validating => "validating",
            Self::AuthenticatedOk => "authenticated_ok",
            Self::Forbidden => "forbidden",
        }
    }

    /// Validation runs at most once per mount, so every edge points forward.
    #[must_use]
    pub const fn allowed_next_states(self) -> &'static [Self] {
        match self {
            Self::Pending => &[Self::Validating],
            Self::Validating => &[Self::AuthenticatedOk, Self::Forbidden],
            Self::Unauthenticated | Self::AuthenticatedOk | Self::Forbidden => &[],
        }
    }

    #[must_use]
    pub fn can_transition_to(self, next: Self) -> bool {
        self.allowed_next_states().contains(&next)
    }
}

impl fmt::Display for GateState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Actions offered on the 403 page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ForbiddenAction {
    GoToDashboard,
    Logout,
}

/// What the gate renders for its current state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "view", rename_all = "snake_case")]
pub enum RouteView {
    Redirect { to: String, from: String },
    Loading,
    Forbidden { actions: Vec<ForbiddenAction> },
    Children,
}

struct Gate<A> {
    ctx: AuthContext<A>,
    path: String,
    required_role: Option<Role>,
    state: Mutex<GateState>,
}

impl<A> Gate<A> {
    fn state(&self) -> GateState {
        *self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn transition(&self, next: GateState) -> Result<(), CoreError> {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        if !state.can_transition_to(next) {
            return Err(CoreError::InvalidTransition {
                machine: MACHINE.to_string(),
                from: state.to_string(),
                to: next.to_string(),
            });
        }
        tracing::debug!(
            path = %self.path,
            from = state.as_str(),
            to = next.as_str(),
            "route gate transition"
        );
        *state = next;
        Ok(())
    }

    fn finish(&self, result: Result<AuthStatus, AuthError>) -> Result<GateState, CoreError> {
        match result {
            Ok(status) if status.is_authenticated => {
                let Some(user) = self.ctx.store.user() else {
                    self.reject("session cleared during validation");
                    return Ok(self.state());
                };
                let next = match &self.required_role {
                    Some(required) if !user.role.satisfies(required) => {
                        tracing::info!(
                            path = %self.path,
                            role = %user.role,
                            required = %required,
                            "role does not satisfy route"
                        );
                        GateState::Forbidden
                    }
                    _ => GateState::AuthenticatedOk,
                };
                self.transition(next)?;
            }
            Ok(_) => self.reject("server reports no active session"),
            Err(error) => self.reject(&error.to_string()),
        }
        Ok(self.state())
    }

    fn reject(&self, reason: &str) {
        tracing::warn!(path = %self.path, reason, "session validation failed");
        self.ctx.bus.emit_unauthorized();
    }
}

/// A mounted protected route. Dropping it unmounts.
pub struct ProtectedRoute<A> {
    gate: Arc<Gate<A>>,
    _listeners: [Subscription; 2],
}

impl<A> fmt::Debug for ProtectedRoute<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProtectedRoute")
            .field("path", &self.gate.path)
            .field("required_role", &self.gate.required_role)
            .field("state", &self.gate.state())
            .finish_non_exhaustive()
    }
}

impl<A: AuthApi + 'static> ProtectedRoute<A> {
    /// Mount the gate for `path`.
    ///
    /// Without a local session this redirects to `/login` immediately and
    /// never touches the network.
    pub fn mount(ctx: AuthContext<A>, path: impl Into<String>, required_role: Option<Role>) -> Self {
        let path = path.into();

        let navigator = Arc::clone(&ctx.navigator);
        let from = path.clone();
        let on_unauthorized = ctx.bus.on_unauthorized(move || {
            navigator.replace(LOGIN_PATH, Some(from.clone()));
        });
        let navigator = Arc::clone(&ctx.navigator);
        let on_redirect = ctx.bus.on_redirect(move |target| {
            navigator.replace(target, None);
        });

        let initial = if ctx.store.is_authenticated() {
            GateState::Pending
        } else {
            ctx.navigator.replace(LOGIN_PATH, Some(path.clone()));
            GateState::Unauthenticated
        };
        tracing::debug!(%path, state = %initial, "route gate mounted");

        Self {
            gate: Arc::new(Gate {
                ctx,
                path,
                required_role,
                state: Mutex::new(initial),
            }),
            _listeners: [on_unauthorized, on_redirect],
        }
    }

    #[must_use]
    pub fn path(&self) -> &str {
        &self.gate.path
    }

    #[must_use]
    pub fn state(&self) -> GateState {
        self.gate.state()
    }

    #[must_use]
    pub fn render(&self) -> RouteView {
        match self.gate.state() {
            GateState::Unauthenticated => RouteView::Redirect {
                to: LOGIN_PATH.to_string(),
                from: self.gate.path.clone(),
            },
            GateState::Pending | GateState::Validating => RouteView::Loading,
            GateState::AuthenticatedOk => RouteView::Children,
            GateState::Forbidden => RouteView::Forbidden {
                actions: vec![ForbiddenAction::GoToDashboard, ForbiddenAction::Logout],
            },
        }
    }

    /// Validate the session with the server and settle the gate.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::InvalidTransition` when validation already ran for
    /// this mount or there is no local session to validate.
    pub async fn validate(&self) -> Result<GateState, CoreError> {
        self.gate.transition(GateState::Validating)?;
        let result = self.gate.ctx.api.auth_status().await;
        self.gate.finish(result)
    }

    /// Like [`validate`](Self::validate), but on a background task. The
    /// result is dropped if the route is unmounted before the server answers.
    ///
    /// # Errors
    ///
    /// Same as [`validate`](Self::validate); the check happens before spawning.
    pub fn spawn_validation(&self) -> Result<JoinHandle<()>, CoreError> {
        self.gate.transition(GateState::Validating)?;
        let api = Arc::clone(&self.gate.ctx.api);
        let gate = Arc::downgrade(&self.gate);
        Ok(tokio::spawn(async move {
            let result = api.auth_status().await;
            let Some(gate) = gate.upgrade() else {
                tracing::debug!("route unmounted before validation finished");
                return;
            };
            if let Err(error) = gate.finish(result) {
                tracing::warn!(%error, "failed to settle route gate");
            }
        }))
    }

    /// Run one of the 403 page actions.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::Validation` unless the gate is in `Forbidden`.
    pub async fn resolve_forbidden(&self, action: ForbiddenAction) -> Result<(), CoreError> {
        if self.gate.state() != GateState::Forbidden {
            return Err(CoreError::Validation(format!(
                "forbidden actions are unavailable in state {}",
                self.gate.state()
            )));
        }
        let ctx = &self.gate.ctx;
        match action {
            ForbiddenAction::GoToDashboard => ctx.navigator.push(DASHBOARD_PATH),
            ForbiddenAction::Logout => {
                ctx.sign_out().await;
                ctx.navigator.replace(LOGIN_PATH, None);
            }
        }
        Ok(())
    }
}
