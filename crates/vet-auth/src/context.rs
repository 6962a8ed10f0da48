use std::sync::Arc;

use crate::credentials::CredentialStore;
use crate::events::EventBus;
use crate::navigator::Navigator;
use crate::service::AuthApi;
use crate::store::AuthStore;

/// Delete the bearer token and reset the session.
pub(crate) fn clear_local_session(store: &AuthStore, credentials: &dyn CredentialStore) {
    if let Err(error) = credentials.delete() {
        tracing::warn!(%error, "failed to delete stored token");
    }
    store.logout();
}

/// Shared handles injected into the gate, the login form and the app root.
pub struct AuthContext<A> {
    pub store: Arc<AuthStore>,
    pub api: Arc<A>,
    pub bus: EventBus,
    pub navigator: Arc<Navigator>,
    pub credentials: Arc<dyn CredentialStore>,
}

impl<A> Clone for AuthContext<A> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            api: Arc::clone(&self.api),
            bus: self.bus.clone(),
            navigator: Arc::clone(&self.navigator),
            credentials: Arc::clone(&self.credentials),
        }
    }
}

impl<A> std::fmt::Debug for AuthContext<A> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthContext")
            .field("store", &self.store)
            .field("bus", &self.bus)
            .field("location", &self.navigator.current())
            .finish_non_exhaustive()
    }
}

impl<A> AuthContext<A> {
    /// Drop local session state after the server invalidated it.
    pub fn invalidate(&self) {
        clear_local_session(&self.store, self.credentials.as_ref());
    }
}

impl<A: AuthApi> AuthContext<A> {
    /// User-initiated logout. The server call is best effort: local state is
    /// cleared even when it fails.
    pub async fn sign_out(&self) {
        if let Err(error) = self.api.logout().await {
            tracing::warn!(%error, "server logout failed; clearing local session anyway");
        }
        self.invalidate();
    }
}
