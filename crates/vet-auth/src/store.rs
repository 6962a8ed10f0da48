//! Session store.
//!
//! An explicit state container shared as `Arc<AuthStore>`. Every mutating
//! action updates memory first and then writes through the persistence
//! adapter; a failed write is logged and never rolls the transition back.

use std::sync::{Arc, PoisonError, RwLock, RwLockWriteGuard};

use vet_core::{LoadingState, Role, Session, User, UserPatch};

use crate::persist::{PersistedSession, SessionPersistence};

pub struct AuthStore {
    state: RwLock<Session>,
    persistence: Arc<dyn SessionPersistence>,
}

impl std::fmt::Debug for AuthStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthStore")
            .field("state", &self.snapshot())
            .finish_non_exhaustive()
    }
}

impl AuthStore {
    /// A fresh store that ignores whatever is persisted.
    #[must_use]
    pub fn new(persistence: Arc<dyn SessionPersistence>) -> Self {
        Self {
            state: RwLock::new(Session::default()),
            persistence,
        }
    }

    /// Rehydrate from persisted storage. Synchronous, no network.
    ///
    /// A corrupted entry, or one claiming `isAuthenticated` without a user,
    /// is cleared and the store starts unauthenticated.
    #[must_use]
    pub fn hydrate(persistence: Arc<dyn SessionPersistence>) -> Self {
        let store = Self::new(persistence);
        match store.persistence.load() {
            Ok(Some(PersistedSession {
                user,
                is_authenticated,
            })) => {
                let candidate = Session {
                    user,
                    is_authenticated,
                    ..Session::default()
                };
                if candidate.is_consistent() {
                    *store.write() = candidate;
                    tracing::debug!(is_authenticated, "session rehydrated");
                } else {
                    tracing::warn!("persisted session is authenticated without a user; clearing");
                    store.logout();
                }
            }
            Ok(None) => tracing::debug!("no persisted session"),
            Err(error) => {
                tracing::warn!(%error, "failed to rehydrate session; clearing");
                store.logout();
            }
        }
        store
    }

    #[must_use]
    pub fn snapshot(&self) -> Session {
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_authenticated
    }

    #[must_use]
    pub fn user(&self) -> Option<User> {
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .user
            .clone()
    }

    #[must_use]
    pub fn role(&self) -> Option<Role> {
        self.user().map(|u| u.role)
    }

    #[must_use]
    pub fn loading_state(&self) -> LoadingState {
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .loading_state
    }

    pub fn login(&self, user: User) {
        let mut state = self.write();
        tracing::debug!(user_id = %user.id, role = %user.role, "session authenticated");
        state.user = Some(user);
        state.is_authenticated = true;
        state.loading_state = LoadingState::Success;
        state.error = None;
        let persisted = PersistedSession::from(&*state);
        drop(state);
        self.persist(&persisted);
    }

    /// Reset to the initial session and clear persisted storage. Idempotent.
    pub fn logout(&self) {
        *self.write() = Session::default();
        if let Err(error) = self.persistence.clear() {
            tracing::warn!(%error, "failed to clear persisted session");
        }
        tracing::debug!("session cleared");
    }

    /// Merge `patch` into the current user. Returns `false` (and changes
    /// nothing) when no user is present.
    pub fn update_user(&self, patch: UserPatch) -> bool {
        let mut state = self.write();
        let Some(user) = state.user.as_mut() else {
            return false;
        };
        user.apply(patch);
        let persisted = PersistedSession::from(&*state);
        drop(state);
        self.persist(&persisted);
        true
    }

    pub fn begin_request(&self) {
        self.write().loading_state = LoadingState::Pending;
    }

    pub fn set_error(&self, message: impl Into<String>) {
        let mut state = self.write();
        state.error = Some(message.into());
        state.loading_state = LoadingState::Error;
    }

    pub fn clear_error(&self) {
        self.write().error = None;
    }

    fn write(&self) -> RwLockWriteGuard<'_, Session> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }

    fn persist(&self, persisted: &PersistedSession) {
        if let Err(error) = self.persistence.save(persisted) {
            tracing::warn!(%error, "failed to persist session");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persist::{MemorySessionStorage, encode};
    use pretty_assertions::assert_eq;
    use serde_json::Map;

    fn make_user(role: Role) -> User {
        User {
            id: "u_1".into(),
            email: "ana@clinic.test".into(),
            first_name: "Ana".into(),
            last_name: "Ruiz".into(),
            role,
            extra: Map::new(),
        }
    }

    fn memory() -> Arc<MemorySessionStorage> {
        Arc::new(MemorySessionStorage::new())
    }

    #[test]
    fn login_sets_authenticated_user_and_persists() {
        let storage = memory();
        let store = AuthStore::new(storage.clone());
        store.set_error("old failure");

        store.login(make_user(Role::Staff));

        let session = store.snapshot();
        assert!(session.is_authenticated);
        assert!(session.user.is_some());
        assert_eq!(session.loading_state, LoadingState::Success);
        assert_eq!(session.error, None);
        assert!(storage.raw().is_some());
    }

    #[test]
    fn logout_resets_and_is_idempotent() {
        let storage = memory();
        let store = AuthStore::new(storage.clone());
        store.login(make_user(Role::Admin));

        store.logout();
        let once = store.snapshot();
        store.logout();
        let twice = store.snapshot();

        assert_eq!(once, twice);
        assert_eq!(once, Session::default());
        assert!(!once.is_authenticated);
        assert!(once.user.is_none());
        assert!(storage.raw().is_none());
    }

    #[test]
    fn update_user_is_noop_without_user() {
        let storage = memory();
        let store = AuthStore::new(storage.clone());
        let changed = store.update_user(UserPatch {
            first_name: Some("Ghost".into()),
            ..Default::default()
        });
        assert!(!changed);
        assert!(store.user().is_none());
        assert!(storage.raw().is_none());
    }

    #[test]
    fn update_user_merges_and_persists() {
        let storage = memory();
        let store = AuthStore::new(storage.clone());
        store.login(make_user(Role::Staff));

        assert!(store.update_user(UserPatch {
            role: Some(Role::Admin),
            ..Default::default()
        }));
        assert_eq!(store.role(), Some(Role::Admin));

        let rehydrated = AuthStore::hydrate(storage);
        assert_eq!(rehydrated.role(), Some(Role::Admin));
        assert_eq!(rehydrated.user().map(|u| u.first_name), Some("Ana".into()));
    }

    #[test]
    fn errors_are_independent_of_authentication() {
        let store = AuthStore::new(memory());
        store.login(make_user(Role::Staff));

        store.set_error("server hiccup");
        assert!(store.is_authenticated());
        assert_eq!(store.loading_state(), LoadingState::Error);
        assert_eq!(store.snapshot().error.as_deref(), Some("server hiccup"));

        store.clear_error();
        assert!(store.is_authenticated());
        assert_eq!(store.snapshot().error, None);
    }

    #[test]
    fn begin_request_marks_pending() {
        let store = AuthStore::new(memory());
        store.begin_request();
        assert!(store.loading_state().is_pending());
    }

    #[test]
    fn hydration_round_trips_login() {
        let storage = memory();
        let store = AuthStore::new(storage.clone());
        let user = make_user(Role::Veterinarian);
        store.login(user.clone());

        let fresh = AuthStore::hydrate(storage);
        assert!(fresh.is_authenticated());
        assert_eq!(fresh.user(), Some(user));
        assert_eq!(fresh.loading_state(), LoadingState::Idle);
    }

    #[test]
    fn hydration_clears_corrupted_json() {
        let storage = Arc::new(MemorySessionStorage::with_raw("{\"state\": {"));
        let store = AuthStore::hydrate(storage.clone());
        assert!(!store.is_authenticated());
        assert!(store.user().is_none());
        assert!(storage.raw().is_none());
    }

    #[test]
    fn hydration_clears_authenticated_without_user() {
        let raw = encode(&PersistedSession {
            user: None,
            is_authenticated: true,
        })
        .unwrap();
        let storage = Arc::new(MemorySessionStorage::with_raw(raw));
        let store = AuthStore::hydrate(storage.clone());
        assert!(!store.is_authenticated());
        assert!(store.snapshot().is_consistent());
        assert!(storage.raw().is_none());
    }

    #[test]
    fn new_store_ignores_persisted_state() {
        let storage = memory();
        AuthStore::new(storage.clone()).login(make_user(Role::Staff));
        let store = AuthStore::new(storage);
        assert!(!store.is_authenticated());
    }
}
