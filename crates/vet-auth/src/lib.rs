//! # vet-auth
//!
//! Session lifecycle for the vetdesk clinic admin desk.
//!
//! Provides unverified bearer-token expiry inspection, a persisted session
//! store, the auth API client (`reqwest`), an in-process event bus for
//! `unauthorized`/`redirect` signals, the protected-route gate, the login
//! form flow and the [`App`] root that wires them together. Bearer tokens are
//! kept in the OS keychain (`keyring`) with env and file fallbacks.

pub mod app;
pub mod context;
pub mod credentials;
pub mod error;
pub mod events;
pub mod gate;
pub mod login;
pub mod mock;
pub mod navigator;
pub mod persist;
pub mod service;
pub mod store;
pub mod token;

pub use app::{App, RouteOutcome, TokenStatus};
pub use context::AuthContext;
pub use credentials::{CredentialStore, MemoryCredentials, SystemCredentials, TokenSource};
pub use error::AuthError;
pub use events::{AuthEvent, Channel, EventBus, Subscription};
pub use gate::{ForbiddenAction, GateState, ProtectedRoute, RouteView};
pub use login::{FieldError, LoginError, LoginField, LoginForm};
pub use navigator::{Location, Navigator};
pub use persist::{FileSessionStorage, MemorySessionStorage, PersistedSession, SessionPersistence};
pub use service::{AuthApi, AuthStatus, Credentials, HttpAuthService, LoginResponse};
pub use store::AuthStore;
