//! Persistence adapter for the session store.
//!
//! Only `{user, isAuthenticated}` survives a restart. The on-disk shape is the
//! envelope `{"state": {...}, "version": 0}` stored under the `auth-storage`
//! key. A missing entry means a fresh session; an unreadable one is reported
//! as [`AuthError::CorruptedSession`] so the store can force a clear.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use serde::{Deserialize, Serialize};
use vet_core::{Session, User};

use crate::error::AuthError;

/// Key under which the session is persisted.
pub const STORAGE_KEY: &str = "auth-storage";

/// Current envelope version. Entries with another version are discarded.
pub const STORAGE_VERSION: u32 = 0;

/// The persisted subset of [`Session`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistedSession {
    #[serde(default)]
    pub user: Option<User>,
    #[serde(default)]
    pub is_authenticated: bool,
}

impl From<&Session> for PersistedSession {
    fn from(session: &Session) -> Self {
        Self {
            user: session.user.clone(),
            is_authenticated: session.is_authenticated,
        }
    }
}

#[derive(Serialize, Deserialize)]
struct Envelope {
    state: PersistedSession,
    #[serde(default)]
    version: u32,
}

/// Durable storage for the persisted session.
pub trait SessionPersistence: Send + Sync {
    /// Load the persisted session. `Ok(None)` when nothing is stored.
    ///
    /// # Errors
    ///
    /// `AuthError::CorruptedSession` when the entry cannot be parsed,
    /// `AuthError::Storage` when the backend cannot be read.
    fn load(&self) -> Result<Option<PersistedSession>, AuthError>;

    /// # Errors
    ///
    /// `AuthError::Storage` when the backend cannot be written.
    fn save(&self, state: &PersistedSession) -> Result<(), AuthError>;

    /// # Errors
    ///
    /// `AuthError::Storage` when the entry exists but cannot be removed.
    fn clear(&self) -> Result<(), AuthError>;
}

/// Serialize a session into the storage envelope.
///
/// # Errors
///
/// Returns `AuthError::Storage` if serialization fails.
pub fn encode(state: &PersistedSession) -> Result<String, AuthError> {
    serde_json::to_string(&Envelope {
        state: state.clone(),
        version: STORAGE_VERSION,
    })
    .map_err(|e| AuthError::Storage(format!("serialize {STORAGE_KEY}: {e}")))
}

/// Parse a storage envelope. Blank input is treated as absent.
///
/// # Errors
///
/// Returns `AuthError::CorruptedSession` for invalid JSON or a wrong shape.
pub fn decode(raw: &str) -> Result<Option<PersistedSession>, AuthError> {
    if raw.trim().is_empty() {
        return Ok(None);
    }
    let envelope: Envelope =
        serde_json::from_str(raw).map_err(|e| AuthError::CorruptedSession(e.to_string()))?;
    if envelope.version != STORAGE_VERSION {
        tracing::warn!(
            found = envelope.version,
            expected = STORAGE_VERSION,
            "discarding persisted session with unknown version"
        );
        return Ok(None);
    }
    Ok(Some(envelope.state))
}

// ---------------------------------------------------------------------------
// File backend
// ---------------------------------------------------------------------------

/// JSON file backend, written with owner-only permissions.
#[derive(Debug, Clone)]
pub struct FileSessionStorage {
    path: PathBuf,
}

impl FileSessionStorage {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SessionPersistence for FileSessionStorage {
    fn load(&self) -> Result<Option<PersistedSession>, AuthError> {
        match fs::read_to_string(&self.path) {
            Ok(raw) => decode(&raw),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(AuthError::Storage(format!(
                "read {}: {e}",
                self.path.display()
            ))),
        }
    }

    fn save(&self, state: &PersistedSession) -> Result<(), AuthError> {
        let raw = encode(state)?;
        crate::credentials::store_file(&self.path, &raw)
            .map_err(|e| AuthError::Storage(format!("write {}: {e}", self.path.display())))
    }

    fn clear(&self) -> Result<(), AuthError> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(AuthError::Storage(format!(
                "delete {}: {e}",
                self.path.display()
            ))),
        }
    }
}

// ---------------------------------------------------------------------------
// In-memory backend
// ---------------------------------------------------------------------------

/// Keeps the raw encoded entry in memory. Tests seed it with arbitrary
/// (including corrupted) content via [`MemorySessionStorage::with_raw`].
#[derive(Debug, Default)]
pub struct MemorySessionStorage {
    raw: Mutex<Option<String>>,
}

impl MemorySessionStorage {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_raw(raw: impl Into<String>) -> Self {
        Self {
            raw: Mutex::new(Some(raw.into())),
        }
    }

    /// The raw stored entry, if any.
    #[must_use]
    pub fn raw(&self) -> Option<String> {
        self.raw.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }
}

impl SessionPersistence for MemorySessionStorage {
    fn load(&self) -> Result<Option<PersistedSession>, AuthError> {
        match self.raw() {
            Some(raw) => decode(&raw),
            None => Ok(None),
        }
    }

    fn save(&self, state: &PersistedSession) -> Result<(), AuthError> {
        let raw = encode(state)?;
        *self.raw.lock().unwrap_or_else(PoisonError::into_inner) = Some(raw);
        Ok(())
    }

    fn clear(&self) -> Result<(), AuthError> {
        self.raw.lock().unwrap_or_else(PoisonError::into_inner).take();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use vet_core::Role;

    fn make_state() -> PersistedSession {
        PersistedSession {
            user: Some(User {
                id: "u_7".into(),
                email: "desk@clinic.test".into(),
                first_name: "Desk".into(),
                last_name: "Staff".into(),
                role: Role::Staff,
                extra: serde_json::Map::new(),
            }),
            is_authenticated: true,
        }
    }

    #[test]
    fn envelope_has_state_and_version() {
        let raw = encode(&make_state()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(value["version"], serde_json::json!(0));
        assert_eq!(value["state"]["isAuthenticated"], serde_json::json!(true));
        assert_eq!(value["state"]["user"]["role"], serde_json::json!("staff"));
    }

    #[test]
    fn decode_blank_is_absent() {
        assert_eq!(decode("").unwrap(), None);
        assert_eq!(decode("  \n").unwrap(), None);
    }

    #[test]
    fn decode_garbage_is_corrupted() {
        assert!(matches!(
            decode("{not json"),
            Err(AuthError::CorruptedSession(_))
        ));
        assert!(matches!(
            decode(r#"{"version":0}"#),
            Err(AuthError::CorruptedSession(_))
        ));
    }

    #[test]
    fn decode_discards_other_versions() {
        let raw = r#"{"state":{"user":null,"isAuthenticated":false},"version":3}"#;
        assert_eq!(decode(raw).unwrap(), None);
    }

    #[test]
    fn file_backend_save_load_clear() {
        let tmp = tempfile::TempDir::new().expect("tmp dir");
        let storage = FileSessionStorage::new(tmp.path().join("vetdesk").join("auth-storage.json"));

        assert_eq!(storage.load().unwrap(), None);
        storage.save(&make_state()).unwrap();
        assert_eq!(storage.load().unwrap(), Some(make_state()));

        storage.clear().unwrap();
        storage.clear().unwrap();
        assert_eq!(storage.load().unwrap(), None);
        assert!(!storage.path().exists());
    }

    #[test]
    fn file_backend_reports_corruption() {
        let tmp = tempfile::TempDir::new().expect("tmp dir");
        let path = tmp.path().join("auth-storage.json");
        fs::write(&path, "{\"state\": [").unwrap();
        let storage = FileSessionStorage::new(&path);
        assert!(matches!(storage.load(), Err(AuthError::CorruptedSession(_))));
    }

    #[test]
    fn file_backend_save_error_names_the_path() {
        let tmp = tempfile::TempDir::new().expect("tmp dir");
        let blocker = tmp.path().join("not-a-dir");
        fs::write(&blocker, "").unwrap();
        let storage = FileSessionStorage::new(blocker.join("auth-storage.json"));

        let Err(AuthError::Storage(message)) = storage.save(&make_state()) else {
            panic!("expected a storage error");
        };
        assert!(message.starts_with("write "));
        assert!(message.contains("auth-storage.json"));
        assert!(!message.contains("token store"));
    }

    #[test]
    fn memory_backend_keeps_raw_entry() {
        let storage = MemorySessionStorage::new();
        storage.save(&make_state()).unwrap();
        let raw = storage.raw().expect("saved");
        assert!(raw.contains("\"state\""));
        storage.clear().unwrap();
        assert!(storage.raw().is_none());
    }
}
