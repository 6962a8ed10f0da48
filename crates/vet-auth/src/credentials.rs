//! Bearer token storage.
//!
//! [`SystemCredentials`] resolves the token from the OS keychain, then the
//! `VETDESK_AUTH__TOKEN` environment variable, then a file under the user's
//! data directory. [`MemoryCredentials`] keeps it in process for tests and
//! ephemeral sessions.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use serde::Serialize;

use crate::error::AuthError;

const DEFAULT_KEYRING_SERVICE: &str = "vetdesk";
const KEYRING_USER: &str = "bearer-token";
const CREDENTIALS_FILE_NAME: &str = "credentials";
const TOKEN_ENV: &str = "VETDESK_AUTH__TOKEN";

/// Where a loaded token came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenSource {
    Keyring,
    Env,
    File,
    Memory,
}

impl TokenSource {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Keyring => "keyring",
            Self::Env => "env",
            Self::File => "file",
            Self::Memory => "memory",
        }
    }
}

/// Storage for the API bearer token.
pub trait CredentialStore: Send + Sync {
    /// Persist `token`, replacing any previous one.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::TokenStore` if no backend accepted the token.
    fn store(&self, token: &str) -> Result<(), AuthError>;

    /// Load the current token, if any.
    fn load(&self) -> Option<String>;

    /// Remove the stored token. Removing a missing token is not an error.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::TokenStore` if the backing file cannot be removed.
    fn delete(&self) -> Result<(), AuthError>;

    /// Which backend currently holds the token.
    fn source(&self) -> Option<TokenSource>;
}

// ---------------------------------------------------------------------------
// System (keyring → env → file)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct SystemCredentials {
    service: String,
    file_path: Option<PathBuf>,
}

impl Default for SystemCredentials {
    fn default() -> Self {
        Self::new()
    }
}

impl SystemCredentials {
    /// Keyring service defaults to `"vetdesk"`; `VETDESK_KEYRING_SERVICE`
    /// overrides it so tests never touch real credentials.
    #[must_use]
    pub fn new() -> Self {
        Self {
            service: std::env::var("VETDESK_KEYRING_SERVICE")
                .unwrap_or_else(|_| DEFAULT_KEYRING_SERVICE.to_string()),
            file_path: default_credentials_path(),
        }
    }

    /// Use an explicit credentials file instead of the data-dir default.
    #[must_use]
    pub fn with_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.file_path = Some(path.into());
        self
    }

    fn entry(&self) -> Option<keyring::Entry> {
        keyring::Entry::new(&self.service, KEYRING_USER).ok()
    }

    fn store_in_file(&self, token: &str) -> Result<(), AuthError> {
        let path = self.file_path.as_deref().ok_or_else(|| {
            AuthError::TokenStore("data directory not found: cannot store credentials".into())
        })?;
        store_file(path, token)
            .map_err(|e| AuthError::TokenStore(format!("write {}: {e}", path.display())))
    }
}

impl CredentialStore for SystemCredentials {
    fn store(&self, token: &str) -> Result<(), AuthError> {
        match keyring::Entry::new(&self.service, KEYRING_USER) {
            Ok(entry) => match entry.set_password(token) {
                Ok(()) => Ok(()),
                Err(error) => {
                    tracing::warn!(%error, "keyring store failed; falling back to file");
                    self.store_in_file(token)
                }
            },
            Err(error) => {
                tracing::warn!(%error, "keyring unavailable; falling back to file");
                self.store_in_file(token)
            }
        }
    }

    fn load(&self) -> Option<String> {
        if let Some(entry) = self.entry()
            && let Ok(token) = entry.get_password()
            && !token.is_empty()
        {
            return Some(token);
        }

        if let Ok(token) = std::env::var(TOKEN_ENV)
            && !token.trim().is_empty()
        {
            return Some(token.trim().to_string());
        }

        load_file(self.file_path.as_deref()?)
    }

    fn delete(&self) -> Result<(), AuthError> {
        // May not exist.
        if let Some(entry) = self.entry() {
            let _ = entry.delete_credential();
        }

        if let Some(path) = self.file_path.as_deref()
            && path.exists()
        {
            fs::remove_file(path).map_err(|e| {
                AuthError::TokenStore(format!("failed to delete {}: {e}", path.display()))
            })?;
        }
        Ok(())
    }

    fn source(&self) -> Option<TokenSource> {
        if self
            .entry()
            .is_some_and(|e| e.get_password().is_ok_and(|t| !t.is_empty()))
        {
            return Some(TokenSource::Keyring);
        }
        if std::env::var(TOKEN_ENV).is_ok_and(|t| !t.trim().is_empty()) {
            return Some(TokenSource::Env);
        }
        if self.file_path.as_deref().and_then(load_file).is_some() {
            return Some(TokenSource::File);
        }
        None
    }
}

// ---------------------------------------------------------------------------
// In-memory
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
pub struct MemoryCredentials {
    token: Mutex<Option<String>>,
}

impl MemoryCredentials {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_token(token: impl Into<String>) -> Self {
        Self {
            token: Mutex::new(Some(token.into())),
        }
    }
}

impl CredentialStore for MemoryCredentials {
    fn store(&self, token: &str) -> Result<(), AuthError> {
        *self.token.lock().unwrap_or_else(PoisonError::into_inner) = Some(token.to_string());
        Ok(())
    }

    fn load(&self) -> Option<String> {
        self.token
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn delete(&self) -> Result<(), AuthError> {
        self.token
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        Ok(())
    }

    fn source(&self) -> Option<TokenSource> {
        self.load().map(|_| TokenSource::Memory)
    }
}

// --- Private file helpers ---

fn default_credentials_path() -> Option<PathBuf> {
    dirs::data_dir().map(|d| d.join("vetdesk").join(CREDENTIALS_FILE_NAME))
}

pub(crate) fn store_file(path: &Path, contents: &str) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            if let Err(e) = fs::set_permissions(parent, fs::Permissions::from_mode(0o700)) {
                tracing::warn!("failed to chmod 0700 {}: {e}", parent.display());
            }
        }
    }
    fs::write(path, contents)?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(path, fs::Permissions::from_mode(0o600))?;
    }

    Ok(())
}

fn load_file(path: &Path) -> Option<String> {
    fs::read_to_string(path)
        .ok()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}
