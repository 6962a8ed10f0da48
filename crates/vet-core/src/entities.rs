//! Entity structs held by the client.
//!
//! `User` is owned by the remote API: the client only stores and displays it.
//! Fields the client does not model are kept in `extra` so a round trip through
//! persisted storage never drops them.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::enums::{LoadingState, Role};

/// A platform user as returned by the API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub email: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    pub role: Role,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl User {
    /// `"First Last"`, falling back to the email when both names are empty.
    #[must_use]
    pub fn display_name(&self) -> String {
        let full = format!("{} {}", self.first_name, self.last_name);
        let full = full.trim();
        if full.is_empty() {
            self.email.clone()
        } else {
            full.to_string()
        }
    }

    /// Merge a partial update into this user. `None` fields are left as-is;
    /// `extra` entries overwrite existing keys.
    pub fn apply(&mut self, patch: UserPatch) {
        if let Some(email) = patch.email {
            self.email = email;
        }
        if let Some(first_name) = patch.first_name {
            self.first_name = first_name;
        }
        if let Some(last_name) = patch.last_name {
            self.last_name = last_name;
        }
        if let Some(role) = patch.role {
            self.role = role;
        }
        self.extra.extend(patch.extra);
    }
}

/// Partial update for [`User`], used by profile edits and role changes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Client-held authentication state.
///
/// Invariant: `is_authenticated` implies `user.is_some()`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub user: Option<User>,
    pub is_authenticated: bool,
    pub loading_state: LoadingState,
    pub error: Option<String>,
}

impl Session {
    /// Whether the authenticated/user invariant holds.
    #[must_use]
    pub const fn is_consistent(&self) -> bool {
        !self.is_authenticated || self.user.is_some()
    }

    #[must_use]
    pub fn role(&self) -> Option<&Role> {
        self.user.as_ref().map(|u| &u.role)
    }
}
