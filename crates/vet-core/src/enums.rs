//! Role and loading-state enums.
//!
//! Roles are a closed set with an escape hatch (`Other`) for role names the
//! API introduces before the client knows about them. Authorization goes
//! through [`Role::satisfies`], never through string comparison.

use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// Capability
// ---------------------------------------------------------------------------

/// Something a role is allowed to do in the admin desk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Capability {
    ManageUsers,
    ManageClinics,
    ManageContent,
    ManageAppointments,
    ViewAppointments,
    ViewPets,
}

impl Capability {
    pub const ALL: &'static [Self] = &[
        Self::ManageUsers,
        Self::ManageClinics,
        Self::ManageContent,
        Self::ManageAppointments,
        Self::ViewAppointments,
        Self::ViewPets,
    ];
}

// ---------------------------------------------------------------------------
// Role
// ---------------------------------------------------------------------------

/// Role of a platform user, as reported by the API.
///
/// Serialized as a lowercase string. Unknown strings deserialize to
/// [`Role::Other`] and carry no capabilities.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Role {
    Admin,
    Veterinarian,
    Staff,
    Receptionist,
    Client,
    Other(String),
}

impl Role {
    /// Parse a role name. Matching is case-insensitive and ignores
    /// surrounding whitespace.
    #[must_use]
    pub fn parse(value: &str) -> Self {
        let normalized = value.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "admin" => Self::Admin,
            "veterinarian" | "vet" => Self::Veterinarian,
            "staff" => Self::Staff,
            "receptionist" => Self::Receptionist,
            "client" => Self::Client,
            _ => Self::Other(value.trim().to_string()),
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Admin => "admin",
            Self::Veterinarian => "veterinarian",
            Self::Staff => "staff",
            Self::Receptionist => "receptionist",
            Self::Client => "client",
            Self::Other(name) => name,
        }
    }

    /// Capabilities granted to this role.
    #[must_use]
    pub const fn capabilities(&self) -> &'static [Capability] {
        match self {
            Self::Admin => Capability::ALL,
            Self::Veterinarian => &[
                Capability::ManageAppointments,
                Capability::ViewAppointments,
                Capability::ViewPets,
            ],
            Self::Staff => &[
                Capability::ManageContent,
                Capability::ViewAppointments,
                Capability::ViewPets,
            ],
            Self::Receptionist => &[Capability::ManageAppointments, Capability::ViewAppointments],
            Self::Client | Self::Other(_) => &[],
        }
    }

    #[must_use]
    pub fn has(&self, capability: Capability) -> bool {
        self.capabilities().contains(&capability)
    }

    /// Whether a user holding `self` may enter a route that requires `required`.
    ///
    /// Holds when the roles are equal or when `self` carries every capability
    /// of `required`. Only `Admin` satisfies `Admin`.
    #[must_use]
    pub fn satisfies(&self, required: &Self) -> bool {
        self == required
            || (!matches!(required, Self::Other(_))
                && required.capabilities().iter().all(|c| self.has(*c)))
    }
}

impl From<String> for Role {
    fn from(value: String) -> Self {
        Self::parse(&value)
    }
}

impl From<Role> for String {
    fn from(role: Role) -> Self {
        role.as_str().to_string()
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// LoadingState
// ---------------------------------------------------------------------------

/// Request status tracked by the auth store.
///
/// ```text
/// idle → pending → success
///                → error
/// success | error → pending (next request)
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoadingState {
    #[default]
    Idle,
    Pending,
    Success,
    Error,
}

impl LoadingState {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Pending => "pending",
            Self::Success => "success",
            Self::Error => "error",
        }
    }

    #[must_use]
    pub const fn is_pending(self) -> bool {
        matches!(self, Self::Pending)
    }
}

impl fmt::Display for LoadingState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
