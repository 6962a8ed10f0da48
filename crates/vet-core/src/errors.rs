//! Cross-cutting error types for vetdesk.
//!
//! Domain-specific errors (`AuthError`, `ConfigError`) live in their own
//! crates. The binary converges everything into `anyhow::Error`.

use thiserror::Error;

/// Errors that can be raised by any vetdesk crate.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CoreError {
    /// A state machine transition was attempted that is not allowed.
    #[error("Invalid state transition: {machine} from {from} to {to}")]
    InvalidTransition {
        machine: String,
        from: String,
        to: String,
    },

    /// Data failed validation (format, constraints).
    #[error("Validation error: {0}")]
    Validation(String),
}
