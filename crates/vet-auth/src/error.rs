use thiserror::Error;

#[derive(Debug, Error)]
pub enum AuthError {
    /// The API answered 401. Callers treat this as "session invalidated",
    /// not as a generic failure.
    #[error("unauthorized: the server rejected the session")]
    Unauthorized,

    #[error("request failed: {0}")]
    Network(String),

    #[error("API error (HTTP {status}): {message}")]
    Api { status: u16, message: String },

    #[error("session storage error: {0}")]
    Storage(String),

    #[error("persisted session is corrupted: {0}")]
    CorruptedSession(String),

    #[error("token store error: {0}")]
    TokenStore(String),
}

impl AuthError {
    #[must_use]
    pub const fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Unauthorized)
    }

    /// Text suitable for showing inline next to a form.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Unauthorized => "Invalid email or password".to_string(),
            Self::Api { message, .. } => message.clone(),
            Self::Network(_) => "Unable to reach the server, please try again".to_string(),
            other => other.to_string(),
        }
    }
}
