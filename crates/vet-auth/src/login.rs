//! Login form flow: validate, call the API, populate the store.

use std::fmt;

use serde::Serialize;
use thiserror::Error;

use crate::context::AuthContext;
use crate::navigator::DASHBOARD_PATH;
use crate::service::{AuthApi, Credentials};

pub const MIN_PASSWORD_LEN: usize = 6;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LoginField {
    Email,
    Password,
}

impl LoginField {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Email => "email",
            Self::Password => "password",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: LoginField,
    pub message: String,
}

impl FieldError {
    fn new(field: LoginField, message: &str) -> Self {
        Self {
            field,
            message: message.to_string(),
        }
    }
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field.as_str(), self.message)
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum LoginError {
    /// Input failed client-side validation. No request was sent.
    #[error("invalid input: {}", join(.0))]
    Invalid(Vec<FieldError>),

    /// The server refused the credentials or could not be reached.
    #[error("{0}")]
    Rejected(String),
}

fn join(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Check `email` and `password` before anything leaves the process.
///
/// # Errors
///
/// Returns every failing field, email first.
pub fn validate(email: &str, password: &str) -> Result<(), Vec<FieldError>> {
    let mut errors = Vec::new();
    let email = email.trim();
    if email.is_empty() {
        errors.push(FieldError::new(LoginField::Email, "Email is required"));
    } else if !is_well_formed_email(email) {
        errors.push(FieldError::new(LoginField::Email, "Invalid email address"));
    }
    if password.is_empty() {
        errors.push(FieldError::new(LoginField::Password, "Password is required"));
    } else if password.chars().count() < MIN_PASSWORD_LEN {
        errors.push(FieldError::new(
            LoginField::Password,
            "Password must be at least 6 characters",
        ));
    }
    if errors.is_empty() { Ok(()) } else { Err(errors) }
}

fn is_well_formed_email(email: &str) -> bool {
    if email.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.contains('@')
        && domain.contains('.')
        && domain.split('.').all(|label| !label.is_empty())
}

/// The login page.
#[derive(Debug)]
pub struct LoginForm<A> {
    ctx: AuthContext<A>,
    from: Option<String>,
}

impl<A: AuthApi> LoginForm<A> {
    /// The post-login destination is taken from the redirect that led here.
    #[must_use]
    pub fn new(ctx: AuthContext<A>) -> Self {
        let from = ctx.navigator.current().from;
        Self { ctx, from }
    }

    /// Where a successful login lands.
    #[must_use]
    pub fn destination(&self) -> &str {
        self.from.as_deref().unwrap_or(DASHBOARD_PATH)
    }

    /// Submit the form. On success the session is populated, the bearer
    /// token stored, and the navigator moved to the destination, which is
    /// also returned.
    ///
    /// # Errors
    ///
    /// `LoginError::Invalid` on bad input, `LoginError::Rejected` when the
    /// API call fails. The session stays unauthenticated in both cases.
    pub async fn submit(&self, email: &str, password: &str) -> Result<String, LoginError> {
        validate(email, password).map_err(LoginError::Invalid)?;

        let store = &self.ctx.store;
        store.begin_request();
        let credentials = Credentials::new(email.trim(), password);
        let response = match self.ctx.api.login(&credentials).await {
            Ok(response) => response,
            Err(error) => {
                tracing::info!(%error, email = %credentials.email, "login rejected");
                let message = error.user_message();
                store.set_error(message.clone());
                return Err(LoginError::Rejected(message));
            }
        };

        if let Some(token) = response.access_token.as_deref()
            && let Err(error) = self.ctx.credentials.store(token)
        {
            tracing::warn!(%error, "could not store bearer token; session will not survive restart");
        }
        tracing::info!(user = %response.user.id, role = %response.user.role, "logged in");
        store.login(response.user);

        let destination = self.destination().to_string();
        self.ctx.navigator.replace(destination.clone(), None);
        Ok(destination)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use pretty_assertions::assert_eq;
    use rstest::rstest;
    use serde_json::Map;
    use vet_core::{LoadingState, Role, User};

    use crate::credentials::MemoryCredentials;
    use crate::events::EventBus;
    use crate::mock::{MockAuthApi, MockFailure};
    use crate::navigator::{Location, Navigator};
    use crate::persist::MemorySessionStorage;
    use crate::service::LoginResponse;
    use crate::store::AuthStore;

    fn vet() -> User {
        User {
            id: "u_3".into(),
            email: "lee@clinic.test".into(),
            first_name: "Lee".into(),
            last_name: "Park".into(),
            role: Role::Veterinarian,
            extra: Map::new(),
        }
    }

    fn form(api: MockAuthApi, at: Location) -> LoginForm<MockAuthApi> {
        let navigator = Navigator::new("/");
        navigator.replace(at.path, at.from);
        LoginForm::new(AuthContext {
            store: Arc::new(AuthStore::new(Arc::new(MemorySessionStorage::new()))),
            api: Arc::new(api),
            bus: EventBus::new(),
            navigator: Arc::new(navigator),
            credentials: Arc::new(MemoryCredentials::new()),
        })
    }

    #[rstest]
    #[case("", "secret1", vec![LoginField::Email])]
    #[case("not-an-email", "secret1", vec![LoginField::Email])]
    #[case("a@b", "secret1", vec![LoginField::Email])]
    #[case("a @b.test", "secret1", vec![LoginField::Email])]
    #[case("a@b.test", "", vec![LoginField::Password])]
    #[case("a@b.test", "12345", vec![LoginField::Password])]
    #[case("", "", vec![LoginField::Email, LoginField::Password])]
    fn invalid_input(#[case] email: &str, #[case] password: &str, #[case] fields: Vec<LoginField>) {
        let errors = validate(email, password).unwrap_err();
        assert_eq!(errors.iter().map(|e| e.field).collect::<Vec<_>>(), fields);
    }

    #[test]
    fn valid_input() {
        assert_eq!(validate(" lee@clinic.test ", "123456"), Ok(()));
    }

    #[tokio::test]
    async fn invalid_input_never_calls_api() {
        let form = form(MockAuthApi::new(), Location::new("/login"));
        let err = form.submit("nope", "1").await.unwrap_err();
        assert!(matches!(err, LoginError::Invalid(ref e) if e.len() == 2));
        assert_eq!(form.ctx.api.login_calls(), 0);
    }

    #[tokio::test]
    async fn success_populates_store_and_returns_from() {
        let api = MockAuthApi::new().with_login(LoginResponse {
            user: vet(),
            access_token: Some("h.p.s".into()),
        });
        let form = form(
            api,
            Location {
                path: "/login".into(),
                from: Some("/appointments".into()),
            },
        );

        let dest = form.submit("lee@clinic.test", "hunter22").await.unwrap();
        assert_eq!(dest, "/appointments");
        assert_eq!(form.ctx.navigator.current().path, "/appointments");
        assert!(form.ctx.store.is_authenticated());
        assert_eq!(form.ctx.store.loading_state(), LoadingState::Success);
        assert_eq!(form.ctx.credentials.load().as_deref(), Some("h.p.s"));
        assert_eq!(
            form.ctx.api.last_credentials().map(|c| c.email),
            Some("lee@clinic.test".to_string())
        );
    }

    #[tokio::test]
    async fn success_without_from_goes_to_dashboard() {
        let api = MockAuthApi::new().with_login(LoginResponse {
            user: vet(),
            access_token: None,
        });
        let form = form(api, Location::new("/login"));
        assert_eq!(form.submit("lee@clinic.test", "hunter22").await.unwrap(), "/dashboard");
        assert_eq!(form.ctx.credentials.load(), None);
    }

    #[tokio::test]
    async fn rejection_sets_error_and_stays_unauthenticated() {
        let form = form(
            MockAuthApi::new().with_login_failure(MockFailure::Unauthorized),
            Location::new("/login"),
        );
        let err = form.submit("lee@clinic.test", "wrong-pass").await.unwrap_err();
        assert_eq!(err, LoginError::Rejected("Invalid email or password".into()));

        let session = form.ctx.store.snapshot();
        assert!(!session.is_authenticated);
        assert_eq!(session.loading_state, LoadingState::Error);
        assert_eq!(session.error.as_deref(), Some("Invalid email or password"));
    }

    #[tokio::test]
    async fn server_message_is_surfaced() {
        let form = form(
            MockAuthApi::new().with_login_failure(MockFailure::Api {
                status: 423,
                message: "Account locked".into(),
            }),
            Location::new("/login"),
        );
        let err = form.submit("lee@clinic.test", "hunter22").await.unwrap_err();
        assert_eq!(err.to_string(), "Account locked");
    }
}
