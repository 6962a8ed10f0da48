//! Bearer token inspection without signature verification.
//!
//! Decoding here is advisory: it only tells the client when a token is about
//! to stop working. The server remains the authority on validity, so every
//! helper fails closed (an undecodable token counts as expired).

use base64::Engine as _;
use base64::alphabet;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};
use chrono::{DateTime, TimeDelta, Utc};
use serde_json::{Map, Value};
use vet_core::Role;

/// Default window for [`will_expire_soon`].
pub const DEFAULT_REFRESH_WINDOW: TimeDelta = TimeDelta::minutes(5);

/// URL-safe alphabet that accepts payloads with or without `=` padding.
const PAYLOAD_ENGINE: GeneralPurpose = GeneralPurpose::new(
    &alphabet::URL_SAFE,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// Decoded JWT payload (the middle segment).
#[derive(Debug, Clone, PartialEq)]
pub struct TokenPayload(Map<String, Value>);

impl TokenPayload {
    /// `exp` claim in Unix seconds. Fractional values are truncated.
    #[must_use]
    pub fn exp(&self) -> Option<i64> {
        numeric_claim(self.0.get("exp")?)
    }

    /// `iat` claim in Unix seconds.
    #[must_use]
    pub fn issued_at(&self) -> Option<i64> {
        numeric_claim(self.0.get("iat")?)
    }

    #[must_use]
    pub fn subject(&self) -> Option<&str> {
        self.0.get("sub").and_then(Value::as_str)
    }

    #[must_use]
    pub fn email(&self) -> Option<&str> {
        self.0.get("email").and_then(Value::as_str)
    }

    #[must_use]
    pub fn role(&self) -> Option<Role> {
        self.0.get("role").and_then(Value::as_str).map(Role::parse)
    }

    #[must_use]
    pub fn get(&self, claim: &str) -> Option<&Value> {
        self.0.get(claim)
    }

    #[must_use]
    pub const fn claims(&self) -> &Map<String, Value> {
        &self.0
    }
}

#[allow(clippy::cast_possible_truncation)]
fn numeric_claim(value: &Value) -> Option<i64> {
    value
        .as_i64()
        .or_else(|| value.as_f64().filter(|f| f.is_finite()).map(|f| f as i64))
}

/// Decode a token's payload. Returns `None` for anything that is not three
/// dot-separated segments with a base64url JSON object in the middle.
#[must_use]
pub fn decode(token: &str) -> Option<TokenPayload> {
    let mut parts = token.trim().split('.');
    let (Some(_header), Some(payload), Some(_signature), None) =
        (parts.next(), parts.next(), parts.next(), parts.next())
    else {
        return None;
    };
    if payload.is_empty() {
        return None;
    }

    // Tolerate standard-alphabet encoders.
    let normalized = payload.replace('+', "-").replace('/', "_");
    let bytes = PAYLOAD_ENGINE.decode(normalized).ok()?;
    match serde_json::from_slice::<Value>(&bytes).ok()? {
        Value::Object(map) => Some(TokenPayload(map)),
        _ => None,
    }
}

/// Expiration as Unix milliseconds.
#[must_use]
pub fn expiration_ms(token: &str) -> Option<i64> {
    decode(token)?.exp()?.checked_mul(1000)
}

/// Expiration as a timestamp.
#[must_use]
pub fn expires_at(token: &str) -> Option<DateTime<Utc>> {
    DateTime::from_timestamp_millis(expiration_ms(token)?)
}

/// Whether the token is expired, or will be within `buffer`.
#[must_use]
pub fn is_expired(token: &str, buffer: TimeDelta) -> bool {
    is_expired_at(token, buffer, Utc::now())
}

/// [`is_expired`] against an explicit clock.
#[must_use]
pub fn is_expired_at(token: &str, buffer: TimeDelta, now: DateTime<Utc>) -> bool {
    expiration_ms(token).is_none_or(|exp_ms| {
        now.timestamp_millis() >= exp_ms.saturating_sub(buffer.num_milliseconds())
    })
}

/// Whether the token expires within `within` (see [`DEFAULT_REFRESH_WINDOW`]).
#[must_use]
pub fn will_expire_soon(token: &str, within: TimeDelta) -> bool {
    will_expire_soon_at(token, within, Utc::now())
}

/// [`will_expire_soon`] against an explicit clock.
#[must_use]
pub fn will_expire_soon_at(token: &str, within: TimeDelta, now: DateTime<Utc>) -> bool {
    is_expired_at(token, within, now)
}

/// Remaining lifetime, `None` when undecodable or already expired.
#[must_use]
pub fn time_until_expiry(token: &str) -> Option<TimeDelta> {
    let remaining = expires_at(token)? - Utc::now();
    (remaining > TimeDelta::zero()).then_some(remaining)
}
