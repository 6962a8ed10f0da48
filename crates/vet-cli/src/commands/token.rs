use chrono::{DateTime, TimeDelta, Utc};
use serde::Serialize;
use serde_json::{Map, Value};
use vet_auth::token;
use vet_config::VetConfig;

use crate::cli::GlobalFlags;
use crate::cli::subcommands::TokenCommands;
use crate::cli::subcommands::token::TokenInspectArgs;
use crate::output::output;

#[derive(Debug, Serialize)]
struct TokenInspectResponse {
    decodable: bool,
    subject: Option<String>,
    email: Option<String>,
    role: Option<String>,
    issued_at: Option<String>,
    expires_at: Option<String>,
    expired: bool,
    expires_soon: bool,
    seconds_remaining: Option<i64>,
    claims: Map<String, Value>,
}

/// Handle `vetdesk token <subcommand>`.
pub fn handle(
    action: &TokenCommands,
    flags: &GlobalFlags,
    config: &VetConfig,
) -> anyhow::Result<()> {
    match action {
        TokenCommands::Inspect(args) => {
            let buffer = seconds(
                "--buffer-secs",
                args.buffer_secs
                    .unwrap_or(config.session.expiry_buffer_secs),
            )?;
            let window = seconds(
                "session.refresh_window_secs",
                config.session.refresh_window_secs,
            )?;
            output(&inspect(args, buffer, window, Utc::now()), flags.format)
        }
    }
}

fn seconds(name: &str, secs: i64) -> anyhow::Result<TimeDelta> {
    TimeDelta::try_seconds(secs)
        .ok_or_else(|| anyhow::anyhow!("{name} is out of range: {secs}"))
}

fn inspect(
    args: &TokenInspectArgs,
    buffer: TimeDelta,
    window: TimeDelta,
    now: DateTime<Utc>,
) -> TokenInspectResponse {
    let raw = args.token.as_str();
    let payload = token::decode(raw);
    let expires_at = token::expires_at(raw);

    TokenInspectResponse {
        decodable: payload.is_some(),
        subject: payload.as_ref().and_then(|p| p.subject().map(str::to_string)),
        email: payload.as_ref().and_then(|p| p.email().map(str::to_string)),
        role: payload
            .as_ref()
            .and_then(token::TokenPayload::role)
            .map(|r| r.to_string()),
        issued_at: payload
            .as_ref()
            .and_then(token::TokenPayload::issued_at)
            .and_then(|secs| DateTime::<Utc>::from_timestamp(secs, 0))
            .map(|t| t.to_rfc3339()),
        expires_at: expires_at.map(|t| t.to_rfc3339()),
        expired: token::is_expired_at(raw, buffer, now),
        expires_soon: token::will_expire_soon_at(raw, window, now),
        seconds_remaining: expires_at.map(|t| (t - now).num_seconds().max(0)),
        claims: payload.map(|p| p.claims().clone()).unwrap_or_default(),
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeDelta, TimeZone, Utc};
    use pretty_assertions::assert_eq;

    use super::{inspect, seconds};
    use crate::cli::subcommands::token::TokenInspectArgs;

    // {"sub":"u_1","email":"a@clinic.test","role":"admin","iat":1700000000,"exp":1700003600}
    const TOKEN: &str = "eyJhbGciOiJIUzI1NiJ9.eyJzdWIiOiJ1XzEiLCJlbWFpbCI6ImFAY2xpbmljLnRlc3QiLCJyb2xlIjoiYWRtaW4iLCJpYXQiOjE3MDAwMDAwMDAsImV4cCI6MTcwMDAwMzYwMH0.sig";

    fn args(token: &str) -> TokenInspectArgs {
        TokenInspectArgs {
            token: token.to_string(),
            buffer_secs: None,
        }
    }

    #[test]
    fn inspect_reports_claims_and_expiry() {
        let now = Utc.timestamp_opt(1_700_000_000, 0).unwrap();
        let resp = inspect(
            &args(TOKEN),
            TimeDelta::zero(),
            TimeDelta::minutes(5),
            now,
        );
        assert!(resp.decodable);
        assert_eq!(resp.subject.as_deref(), Some("u_1"));
        assert_eq!(resp.role.as_deref(), Some("admin"));
        assert_eq!(resp.seconds_remaining, Some(3600));
        assert!(!resp.expired);
        assert!(!resp.expires_soon);
        assert_eq!(resp.claims["email"], "a@clinic.test");
    }

    #[test]
    fn inspect_near_expiry_with_buffer() {
        let now = Utc.timestamp_opt(1_700_003_590, 0).unwrap();
        let resp = inspect(&args(TOKEN), TimeDelta::seconds(30), TimeDelta::minutes(5), now);
        assert!(resp.expired);
        assert!(resp.expires_soon);
        assert_eq!(resp.seconds_remaining, Some(10));
    }

    #[test]
    fn out_of_range_buffer_is_an_error() {
        let err = seconds("--buffer-secs", i64::MAX / 100).unwrap_err();
        assert!(err.to_string().contains("--buffer-secs"));
        assert_eq!(seconds("--buffer-secs", 30).unwrap(), TimeDelta::seconds(30));
    }

    #[test]
    fn inspect_garbage_fails_closed() {
        let resp = inspect(&args("not-a-token"), TimeDelta::zero(), TimeDelta::minutes(5), Utc::now());
        assert!(!resp.decodable);
        assert!(resp.expired);
        assert!(resp.expires_soon);
        assert_eq!(resp.expires_at, None);
        assert!(resp.claims.is_empty());
    }
}
