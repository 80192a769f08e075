//! Decode-only inspection of access-token claims.
//!
//! Signatures are NOT verified here. The result is used for log lines only and
//! never decides whether a request goes through; the provider is the authority.

use base64::Engine as _;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use tracing::{debug, warn};

#[derive(Debug, Deserialize)]
struct Claims {
    exp: Option<i64>,
}

/// Expiry of a JWT access token, if the token is a JWT carrying `exp`.
pub fn expires_at(access_token: &str) -> Option<DateTime<Utc>> {
    let parts: Vec<&str> = access_token.split('.').collect();
    if parts.len() != 3 {
        return None;
    }

    // Some issuers pad their segments; accept both forms.
    let payload_bytes = base64::engine::general_purpose::URL_SAFE_NO_PAD
        .decode(parts[1].trim_end_matches('='))
        .ok()?;

    let claims: Claims = serde_json::from_slice(&payload_bytes).ok()?;
    DateTime::from_timestamp(claims.exp?, 0)
}

/// Short, non-secret handle for a token in log lines.
pub fn fingerprint(access_token: &str) -> String {
    let prefix: String = access_token.chars().take(8).collect();
    format!("{prefix}…")
}

/// Log what we can tell about the token before using it.
pub fn log_expiry(access_token: &str) {
    match expires_at(access_token) {
        Some(exp) if exp < Utc::now() => {
            warn!(
                "Access token {} expired at {exp}; expect the provider to reject it",
                fingerprint(access_token)
            );
        }
        Some(exp) => debug!("Access token {} expires at {exp}", fingerprint(access_token)),
        None => debug!("Access token {} is opaque", fingerprint(access_token)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn jwt_with(payload: &str) -> String {
        let enc = |s: &str| base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(s);
        format!("{}.{}.sig", enc(r#"{"alg":"HS256"}"#), enc(payload))
    }

    #[test]
    fn test_expiry_from_jwt() {
        let token = jwt_with(r#"{"sub":"123","exp":1700000000}"#);
        let exp = expires_at(&token).unwrap();
        assert_eq!(exp.timestamp(), 1_700_000_000);
    }

    #[test]
    fn test_opaque_or_malformed_tokens() {
        assert!(expires_at("opaque-token").is_none());
        assert!(expires_at("a.!!!.c").is_none());
        assert!(expires_at(&jwt_with(r#"{"sub":"no-exp"}"#)).is_none());
        assert!(expires_at(&jwt_with("not json")).is_none());
    }

    #[test]
    fn test_fingerprint_hides_token() {
        assert_eq!(fingerprint("abcdefghijklmnop"), "abcdefgh…");
        assert_eq!(fingerprint("abc"), "abc…");
    }
}
