use anyhow::{bail, Context, Result};
use std::path::PathBuf;
use std::time::Duration;

const DEFAULT_AUTH_URL: &str = "https://api.getjobber.com/api/oauth/authorize";
const DEFAULT_TOKEN_URL: &str = "https://api.getjobber.com/api/oauth/token";
const DEFAULT_GRAPHQL_URL: &str = "https://api.getjobber.com/api/graphql";
const DEFAULT_API_VERSION: &str = "2025-01-20";
const DEFAULT_SCOPES: &str = "read_vehicles,write_vehicles";

/// The GraphQL edge sits behind bot detection that rejects obvious non-browser clients.
const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36";

/// Application configuration, loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    // ── Server ──────────────────────────────────────────────────────────
    pub host: String,
    pub port: u16,
    /// Directory served for any path that isn't an API route.
    pub static_dir: PathBuf,

    // ── OAuth client ────────────────────────────────────────────────────
    pub client_id: String,
    pub client_secret: String,
    pub auth_url: String,
    pub token_url: String,
    pub redirect_uri: String,
    /// Passed verbatim as the `scope` query parameter.
    pub scopes: String,

    // ── GraphQL ─────────────────────────────────────────────────────────
    pub graphql_url: String,
    /// Sent as `X-JOBBER-GRAPHQL-VERSION`.
    pub api_version: String,
    pub user_agent: String,
    pub upstream_timeout: Duration,

    // ── Sessions ────────────────────────────────────────────────────────
    /// HMAC key for session cookies and the OAuth `state` parameter.
    pub session_secret: String,
    pub session_ttl: Duration,
    pub session_sweep_interval: Duration,
    pub cookie_secure: bool,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "3001".into())
            .parse()
            .context("Invalid PORT")?;

        let session_secret = std::env::var("SESSION_SECRET")
            .context("SESSION_SECRET is required (any strong random string)")?;
        if session_secret.trim().is_empty() {
            bail!("SESSION_SECRET must not be empty");
        }

        Ok(Config {
            host: std::env::var("HOST").unwrap_or_else(|_| "127.0.0.1".into()),
            port,
            static_dir: std::env::var("STATIC_DIR")
                .unwrap_or_else(|_| "public".into())
                .into(),

            client_id: std::env::var("JOBBER_CLIENT_ID")
                .context("JOBBER_CLIENT_ID is required (from the Jobber developer center)")?,
            client_secret: std::env::var("JOBBER_CLIENT_SECRET")
                .context("JOBBER_CLIENT_SECRET is required (from the Jobber developer center)")?,
            auth_url: std::env::var("JOBBER_AUTH_URL").unwrap_or_else(|_| DEFAULT_AUTH_URL.into()),
            token_url: std::env::var("JOBBER_TOKEN_URL")
                .unwrap_or_else(|_| DEFAULT_TOKEN_URL.into()),
            redirect_uri: std::env::var("REDIRECT_URI")
                .unwrap_or_else(|_| format!("http://localhost:{port}/auth/callback")),
            scopes: std::env::var("OAUTH_SCOPES").unwrap_or_else(|_| DEFAULT_SCOPES.into()),

            graphql_url: std::env::var("JOBBER_GRAPHQL_URL")
                .unwrap_or_else(|_| DEFAULT_GRAPHQL_URL.into()),
            api_version: std::env::var("JOBBER_API_VERSION")
                .unwrap_or_else(|_| DEFAULT_API_VERSION.into()),
            user_agent: std::env::var("UPSTREAM_USER_AGENT")
                .unwrap_or_else(|_| DEFAULT_USER_AGENT.into()),
            upstream_timeout: secs_var("UPSTREAM_TIMEOUT_SECS", 30)?,

            session_secret,
            session_ttl: secs_var("SESSION_TTL_SECS", 24 * 3600)?,
            session_sweep_interval: secs_var("SESSION_SWEEP_SECS", 5 * 60)?,
            cookie_secure: std::env::var("COOKIE_SECURE")
                .map(|v| matches!(v.to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
                .unwrap_or(false),
        })
    }

    /// Address the listener binds to.
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn secs_var(name: &str, default: u64) -> Result<Duration> {
    let secs = match std::env::var(name) {
        Ok(raw) => raw
            .parse::<u64>()
            .with_context(|| format!("Invalid {name} (expected whole seconds)"))?,
        Err(_) => default,
    };
    Ok(Duration::from_secs(secs))
}
