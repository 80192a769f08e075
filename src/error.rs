use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::{json, Value};

/// Failures talking to the GraphQL API.
#[derive(Debug, thiserror::Error)]
pub enum UpstreamError {
    /// 401 or 403 from the provider: the stored token is no longer usable.
    #[error("HTTP {0}: access token rejected")]
    Unauthorized(u16),

    #[error("HTTP {status}: Redirect to {location}")]
    Redirect { status: u16, location: String },

    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Upstream request failed: {0}")]
    Transport(String),

    #[error("Invalid upstream response: {0}")]
    Decode(String),
}

impl UpstreamError {
    /// Attach the user-facing action that failed.
    pub fn during(self, action: &'static str) -> RelayError {
        RelayError::Upstream {
            action,
            source: self,
        }
    }
}

impl From<reqwest::Error> for UpstreamError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            UpstreamError::Decode(e.to_string())
        } else {
            UpstreamError::Transport(e.to_string())
        }
    }
}

/// Unified error type for the relay's HTTP handlers.
#[derive(Debug, thiserror::Error)]
pub enum RelayError {
    // ── Client errors ───────────────────────────────────────────────────
    #[error("{0}")]
    BadRequest(String),

    #[error("Not authenticated")]
    Unauthorized,

    #[error("Invalid state parameter")]
    InvalidState,

    // ── Provider errors ─────────────────────────────────────────────────
    #[error("GraphQL errors")]
    Graphql(Vec<Value>),

    #[error("Validation errors")]
    UserErrors(Vec<Value>),

    #[error("Token exchange failed: {0}")]
    TokenExchange(String),

    #[error("{action}: {source}")]
    Upstream {
        action: &'static str,
        #[source]
        source: UpstreamError,
    },

    // ── Internal ────────────────────────────────────────────────────────
    #[error("Crypto error: {0}")]
    Crypto(String),
}

impl RelayError {
    /// Whether the upstream rejected the session's token.
    pub fn needs_reauth(&self) -> bool {
        matches!(
            self,
            RelayError::Upstream {
                source: UpstreamError::Unauthorized(_),
                ..
            }
        )
    }
}

impl IntoResponse for RelayError {
    fn into_response(self) -> Response {
        if self.needs_reauth() {
            let body = json!({ "error": "Authentication expired", "needsReauth": true });
            return (StatusCode::UNAUTHORIZED, axum::Json(body)).into_response();
        }

        let (status, body) = match self {
            err @ (RelayError::BadRequest(_) | RelayError::InvalidState) => (
                StatusCode::BAD_REQUEST,
                json!({ "error": err.to_string() }),
            ),
            RelayError::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                json!({ "error": "Not authenticated" }),
            ),
            RelayError::Graphql(details) => (
                StatusCode::BAD_REQUEST,
                json!({ "error": "GraphQL errors", "details": details }),
            ),
            RelayError::UserErrors(details) => (
                StatusCode::BAD_REQUEST,
                json!({ "error": "Validation errors", "details": details }),
            ),
            RelayError::Upstream { action, source } => (
                StatusCode::INTERNAL_SERVER_ERROR,
                json!({ "error": action, "details": source.to_string() }),
            ),
            err @ (RelayError::TokenExchange(_) | RelayError::Crypto(_)) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                json!({ "error": "Internal server error", "details": err.to_string() }),
            ),
        };

        (status, axum::Json(body)).into_response()
    }
}
