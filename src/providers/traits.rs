use async_trait::async_trait;

use crate::error::RelayError;

/// Tokens returned from an OAuth provider after code exchange.
#[derive(Debug, Clone)]
pub struct TokenSet {
    pub access_token: String,
    pub refresh_token: Option<String>,
}

/// Authorization-code half of an OAuth 2.0 client.
#[async_trait]
pub trait OAuthProvider: Send + Sync {
    /// Unique provider identifier (e.g., "jobber").
    fn id(&self) -> &str;

    /// Build the authorization URL that the browser should be redirected to.
    ///
    /// - `state`: An opaque, HMAC-signed state string for CSRF protection.
    fn auth_url(&self, state: &str) -> String;

    /// Exchange an authorization code for an access token (and optionally refresh token).
    async fn exchange_code(&self, code: &str) -> Result<TokenSet, RelayError>;
}
