use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, error};

use super::traits::{OAuthProvider, TokenSet};
use crate::config::Config;
use crate::error::RelayError;

/// Jobber OAuth 2.0 provider.
///
/// Quirks:
/// - The token endpoint takes a JSON body (not form-encoded) with the client secret inline.
/// - Scopes are comma-separated.
/// - Access tokens are JWTs; the response carries no `expires_in`.
pub struct JobberProvider {
    client_id: String,
    client_secret: String,
    auth_url: String,
    token_url: String,
    redirect_uri: String,
    scopes: String,
    http: reqwest::Client,
}

#[derive(Serialize)]
struct TokenRequest<'a> {
    grant_type: &'static str,
    client_id: &'a str,
    client_secret: &'a str,
    code: &'a str,
    redirect_uri: &'a str,
}

#[derive(Debug, Deserialize)]
struct JobberTokenResponse {
    access_token: String,
    refresh_token: Option<String>,
}

impl JobberProvider {
    pub fn new(config: &Config, http: reqwest::Client) -> Self {
        Self {
            client_id: config.client_id.clone(),
            client_secret: config.client_secret.clone(),
            auth_url: config.auth_url.clone(),
            token_url: config.token_url.clone(),
            redirect_uri: config.redirect_uri.clone(),
            scopes: config.scopes.clone(),
            http,
        }
    }
}

#[async_trait]
impl OAuthProvider for JobberProvider {
    fn id(&self) -> &str {
        "jobber"
    }

    fn auth_url(&self, state: &str) -> String {
        format!(
            "{base}?\
             client_id={client_id}\
             &redirect_uri={redirect_uri}\
             &response_type=code\
             &scope={scope}\
             &state={state}",
            base = self.auth_url,
            client_id = urlencoding(&self.client_id),
            redirect_uri = urlencoding(&self.redirect_uri),
            scope = urlencoding(&self.scopes),
            state = urlencoding(state),
        )
    }

    async fn exchange_code(&self, code: &str) -> Result<TokenSet, RelayError> {
        debug!("Exchanging authorization code at {}", self.token_url);

        let resp = self
            .http
            .post(&self.token_url)
            .header("Accept", "application/json")
            .json(&TokenRequest {
                grant_type: "authorization_code",
                client_id: &self.client_id,
                client_secret: &self.client_secret,
                code,
                redirect_uri: &self.redirect_uri,
            })
            .send()
            .await
            .map_err(|e| RelayError::TokenExchange(format!("request failed: {e}")))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            error!("Jobber token exchange returned {status}: {body}");
            return Err(RelayError::TokenExchange(format!("HTTP {status}: {body}")));
        }

        let token_resp: JobberTokenResponse = resp
            .json()
            .await
            .map_err(|e| RelayError::TokenExchange(format!("failed to parse token response: {e}")))?;

        if token_resp.access_token.trim().is_empty() {
            error!("Jobber token exchange returned an empty access_token");
            return Err(RelayError::TokenExchange("empty access_token in token response".into()));
        }

        Ok(TokenSet {
            access_token: token_resp.access_token,
            refresh_token: token_resp.refresh_token,
        })
    }
}

fn urlencoding(s: &str) -> String {
    url::form_urlencoded::byte_serialize(s.as_bytes()).collect()
}
