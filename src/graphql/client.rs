use reqwest::header::{
    ACCEPT, ACCEPT_LANGUAGE, AUTHORIZATION, CACHE_CONTROL, CONTENT_TYPE, LOCATION, USER_AGENT,
};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use crate::config::Config;
use crate::error::UpstreamError;

const VERSION_HEADER: &str = "X-JOBBER-GRAPHQL-VERSION";

#[derive(Serialize)]
struct GraphqlRequest<'a, V> {
    query: &'a str,
    variables: &'a V,
}

/// Standard GraphQL response envelope.
#[derive(Debug, Deserialize)]
pub struct GraphqlResponse<T> {
    pub data: Option<T>,
    pub errors: Option<Vec<Value>>,
}

/// Bearer-authenticated client for the provider's GraphQL endpoint.
pub struct GraphqlClient {
    http: reqwest::Client,
    endpoint: String,
    api_version: String,
    user_agent: String,
}

impl GraphqlClient {
    pub fn new(config: &Config, http: reqwest::Client) -> Self {
        Self {
            http,
            endpoint: config.graphql_url.clone(),
            api_version: config.api_version.clone(),
            user_agent: config.user_agent.clone(),
        }
    }

    /// POST one operation. Only a 200 with a decodable envelope is `Ok`;
    /// GraphQL-level `errors` are left for the caller to classify.
    pub async fn execute<V, T>(
        &self,
        access_token: &str,
        query: &str,
        variables: &V,
    ) -> Result<GraphqlResponse<T>, UpstreamError>
    where
        V: Serialize + Sync,
        T: DeserializeOwned,
    {
        debug!("POST {}", self.endpoint);

        let resp = self
            .http
            .post(&self.endpoint)
            .header(AUTHORIZATION, format!("Bearer {access_token}"))
            .header(CONTENT_TYPE, "application/json")
            .header(ACCEPT, "application/json")
            .header(VERSION_HEADER, &self.api_version)
            .header(USER_AGENT, &self.user_agent)
            .header(ACCEPT_LANGUAGE, "en-US,en;q=0.9")
            .header(CACHE_CONTROL, "no-cache")
            .json(&GraphqlRequest { query, variables })
            .send()
            .await?;

        let status = resp.status();
        debug!("GraphQL response status: {status}");

        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            warn!("GraphQL endpoint rejected the access token ({status})");
            return Err(UpstreamError::Unauthorized(status.as_u16()));
        }

        if status.is_redirection() {
            let location = resp
                .headers()
                .get(LOCATION)
                .and_then(|v| v.to_str().ok())
                .unwrap_or_default()
                .to_string();
            warn!("GraphQL endpoint redirected to {location}");
            return Err(UpstreamError::Redirect {
                status: status.as_u16(),
                location,
            });
        }

        if status != StatusCode::OK {
            let body = resp.text().await.unwrap_or_default();
            return Err(UpstreamError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let body = resp.text().await?;
        serde_json::from_str(&body).map_err(|e| UpstreamError::Decode(e.to_string()))
    }
}
