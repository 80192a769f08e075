pub mod api;
pub mod auth;
pub mod config;
pub mod crypto;
pub mod error;
pub mod graphql;
pub mod providers;
pub mod session;

pub use config::Config;
pub use error::{RelayError, UpstreamError};

use anyhow::Context;
use std::sync::Arc;

use crypto::Signer;
use graphql::GraphqlClient;
use providers::{JobberProvider, OAuthProvider};
use session::SessionStore;

/// Shared application state passed to all API handlers.
pub struct AppState {
    pub config: Config,
    pub sessions: SessionStore,
    pub signer: Signer,
    pub provider: Box<dyn OAuthProvider>,
    pub graphql: GraphqlClient,
}

pub type SharedState = Arc<AppState>;

impl AppState {
    /// Wire up the Jobber provider and GraphQL client from configuration.
    pub fn new(config: Config) -> anyhow::Result<Self> {
        // Redirects from the API edge are reported, not followed.
        let http = reqwest::Client::builder()
            .redirect(reqwest::redirect::Policy::none())
            .timeout(config.upstream_timeout)
            .build()
            .context("Failed to build HTTP client")?;

        let signer = Signer::new(&config.session_secret).context("Invalid SESSION_SECRET")?;

        Ok(Self {
            sessions: SessionStore::new(config.session_ttl),
            signer,
            provider: Box::new(JobberProvider::new(&config, http.clone())),
            graphql: GraphqlClient::new(&config, http),
            config,
        })
    }
}
