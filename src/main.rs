use anyhow::Result;
use std::sync::Arc;
use tracing::info;

use jobber_relay::{api, session, AppState, Config, SharedState};

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env if present
    let _ = dotenvy::dotenv();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "jobber_relay=info,tower_http=info".into()),
        )
        .init();

    // Load config
    let config = Config::from_env()?;
    info!("jobber-relay v{}", env!("CARGO_PKG_VERSION"));
    info!("GraphQL endpoint: {} (API version {})", config.graphql_url, config.api_version);

    // Build shared state
    let state: SharedState = Arc::new(AppState::new(config.clone())?);

    // Start session sweeper
    let sweeper_state = state.clone();
    tokio::spawn(async move {
        session::sweep_daemon(sweeper_state).await;
    });

    // Build router
    let app = api::router(state);

    // Start server
    let listener = tokio::net::TcpListener::bind(config.bind_addr()).await?;
    info!("Server running on http://localhost:{}", config.port);
    info!("Start the OAuth flow at http://localhost:{}/auth/login", config.port);
    axum::serve(listener, app).await?;

    Ok(())
}
