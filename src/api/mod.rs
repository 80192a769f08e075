//! HTTP surface of the relay.
//!
//! - /auth/*          — OAuth redirect + callback
//! - /api/auth/*      — session status and logout
//! - /api/vehicles    — create-vehicle relay
//! - everything else  — static front-end from `STATIC_DIR`

pub mod routes;

use crate::SharedState;
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

pub fn router(state: SharedState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let static_files = ServeDir::new(&state.config.static_dir);

    Router::new()
        .merge(routes::router(state))
        .fallback_service(static_files)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}
