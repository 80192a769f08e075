//! Route handlers for the relay.
//!
//! All handlers receive `SharedState` via Axum state extraction. The browser
//! is identified by the signed `relay.sid` cookie; nothing else is trusted.

use axum::{
    extract::{FromRequest, Query, Request, State},
    http::{header::CONTENT_TYPE, HeaderMap},
    response::{IntoResponse, Redirect, Response},
    routing::{get, post},
    Form, Json, Router,
};
use chrono::Utc;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, error, info, warn};

use crate::auth::token;
use crate::crypto::random_token;
use crate::error::RelayError;
use crate::graphql::vehicles::{self, CreateVehicleBody};
use crate::session::cookie::{self, SESSION_COOKIE};
use crate::session::Session;
use crate::SharedState;

/// How long a login may take between `/auth/login` and the callback.
const STATE_MAX_AGE_SECS: i64 = 600;

// =============================================================================
// Router
// =============================================================================

pub fn router(state: SharedState) -> Router {
    Router::new()
        // ── OAuth ────────────────────────────────────────────────────────
        .route("/auth/login", get(auth_login))
        .route("/auth/callback", get(auth_callback))
        // ── Session ──────────────────────────────────────────────────────
        .route("/api/auth/status", get(auth_status))
        .route("/api/auth/logout", post(auth_logout))
        // ── Vehicles ─────────────────────────────────────────────────────
        .route("/api/vehicles", post(vehicle_create))
        .with_state(state)
}

// =============================================================================
// Session helpers
// =============================================================================

/// Resolve the browser's session from its signed cookie.
///
/// A session without an access token is treated as absent.
fn current_session(state: &SharedState, headers: &HeaderMap) -> Option<(String, Session)> {
    let signed = cookie::read(headers, SESSION_COOKIE)?;
    let id = match state.signer.verify(signed) {
        Ok(id) => id,
        Err(_) => {
            debug!("Ignoring session cookie with a bad signature");
            return None;
        }
    };
    let session = state
        .sessions
        .get(&id)
        .filter(|s| !s.access_token.is_empty())?;
    Some((id, session))
}

fn require_session(
    state: &SharedState,
    headers: &HeaderMap,
) -> Result<(String, Session), RelayError> {
    current_session(state, headers).ok_or(RelayError::Unauthorized)
}

fn home_with(query: &str) -> Response {
    Redirect::temporary(&format!("/?{query}")).into_response()
}

fn error_redirect(code: &str) -> Response {
    home_with(&format!("error={}", urlencoding(code)))
}

fn urlencoding(s: &str) -> String {
    url::form_urlencoded::byte_serialize(s.as_bytes()).collect()
}

// =============================================================================
// OAuth Endpoints
// =============================================================================

/// GET /auth/login — Redirect the browser to the provider's consent screen.
async fn auth_login(State(state): State<SharedState>) -> Result<Response, RelayError> {
    // Build state parameter: nonce:timestamp
    let state_data = format!("{}:{}", random_token(), Utc::now().timestamp());
    let signed_state = state.signer.sign(&state_data)?;

    let auth_url = state.provider.auth_url(&signed_state);
    info!("Starting {} OAuth flow", state.provider.id());

    Ok(Redirect::temporary(&auth_url).into_response())
}

/// Check signature and age of the round-tripped `state` parameter.
fn verify_oauth_state(state: &SharedState, signed: Option<&str>) -> Result<(), RelayError> {
    let signed = signed
        .filter(|s| !s.is_empty())
        .ok_or(RelayError::InvalidState)?;
    let state_data = state.signer.verify(signed)?;

    let (_nonce, timestamp) = state_data
        .rsplit_once(':')
        .ok_or(RelayError::InvalidState)?;
    let timestamp: i64 = timestamp.parse().map_err(|_| RelayError::InvalidState)?;

    if Utc::now().timestamp() - timestamp > STATE_MAX_AGE_SECS {
        return Err(RelayError::InvalidState);
    }
    Ok(())
}

#[derive(Deserialize)]
struct CallbackQuery {
    code: Option<String>,
    error: Option<String>,
    state: Option<String>,
}

/// GET /auth/callback — Exchange the code and open a session.
///
/// Every outcome is a redirect back to `/`; failures are reported as `?error=<code>`.
async fn auth_callback(
    State(state): State<SharedState>,
    headers: HeaderMap,
    Query(q): Query<CallbackQuery>,
) -> Response {
    if let Some(err) = q.error.filter(|e| !e.is_empty()) {
        warn!("Provider returned an OAuth error: {err}");
        return error_redirect(&err);
    }

    let Some(code) = q.code.filter(|c| !c.is_empty()) else {
        warn!("OAuth callback without an authorization code");
        return error_redirect("invalid_request");
    };

    if let Err(e) = verify_oauth_state(&state, q.state.as_deref()) {
        warn!("Rejecting OAuth callback: {e}");
        return error_redirect("invalid_state");
    }

    let tokens = match state.provider.exchange_code(&code).await {
        Ok(tokens) => tokens,
        Err(e) => {
            error!("Token exchange error: {e}");
            return error_redirect("token_exchange_failed");
        }
    };

    // A fresh login replaces whatever this browser held before.
    if let Some((old_id, _)) = current_session(&state, &headers) {
        state.sessions.destroy(&old_id);
    }

    let session_id = state
        .sessions
        .create(tokens.access_token, tokens.refresh_token);
    let signed = match state.signer.sign(&session_id) {
        Ok(signed) => signed,
        Err(e) => {
            error!("Failed to sign session cookie: {e}");
            state.sessions.destroy(&session_id);
            return error_redirect("server_error");
        }
    };

    info!("OAuth callback complete; session established");
    let set_cookie = cookie::issue(&signed, state.config.cookie_secure, state.config.session_ttl);
    (cookie::set_header(set_cookie), home_with("authenticated=true")).into_response()
}

// =============================================================================
// Session Endpoints
// =============================================================================

/// GET /api/auth/status
async fn auth_status(State(state): State<SharedState>, headers: HeaderMap) -> Json<Value> {
    let has_token = current_session(&state, &headers).is_some();

    Json(json!({
        "authenticated": has_token,
        "hasToken": has_token,
    }))
}

/// POST /api/auth/logout
async fn auth_logout(State(state): State<SharedState>, headers: HeaderMap) -> impl IntoResponse {
    if let Some((id, _)) = current_session(&state, &headers) {
        state.sessions.destroy(&id);
        info!("Session logged out");
    }

    (
        cookie::set_header(cookie::clear(state.config.cookie_secure)),
        Json(json!({ "success": true })),
    )
}

// =============================================================================
// Vehicle Endpoints
// =============================================================================

/// Decode a JSON or form-encoded vehicle body.
///
/// An unreadable body is reported the same way as missing fields.
async fn read_vehicle_body(req: Request) -> CreateVehicleBody {
    let is_form = req
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|ct| ct.starts_with("application/x-www-form-urlencoded"));

    let parsed = if is_form {
        Form::<CreateVehicleBody>::from_request(req, &())
            .await
            .map(|Form(body)| body)
            .map_err(|rejection| rejection.body_text())
    } else {
        Json::<CreateVehicleBody>::from_request(req, &())
            .await
            .map(|Json(body)| body)
            .map_err(|rejection| rejection.body_text())
    };

    parsed.unwrap_or_else(|reason| {
        debug!("Unreadable vehicle body: {reason}");
        CreateVehicleBody::default()
    })
}

/// POST /api/vehicles — Create a vehicle through the provider's GraphQL API.
async fn vehicle_create(State(state): State<SharedState>, req: Request) -> Response {
    let headers = req.headers().clone();
    let (session_id, session) = match require_session(&state, &headers) {
        Ok(found) => found,
        Err(e) => {
            info!("Vehicle request without an access token in session");
            return e.into_response();
        }
    };

    let input = match read_vehicle_body(req).await.into_input() {
        Ok(input) => input,
        Err(e) => return e.into_response(),
    };

    info!(
        "Creating vehicle {:?} ({} {} {})",
        input.name, input.year, input.make, input.model
    );
    token::log_expiry(&session.access_token);

    match vehicles::create_vehicle(&state.graphql, &session.access_token, &input).await {
        Ok(vehicle) => Json(json!({ "success": true, "vehicle": vehicle })).into_response(),
        Err(e) if e.needs_reauth() => {
            warn!("Provider rejected the session token; clearing session");
            state.sessions.destroy(&session_id);
            (cookie::set_header(cookie::clear(state.config.cookie_secure)), e).into_response()
        }
        Err(e) => {
            error!("Vehicle creation error: {e}");
            e.into_response()
        }
    }
}
