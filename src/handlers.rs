//! HTTP route handlers for the OAuth callback server.
//!
//! This module contains the handler functions for `/auth`, `/callback`,
//! `/health` and `/status`, and the router that wires them to shared state.

use axum::{
    extract::{Query, State},
    http::{header, StatusCode},
    response::{Html, IntoResponse, Json, Response},
    routing::get,
    Router,
};
use log::{error, info};
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;

use crate::state::AppState;

/// Query parameters Twitter appends to the redirect URI.
#[derive(Debug, Deserialize)]
pub struct CallbackParams {
    pub code: Option<String>,
    pub state: Option<String>,
    pub error: Option<String>,
}

/// Builds the router with all routes bound to `state`.
pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/auth", get(handle_auth))
        .route("/callback", get(handle_callback))
        .route("/health", get(handle_health))
        .route("/status", get(handle_status))
        .with_state(state)
}

/// Handles GET requests to the `/auth` endpoint.
///
/// Starts a new OAuth 2.0 authorization, replacing any pending one, and
/// redirects the browser to the Twitter consent page with a `302 Found`.
pub async fn handle_auth(State(state): State<Arc<AppState>>) -> Response {
    match state.auth.begin_authorization().await {
        Ok(request) => {
            info!("Redirecting to Twitter consent page");
            (StatusCode::FOUND, [(header::LOCATION, request.url)]).into_response()
        }
        Err(e) => {
            error!("Failed to start authorization: {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, "Authentication failed").into_response()
        }
    }
}

/// Handles GET requests to the `/callback` endpoint.
///
/// Exchanges the authorization code for an access token.
///
/// # Returns
///
/// - `200` with a confirmation page when the exchange succeeds
/// - `500` with a plain error message otherwise
pub async fn handle_callback(
    State(state): State<Arc<AppState>>,
    Query(params): Query<CallbackParams>,
) -> Result<Html<&'static str>, (StatusCode, &'static str)> {
    if let Some(err) = params.error.as_deref() {
        error!("Auth Error: authorization denied ({})", err);
        return Err((StatusCode::INTERNAL_SERVER_ERROR, "Authentication failed"));
    }

    let Some(code) = params.code.as_deref().filter(|c| !c.is_empty()) else {
        error!("Auth Error: callback without code");
        return Err((StatusCode::INTERNAL_SERVER_ERROR, "Authentication failed"));
    };

    match state
        .auth
        .complete_callback(code, params.state.as_deref())
        .await
    {
        Ok(_) => {
            info!("Authentication successful");
            Ok(Html("Authentication successful! You can close this window."))
        }
        Err(e) => {
            error!("Auth Error: {}", e);
            Err((StatusCode::INTERNAL_SERVER_ERROR, "Authentication failed"))
        }
    }
}

/// Handles GET requests to the `/health` endpoint.
///
/// Always returns 200 once the process is up, authenticated or not.
pub async fn handle_health() -> &'static str {
    "Bot is running"
}

/// Handles GET requests to the `/status` endpoint.
///
/// # Example Response
///
/// ```json
/// {
///   "authenticated": true,
///   "mention_watermark": 1850000000000000000,
///   "recent_runs": [
///     { "job": "post", "result": "posted", "kind": "original", "tweet_id": "1", ... }
///   ]
/// }
/// ```
pub async fn handle_status(State(state): State<Arc<AppState>>) -> Json<Value> {
    Json(json!({
        "authenticated": state.auth.is_authenticated().await,
        "mention_watermark": state.poller.watermark(),
        "recent_runs": state.runs.snapshot(),
    }))
}
