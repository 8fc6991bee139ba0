//! HTTP handlers.
//!
//! Sign-up outcomes are never returned here. A request is only enqueued;
//! its result shows up in `GET /auth` once the store has applied the
//! emitted events.

use crate::state::AppState;
use authflow_core::events::{AuthError, Identity};
use authflow_core::store::AuthState;
use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use serde::{Deserialize, Serialize};

/// Credentials accepted by both `/sign-up` and `/sign-in`.
#[derive(Deserialize)]
pub struct CredentialsBody {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct SignUpResponse {
    pub accepted: bool,
}

/// Enqueue a sign-up request (`POST /sign-up`).
///
/// Answers 503 once the sign-up processor no longer takes requests. That
/// is normally the hard limit, but it also happens if the processor
/// stopped because the event store went away.
pub async fn sign_up(
    State(state): State<AppState>,
    Json(body): Json<CredentialsBody>,
) -> impl IntoResponse {
    let accepted = state.sign_up.submit(body.email, body.password).await;
    let status = if accepted {
        StatusCode::ACCEPTED
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    (status, Json(SignUpResponse { accepted }))
}

/// Sign in to an existing account at the provider (`POST /sign-in`).
///
/// The provider pushes the new identity to the auth sync processor, so
/// `GET /auth` reflects it once the store catches up.
pub async fn sign_in(
    State(state): State<AppState>,
    Json(body): Json<CredentialsBody>,
) -> Result<Json<Identity>, (StatusCode, Json<AuthError>)> {
    state
        .provider
        .sign_in(&body.email, &body.password)
        .map(Json)
        .map_err(|e| (StatusCode::UNAUTHORIZED, Json(e)))
}

/// Sign the current user out at the provider (`POST /sign-out`).
pub async fn sign_out(State(state): State<AppState>) -> StatusCode {
    state.provider.sign_out();
    StatusCode::NO_CONTENT
}

/// Current auth state (`GET /auth`).
pub async fn auth_state(State(state): State<AppState>) -> Json<AuthState> {
    Json(state.store.snapshot().await)
}
