//! Admin session endpoints.
//!
//! - POST /api/admin/login - Exchange credentials for a session token
//! - POST /api/admin/logout - Revoke the presented token
//! - GET /api/admin/check - Whether the request carries a valid token
//!
//! The token is returned in the body (for `Authorization: Bearer`) and set as
//! an `HttpOnly` cookie (for the browser).

use crate::api::catalog::Ack;
use crate::state::{AdminGate, AppState};
use axum::{
    Json,
    body::Bytes,
    extract::State,
    http::{HeaderMap, HeaderValue, header},
    response::{IntoResponse, Response},
};
use booking_auth::{ADMIN_COOKIE, AuthError};
use booking_web::{AppError, presented_token};
use serde::Serialize;
use serde_json::Value;

/// Body of a successful login.
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    /// Always `true`
    pub ok: bool,
    /// Authenticated username
    pub username: String,
    /// Session token
    pub token: String,
}

/// Body of `GET /api/admin/check`.
#[derive(Debug, Serialize)]
pub struct CheckResponse {
    /// Whether the token is valid
    pub authenticated: bool,
}

fn session_cookie(gate: &AdminGate, token: &str, max_age: i64) -> Result<HeaderValue, AppError> {
    let mut cookie =
        format!("{ADMIN_COOKIE}={token}; HttpOnly; SameSite=Lax; Path=/; Max-Age={max_age}");
    if gate.secure_cookie {
        cookie.push_str("; Secure");
    }
    HeaderValue::from_str(&cookie)
        .map_err(|e| AppError::internal("Failed to create session").with_source(e))
}

/// Log in with `{username, password}`.
///
/// # Errors
///
/// 400 when a field is missing, 401 when they do not match, 503 when no
/// admin account is configured.
pub async fn login(State(state): State<AppState>, body: Bytes) -> Result<Response, AppError> {
    let gate = &state.gate;
    let credentials = gate.credentials.as_ref().ok_or(AuthError::NotConfigured)?;

    let body: Value = serde_json::from_slice(&body).unwrap_or(Value::Null);
    let field = |name: &str| body.get(name).and_then(Value::as_str).unwrap_or_default();
    credentials.verify(field("username"), field("password"))?;

    let session = gate.tokens.issue(credentials.username()).await?;
    let cookie = session_cookie(gate, &session.token, gate.ttl.num_seconds())?;
    tracing::info!(username = %session.username, expires_at = %session.expires_at, "admin logged in");

    let mut response = Json(LoginResponse {
        ok: true,
        username: session.username,
        token: session.token,
    })
    .into_response();
    response.headers_mut().insert(header::SET_COOKIE, cookie);
    Ok(response)
}

/// Revoke the presented token and clear the cookie. Succeeds without a token.
///
/// # Errors
///
/// 500 when the registry cannot be updated.
pub async fn logout(State(state): State<AppState>, headers: HeaderMap) -> Result<Response, AppError> {
    if let Some(token) = presented_token(&headers) {
        state.gate.tokens.revoke(&token).await?;
        tracing::info!("admin logged out");
    }

    let cookie = session_cookie(&state.gate, "", 0)?;
    let mut response = Json(Ack::OK).into_response();
    response.headers_mut().insert(header::SET_COOKIE, cookie);
    Ok(response)
}

/// Report whether the request is authenticated. Never fails.
pub async fn check(State(state): State<AppState>, headers: HeaderMap) -> Json<CheckResponse> {
    let authenticated = match presented_token(&headers) {
        Some(token) => state.gate.tokens.validate(&token).await.is_ok(),
        None => false,
    };
    Json(CheckResponse { authenticated })
}
