//! Session API endpoints.
//!
//! - POST `/login` - Issue both tokens on credential match
//! - POST `/logout` - Revoke the refresh token and clear cookies
//! - POST `/refresh` - Exchange the refresh token for a new access token
//! - GET `/me` - Return the identity from the access token

use axum::{
    Json, Router,
    extract::State,
    http::{HeaderMap, StatusCode, header::SET_COOKIE},
    response::{AppendHeaders, IntoResponse},
    routing::{get, post},
};
use serde::Serialize;
use std::sync::Arc;

use super::error::ApiError;
use crate::cookies::{
    ACCESS_COOKIE_NAME, REFRESH_COOKIE_NAME, clear_cookie, get_cookie, set_cookie,
};
use crate::jwt::{ACCESS_TOKEN_TTL_SECS, JwtConfig, REFRESH_TOKEN_TTL_SECS, TokenPayload};
use crate::registry::RefreshTokenRegistry;

/// The single known identity. There is no user store; credentials are
/// compared in plaintext memory.
struct TestUser {
    id: &'static str,
    email: &'static str,
    password: &'static str,
    name: &'static str,
}

const TEST_USER: TestUser = TestUser {
    id: "user-1",
    email: "test@test.com",
    password: "password123",
    name: "Test User",
};

#[derive(Clone)]
pub struct SessionState {
    pub jwt: Arc<JwtConfig>,
    pub registry: RefreshTokenRegistry,
    pub secure_cookies: bool,
}

pub fn router(state: SessionState) -> Router {
    Router::new()
        .route("/login", post(login))
        .route("/logout", post(logout))
        .route("/refresh", post(refresh))
        .route("/me", get(me))
        .with_state(state)
}

#[derive(Serialize)]
struct MessageResponse {
    message: &'static str,
}

#[derive(Serialize)]
struct SessionResponse {
    message: &'static str,
    user: TokenPayload,
}

/// Login with email and password. On a match, issues both tokens, registers
/// the refresh token as active, and sets both cookies.
///
/// The failure message never reveals which field was wrong.
async fn login(
    State(state): State<SessionState>,
    Json(body): Json<serde_json::Value>,
) -> Result<impl IntoResponse, ApiError> {
    let email = body.get("email").and_then(|v| v.as_str()).unwrap_or("");
    let password = body.get("password").and_then(|v| v.as_str()).unwrap_or("");

    if email.is_empty() || password.is_empty() {
        return Err(ApiError::bad_request("Email and password are required"));
    }

    if email != TEST_USER.email || password != TEST_USER.password {
        return Err(ApiError::unauthorized("Invalid email or password"));
    }

    let payload = TokenPayload {
        id: TEST_USER.id.to_string(),
        email: TEST_USER.email.to_string(),
        name: TEST_USER.name.to_string(),
    };

    let access_token = state
        .jwt
        .issue_access(&payload)
        .map_err(|e| ApiError::internal("Failed to issue access token", e))?;
    let refresh_token = state
        .jwt
        .issue_refresh(&payload)
        .map_err(|e| ApiError::internal("Failed to issue refresh token", e))?;

    state.registry.register(&refresh_token);

    let access_cookie = set_cookie(
        ACCESS_COOKIE_NAME,
        &access_token,
        ACCESS_TOKEN_TTL_SECS,
        state.secure_cookies,
    );
    let refresh_cookie = set_cookie(
        REFRESH_COOKIE_NAME,
        &refresh_token,
        REFRESH_TOKEN_TTL_SECS,
        state.secure_cookies,
    );

    Ok((
        StatusCode::OK,
        AppendHeaders([(SET_COOKIE, access_cookie), (SET_COOKIE, refresh_cookie)]),
        Json(SessionResponse {
            message: "Login successful",
            user: payload,
        }),
    ))
}

/// Logout - revoke the refresh token and clear both cookies.
/// Always succeeds, even with no session or an unknown token.
async fn logout(State(state): State<SessionState>, headers: HeaderMap) -> impl IntoResponse {
    if let Some(refresh_token) = get_cookie(&headers, REFRESH_COOKIE_NAME) {
        state.registry.revoke(refresh_token);
    }

    let clear_access = clear_cookie(ACCESS_COOKIE_NAME, state.secure_cookies);
    let clear_refresh = clear_cookie(REFRESH_COOKIE_NAME, state.secure_cookies);

    (
        StatusCode::OK,
        AppendHeaders([(SET_COOKIE, clear_access), (SET_COOKIE, clear_refresh)]),
        Json(MessageResponse {
            message: "Logout successful",
        }),
    )
}

/// Mint a new access token from a valid, active refresh token. The refresh
/// token itself is not rotated.
///
/// Revoked and expired tokens both answer 401; the branches differ only in
/// message text. The registry check runs before signature verification.
async fn refresh(
    State(state): State<SessionState>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, ApiError> {
    let refresh_token = get_cookie(&headers, REFRESH_COOKIE_NAME)
        .ok_or_else(|| ApiError::unauthorized("Refresh token not found"))?;

    if !state.registry.is_active(refresh_token) {
        return Err(ApiError::unauthorized("Refresh token has been revoked"));
    }

    let payload = state
        .jwt
        .verify_refresh(refresh_token)
        .map_err(|_| ApiError::unauthorized("Invalid or expired refresh token"))?;

    let access_token = state
        .jwt
        .issue_access(&payload)
        .map_err(|e| ApiError::internal("Failed to issue access token", e))?;

    let access_cookie = set_cookie(
        ACCESS_COOKIE_NAME,
        &access_token,
        ACCESS_TOKEN_TTL_SECS,
        state.secure_cookies,
    );

    Ok((
        StatusCode::OK,
        [(SET_COOKIE, access_cookie)],
        Json(SessionResponse {
            message: "Access token refreshed",
            user: payload,
        }),
    ))
}

/// Return the identity claims from the access token.
async fn me(
    State(state): State<SessionState>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, ApiError> {
    let access_token = get_cookie(&headers, ACCESS_COOKIE_NAME)
        .ok_or_else(|| ApiError::unauthorized("Access token not found"))?;

    let payload = state
        .jwt
        .verify_access(access_token)
        .map_err(|_| ApiError::unauthorized("Invalid or expired access token"))?;

    Ok((
        StatusCode::OK,
        Json(SessionResponse {
            message: "User information",
            user: payload,
        }),
    ))
}
