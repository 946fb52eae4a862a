//! Route guard for navigable page requests.
//!
//! Redirects based on path classification and access-token cookie presence.
//! Presence only: an expired-but-present token still passes the guard, and
//! actual validity is enforced when an API call hits the session endpoints.

use axum::{
    extract::Request,
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};

use crate::cookies::{ACCESS_COOKIE_NAME, get_cookie};

/// Paths that require authentication.
const PROTECTED_ROUTES: &[&str] = &["/protected"];

/// Paths that authenticated users should not see.
const AUTH_ROUTES: &[&str] = &["/login"];

/// Prefixes the guard never touches: API routes and static assets.
const EXCLUDED_PREFIXES: &[&str] = &["/api", "/static", "/favicon.ico"];

/// Outcome of classifying one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardDecision {
    PassThrough,
    /// Redirect to the login page, carrying the original location so the
    /// user can be sent back after logging in.
    RedirectToLogin(String),
    RedirectHome,
}

/// Pure classification of `(path + query, token presence)`.
pub fn guard_decision(path: &str, query: Option<&str>, authenticated: bool) -> GuardDecision {
    if EXCLUDED_PREFIXES.iter().any(|p| path.starts_with(p)) {
        return GuardDecision::PassThrough;
    }

    let is_protected = PROTECTED_ROUTES.iter().any(|r| path.starts_with(r));
    let is_auth_route = AUTH_ROUTES.iter().any(|r| path.starts_with(r));

    if is_protected && !authenticated {
        let original = match query {
            Some(q) => format!("{}?{}", path, q),
            None => path.to_string(),
        };
        let encoded: String = url::form_urlencoded::byte_serialize(original.as_bytes()).collect();
        return GuardDecision::RedirectToLogin(format!("/login?redirectUrl={}", encoded));
    }

    if is_auth_route && authenticated {
        return GuardDecision::RedirectHome;
    }

    GuardDecision::PassThrough
}

/// Axum middleware applying [`guard_decision`] to every page request.
pub async fn route_guard(request: Request, next: Next) -> Response {
    let authenticated = get_cookie(request.headers(), ACCESS_COOKIE_NAME).is_some();
    let decision = guard_decision(request.uri().path(), request.uri().query(), authenticated);

    match decision {
        GuardDecision::PassThrough => next.run(request).await,
        GuardDecision::RedirectToLogin(location) => {
            Redirect::temporary(&location).into_response()
        }
        GuardDecision::RedirectHome => Redirect::temporary("/").into_response(),
    }
}
