mod error;
mod session;

use axum::Router;
use std::sync::Arc;

use crate::jwt::JwtConfig;
use crate::registry::RefreshTokenRegistry;

/// Create the API router. Nested at `/api` by the caller.
pub fn create_api_router(
    jwt: Arc<JwtConfig>,
    registry: RefreshTokenRegistry,
    secure_cookies: bool,
) -> Router {
    let session_state = session::SessionState {
        jwt,
        registry,
        secure_cookies,
    };

    session::router(session_state)
}
