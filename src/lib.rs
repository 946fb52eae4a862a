pub mod api;
pub mod cli;
pub mod client;
pub mod cookies;
pub mod guard;
pub mod jwt;
pub mod pages;
pub mod registry;

use api::create_api_router;
use axum::{Router, middleware, routing::get};
use jwt::JwtConfig;
use registry::RefreshTokenRegistry;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;

pub struct ServerConfig {
    /// Secret for signing access tokens
    pub access_secret: Vec<u8>,
    /// Secret for signing refresh tokens (independent key, never shared
    /// with access tokens)
    pub refresh_secret: Vec<u8>,
    /// Whether to set the Secure flag on cookies (true in production HTTPS)
    pub secure_cookies: bool,
    /// Revocation registry for refresh tokens (cloneable, shared handle)
    pub registry: RefreshTokenRegistry,
}

/// Create the application router with the given configuration.
pub fn create_app(config: &ServerConfig) -> Router {
    let jwt = Arc::new(JwtConfig::new(
        &config.access_secret,
        &config.refresh_secret,
    ));

    let api_router = create_api_router(jwt, config.registry.clone(), config.secure_cookies);

    // Page routes run through the route guard; API routes never do.
    let page_routes = Router::new()
        .route("/", get(pages::home))
        .route("/login", get(pages::login))
        .route("/protected", get(pages::protected))
        .layer(middleware::from_fn(guard::route_guard));

    Router::new().nest("/api", api_router).merge(page_routes)
}

/// Run the server on the given listener. This function blocks until the
/// server exits.
pub async fn run_server(config: ServerConfig, listener: TcpListener) -> Result<(), std::io::Error> {
    let app = create_app(&config);
    axum::serve(listener, app).await
}

/// Start the server on the given port in a background task. Use port 0 to
/// let the OS choose a random port. Returns the actual listening address.
/// Note: For production use, prefer `run_server` directly in main.
pub async fn start_server(
    config: ServerConfig,
    port: u16,
) -> (tokio::task::JoinHandle<()>, SocketAddr) {
    let addr = format!("127.0.0.1:{}", port);
    let listener = TcpListener::bind(&addr).await.expect("Failed to bind");
    let local_addr = listener.local_addr().expect("Failed to get local address");

    let handle = tokio::spawn(async move {
        run_server(config, listener).await.ok();
    });

    (handle, local_addr)
}
