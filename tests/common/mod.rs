#![allow(dead_code)]

use axum::body::Body;
use jsonwebtoken::{EncodingKey, Header};
use rookery::{ServerConfig, create_app, jwt::JwtConfig, registry::RefreshTokenRegistry};
use std::time::{SystemTime, UNIX_EPOCH};

pub const ACCESS_SECRET: &[u8] = b"test-access-secret-for-testing-1";
pub const REFRESH_SECRET: &[u8] = b"test-refresh-secret-for-testing";

pub const TEST_EMAIL: &str = "test@test.com";
pub const TEST_PASSWORD: &str = "password123";

/// Create a test app and return (app, registry, jwt_config).
/// The registry handle lets tests revoke tokens out of band.
pub fn create_test_app() -> (axum::Router, RefreshTokenRegistry, JwtConfig) {
    let registry = RefreshTokenRegistry::new();
    let jwt = JwtConfig::new(ACCESS_SECRET, REFRESH_SECRET);
    let config = ServerConfig {
        access_secret: ACCESS_SECRET.to_vec(),
        refresh_secret: REFRESH_SECRET.to_vec(),
        secure_cookies: false,
        registry: registry.clone(),
    };
    (create_app(&config), registry, jwt)
}

/// Server config for tests that start a real listener.
pub fn test_server_config() -> (ServerConfig, RefreshTokenRegistry) {
    let registry = RefreshTokenRegistry::new();
    let config = ServerConfig {
        access_secret: ACCESS_SECRET.to_vec(),
        refresh_secret: REFRESH_SECRET.to_vec(),
        secure_cookies: false,
        registry: registry.clone(),
    };
    (config, registry)
}

#[derive(serde::Serialize)]
struct TestClaims {
    id: String,
    email: String,
    name: String,
    iat: u64,
    exp: u64,
}

/// Sign a token for the test user with an arbitrary expiry offset.
/// Negative offsets produce already-expired tokens.
pub fn make_token(secret: &[u8], exp_offset_secs: i64) -> String {
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_secs() as i64;

    let claims = TestClaims {
        id: "user-1".to_string(),
        email: TEST_EMAIL.to_string(),
        name: "Test User".to_string(),
        iat: (now - 100) as u64,
        exp: (now + exp_offset_secs) as u64,
    };

    jsonwebtoken::encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret),
    )
    .unwrap()
}

pub fn expired_access_token() -> String {
    make_token(ACCESS_SECRET, -60)
}

pub fn expired_refresh_token() -> String {
    make_token(REFRESH_SECRET, -60)
}

pub fn login_body() -> String {
    format!(
        r#"{{"email": "{}", "password": "{}"}}"#,
        TEST_EMAIL, TEST_PASSWORD
    )
}

/// Extract Set-Cookie headers from a response.
pub fn extract_set_cookies(response: &axum::http::Response<Body>) -> Vec<String> {
    response
        .headers()
        .get_all("set-cookie")
        .iter()
        .filter_map(|v| v.to_str().ok())
        .map(|s| s.to_string())
        .collect()
}

/// Pull the value of a named cookie out of Set-Cookie headers.
pub fn cookie_value(cookies: &[String], name: &str) -> Option<String> {
    cookies.iter().find_map(|c| {
        let (key, rest) = c.split_once('=')?;
        if key == name {
            Some(rest.split(';').next().unwrap_or("").to_string())
        } else {
            None
        }
    })
}

/// Check if cookies contain a token being cleared (Max-Age=0).
pub fn has_cleared_cookie(cookies: &[String], cookie_name: &str) -> bool {
    cookies
        .iter()
        .any(|c| c.starts_with(&format!("{}=", cookie_name)) && c.contains("Max-Age=0"))
}

pub async fn body_json(response: axum::http::Response<Body>) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}
