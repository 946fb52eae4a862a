//! JWT token generation and validation.
//!
//! Dual-token system with independent signing keys:
//! - Access tokens: short-lived (15 minutes), stateless
//! - Refresh tokens: long-lived (7 days), tracked in the revocation registry
//!
//! The two token kinds are signed with separate secrets so a leaked access
//! token can never be replayed against the refresh endpoint.

use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};

/// Access token duration: 15 minutes
pub const ACCESS_TOKEN_TTL_SECS: u64 = 15 * 60;

/// Refresh token duration: 7 days
pub const REFRESH_TOKEN_TTL_SECS: u64 = 7 * 24 * 60 * 60;

/// Identity claims embedded in both token kinds. Immutable once issued.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenPayload {
    pub id: String,
    pub email: String,
    pub name: String,
}

/// Full JWT claims: identity payload plus timestamps.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct Claims {
    #[serde(flatten)]
    payload: TokenPayload,
    /// Issued at (Unix timestamp)
    iat: u64,
    /// Expiration time (Unix timestamp)
    exp: u64,
}

/// Signing configuration for both token kinds.
#[derive(Clone)]
pub struct JwtConfig {
    access_encoding: EncodingKey,
    access_decoding: DecodingKey,
    refresh_encoding: EncodingKey,
    refresh_decoding: DecodingKey,
}

impl JwtConfig {
    /// Create a JWT configuration from the two signing secrets.
    pub fn new(access_secret: &[u8], refresh_secret: &[u8]) -> Self {
        Self {
            access_encoding: EncodingKey::from_secret(access_secret),
            access_decoding: DecodingKey::from_secret(access_secret),
            refresh_encoding: EncodingKey::from_secret(refresh_secret),
            refresh_decoding: DecodingKey::from_secret(refresh_secret),
        }
    }

    /// Issue a short-lived access token for the given identity.
    pub fn issue_access(&self, payload: &TokenPayload) -> Result<String, JwtError> {
        self.issue(payload, ACCESS_TOKEN_TTL_SECS, &self.access_encoding)
    }

    /// Issue a long-lived refresh token for the given identity.
    ///
    /// The caller is responsible for registering the returned token in the
    /// revocation registry; issuance alone does not make it redeemable.
    pub fn issue_refresh(&self, payload: &TokenPayload) -> Result<String, JwtError> {
        self.issue(payload, REFRESH_TOKEN_TTL_SECS, &self.refresh_encoding)
    }

    fn issue(
        &self,
        payload: &TokenPayload,
        ttl_secs: u64,
        key: &EncodingKey,
    ) -> Result<String, JwtError> {
        let now = unix_now()?;
        let claims = Claims {
            payload: payload.clone(),
            iat: now,
            exp: now + ttl_secs,
        };

        jsonwebtoken::encode(&Header::default(), &claims, key).map_err(JwtError::Encoding)
    }

    /// Validate an access token and return its identity payload.
    /// Fails on bad signature, wrong signing key, or expiry.
    pub fn verify_access(&self, token: &str) -> Result<TokenPayload, JwtError> {
        verify(token, &self.access_decoding)
    }

    /// Validate a refresh token and return its identity payload.
    pub fn verify_refresh(&self, token: &str) -> Result<TokenPayload, JwtError> {
        verify(token, &self.refresh_decoding)
    }
}

fn verify(token: &str, key: &DecodingKey) -> Result<TokenPayload, JwtError> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.leeway = 0;

    let token_data =
        jsonwebtoken::decode::<Claims>(token, key, &validation).map_err(JwtError::Decoding)?;

    Ok(token_data.claims.payload)
}

fn unix_now() -> Result<u64, JwtError> {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .map_err(|_| JwtError::Time)
}

/// Errors that can occur during JWT operations.
#[derive(Debug, thiserror::Error)]
pub enum JwtError {
    #[error("Failed to encode token: {0}")]
    Encoding(jsonwebtoken::errors::Error),
    #[error("Failed to decode token: {0}")]
    Decoding(jsonwebtoken::errors::Error),
    #[error("System time error")]
    Time,
}
