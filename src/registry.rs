//! Revocation registry for refresh tokens.
//!
//! A refresh token is redeemable only while it is present here. Signed
//! tokens are otherwise stateless, so this set is what makes logout
//! effective before natural expiry.
//!
//! Expired-but-unrevoked entries are never evicted; the set is bounded by
//! the refresh token TTL and the process lifetime.

use std::collections::HashSet;
use std::sync::{Arc, Mutex};

/// Process-wide set of currently-valid refresh tokens.
///
/// Cloneable handle; clones share the same underlying set. Constructed once
/// at startup and injected into the server state.
#[derive(Clone, Default)]
pub struct RefreshTokenRegistry {
    tokens: Arc<Mutex<HashSet<String>>>,
}

impl RefreshTokenRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark a freshly issued refresh token as active.
    pub fn register(&self, token: &str) {
        self.tokens
            .lock()
            .expect("registry lock poisoned")
            .insert(token.to_string());
    }

    /// Remove a refresh token. Revoking an absent or unknown token is a
    /// no-op, which makes logout idempotent.
    pub fn revoke(&self, token: &str) {
        self.tokens
            .lock()
            .expect("registry lock poisoned")
            .remove(token);
    }

    /// Whether the token was issued here and has not been revoked.
    pub fn is_active(&self, token: &str) -> bool {
        self.tokens
            .lock()
            .expect("registry lock poisoned")
            .contains(token)
    }
}
