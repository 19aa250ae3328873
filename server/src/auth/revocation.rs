use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

/// Where revoked session tokens are remembered until they would have
/// expired anyway.
///
/// Keys are token ids (`jti`), never raw token strings. The in-process
/// implementation is only correct for a single instance; a horizontally
/// scaled deployment needs an implementation backed by shared storage so a
/// logout on one instance is seen by all of them.
#[async_trait]
pub trait RevocationStore: Send + Sync {
    /// Record `key` as revoked. `expires_at` is the token's own expiry
    /// (Unix seconds); after it the entry may be forgotten.
    async fn revoke(&self, key: &str, expires_at: i64);

    /// Whether `key` is revoked as of `now`.
    async fn is_revoked(&self, key: &str, now: i64) -> bool;

    /// Forget entries whose token has expired. Returns how many were removed.
    async fn sweep(&self, now: i64) -> usize;

    async fn len(&self) -> usize;
}

/// Process-local revocation set. Contents are lost on restart, so a token
/// revoked shortly before a restart becomes usable again until its `exp`.
#[derive(Debug, Default)]
pub struct InMemoryRevocationStore {
    entries: RwLock<HashMap<String, i64>>,
}

impl InMemoryRevocationStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RevocationStore for InMemoryRevocationStore {
    async fn revoke(&self, key: &str, expires_at: i64) {
        let mut entries = self.entries.write().await;
        let slot = entries.entry(key.to_string()).or_insert(expires_at);
        *slot = (*slot).max(expires_at);
    }

    async fn is_revoked(&self, key: &str, now: i64) -> bool {
        // Entries past their expiry are treated as absent even before a
        // sweep removes them.
        self.entries
            .read()
            .await
            .get(key)
            .is_some_and(|&expires_at| expires_at > now)
    }

    async fn sweep(&self, now: i64) -> usize {
        let mut entries = self.entries.write().await;
        let before = entries.len();
        entries.retain(|_, expires_at| *expires_at > now);
        before - entries.len()
    }

    async fn len(&self) -> usize {
        self.entries.read().await.len()
    }
}
