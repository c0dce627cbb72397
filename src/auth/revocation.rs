use std::collections::HashMap;
use std::sync::RwLock;

/// Capability the token service uses to record and check explicitly
/// invalidated tokens. Implementations must be safe to share across request
/// handlers.
pub trait RevocationStore: Send + Sync {
    /// Marks a jti as revoked. `expires_at` is the token's own expiry, kept
    /// so the entry can be dropped once the token would have died anyway.
    fn revoke(&self, jti: &str, expires_at: i64);

    fn is_revoked(&self, jti: &str) -> bool;

    /// Removes entries whose token expired before `now`.
    fn prune(&self, now: i64);
}

/// Process-wide in-memory revocation set. Cleared on restart; tokens revoked
/// in a previous process lifetime become valid again until they expire.
#[derive(Default)]
pub struct InMemoryRevocations {
    // jti -> token expiry
    entries: RwLock<HashMap<String, i64>>,
}

impl InMemoryRevocations {
    pub fn new() -> Self {
        Self::default()
    }
}

impl RevocationStore for InMemoryRevocations {
    fn revoke(&self, jti: &str, expires_at: i64) {
        let mut entries = self.entries.write().unwrap_or_else(|e| e.into_inner());
        entries.insert(jti.to_string(), expires_at);
    }

    fn is_revoked(&self, jti: &str) -> bool {
        let entries = self.entries.read().unwrap_or_else(|e| e.into_inner());
        entries.contains_key(jti)
    }

    fn prune(&self, now: i64) {
        let mut entries = self.entries.write().unwrap_or_else(|e| e.into_inner());
        entries.retain(|_, expires_at| *expires_at > now);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn revoke_and_check() {
        let store = InMemoryRevocations::new();
        assert!(!store.is_revoked("a"));

        store.revoke("a", 100);
        assert!(store.is_revoked("a"));
        assert!(!store.is_revoked("b"));
    }

    #[test]
    fn prune_drops_only_expired_entries() {
        let store = InMemoryRevocations::new();
        store.revoke("old", 100);
        store.revoke("live", 200);

        store.prune(150);
        assert!(!store.is_revoked("old"));
        assert!(store.is_revoked("live"));
    }
}
