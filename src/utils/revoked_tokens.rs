use moka::future::Cache;
use std::time::Duration;

/// Revoked ids kept at once. Beyond this the cache evicts, and an evicted
/// token is accepted again until its own `exp`; an accepted bound for a
/// single-instance service.
const MAX_REVOKED: u64 = 100_000;

/// Token ids (`jti`) that were logged out or rotated away.
///
/// Entries expire after the longest token lifetime; by then the token is
/// rejected for its `exp` anyway.
#[derive(Clone)]
pub struct RevokedTokens {
    cache: Cache<String, ()>,
}

impl RevokedTokens {
    pub fn new(ttl_secs: u64) -> Self {
        Self {
            cache: Cache::builder()
                .max_capacity(MAX_REVOKED)
                .time_to_live(Duration::from_secs(ttl_secs.max(1)))
                .build(),
        }
    }

    pub async fn revoke(&self, jti: &str) {
        self.cache.insert(jti.to_string(), ()).await;
    }

    /// Revokes several ids concurrently.
    pub async fn revoke_all(&self, jtis: &[String]) {
        let inserts: Vec<_> = jtis
            .iter()
            .map(|jti| self.cache.insert(jti.clone(), ()))
            .collect();

        futures::future::join_all(inserts).await;
    }

    /// Revokes `jti` and reports whether this call was the one that did it.
    /// Concurrent callers racing on one id get `true` exactly once.
    pub async fn claim(&self, jti: &str) -> bool {
        self.cache
            .entry(jti.to_string())
            .or_insert(())
            .await
            .is_fresh()
    }

    pub async fn is_revoked(&self, jti: &str) -> bool {
        self.cache.get(jti).await.is_some()
    }
}
