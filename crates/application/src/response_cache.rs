//! Process-local TTL cache for Holmes responses.
//!
//! Values are stored as opaque JSON and decoded on read. Expiry is lazy: an
//! entry older than its TTL is refetched on the next read and otherwise left
//! in place, so a failed refetch never destroys the last good value.

mod key;
mod policy;


use std::collections::HashMap;
use std::future::Future;
use std::time::Duration;

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tokio::sync::RwLock;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use easyholmes_core::AppResult;

pub use key::{CacheCategory, CacheKey, CacheScope};
pub use policy::CacheTtlPolicy;

#[derive(Debug, Clone)]
struct CacheEntry {
    value: Value,
    stored_at: Instant,
}

/// Introspection snapshot of the cache.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    /// Number of stored entries, fresh or stale.
    pub size: usize,
    /// String form of every stored key, sorted.
    pub keys: Vec<String>,
}

/// In-memory response cache keyed by [`CacheKey`].
#[derive(Default)]
pub struct ResponseCache {
    entries: RwLock<HashMap<CacheKey, CacheEntry>>,
}

impl ResponseCache {
    /// Creates an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the cached value for `key` if it is younger than `ttl`,
    /// otherwise runs `fetch`, stores its result and returns it.
    ///
    /// When `fetch` fails the error is returned and the existing entry, stale
    /// or not, is left untouched.
    pub async fn get_or_fetch<T, F, Fut>(&self, key: CacheKey, ttl: Duration, fetch: F) -> AppResult<T>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = AppResult<T>>,
    {
        if let Some(value) = self.fresh_value(&key, ttl).await {
            match serde_json::from_value::<T>(value) {
                Ok(decoded) => {
                    debug!(cache_key = %key, "cache hit");
                    return Ok(decoded);
                }
                Err(error) => {
                    warn!(cache_key = %key, %error, "cached value has an unexpected shape, refetching");
                }
            }
        } else {
            debug!(cache_key = %key, "cache miss");
        }

        let fetched = fetch().await?;

        match serde_json::to_value(&fetched) {
            Ok(value) => {
                self.entries.write().await.insert(
                    key,
                    CacheEntry {
                        value,
                        stored_at: Instant::now(),
                    },
                );
            }
            Err(error) => {
                warn!(cache_key = %key, %error, "response could not be encoded, not caching");
            }
        }

        Ok(fetched)
    }

    async fn fresh_value(&self, key: &CacheKey, ttl: Duration) -> Option<Value> {
        let entries = self.entries.read().await;
        entries
            .get(key)
            .filter(|entry| entry.stored_at.elapsed() < ttl)
            .map(|entry| entry.value.clone())
    }

    /// Removes one entry. Returns whether it was present.
    pub async fn invalidate(&self, key: &CacheKey) -> bool {
        let removed = self.entries.write().await.remove(key).is_some();
        if removed {
            info!(cache_key = %key, "cache entry invalidated");
        }
        removed
    }

    /// Removes every entry inside `scope`. Returns how many were removed.
    pub async fn invalidate_scope(&self, scope: &CacheScope) -> usize {
        self.invalidate_where(|key| scope.matches(key), &scope.to_string())
            .await
    }

    /// Removes every entry whose string key starts with `prefix`.
    pub async fn invalidate_by_prefix(&self, prefix: &str) -> usize {
        self.invalidate_where(|key| key.to_string().starts_with(prefix), prefix)
            .await
    }

    async fn invalidate_where<P>(&self, predicate: P, label: &str) -> usize
    where
        P: Fn(&CacheKey) -> bool,
    {
        let mut entries = self.entries.write().await;
        let before = entries.len();
        entries.retain(|key, _| !predicate(key));
        let removed = before - entries.len();

        if removed > 0 {
            info!(scope = label, removed, "cache entries invalidated");
        }
        removed
    }

    /// Drops everything. Returns how many entries were removed.
    pub async fn clear(&self) -> usize {
        let mut entries = self.entries.write().await;
        let removed = entries.len();
        entries.clear();
        info!(removed, "cache cleared");
        removed
    }

    /// Returns the current size and keys.
    pub async fn stats(&self) -> CacheStats {
        let entries = self.entries.read().await;
        let mut keys: Vec<String> = entries.keys().map(ToString::to_string).collect();
        keys.sort();

        CacheStats {
            size: entries.len(),
            keys,
        }
    }
}
