//! In-process TTL cache used when Redis is not configured or not reachable.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::RwLock;

/// Entries beyond this count trigger a sweep of expired values on insert.
const SWEEP_THRESHOLD: usize = 1024;

#[derive(Debug)]
struct Entry {
    json: String,
    expires_at: Instant,
}

/// JSON strings keyed by cache key, shared across clones.
#[derive(Clone, Debug, Default)]
pub struct LocalCache {
    entries: Arc<RwLock<HashMap<String, Entry>>>,
}

impl LocalCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn get(&self, key: &str) -> Option<String> {
        let entries = self.entries.read().await;
        entries
            .get(key)
            .filter(|entry| entry.expires_at > Instant::now())
            .map(|entry| entry.json.clone())
    }

    pub async fn set(&self, key: &str, json: String, ttl: Duration) {
        let mut entries = self.entries.write().await;
        if entries.len() >= SWEEP_THRESHOLD {
            let now = Instant::now();
            entries.retain(|_, entry| entry.expires_at > now);
        }
        entries.insert(
            key.to_string(),
            Entry {
                json,
                expires_at: Instant::now() + ttl,
            },
        );
    }

    pub async fn invalidate(&self, key: &str) {
        self.entries.write().await.remove(key);
    }

    pub async fn invalidate_prefix(&self, prefix: &str) -> u64 {
        let mut entries = self.entries.write().await;
        let before = entries.len();
        entries.retain(|key, _| !key.starts_with(prefix));
        (before - entries.len()) as u64
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_set_and_get() {
        let cache = LocalCache::new();
        cache.set("a", "1".to_string(), Duration::from_secs(60)).await;
        assert_eq!(cache.get("a").await.as_deref(), Some("1"));
        assert_eq!(cache.get("b").await, None);
    }

    #[tokio::test]
    async fn test_expired_entries_are_misses() {
        let cache = LocalCache::new();
        cache.set("a", "1".to_string(), Duration::ZERO).await;
        assert_eq!(cache.get("a").await, None);
    }

    #[tokio::test]
    async fn test_invalidate_prefix() {
        let cache = LocalCache::new();
        let ttl = Duration::from_secs(60);
        cache.set("masnaa:suppliers:list:1", "[]".to_string(), ttl).await;
        cache.set("masnaa:suppliers:list:2", "[]".to_string(), ttl).await;
        cache.set("masnaa:purchase_orders:list:1", "[]".to_string(), ttl).await;

        let removed = cache.invalidate_prefix("masnaa:suppliers:").await;
        assert_eq!(removed, 2);
        assert_eq!(cache.len().await, 1);
    }

    #[tokio::test]
    async fn test_clones_share_entries() {
        let cache = LocalCache::new();
        let other = cache.clone();
        cache.set("k", "v".to_string(), Duration::from_secs(60)).await;
        assert_eq!(other.get("k").await.as_deref(), Some("v"));
        other.invalidate("k").await;
        assert_eq!(cache.get("k").await, None);
    }
}
