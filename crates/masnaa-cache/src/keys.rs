//! Cache key generation and invalidation helpers.

use serde::Serialize;
use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::store::AppCache;

/// Prefix for all cache keys to avoid collisions with other Redis users.
const CACHE_PREFIX: &str = "masnaa";

fn build_key(parts: &[&str]) -> String {
    format!("{}:{}", CACHE_PREFIX, parts.join(":"))
}

pub mod suppliers {
    use super::*;

    pub fn by_id(supplier_id: Uuid) -> String {
        build_key(&["suppliers", "id", &supplier_id.to_string()])
    }

    pub fn list(filters_hash: &str) -> String {
        build_key(&["suppliers", "list", filters_hash])
    }

    /// Covers every supplier key.
    pub fn prefix() -> String {
        build_key(&["suppliers", ""])
    }
}

pub mod purchase_orders {
    use super::*;

    pub fn list(filters_hash: &str) -> String {
        build_key(&["purchase_orders", "list", filters_hash])
    }

    pub fn prefix() -> String {
        build_key(&["purchase_orders", ""])
    }
}

/// Stable short digest of filter parameters.
///
/// Keys are shared between instances through Redis, so the digest is taken over the
/// JSON encoding rather than a process-local hasher.
pub fn hash_filters<T: Serialize>(filters: &T) -> String {
    let encoded = serde_json::to_vec(filters).unwrap_or_default();
    let digest = Sha256::digest(&encoded);
    hex::encode(&digest[..12])
}

/// Invalidation after mutations. Advisory: failures are logged by [`AppCache`].
pub mod invalidate {
    use super::*;

    /// Supplier names appear in purchase-order lists, so both are dropped.
    pub async fn supplier(cache: &AppCache) {
        cache.invalidate_prefix(&suppliers::prefix()).await;
        cache.invalidate_prefix(&purchase_orders::prefix()).await;
    }

    pub async fn purchase_orders(cache: &AppCache) {
        cache.invalidate_prefix(&purchase_orders::prefix()).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_key_generation() {
        let id = Uuid::nil();
        let key = suppliers::by_id(id);
        assert!(key.starts_with("masnaa:suppliers:"));
        assert!(key.contains(&id.to_string()));
        assert!(key.starts_with(&suppliers::prefix()));
        assert!(purchase_orders::list("abc").starts_with(&purchase_orders::prefix()));
    }

    #[test]
    fn test_hash_filters() {
        let a = hash_filters(&("steel", 20, true));
        assert_eq!(a, hash_filters(&("steel", 20, true)));
        assert_ne!(a, hash_filters(&("steel", 20, false)));
        assert_eq!(a.len(), 24);
    }

    #[tokio::test]
    async fn test_supplier_invalidation_drops_order_lists() {
        let cache = AppCache::local(Duration::from_secs(60));
        cache.set(&suppliers::list("h"), &1).await;
        cache.set(&purchase_orders::list("h"), &2).await;

        invalidate::supplier(&cache).await;

        assert_eq!(cache.get::<i32>(&suppliers::list("h")).await, None);
        assert_eq!(cache.get::<i32>(&purchase_orders::list("h")).await, None);
    }
}
