//! Redis client with JSON-encoded values.

use std::time::Duration;

use redis::{AsyncCommands, Client, aio::ConnectionManager};
use tracing::{debug, instrument};

#[derive(Clone)]
pub struct RedisCache {
    conn: ConnectionManager,
}

impl std::fmt::Debug for RedisCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedisCache").finish_non_exhaustive()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Redis did not answer within {0:?}")]
    Timeout(Duration),
}

impl RedisCache {
    /// Connects, giving up after `timeout`.
    pub async fn connect(redis_url: &str, timeout: Duration) -> Result<Self, CacheError> {
        let client = Client::open(redis_url)?;
        let conn = tokio::time::timeout(timeout, ConnectionManager::new(client))
            .await
            .map_err(|_| CacheError::Timeout(timeout))??;

        Ok(Self { conn })
    }

    #[instrument(skip(self), fields(cache.operation = "GET"))]
    pub async fn get_raw(&self, key: &str) -> Result<Option<String>, CacheError> {
        let mut conn = self.conn.clone();
        let value = conn.get::<_, Option<String>>(key).await?;
        debug!(cache.key = %key, cache.hit = value.is_some(), "Redis GET");
        Ok(value)
    }

    #[instrument(skip(self, json), fields(cache.operation = "SETEX"))]
    pub async fn set_raw(&self, key: &str, json: String, ttl: Duration) -> Result<(), CacheError> {
        let mut conn = self.conn.clone();
        conn.set_ex::<_, _, ()>(key, json, ttl.as_secs().max(1))
            .await?;
        debug!(cache.key = %key, cache.ttl_secs = ttl.as_secs(), "Redis SETEX");
        Ok(())
    }

    #[instrument(skip(self), fields(cache.operation = "DEL"))]
    pub async fn invalidate(&self, key: &str) -> Result<(), CacheError> {
        let mut conn = self.conn.clone();
        conn.del::<_, ()>(key).await?;
        Ok(())
    }

    /// Deletes every key starting with `prefix`, walking the keyspace with `SCAN`.
    #[instrument(skip(self), fields(cache.operation = "SCAN_DEL"))]
    pub async fn invalidate_prefix(&self, prefix: &str) -> Result<u64, CacheError> {
        let mut conn = self.conn.clone();
        let pattern = format!("{prefix}*");
        let mut cursor: u64 = 0;
        let mut deleted: u64 = 0;

        loop {
            let (next_cursor, keys): (u64, Vec<String>) = redis::cmd("SCAN")
                .arg(cursor)
                .arg("MATCH")
                .arg(&pattern)
                .arg("COUNT")
                .arg(100)
                .query_async(&mut conn)
                .await?;

            if !keys.is_empty() {
                let count: u64 = conn.del(&keys).await?;
                deleted += count;
            }

            cursor = next_cursor;
            if cursor == 0 {
                break;
            }
        }

        debug!(cache.prefix = %prefix, cache.deleted = deleted, "Prefix invalidation complete");
        Ok(deleted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    #[ignore = "requires Redis"]
    async fn test_set_get_invalidate() {
        let cache = RedisCache::connect("redis://localhost:6379", Duration::from_secs(2))
            .await
            .unwrap();

        cache
            .set_raw("masnaa:test:key", "\"value\"".to_string(), Duration::from_secs(60))
            .await
            .unwrap();
        assert_eq!(
            cache.get_raw("masnaa:test:key").await.unwrap().as_deref(),
            Some("\"value\"")
        );

        cache.invalidate_prefix("masnaa:test:").await.unwrap();
        assert_eq!(cache.get_raw("masnaa:test:key").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_unreachable_redis_fails_fast() {
        let started = std::time::Instant::now();
        let result = RedisCache::connect("redis://127.0.0.1:1", Duration::from_millis(500)).await;
        assert!(result.is_err());
        assert!(started.elapsed() < Duration::from_secs(5));
    }
}
