//! The application-facing cache.
//!
//! [`AppCache`] reads and writes Redis when it is connected and the in-process
//! [`LocalCache`] otherwise. Every failure is logged and swallowed: a cache problem
//! degrades to a miss, never to an error response.

use std::time::Duration;

use serde::{Serialize, de::DeserializeOwned};
use tracing::{debug, info, warn};

use crate::config::CacheConfig;
use crate::local::LocalCache;
use crate::redis::RedisCache;

#[derive(Clone, Debug)]
pub struct AppCache {
    redis: Option<RedisCache>,
    local: LocalCache,
    default_ttl: Duration,
}

impl AppCache {
    /// Connects to Redis when configured; falls back to the local cache otherwise.
    pub async fn connect(config: &CacheConfig) -> Self {
        let redis = match config.redis_url.as_deref() {
            Some(url) => match RedisCache::connect(url, config.connect_timeout).await {
                Ok(redis) => {
                    info!("Redis cache connected");
                    Some(redis)
                }
                Err(e) => {
                    warn!(error = %e, "Redis unavailable, using in-process cache");
                    None
                }
            },
            None => {
                info!("REDIS_URL not set, using in-process cache");
                None
            }
        };

        Self {
            redis,
            local: LocalCache::new(),
            default_ttl: config.default_ttl,
        }
    }

    pub fn local(default_ttl: Duration) -> Self {
        Self {
            redis: None,
            local: LocalCache::new(),
            default_ttl,
        }
    }

    pub fn is_distributed(&self) -> bool {
        self.redis.is_some()
    }

    pub async fn get<T>(&self, key: &str) -> Option<T>
    where
        T: DeserializeOwned,
    {
        let raw = match &self.redis {
            Some(redis) => match redis.get_raw(key).await {
                Ok(raw) => raw,
                Err(e) => {
                    warn!(cache.key = %key, error = %e, "Redis GET failed, trying local cache");
                    self.local.get(key).await
                }
            },
            None => self.local.get(key).await,
        }?;

        match serde_json::from_str(&raw) {
            Ok(value) => {
                debug!(cache.key = %key, "Cache hit");
                Some(value)
            }
            Err(e) => {
                warn!(cache.key = %key, error = %e, "Discarding undecodable cache entry");
                self.invalidate(key).await;
                None
            }
        }
    }

    pub async fn set<T>(&self, key: &str, value: &T)
    where
        T: Serialize,
    {
        self.set_with_ttl(key, value, self.default_ttl).await;
    }

    pub async fn set_with_ttl<T>(&self, key: &str, value: &T, ttl: Duration)
    where
        T: Serialize,
    {
        let json = match serde_json::to_string(value) {
            Ok(json) => json,
            Err(e) => {
                warn!(cache.key = %key, error = %e, "Failed to serialize cache value");
                return;
            }
        };

        if let Some(redis) = &self.redis {
            match redis.set_raw(key, json.clone(), ttl).await {
                Ok(()) => return,
                Err(e) => warn!(cache.key = %key, error = %e, "Redis SET failed, using local cache"),
            }
        }
        self.local.set(key, json, ttl).await;
    }

    /// Removes the key from both tiers.
    pub async fn invalidate(&self, key: &str) {
        if let Some(redis) = &self.redis
            && let Err(e) = redis.invalidate(key).await
        {
            warn!(cache.key = %key, error = %e, "Failed to invalidate Redis key");
        }
        self.local.invalidate(key).await;
    }

    pub async fn invalidate_prefix(&self, prefix: &str) {
        if let Some(redis) = &self.redis
            && let Err(e) = redis.invalidate_prefix(prefix).await
        {
            warn!(cache.prefix = %prefix, error = %e, "Failed to invalidate Redis prefix");
        }
        self.local.invalidate_prefix(prefix).await;
    }
}
