//! Cache configuration.
//!
//! # Environment Variables
//!
//! - `REDIS_URL`: Redis connection URL. Unset means the in-process cache only.
//! - `CACHE_TTL_SECONDS`: default TTL for cached items (default `300`)
//! - `REDIS_CONNECT_TIMEOUT_MS`: how long start-up waits for Redis (default `2000`)

use std::env;
use std::time::Duration;

pub const DEFAULT_TTL_SECONDS: u64 = 300;

#[derive(Clone, Debug)]
pub struct CacheConfig {
    pub redis_url: Option<String>,
    pub default_ttl: Duration,
    pub connect_timeout: Duration,
}

impl CacheConfig {
    /// Unparseable numbers fall back to their defaults; a cache is never required.
    pub fn from_env() -> Self {
        Self {
            redis_url: env::var("REDIS_URL").ok().filter(|url| !url.trim().is_empty()),
            default_ttl: Duration::from_secs(
                env::var("CACHE_TTL_SECONDS")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(DEFAULT_TTL_SECONDS),
            ),
            connect_timeout: Duration::from_millis(
                env::var("REDIS_CONNECT_TIMEOUT_MS")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(2000),
            ),
        }
    }

    pub fn local_only() -> Self {
        Self::default()
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            redis_url: None,
            default_ttl: Duration::from_secs(DEFAULT_TTL_SECONDS),
            connect_timeout: Duration::from_secs(2),
        }
    }
}
