//! # Masnaa Cache
//!
//! Best-effort caching for read-heavy list endpoints.
//!
//! - [`AppCache`]: Redis when reachable, in-process TTL map otherwise
//! - [`CacheConfig`]: `REDIS_URL`, `CACHE_TTL_SECONDS` (default 300)
//! - [`keys`]: key builders and post-mutation invalidation
//!
//! ```ignore
//! let cache = AppCache::connect(&CacheConfig::from_env()).await;
//! let key = keys::suppliers::list(&hash_filters(&filters));
//! if let Some(page) = cache.get::<PaginatedSuppliersResponse>(&key).await {
//!     return Ok(page);
//! }
//! ```

pub mod config;
pub mod keys;
pub mod local;
pub mod redis;
pub mod store;

pub use config::CacheConfig;
pub use keys::{hash_filters, invalidate};
pub use local::LocalCache;
pub use self::redis::{CacheError, RedisCache};
pub use store::AppCache;
