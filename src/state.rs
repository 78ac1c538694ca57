use masnaa_cache::{AppCache, CacheConfig};
use masnaa_config::{
    ConfigError, CorsConfig, DatabaseConfig, JwtConfig, RateLimitConfig, ServerConfig,
};
use sqlx::PgPool;

#[derive(Clone, Debug)]
pub struct AppState {
    pub db: PgPool,
    pub jwt_config: JwtConfig,
    pub cors_config: CorsConfig,
    pub rate_limit_config: RateLimitConfig,
    pub server_config: ServerConfig,
    pub cache: AppCache,
}

#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("database connection failed: {0}")]
    Database(#[from] sqlx::Error),
}

impl AppState {
    /// State with development defaults around an existing pool and JWT config.
    pub fn new(db: PgPool, jwt_config: JwtConfig, cache: AppCache) -> Self {
        Self {
            db,
            jwt_config,
            cors_config: CorsConfig::parse("http://localhost:5173"),
            rate_limit_config: RateLimitConfig::default(),
            server_config: ServerConfig::default(),
            cache,
        }
    }
}

/// Loads every config from the environment, then connects the pool and cache.
///
/// Configuration is validated before any connection is attempted so a missing
/// `JWT_SECRET` fails fast.
pub async fn init_app_state() -> Result<AppState, StartupError> {
    let jwt_config = JwtConfig::from_env()?;
    let database_config = DatabaseConfig::from_env()?;
    let rate_limit_config = RateLimitConfig::from_env()?;
    let server_config = ServerConfig::from_env()?;
    let cors_config = CorsConfig::from_env();
    let cache_config = CacheConfig::from_env();

    let db = masnaa_db::connect(&database_config).await?;
    let cache = AppCache::connect(&cache_config).await;

    Ok(AppState {
        db,
        jwt_config,
        cors_config,
        rate_limit_config,
        server_config,
        cache,
    })
}
