//! # Masnaa DB
//!
//! Explicit PostgreSQL pool lifecycle: [`connect`] at start-up, [`run_migrations`]
//! from the CLI, [`close`] on shutdown. Nothing here is global; the pool is handed to
//! the application state and cloned into handlers.
//!
//! ```ignore
//! let config = DatabaseConfig::from_env()?;
//! let pool = masnaa_db::connect(&config).await?;
//! // ...
//! masnaa_db::close(&pool).await;
//! ```

use std::str::FromStr;

use masnaa_config::DatabaseConfig;
use sqlx::migrate::MigrateError;
use sqlx::postgres::{PgConnectOptions, PgPoolOptions};
use tracing::{info, instrument};

pub use sqlx::PgPool;

/// Opens a pool with the configured size, acquire timeout and per-statement timeout.
#[instrument(skip(config), fields(db.max_connections = config.max_connections))]
pub async fn connect(config: &DatabaseConfig) -> Result<PgPool, sqlx::Error> {
    let statement_timeout_ms = config.statement_timeout.as_millis().to_string();
    let options = PgConnectOptions::from_str(&config.url)?
        .options([("statement_timeout", statement_timeout_ms.as_str())]);

    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .acquire_timeout(config.acquire_timeout)
        .connect_with(options)
        .await?;

    info!(
        db.max_connections = config.max_connections,
        db.acquire_timeout_secs = config.acquire_timeout.as_secs(),
        "Database pool connected"
    );

    Ok(pool)
}

/// Applies pending versioned migrations from `migrations/`.
pub async fn run_migrations(pool: &PgPool) -> Result<(), MigrateError> {
    sqlx::migrate!("../../migrations").run(pool).await?;
    info!("Database migrations applied");
    Ok(())
}

/// Waits for checked-out connections to return, then closes the pool.
pub async fn close(pool: &PgPool) {
    pool.close().await;
    info!("Database pool closed");
}
