//! PostgreSQL connection settings.
//!
//! - `DATABASE_URL`: connection string (required)
//! - `DATABASE_MAX_CONNECTIONS` (default 10), `DATABASE_MIN_CONNECTIONS` (default 1)
//! - `DATABASE_ACQUIRE_TIMEOUT_SECS`: wait for a pooled connection (default 5)
//! - `DATABASE_STATEMENT_TIMEOUT_MS`: per-statement server timeout (default 15000)

use std::env;
use std::time::Duration;

use crate::error::{ConfigError, parse_or};

#[derive(Clone, Debug)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
    pub acquire_timeout: Duration,
    pub statement_timeout: Duration,
}

impl DatabaseConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let url = env::var("DATABASE_URL").map_err(|_| ConfigError::Missing("DATABASE_URL"))?;

        Ok(Self {
            url,
            max_connections: parse_or("DATABASE_MAX_CONNECTIONS", 10)?,
            min_connections: parse_or("DATABASE_MIN_CONNECTIONS", 1)?,
            acquire_timeout: Duration::from_secs(parse_or("DATABASE_ACQUIRE_TIMEOUT_SECS", 5)?),
            statement_timeout: Duration::from_millis(parse_or(
                "DATABASE_STATEMENT_TIMEOUT_MS",
                15_000,
            )?),
        })
    }
}
