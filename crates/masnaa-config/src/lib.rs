//! # Masnaa Config
//!
//! Configuration structures loaded from environment variables:
//!
//! - [`jwt`]: session token signing and cookie settings (secret required)
//! - [`database`]: PostgreSQL pool sizing and timeouts
//! - [`server`]: bind address, metrics port, request timeout
//! - [`cors`]: allowed origins
//! - [`rate_limit`]: per-IP request limits
//!
//! Loaders return [`ConfigError`] for required values that are absent or malformed
//! so start-up can refuse to run with an unsafe configuration.

pub mod cors;
pub mod database;
pub mod environment;
pub mod error;
pub mod jwt;
pub mod rate_limit;
pub mod server;

pub use cors::CorsConfig;
pub use database::DatabaseConfig;
pub use environment::Environment;
pub use error::ConfigError;
pub use jwt::JwtConfig;
pub use rate_limit::RateLimitConfig;
pub use server::ServerConfig;
