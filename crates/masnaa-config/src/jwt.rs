//! Session token configuration.
//!
//! `JWT_SECRET` is required: there is no built-in fallback, and start-up fails when it
//! is missing or shorter than [`MIN_SECRET_LEN`] bytes.
//!
//! - `JWT_SECRET`: HMAC signing secret (required)
//! - `JWT_SESSION_EXPIRY`: session lifetime in seconds (default 7 days)
//! - `SESSION_COOKIE_NAME`: cookie carrying the token (default `auth-token`)

use std::env;

use crate::environment::Environment;
use crate::error::{ConfigError, parse_or};

pub const MIN_SECRET_LEN: usize = 32;
pub const DEFAULT_SESSION_EXPIRY: i64 = 7 * 24 * 60 * 60;
pub const DEFAULT_COOKIE_NAME: &str = "auth-token";

#[derive(Clone, Debug)]
pub struct JwtConfig {
    pub secret: String,
    pub session_expiry: i64,
    pub cookie_name: String,
    /// Sets the `Secure` attribute on the session cookie; on in production.
    pub cookie_secure: bool,
}

impl JwtConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let secret = env::var("JWT_SECRET").map_err(|_| ConfigError::Missing("JWT_SECRET"))?;
        Self::build(secret, Environment::from_env())
    }

    fn build(secret: String, environment: Environment) -> Result<Self, ConfigError> {
        if secret.trim().is_empty() {
            return Err(ConfigError::Missing("JWT_SECRET"));
        }
        if secret.len() < MIN_SECRET_LEN {
            return Err(ConfigError::TooShort {
                name: "JWT_SECRET",
                min: MIN_SECRET_LEN,
            });
        }

        Ok(Self {
            secret,
            session_expiry: parse_or("JWT_SESSION_EXPIRY", DEFAULT_SESSION_EXPIRY)?,
            cookie_name: env::var("SESSION_COOKIE_NAME")
                .unwrap_or_else(|_| DEFAULT_COOKIE_NAME.to_string()),
            cookie_secure: environment.is_production(),
        })
    }

    /// Config with a caller-supplied secret and defaults for everything else.
    pub fn with_secret(secret: impl Into<String>) -> Result<Self, ConfigError> {
        Self::build(secret.into(), Environment::Development)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_secret_rejected() {
        let err = JwtConfig::with_secret("short").unwrap_err();
        assert!(matches!(err, ConfigError::TooShort { .. }));
    }

    #[test]
    fn test_blank_secret_rejected() {
        let err = JwtConfig::with_secret("   ").unwrap_err();
        assert!(matches!(err, ConfigError::Missing("JWT_SECRET")));
    }

    #[test]
    fn test_defaults() {
        let config = JwtConfig::with_secret("x".repeat(MIN_SECRET_LEN)).unwrap();
        assert_eq!(config.session_expiry, DEFAULT_SESSION_EXPIRY);
        assert_eq!(config.cookie_name, "auth-token");
        assert!(!config.cookie_secure);
    }

    #[test]
    fn test_production_sets_secure_cookie() {
        let config =
            JwtConfig::build("y".repeat(MIN_SECRET_LEN), Environment::Production).unwrap();
        assert!(config.cookie_secure);
    }
}
