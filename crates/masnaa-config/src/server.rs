use std::env;
use std::time::Duration;

use crate::environment::Environment;
use crate::error::{ConfigError, parse_or};

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub metrics_port: u16,
    pub request_timeout: Duration,
    pub environment: Environment,
}

impl ServerConfig {
    /// `HOST`, `PORT`, `METRICS_PORT`, `REQUEST_TIMEOUT_SECS`.
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: parse_or("PORT", 3000)?,
            metrics_port: parse_or("METRICS_PORT", 9090)?,
            request_timeout: Duration::from_secs(parse_or("REQUEST_TIMEOUT_SECS", 30)?),
            environment: Environment::from_env(),
        })
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3000,
            metrics_port: 9090,
            request_timeout: Duration::from_secs(30),
            environment: Environment::Development,
        }
    }
}
