//! Rate limiting configuration for API endpoints.
//!
//! Authentication endpoints get a stricter bucket than the rest of the API to slow
//! down credential guessing. Keys are client IPs, taken from `X-Forwarded-For` /
//! `X-Real-IP` when a proxy sets them and from the peer address otherwise.
//!
//! - `RATE_LIMIT_ENABLED`: set to `false` to disable limiting (default `true`)
//! - `RATE_LIMIT_GENERAL_PER_SECOND` / `RATE_LIMIT_GENERAL_BURST_SIZE` (defaults 2 / 30)
//! - `RATE_LIMIT_AUTH_PER_SECOND` / `RATE_LIMIT_AUTH_BURST_SIZE` (defaults 10 / 5)

use tower_governor::governor::{GovernorConfig, GovernorConfigBuilder};
use tower_governor::key_extractor::SmartIpKeyExtractor;

use crate::error::{ConfigError, parse_or};

pub type IpGovernorConfig =
    GovernorConfig<SmartIpKeyExtractor, ::governor::middleware::NoOpMiddleware>;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RateLimitConfig {
    pub enabled: bool,
    pub general_per_second: u64,
    pub general_burst_size: u32,
    /// Seconds between token refills for auth endpoints.
    pub auth_per_second: u64,
    pub auth_burst_size: u32,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            general_per_second: 2,
            general_burst_size: 30,
            auth_per_second: 10,
            auth_burst_size: 5,
        }
    }
}

impl RateLimitConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();
        Ok(Self {
            enabled: parse_or("RATE_LIMIT_ENABLED", defaults.enabled)?,
            general_per_second: parse_or(
                "RATE_LIMIT_GENERAL_PER_SECOND",
                defaults.general_per_second,
            )?,
            general_burst_size: parse_or(
                "RATE_LIMIT_GENERAL_BURST_SIZE",
                defaults.general_burst_size,
            )?,
            auth_per_second: parse_or("RATE_LIMIT_AUTH_PER_SECOND", defaults.auth_per_second)?,
            auth_burst_size: parse_or("RATE_LIMIT_AUTH_BURST_SIZE", defaults.auth_burst_size)?,
        })
    }

    /// Limiting switched off, for tests driving the router without a peer address.
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Self::default()
        }
    }

    /// `None` when limiting is disabled or the values are rejected by governor
    /// (a zero rate or burst).
    #[must_use]
    pub fn general_governor_config(&self) -> Option<IpGovernorConfig> {
        self.governor(self.general_per_second, self.general_burst_size)
    }

    #[must_use]
    pub fn auth_governor_config(&self) -> Option<IpGovernorConfig> {
        self.governor(self.auth_per_second, self.auth_burst_size)
    }

    fn governor(&self, per_second: u64, burst_size: u32) -> Option<IpGovernorConfig> {
        if !self.enabled {
            return None;
        }
        GovernorConfigBuilder::default()
            .per_second(per_second)
            .burst_size(burst_size)
            .key_extractor(SmartIpKeyExtractor)
            .finish()
    }
}
