//! Configuration module
//!
//! Loads configuration from environment variables. Every key has a default
//! so the engine is usable as a library without any environment set up.

use std::env;
use std::time::Duration;

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Environment (development, production)
    pub environment: String,

    /// Lifetime of issued login tokens, in seconds
    pub token_ttl_secs: u64,

    /// Timeout for external exchange-rate fetches, in milliseconds
    pub rate_fetch_timeout_ms: u64,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        let environment = env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string());

        let token_ttl_secs = env::var("TOKEN_TTL_SECS")
            .unwrap_or_else(|_| "900".to_string())
            .parse()
            .map_err(|_| ConfigError::InvalidValue("TOKEN_TTL_SECS"))?;

        let rate_fetch_timeout_ms = env::var("RATE_FETCH_TIMEOUT_MS")
            .unwrap_or_else(|_| "2000".to_string())
            .parse()
            .map_err(|_| ConfigError::InvalidValue("RATE_FETCH_TIMEOUT_MS"))?;

        Ok(Self {
            environment,
            token_ttl_secs,
            rate_fetch_timeout_ms,
        })
    }

    /// Check if running in production
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    pub fn token_ttl(&self) -> Duration {
        Duration::from_secs(self.token_ttl_secs)
    }

    pub fn rate_fetch_timeout(&self) -> Duration {
        Duration::from_millis(self.rate_fetch_timeout_ms)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            environment: "development".to_string(),
            token_ttl_secs: 900,
            rate_fetch_timeout_ms: 2000,
        }
    }
}

/// Configuration error types
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnv(&'static str),

    #[error("Invalid value for environment variable: {0}")]
    InvalidValue(&'static str),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!(!config.is_production());
        assert_eq!(config.token_ttl(), Duration::from_secs(900));
        assert_eq!(config.rate_fetch_timeout(), Duration::from_millis(2000));
    }
}
