//! Server configuration.
//!
//! The binary fills this from command line arguments (each with an environment
//! variable fallback); tests build it directly.

use std::{path::PathBuf, time::Duration};

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("default page limit must be greater than zero")]
    ZeroDefaultPageLimit,

    #[error("default page limit ({default}) exceeds max page limit ({max})")]
    DefaultAboveMax { default: usize, max: usize },

    #[error("sweep interval must be greater than zero")]
    ZeroSweepInterval,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// `None` disables idle reclamation
    pub idle_room_ttl: Option<Duration>,
    /// How long an ended room stays addressable before it is purged
    pub tombstone_retention: Duration,
    pub sweep_interval: Duration,
    pub default_page_limit: usize,
    pub max_page_limit: usize,
    /// JSON array of products used to render product shares
    pub product_catalog: Option<PathBuf>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
            idle_room_ttl: Some(Duration::from_secs(3600)),
            tombstone_retention: Duration::from_secs(600),
            sweep_interval: Duration::from_secs(60),
            default_page_limit: 50,
            max_page_limit: 200,
            product_catalog: None,
        }
    }
}

impl ServerConfig {
    /// Check the values that cannot be expressed by the argument types alone.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.default_page_limit == 0 {
            return Err(ConfigError::ZeroDefaultPageLimit);
        }
        if self.default_page_limit > self.max_page_limit {
            return Err(ConfigError::DefaultAboveMax {
                default: self.default_page_limit,
                max: self.max_page_limit,
            });
        }
        if self.sweep_interval.is_zero() {
            return Err(ConfigError::ZeroSweepInterval);
        }
        Ok(())
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Seconds to an optional TTL, where zero means "disabled".
pub fn ttl_from_secs(secs: u64) -> Option<Duration> {
    (secs > 0).then(|| Duration::from_secs(secs))
}
