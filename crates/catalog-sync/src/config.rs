//! Runtime configuration with validation.
//!
//! Read from the JSON file named by `CATALOG_SYNC_CONFIG`; every key is optional. Durations are
//! human-readable (`"30s"`, `"1m 30s"`, `"250ms"`).
//!
//! ```json
//! {
//!   "productLookup": {
//!     "failureRateThreshold": 50,
//!     "slidingWindowSize": 10,
//!     "minimumNumberOfCalls": 10,
//!     "resetTimeout": "30s",
//!     "callTimeout": "2s"
//!   },
//!   "delivery": {
//!     "retry": { "maxAttempts": 5, "initialBackoff": "100ms", "multiplier": 2.0, "maxBackoff": "5s" },
//!     "duplicateDeliveries": false
//!   },
//!   "actorBufferSize": 32
//! }
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use sync_framework::channel::{ChannelConfig, RetryPolicyError};
use sync_framework::circuit_breaker::{BreakerConfigError, CircuitBreakerConfig};
use thiserror::Error;
use tracing::info;

/// Environment variable naming the configuration file.
pub const CONFIG_ENV: &str = "CATALOG_SYNC_CONFIG";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SyncConfig {
    /// Circuit breaker around the product lookup
    pub product_lookup: CircuitBreakerConfig,
    /// Event channel redelivery
    pub delivery: ChannelConfig,
    /// Request buffer of each actor
    pub actor_buffer_size: usize,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            product_lookup: CircuitBreakerConfig::default(),
            delivery: ChannelConfig::default(),
            actor_buffer_size: 32,
        }
    }
}

impl SyncConfig {
    /// Reads and validates a configuration file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config: SyncConfig = serde_json::from_str(&raw)?;
        config.validate()?;
        info!(path = %path.display(), "Configuration loaded");
        Ok(config)
    }

    /// Loads the file named by `CATALOG_SYNC_CONFIG`, or the defaults when it is unset.
    pub fn from_env() -> Result<Self, ConfigError> {
        match std::env::var_os(CONFIG_ENV) {
            Some(path) => Self::load(path),
            None => {
                info!("{CONFIG_ENV} not set, using default configuration");
                Ok(Self::default())
            }
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.product_lookup.validate()?;
        self.delivery.retry.validate()?;
        if self.actor_buffer_size == 0 {
            return Err(ConfigError::InvalidBufferSize);
        }
        Ok(())
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid configuration JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("productLookup: {0}")]
    Breaker(#[from] BreakerConfigError),
    #[error("delivery.retry: {0}")]
    Retry(#[from] RetryPolicyError),
    #[error("actorBufferSize must be at least 1")]
    InvalidBufferSize,
}
