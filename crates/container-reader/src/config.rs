//! Configuration for container access.

use serde::{Deserialize, Serialize};

/// Configuration for opening and reading containers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReaderConfig {
    /// Maximum number of open container handles kept in the cache.
    pub handle_cache_capacity: usize,

    /// Connections per interval database pool.
    pub interval_pool_size: u32,

    /// Upper bound on features returned for one interval tile.
    pub max_features_per_tile: u32,
}

impl Default for ReaderConfig {
    fn default() -> Self {
        Self {
            handle_cache_capacity: 64,
            interval_pool_size: 4,
            max_features_per_tile: 100,
        }
    }
}

impl ReaderConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(val) = std::env::var("HANDLE_CACHE_CAPACITY") {
            if let Ok(capacity) = val.parse() {
                config.handle_cache_capacity = capacity;
            }
        }

        if let Ok(val) = std::env::var("INTERVAL_POOL_SIZE") {
            if let Ok(size) = val.parse() {
                config.interval_pool_size = size;
            }
        }

        if let Ok(val) = std::env::var("MAX_FEATURES_PER_TILE") {
            if let Ok(max) = val.parse() {
                config.max_features_per_tile = max;
            }
        }

        config
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), String> {
        if self.handle_cache_capacity == 0 {
            return Err("handle_cache_capacity must be > 0".to_string());
        }

        if self.interval_pool_size == 0 {
            return Err("interval_pool_size must be > 0".to_string());
        }

        if self.max_features_per_tile == 0 {
            return Err("max_features_per_tile must be > 0".to_string());
        }

        Ok(())
    }
}
