//! Configuration for the tile engine.

use std::path::PathBuf;

use container_reader::ReaderConfig;
use serde::{Deserialize, Serialize};

/// Configuration for tile resolution and catalog operations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Maximum tiles resolved concurrently within one batch.
    pub batch_concurrency: usize,

    /// Page size for listings that do not give a limit.
    pub default_page_size: usize,

    /// Maximum suggestions returned per query.
    pub suggestion_limit: u32,

    /// When false every dataset and view config create is refused.
    pub upload_enabled: bool,

    /// Base directory for relative dataset file paths.
    pub data_dir: PathBuf,

    /// Container access settings.
    pub reader: ReaderConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            batch_concurrency: 16,
            default_page_size: 10,
            suggestion_limit: 10,
            upload_enabled: true,
            data_dir: PathBuf::from("."),
            reader: ReaderConfig::default(),
        }
    }
}

impl EngineConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let mut config = Self {
            reader: ReaderConfig::from_env(),
            ..Self::default()
        };

        if let Ok(val) = std::env::var("BATCH_CONCURRENCY") {
            if let Ok(n) = val.parse() {
                config.batch_concurrency = n;
            }
        }

        if let Ok(val) = std::env::var("DEFAULT_PAGE_SIZE") {
            if let Ok(n) = val.parse() {
                config.default_page_size = n;
            }
        }

        if let Ok(val) = std::env::var("SUGGESTION_LIMIT") {
            if let Ok(n) = val.parse() {
                config.suggestion_limit = n;
            }
        }

        if let Ok(val) = std::env::var("UPLOAD_ENABLED") {
            config.upload_enabled = val.to_lowercase() == "true" || val == "1";
        }

        if let Ok(val) = std::env::var("DATA_DIR") {
            config.data_dir = PathBuf::from(val);
        }

        config
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), String> {
        if self.batch_concurrency == 0 {
            return Err("batch_concurrency must be > 0".to_string());
        }

        if self.default_page_size == 0 {
            return Err("default_page_size must be > 0".to_string());
        }

        if self.suggestion_limit == 0 {
            return Err("suggestion_limit must be > 0".to_string());
        }

        self.reader.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = EngineConfig::default();
        assert_eq!(config.batch_concurrency, 16);
        assert_eq!(config.default_page_size, 10);
        assert_eq!(config.suggestion_limit, 10);
        assert!(config.upload_enabled);
        assert_eq!(config.reader.handle_cache_capacity, 64);
    }

    #[test]
    fn test_config_validation() {
        let mut config = EngineConfig::default();
        assert!(config.validate().is_ok());

        config.batch_concurrency = 0;
        assert!(config.validate().is_err());

        config.batch_concurrency = 4;
        config.reader.handle_cache_capacity = 0;
        assert!(config.validate().is_err());
    }
}
