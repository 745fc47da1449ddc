//! Configuration for the HTTP service.

use serde::{Deserialize, Serialize};

/// Settings for the listener, the catalog database and caller identity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceConfig {
    /// Socket address to bind.
    pub listen: String,

    /// SQLite URL of the dataset catalog.
    pub database_url: String,

    /// Header carrying the authenticated user id, set by the trusted proxy.
    pub requester_header: String,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            listen: "0.0.0.0:8000".to_string(),
            database_url: "sqlite://tiles.db".to_string(),
            requester_header: "x-requester".to_string(),
        }
    }
}

impl ServiceConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(val) = std::env::var("LISTEN_ADDR") {
            config.listen = val;
        }

        if let Ok(val) = std::env::var("DATABASE_URL") {
            config.database_url = val;
        }

        if let Ok(val) = std::env::var("REQUESTER_HEADER") {
            config.requester_header = val.to_lowercase();
        }

        config
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), String> {
        if self.listen.parse::<std::net::SocketAddr>().is_err() {
            return Err(format!("listen address '{}' is not a socket address", self.listen));
        }

        if self.database_url.trim().is_empty() {
            return Err("database_url must not be empty".to_string());
        }

        if axum::http::HeaderName::from_bytes(self.requester_header.as_bytes()).is_err() {
            return Err(format!("'{}' is not a valid header name", self.requester_header));
        }

        Ok(())
    }
}
