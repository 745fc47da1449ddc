//! Application state and shared resources.

use std::sync::Arc;

use anyhow::Result;
use axum::http::HeaderMap;
use storage::Catalog;
use tile_engine::{EngineConfig, TileService};
use tileset_common::Requester;
use tracing::info;

use crate::config::ServiceConfig;

/// Shared application state.
pub struct AppState {
    pub catalog: Arc<Catalog>,
    pub service: TileService,
    pub config: ServiceConfig,
}

impl AppState {
    /// Connect to the catalog database and build the tile service.
    pub async fn new(config: ServiceConfig, engine: EngineConfig) -> Result<Self> {
        let catalog = Catalog::connect(&config.database_url).await?;
        catalog.migrate().await?;
        info!(database_url = %config.database_url, "Catalog ready");

        Ok(Self::with_catalog(Arc::new(catalog), config, engine))
    }

    pub fn with_catalog(catalog: Arc<Catalog>, config: ServiceConfig, engine: EngineConfig) -> Self {
        let service = TileService::new(catalog.clone(), catalog.clone(), engine);
        Self {
            catalog,
            service,
            config,
        }
    }

    /// Identity of the caller from the configured header.
    pub fn requester(&self, headers: &HeaderMap) -> Requester {
        let value = headers
            .get(self.config.requester_header.as_str())
            .and_then(|v| v.to_str().ok());
        Requester::from_header(value)
    }
}
