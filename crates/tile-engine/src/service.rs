//! The tile service and its dispatch path from a dataset record to an open
//! container.

use std::path::PathBuf;
use std::sync::Arc;

use container_reader::{CacheStats, ContainerHandle, ContainerKind, HandleCache};
use storage::{DatasetStore, ViewConfStore};
use tileset_common::{DatasetRecord, Requester, TileAddress, TileError, TilePayload, TileResult, TilesetInfo};

use crate::access;
use crate::config::EngineConfig;

/// Entry point for every exposed operation.
///
/// Owns the container handle cache and talks to the record stores only
/// through their traits. Operations are spread over the `batch`, `search`
/// and `admission` modules.
pub struct TileService {
    pub(crate) datasets: Arc<dyn DatasetStore>,
    pub(crate) viewconfs: Arc<dyn ViewConfStore>,
    pub(crate) handles: HandleCache,
    pub(crate) config: EngineConfig,
}

impl TileService {
    pub fn new(
        datasets: Arc<dyn DatasetStore>,
        viewconfs: Arc<dyn ViewConfStore>,
        config: EngineConfig,
    ) -> Self {
        let handles = HandleCache::new(config.reader.clone());
        Self {
            datasets,
            viewconfs,
            handles,
            config,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub async fn cache_stats(&self) -> CacheStats {
        self.handles.stats().await
    }

    /// Absolute location of a dataset file.
    pub fn resolve_path(&self, file_path: &str) -> PathBuf {
        let path = PathBuf::from(file_path);
        if path.is_absolute() {
            path
        } else {
            self.config.data_dir.join(path)
        }
    }

    /// Look up a record, returning `NotFound` if it does not exist.
    pub(crate) async fn require_dataset(&self, uuid: &str) -> TileResult<DatasetRecord> {
        self.datasets
            .get_dataset(uuid)
            .await?
            .ok_or_else(|| TileError::not_found(format!("No such tileset with uid: {}", uuid)))
    }

    /// Look up a record the requester may read.
    pub(crate) async fn readable_dataset(&self, requester: &Requester, uuid: &str) -> TileResult<DatasetRecord> {
        let record = self.require_dataset(uuid).await?;
        if !access::can_read(&record, requester) {
            return Err(TileError::permission_denied(format!("tileset {} is private", uuid)));
        }
        Ok(record)
    }

    // =========================================================================
    // Dispatch
    // =========================================================================

    /// Open (or reuse) the container behind a record.
    ///
    /// Callers apply the access gate first.
    pub(crate) async fn open_container(&self, record: &DatasetRecord) -> TileResult<Arc<ContainerHandle>> {
        let kind = ContainerKind::for_file_type(&record.file_type).ok_or_else(|| {
            TileError::not_found(format!(
                "tileset {} has file type '{}' which has no tiles",
                record.uuid, record.file_type
            ))
        })?;
        self.handles.acquire(&self.resolve_path(&record.file_path), kind).await
    }

    /// Extract one tile from an already-authorized record.
    pub(crate) async fn read_tile(&self, record: &DatasetRecord, address: &TileAddress) -> TileResult<TilePayload> {
        let handle = self.open_container(record).await?;
        handle
            .read_tile(address.zoom, address.coords, &address.transform)
            .await
    }

    /// Tileset info for an already-authorized record, labelled from the record.
    pub(crate) async fn read_info(&self, record: &DatasetRecord) -> TileResult<TilesetInfo> {
        let handle = self.open_container(record).await?;
        Ok(handle.tileset_info().await?.decorate(record))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use storage::Catalog;

    #[tokio::test]
    async fn test_resolve_path() {
        let catalog = Arc::new(Catalog::in_memory().await.unwrap());
        let service = TileService::new(
            catalog.clone(),
            catalog,
            EngineConfig {
                data_dir: PathBuf::from("/srv/media"),
                ..Default::default()
            },
        );

        assert_eq!(service.resolve_path("uploads/a.mpyr"), PathBuf::from("/srv/media/uploads/a.mpyr"));
        assert_eq!(service.resolve_path("/data/b.mpyr"), PathBuf::from("/data/b.mpyr"));
    }
}
