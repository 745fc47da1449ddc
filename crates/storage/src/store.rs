//! Record store interfaces.

use async_trait::async_trait;
use tileset_common::{DatasetFilter, DatasetRecord, TileResult, ViewConf};

/// Dataset record storage.
#[async_trait]
pub trait DatasetStore: Send + Sync {
    /// Look up a record by id.
    async fn get_dataset(&self, uuid: &str) -> TileResult<Option<DatasetRecord>>;

    /// All records matching `filter`, oldest first.
    ///
    /// Visibility is not applied here.
    async fn find_datasets(&self, filter: &DatasetFilter) -> TileResult<Vec<DatasetRecord>>;

    /// Insert a record. Fails with `Conflict` if the id is taken, leaving the
    /// existing record untouched.
    async fn create_dataset(&self, record: DatasetRecord) -> TileResult<DatasetRecord>;

    /// Remove a record. Returns false if it did not exist.
    async fn delete_dataset(&self, uuid: &str) -> TileResult<bool>;
}

/// View configuration storage.
#[async_trait]
pub trait ViewConfStore: Send + Sync {
    /// Strict insert; `Conflict` if the id is taken.
    async fn create_viewconf(&self, viewconf: ViewConf) -> TileResult<ViewConf>;

    async fn get_viewconf(&self, uuid: &str) -> TileResult<Option<ViewConf>>;
}
