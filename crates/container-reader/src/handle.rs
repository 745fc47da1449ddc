//! Open container handles, one variant per format.

use std::path::Path;

use tileset_common::{TileCoords, TilePayload, TilesetInfo, Transform};

use crate::config::ReaderConfig;
use crate::reader::{
    join_error, ChromSizes, IntervalDb, IntervalLayout, MatrixPyramid, TileReader, VectorPyramid,
};
use crate::types::ContainerKind;
use crate::Result;

/// An open container.
pub enum ContainerHandle {
    Matrix(MatrixPyramid),
    Vector(VectorPyramid),
    Intervals(IntervalDb),
    ChromSizes(ChromSizes),
}

impl ContainerHandle {
    /// Open the container at `path` as `kind`.
    pub async fn open(path: &Path, kind: ContainerKind, config: &ReaderConfig) -> Result<Self> {
        let handle = match kind {
            ContainerKind::Matrix => {
                let path = path.to_path_buf();
                let pyramid = tokio::task::spawn_blocking(move || MatrixPyramid::open(&path))
                    .await
                    .map_err(join_error)??;
                ContainerHandle::Matrix(pyramid)
            }
            ContainerKind::Vector => {
                let path = path.to_path_buf();
                let pyramid = tokio::task::spawn_blocking(move || VectorPyramid::open(&path))
                    .await
                    .map_err(join_error)??;
                ContainerHandle::Vector(pyramid)
            }
            ContainerKind::LinearIntervals => {
                ContainerHandle::Intervals(IntervalDb::open(path, IntervalLayout::Linear, config).await?)
            }
            ContainerKind::PairedIntervals => {
                ContainerHandle::Intervals(IntervalDb::open(path, IntervalLayout::Paired, config).await?)
            }
            ContainerKind::StackedIntervals => {
                ContainerHandle::Intervals(IntervalDb::open(path, IntervalLayout::Stacked, config).await?)
            }
            ContainerKind::ChromSizes => ContainerHandle::ChromSizes(ChromSizes::open(path).await?),
        };

        metrics::counter!("container_opens_total", "kind" => kind.as_str()).increment(1);
        Ok(handle)
    }

    fn reader(&self) -> &dyn TileReader {
        match self {
            ContainerHandle::Matrix(r) => r,
            ContainerHandle::Vector(r) => r,
            ContainerHandle::Intervals(r) => r,
            ContainerHandle::ChromSizes(r) => r,
        }
    }

    pub async fn tileset_info(&self) -> Result<TilesetInfo> {
        self.reader().tileset_info().await
    }

    pub async fn read_tile(
        &self,
        zoom: u32,
        coords: TileCoords,
        transform: &Transform,
    ) -> Result<TilePayload> {
        self.reader().read_tile(zoom, coords, transform).await
    }

    /// The interval database behind this handle, if it is one.
    pub fn as_intervals(&self) -> Option<&IntervalDb> {
        match self {
            ContainerHandle::Intervals(db) => Some(db),
            _ => None,
        }
    }

    pub fn as_chromsizes(&self) -> Option<&ChromSizes> {
        match self {
            ContainerHandle::ChromSizes(sizes) => Some(sizes),
            _ => None,
        }
    }

    /// Release resources held outside the handle itself.
    pub async fn close(&self) {
        if let ContainerHandle::Intervals(db) = self {
            db.close().await;
        }
    }

    /// Whether `close` has released this handle's resources.
    pub fn is_closed(&self) -> bool {
        match self {
            ContainerHandle::Intervals(db) => db.is_closed(),
            _ => false,
        }
    }
}
