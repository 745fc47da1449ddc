//! Dense vector pyramid reader.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tileset_common::{DenseTile, TileCoords, TileError, TilePayload, TilesetInfo, Transform};
use zarrs::array::Array;
use zarrs_filesystem::FilesystemStore;

use super::pyramid::{open_array, open_store, read_block, root_metadata, tile_origin};
use super::{check_tile_range, join_error, TileReader};
use crate::Result;

/// Format marker stored in the root group attributes.
pub const VECTOR_FORMAT: &str = "vector-pyramid";

/// Root attributes of a vector pyramid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VectorMetadata {
    pub max_zoom: u32,
    pub tile_size: u64,
    /// Signal length at the finest level.
    pub max_length: u64,
}

impl VectorMetadata {
    pub fn max_width(&self) -> f64 {
        self.tile_size as f64 * 2f64.powi(self.max_zoom as i32)
    }
}

struct VectorInner {
    path: PathBuf,
    metadata: VectorMetadata,
    levels: Vec<Array<FilesystemStore>>,
}

/// An open vector pyramid.
#[derive(Clone)]
pub struct VectorPyramid {
    inner: Arc<VectorInner>,
}

impl VectorPyramid {
    /// Open a pyramid directory. Performs blocking filesystem reads.
    pub fn open(path: &Path) -> Result<Self> {
        let store = open_store(path)?;
        let metadata: VectorMetadata = root_metadata(&store, path, VECTOR_FORMAT)?;
        if metadata.tile_size == 0 {
            return Err(TileError::malformed(path.display(), "tile_size must be > 0"));
        }

        let levels = (0..=metadata.max_zoom)
            .map(|zoom| open_array(&store, path, &format!("/resolutions/{}", zoom)))
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            inner: Arc::new(VectorInner {
                path: path.to_path_buf(),
                metadata,
                levels,
            }),
        })
    }

    pub fn metadata(&self) -> &VectorMetadata {
        &self.inner.metadata
    }
}

impl VectorInner {
    fn read_values(&self, zoom: u32, x: u64) -> Result<Vec<f32>> {
        let ts = self.metadata.tile_size;
        let start = tile_origin(x, ts, &self.path)?;
        read_block(&self.levels[zoom as usize], &self.path, &[start], &[ts])
    }
}

#[async_trait]
impl TileReader for VectorPyramid {
    async fn tileset_info(&self) -> Result<TilesetInfo> {
        let meta = &self.inner.metadata;
        Ok(TilesetInfo::new(
            vec![0.0],
            vec![meta.max_length as f64],
            meta.max_zoom,
            meta.max_width(),
            meta.tile_size,
        ))
    }

    async fn read_tile(
        &self,
        zoom: u32,
        coords: TileCoords,
        _transform: &Transform,
    ) -> Result<TilePayload> {
        let x = match coords {
            TileCoords::OneD(x) => x,
            TileCoords::TwoD(..) => {
                return Err(TileError::not_found("vector tiles take a single position"))
            }
        };
        check_tile_range(zoom, self.inner.metadata.max_zoom, &[x])?;

        let inner = self.inner.clone();
        tokio::task::spawn_blocking(move || {
            let values = inner.read_values(zoom, x)?;
            tracing::debug!(path = %inner.path.display(), zoom, x, "Read vector tile");
            Ok(TilePayload::Dense(DenseTile::encode(&values, vec![values.len()])))
        })
        .await
        .map_err(join_error)?
    }
}
