//! Contact matrix pyramid reader.
//!
//! A matrix pyramid stores one square `counts` array per zoom level. Only the
//! upper triangle (row <= column) is populated; tiles below the diagonal are
//! produced by transposing their mirror tile above it.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tileset_common::{DenseTile, TileCoords, TileError, TilePayload, TilesetInfo, Transform, TransformSpec};
use zarrs::array::Array;
use zarrs_filesystem::FilesystemStore;

use super::pyramid::{open_array, open_store, read_all, read_block, root_metadata, tile_origin};
use super::{check_tile_range, join_error, TileReader};
use crate::Result;

/// Format marker stored in the root group attributes.
pub const MATRIX_FORMAT: &str = "matrix-pyramid";

/// Root attributes of a matrix pyramid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatrixMetadata {
    pub max_zoom: u32,
    /// Bins per tile side.
    pub tile_size: u64,
    /// Base pairs per bin at the finest level.
    pub bin_size: u64,
    /// Bins per side at the finest level.
    pub n_bins: u64,
    #[serde(default)]
    pub transforms: Vec<TransformSpec>,
}

impl MatrixMetadata {
    /// Genome span covered by the zoom 0 tile.
    pub fn max_width(&self) -> f64 {
        self.bin_size as f64 * self.tile_size as f64 * 2f64.powi(self.max_zoom as i32)
    }

    /// Container key of the weights to apply, or `None` for raw counts.
    ///
    /// Unknown names fall back to the default (the first listed transform).
    pub fn resolve_transform(&self, transform: &Transform) -> Option<&str> {
        let default = self.transforms.first().map(|t| t.value.as_str());
        match transform {
            Transform::Identity => None,
            Transform::Default => default,
            Transform::Named(name) => self
                .transforms
                .iter()
                .find(|t| t.name.eq_ignore_ascii_case(name))
                .map(|t| t.value.as_str())
                .or(default),
        }
    }
}

struct MatrixLevel {
    n_bins: u64,
    counts: Array<FilesystemStore>,
    weights: HashMap<String, Vec<f32>>,
}

struct MatrixInner {
    path: PathBuf,
    metadata: MatrixMetadata,
    levels: Vec<MatrixLevel>,
}

/// An open matrix pyramid.
#[derive(Clone)]
pub struct MatrixPyramid {
    inner: Arc<MatrixInner>,
}

impl MatrixPyramid {
    /// Open a pyramid directory, loading per-level weights.
    ///
    /// Performs blocking filesystem reads.
    pub fn open(path: &Path) -> Result<Self> {
        let store = open_store(path)?;
        let metadata: MatrixMetadata = root_metadata(&store, path, MATRIX_FORMAT)?;
        if metadata.tile_size == 0 {
            return Err(TileError::malformed(path.display(), "tile_size must be > 0"));
        }

        let mut levels = Vec::with_capacity(metadata.max_zoom as usize + 1);
        for zoom in 0..=metadata.max_zoom {
            let counts = open_array(&store, path, &format!("/resolutions/{}/counts", zoom))?;
            let shape = counts.shape().to_vec();
            if shape.len() != 2 || shape[0] != shape[1] {
                return Err(TileError::malformed(
                    path.display(),
                    format!("zoom {} counts are not square: {:?}", zoom, shape),
                ));
            }

            let mut weights = HashMap::new();
            for transform in &metadata.transforms {
                let array = open_array(
                    &store,
                    path,
                    &format!("/resolutions/{}/weights/{}", zoom, transform.value),
                )?;
                let values = read_all(&array, path)?;
                if values.len() as u64 != shape[0] {
                    return Err(TileError::malformed(
                        path.display(),
                        format!("zoom {} weights '{}' have wrong length", zoom, transform.value),
                    ));
                }
                weights.insert(transform.value.clone(), values);
            }

            levels.push(MatrixLevel {
                n_bins: shape[0],
                counts,
                weights,
            });
        }

        tracing::debug!(
            path = %path.display(),
            max_zoom = metadata.max_zoom,
            n_bins = metadata.n_bins,
            "Opened matrix pyramid"
        );

        Ok(Self {
            inner: Arc::new(MatrixInner {
                path: path.to_path_buf(),
                metadata,
                levels,
            }),
        })
    }

    pub fn metadata(&self) -> &MatrixMetadata {
        &self.inner.metadata
    }

    /// Read tile values (row-major, `tile_size` x `tile_size`) before
    /// quantization.
    pub fn read_values(&self, zoom: u32, x: u64, y: u64, transform: &Transform) -> Result<Vec<f32>> {
        check_tile_range(zoom, self.inner.metadata.max_zoom, &[x, y])?;
        self.inner.read_values(zoom, x, y, transform)
    }
}

impl MatrixInner {
    fn read_values(&self, zoom: u32, x: u64, y: u64, transform: &Transform) -> Result<Vec<f32>> {
        let level = &self.levels[zoom as usize];
        let ts = self.metadata.tile_size;
        let side = ts as usize;
        let shape = [ts, ts];

        let row0 = tile_origin(x, ts, &self.path)?;
        let col0 = tile_origin(y, ts, &self.path)?;

        let mut values = if x < y {
            read_block(&level.counts, &self.path, &[row0, col0], &shape)?
        } else if x > y {
            transpose(&read_block(&level.counts, &self.path, &[col0, row0], &shape)?, side)
        } else {
            let mut block = read_block(&level.counts, &self.path, &[row0, row0], &shape)?;
            for r in 1..side {
                for c in 0..r {
                    block[r * side + c] = block[c * side + r];
                }
            }
            block
        };

        if let Some(key) = self.metadata.resolve_transform(transform) {
            if let Some(weights) = level.weights.get(key) {
                for r in 0..side {
                    let row = row0 + r as u64;
                    if row >= level.n_bins {
                        break;
                    }
                    for c in 0..side {
                        let col = col0 + c as u64;
                        if col >= level.n_bins {
                            break;
                        }
                        values[r * side + c] *= weights[row as usize] * weights[col as usize];
                    }
                }
            }
        }

        tracing::debug!(
            path = %self.path.display(),
            zoom,
            x,
            y,
            transform = ?transform,
            "Read matrix tile"
        );

        Ok(values)
    }
}

fn transpose(block: &[f32], side: usize) -> Vec<f32> {
    let mut out = vec![0.0f32; block.len()];
    for r in 0..side {
        for c in 0..side {
            out[c * side + r] = block[r * side + c];
        }
    }
    out
}

#[async_trait]
impl TileReader for MatrixPyramid {
    async fn tileset_info(&self) -> Result<TilesetInfo> {
        let meta = &self.inner.metadata;
        let extent = meta.n_bins.checked_mul(meta.bin_size).ok_or_else(|| {
            TileError::malformed(self.inner.path.display(), "genome extent overflows")
        })? as f64;
        let mut info = TilesetInfo::new(
            vec![0.0, 0.0],
            vec![extent, extent],
            meta.max_zoom,
            meta.max_width(),
            meta.tile_size,
        );
        info.bins_per_dimension = Some(meta.tile_size);
        info.transforms = meta.transforms.clone();
        Ok(info)
    }

    async fn read_tile(
        &self,
        zoom: u32,
        coords: TileCoords,
        transform: &Transform,
    ) -> Result<TilePayload> {
        let (x, y) = match coords {
            TileCoords::TwoD(x, y) => (x, y),
            TileCoords::OneD(_) => {
                return Err(TileError::not_found("matrix tiles need two positions"))
            }
        };
        check_tile_range(zoom, self.inner.metadata.max_zoom, &[x, y])?;

        let inner = self.inner.clone();
        let transform = transform.clone();
        let side = inner.metadata.tile_size as usize;
        tokio::task::spawn_blocking(move || {
            let values = inner.read_values(zoom, x, y, &transform)?;
            Ok(TilePayload::Dense(DenseTile::encode(&values, vec![side, side])))
        })
        .await
        .map_err(join_error)?
    }
}
