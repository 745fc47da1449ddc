//! Writers producing the container layouts the readers consume.
//!
//! Used by ingestion tooling and by tests that need real containers on disk.

mod interval_writer;
mod matrix_writer;
mod vector_writer;

pub use interval_writer::{IntervalDbMeta, IntervalDbWriter, IntervalRecord};
pub use matrix_writer::MatrixPyramidWriter;
pub use vector_writer::VectorPyramidWriter;

use std::path::Path;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tileset_common::TileError;
use zarrs::array::{ArrayBuilder, DataType, FillValue};
use zarrs::array_subset::ArraySubset;
use zarrs::group::GroupBuilder;
use zarrs_filesystem::FilesystemStore;

use crate::Result;

/// Shape of a written pyramid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PyramidSummary {
    pub max_zoom: u32,
    pub tile_size: u64,
    /// Bins per axis at each zoom level, coarsest first.
    pub level_bins: Vec<u64>,
    pub max_width: f64,
}

fn storage_error(e: impl std::fmt::Display) -> TileError {
    TileError::Storage(e.to_string())
}

/// Create the pyramid directory and its store.
pub(crate) fn create_store(path: &Path) -> Result<Arc<FilesystemStore>> {
    std::fs::create_dir_all(path)?;
    let store = FilesystemStore::new(path).map_err(storage_error)?;
    Ok(Arc::new(store))
}

/// Write a group with the given attributes.
pub(crate) fn write_group(
    store: &Arc<FilesystemStore>,
    group_path: &str,
    attrs: serde_json::Map<String, serde_json::Value>,
) -> Result<()> {
    let mut builder = GroupBuilder::new();
    builder.attributes(attrs);
    let group = builder.build(store.clone(), group_path).map_err(storage_error)?;
    group.store_metadata().map_err(storage_error)?;
    Ok(())
}

/// Write a float32 array of `shape`, chunked by `chunk` along each axis.
pub(crate) fn write_array(
    store: &Arc<FilesystemStore>,
    array_path: &str,
    shape: Vec<u64>,
    chunk: u64,
    data: &[f32],
) -> Result<()> {
    let chunk_grid: zarrs::array::ChunkGrid = vec![chunk; shape.len()]
        .try_into()
        .map_err(|e| TileError::Internal(format!("invalid chunk grid: {:?}", e)))?;

    let array = ArrayBuilder::new(shape.clone(), DataType::Float32, chunk_grid, FillValue::from(0.0f32))
        .build(store.clone(), array_path)
        .map_err(storage_error)?;
    array.store_metadata().map_err(storage_error)?;

    let subset = ArraySubset::new_with_shape(shape);
    array
        .store_array_subset_elements(&subset, data)
        .map_err(storage_error)?;
    Ok(())
}
