//! Format readers and the contract they share.

mod chromsizes;
mod interval;
mod matrix;
mod pyramid;
mod vector;

pub use chromsizes::{ChromEntry, ChromSizes};
pub use interval::{IntervalDb, IntervalLayout, Suggestion};
pub use matrix::{MatrixMetadata, MatrixPyramid, MATRIX_FORMAT};
pub use vector::{VectorMetadata, VectorPyramid, VECTOR_FORMAT};

use async_trait::async_trait;
use tileset_common::{TileCoords, TilePayload, TilesetInfo, Transform};

use crate::Result;

/// Trait for cutting tiles out of an open container.
///
/// Readers return `NotFound` when the container cannot supply the requested
/// zoom level or tile shape. Regions without data are not errors: dense
/// readers zero-fill and interval readers return empty collections.
#[async_trait]
pub trait TileReader: Send + Sync {
    /// Describe the zoom levels and extent of the container.
    async fn tileset_info(&self) -> Result<TilesetInfo>;

    /// Produce the tile at `zoom` / `coords`.
    ///
    /// Readers without value transforms ignore `transform`.
    async fn read_tile(
        &self,
        zoom: u32,
        coords: TileCoords,
        transform: &Transform,
    ) -> Result<TilePayload>;
}

/// Reject tiles outside the zoom range or the `2^zoom` grid.
pub(crate) fn check_tile_range(zoom: u32, max_zoom: u32, positions: &[u64]) -> Result<()> {
    if zoom > max_zoom {
        return Err(tileset_common::TileError::not_found(format!(
            "zoom {} beyond max zoom {}",
            zoom, max_zoom
        )));
    }
    let tiles_per_axis = 1u64 << zoom.min(63);
    if let Some(pos) = positions.iter().find(|&&p| p >= tiles_per_axis) {
        return Err(tileset_common::TileError::not_found(format!(
            "position {} outside zoom {} grid",
            pos, zoom
        )));
    }
    Ok(())
}

/// Convert a blocking task join failure into an internal error.
pub(crate) fn join_error(err: tokio::task::JoinError) -> tileset_common::TileError {
    tileset_common::TileError::Internal(format!("tile task failed: {}", err))
}
