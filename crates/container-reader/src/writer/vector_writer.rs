//! Vector pyramid writer.

use std::path::Path;

use tileset_common::TileError;

use super::{create_store, write_array, write_group, PyramidSummary};
use crate::reader::{VectorMetadata, VECTOR_FORMAT};
use crate::types::zoom_levels_for;
use crate::Result;

/// Writes a dense 1D signal as a vector pyramid.
#[derive(Debug, Clone)]
pub struct VectorPyramidWriter {
    tile_size: u64,
}

impl Default for VectorPyramidWriter {
    fn default() -> Self {
        Self { tile_size: 1024 }
    }
}

impl VectorPyramidWriter {
    pub fn new(tile_size: u64) -> Self {
        Self { tile_size }
    }

    /// Write `values` to `path`; each coarser level sums adjacent pairs.
    pub fn write(&self, path: &Path, values: &[f32]) -> Result<PyramidSummary> {
        if self.tile_size == 0 {
            return Err(TileError::invalid_parameter("tile_size", "must be > 0"));
        }
        if values.is_empty() {
            return Err(TileError::invalid_parameter("values", "signal is empty"));
        }

        let max_zoom = zoom_levels_for(values.len() as u64, self.tile_size);
        let metadata = VectorMetadata {
            max_zoom,
            tile_size: self.tile_size,
            max_length: values.len() as u64,
        };

        let store = create_store(path)?;
        let mut attrs = match serde_json::to_value(&metadata)? {
            serde_json::Value::Object(map) => map,
            _ => serde_json::Map::new(),
        };
        attrs.insert("format".to_string(), serde_json::json!(VECTOR_FORMAT));
        write_group(&store, "/", attrs)?;
        write_group(&store, "/resolutions", serde_json::Map::new())?;

        let mut level = values.to_vec();
        let mut level_bins = vec![0u64; max_zoom as usize + 1];
        for zoom in (0..=max_zoom).rev() {
            level_bins[zoom as usize] = level.len() as u64;
            write_array(
                &store,
                &format!("/resolutions/{}", zoom),
                vec![level.len() as u64],
                self.tile_size,
                &level,
            )?;
            if zoom > 0 {
                level = level.chunks(2).map(|pair| pair.iter().sum()).collect();
            }
        }

        tracing::info!(path = %path.display(), length = values.len(), max_zoom, "Wrote vector pyramid");

        Ok(PyramidSummary {
            max_zoom,
            tile_size: self.tile_size,
            level_bins,
            max_width: metadata.max_width(),
        })
    }
}
