//! Matrix pyramid writer.

use std::path::Path;

use tileset_common::{TileError, TransformSpec};

use super::{create_store, write_array, write_group, PyramidSummary};
use crate::reader::{MatrixMetadata, MATRIX_FORMAT};
use crate::types::zoom_levels_for;
use crate::Result;

/// Writes a symmetric contact matrix as a matrix pyramid.
#[derive(Debug, Clone)]
pub struct MatrixPyramidWriter {
    tile_size: u64,
    bin_size: u64,
    transforms: Vec<(TransformSpec, Vec<f32>)>,
}

impl MatrixPyramidWriter {
    pub fn new(tile_size: u64, bin_size: u64) -> Self {
        Self {
            tile_size,
            bin_size,
            transforms: Vec::new(),
        }
    }

    /// Add a balancing transform with weights at the finest resolution.
    ///
    /// Coarser levels use the mean of each finite weight pair.
    pub fn with_transform(mut self, spec: TransformSpec, weights: Vec<f32>) -> Self {
        self.transforms.push((spec, weights));
        self
    }

    /// Write `matrix` (row-major, `n_bins` x `n_bins`) to `path`.
    ///
    /// Only the upper triangle of each level is stored.
    pub fn write(&self, path: &Path, matrix: &[f32], n_bins: usize) -> Result<PyramidSummary> {
        if self.tile_size == 0 || self.bin_size == 0 {
            return Err(TileError::invalid_parameter("tile_size", "tile and bin size must be > 0"));
        }
        if n_bins == 0 || matrix.len() != n_bins * n_bins {
            return Err(TileError::invalid_parameter(
                "matrix",
                format!("expected {} values, got {}", n_bins * n_bins, matrix.len()),
            ));
        }
        if let Some((spec, _)) = self.transforms.iter().find(|(_, w)| w.len() != n_bins) {
            return Err(TileError::invalid_parameter(
                "weights",
                format!("transform '{}' needs {} weights", spec.name, n_bins),
            ));
        }

        let max_zoom = zoom_levels_for(n_bins as u64, self.tile_size);
        let metadata = MatrixMetadata {
            max_zoom,
            tile_size: self.tile_size,
            bin_size: self.bin_size,
            n_bins: n_bins as u64,
            transforms: self.transforms.iter().map(|(spec, _)| spec.clone()).collect(),
        };

        let store = create_store(path)?;
        let mut attrs = match serde_json::to_value(&metadata)? {
            serde_json::Value::Object(map) => map,
            _ => serde_json::Map::new(),
        };
        attrs.insert("format".to_string(), serde_json::json!(MATRIX_FORMAT));
        write_group(&store, "/", attrs)?;
        write_group(&store, "/resolutions", serde_json::Map::new())?;

        let mut level = matrix.to_vec();
        let mut n = n_bins;
        let mut weights: Vec<Vec<f32>> = self.transforms.iter().map(|(_, w)| w.clone()).collect();
        let mut level_bins = vec![0u64; max_zoom as usize + 1];

        for zoom in (0..=max_zoom).rev() {
            level_bins[zoom as usize] = n as u64;
            write_group(&store, &format!("/resolutions/{}", zoom), serde_json::Map::new())?;
            write_array(
                &store,
                &format!("/resolutions/{}/counts", zoom),
                vec![n as u64, n as u64],
                self.tile_size,
                &upper_triangle(&level, n),
            )?;

            if !self.transforms.is_empty() {
                write_group(&store, &format!("/resolutions/{}/weights", zoom), serde_json::Map::new())?;
                for ((spec, _), w) in self.transforms.iter().zip(&weights) {
                    write_array(
                        &store,
                        &format!("/resolutions/{}/weights/{}", zoom, spec.value),
                        vec![n as u64],
                        self.tile_size,
                        w,
                    )?;
                }
            }

            if zoom > 0 {
                let (coarse, coarse_n) = coarsen(&level, n);
                level = coarse;
                n = coarse_n;
                weights = weights.iter().map(|w| coarsen_weights(w)).collect();
            }
        }

        tracing::info!(
            path = %path.display(),
            n_bins,
            max_zoom,
            "Wrote matrix pyramid"
        );

        Ok(PyramidSummary {
            max_zoom,
            tile_size: self.tile_size,
            level_bins,
            max_width: metadata.max_width(),
        })
    }
}

fn upper_triangle(matrix: &[f32], n: usize) -> Vec<f32> {
    let mut out = matrix.to_vec();
    for r in 1..n {
        for c in 0..r {
            out[r * n + c] = 0.0;
        }
    }
    out
}

/// Sum 2x2 blocks.
fn coarsen(matrix: &[f32], n: usize) -> (Vec<f32>, usize) {
    let coarse_n = (n + 1) / 2;
    let mut out = vec![0.0f32; coarse_n * coarse_n];
    for r in 0..n {
        for c in 0..n {
            out[(r / 2) * coarse_n + c / 2] += matrix[r * n + c];
        }
    }
    (out, coarse_n)
}

fn coarsen_weights(weights: &[f32]) -> Vec<f32> {
    weights
        .chunks(2)
        .map(|pair| {
            let finite: Vec<f32> = pair.iter().copied().filter(|w| w.is_finite()).collect();
            if finite.is_empty() {
                f32::NAN
            } else {
                finite.iter().sum::<f32>() / finite.len() as f32
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_coarsen_odd_size() {
        let m = vec![1.0; 9];
        let (coarse, n) = coarsen(&m, 3);
        assert_eq!(n, 2);
        assert_eq!(coarse, vec![4.0, 2.0, 2.0, 1.0]);
    }

    #[test]
    fn test_upper_triangle() {
        let m = vec![1.0, 2.0, 2.0, 3.0];
        assert_eq!(upper_triangle(&m, 2), vec![1.0, 2.0, 0.0, 3.0]);
    }

    #[test]
    fn test_coarsen_weights() {
        let w = coarsen_weights(&[1.0, 3.0, f32::NAN, 2.0, f32::NAN]);
        assert_eq!(w[0], 2.0);
        assert_eq!(w[1], 2.0);
        assert!(w[2].is_nan());
    }

    #[test]
    fn test_rejects_bad_input() {
        let dir = tempfile::tempdir().unwrap();
        let writer = MatrixPyramidWriter::new(16, 1000);
        assert!(writer.write(dir.path(), &[1.0; 3], 2).is_err());
        assert!(writer.write(dir.path(), &[], 0).is_err());

        let writer = MatrixPyramidWriter::new(16, 1000).with_transform(
            TransformSpec {
                name: "ICE".into(),
                value: "weight".into(),
            },
            vec![1.0],
        );
        assert!(writer.write(dir.path(), &[1.0; 4], 2).is_err());
    }
}
