//! Helpers shared by the Zarr pyramid readers.

use std::path::Path;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use tileset_common::TileError;
use zarrs::array::Array;
use zarrs::array_subset::ArraySubset;
use zarrs::group::Group;
use zarrs_filesystem::FilesystemStore;

use crate::Result;

/// Open a filesystem store rooted at a pyramid directory.
pub(crate) fn open_store(path: &Path) -> Result<Arc<FilesystemStore>> {
    if !path.is_dir() {
        return Err(TileError::not_found(format!(
            "container directory {}",
            path.display()
        )));
    }
    let store = FilesystemStore::new(path).map_err(|e| TileError::malformed(path.display(), e))?;
    Ok(Arc::new(store))
}

/// Parse the root group attributes, checking the `format` marker.
pub(crate) fn root_metadata<T: DeserializeOwned>(
    store: &Arc<FilesystemStore>,
    path: &Path,
    format: &str,
) -> Result<T> {
    let group = Group::open(store.clone(), "/").map_err(|e| TileError::malformed(path.display(), e))?;
    let attrs = group.attributes();

    match attrs.get("format").and_then(|v| v.as_str()) {
        Some(found) if found == format => {}
        found => {
            return Err(TileError::malformed(
                path.display(),
                format!("expected format '{}', found {:?}", format, found),
            ))
        }
    }

    serde_json::from_value(serde_json::Value::Object(attrs.clone()))
        .map_err(|e| TileError::malformed(path.display(), e))
}

/// Open an array inside the pyramid.
pub(crate) fn open_array(
    store: &Arc<FilesystemStore>,
    path: &Path,
    array_path: &str,
) -> Result<Array<FilesystemStore>> {
    Array::open(store.clone(), array_path)
        .map_err(|e| TileError::malformed(path.display(), format!("{}: {}", array_path, e)))
}

/// First bin of tile `index` when tiles are `tile_size` bins wide.
pub(crate) fn tile_origin(index: u64, tile_size: u64, path: &Path) -> Result<u64> {
    index.checked_mul(tile_size).ok_or_else(|| {
        TileError::malformed(
            path.display(),
            format!("tile {} of {} bins overflows the bin index", index, tile_size),
        )
    })
}

/// Number of elements in a block of `shape`.
fn block_len(shape: &[u64], path: &Path) -> Result<usize> {
    shape
        .iter()
        .try_fold(1u64, |acc, &len| acc.checked_mul(len))
        .and_then(|len| usize::try_from(len).ok())
        .ok_or_else(|| TileError::malformed(path.display(), format!("block {:?} is too large", shape)))
}

/// Read a rectangular block, clipped to the array shape and zero-filled to
/// `shape`.
pub(crate) fn read_block(
    array: &Array<FilesystemStore>,
    path: &Path,
    start: &[u64],
    shape: &[u64],
) -> Result<Vec<f32>> {
    let extent = array.shape();
    let mut out = vec![0.0f32; block_len(shape, path)?];

    let clipped: Vec<u64> = start
        .iter()
        .zip(shape)
        .zip(extent)
        .map(|((&s, &len), &ext)| if s >= ext { 0 } else { len.min(ext - s) })
        .collect();
    if clipped.iter().any(|&len| len == 0) {
        return Ok(out);
    }

    let subset = ArraySubset::new_with_start_shape(start.to_vec(), clipped.clone())
        .map_err(|e| TileError::malformed(path.display(), e))?;
    let data: Vec<f32> = array
        .retrieve_array_subset_elements(&subset)
        .map_err(|e| TileError::malformed(path.display(), e))?;

    match clipped.as_slice() {
        [len] => {
            out[..*len as usize].copy_from_slice(&data);
        }
        [rows, cols] => {
            let (rows, cols) = (*rows as usize, *cols as usize);
            let out_cols = shape[1] as usize;
            for r in 0..rows {
                out[r * out_cols..r * out_cols + cols]
                    .copy_from_slice(&data[r * cols..(r + 1) * cols]);
            }
        }
        _ => {
            return Err(TileError::malformed(
                path.display(),
                "only 1D and 2D arrays are supported",
            ))
        }
    }

    Ok(out)
}

/// Read an entire 1D array.
pub(crate) fn read_all(array: &Array<FilesystemStore>, path: &Path) -> Result<Vec<f32>> {
    let subset = ArraySubset::new_with_shape(array.shape().to_vec());
    array
        .retrieve_array_subset_elements(&subset)
        .map_err(|e| TileError::malformed(path.display(), e))
}
