//! Shared types for container access.

use serde::{Deserialize, Serialize};
use tileset_common::FileType;

/// Container layout a handle is opened as.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ContainerKind {
    Matrix,
    Vector,
    LinearIntervals,
    PairedIntervals,
    StackedIntervals,
    ChromSizes,
}

impl ContainerKind {
    /// Container kind backing a dataset file type, if it has one.
    pub fn for_file_type(file_type: &FileType) -> Option<Self> {
        match file_type {
            FileType::MatrixPyramid => Some(Self::Matrix),
            FileType::VectorPyramid => Some(Self::Vector),
            FileType::AnnotationDb => Some(Self::LinearIntervals),
            FileType::Annotation2dDb => Some(Self::PairedIntervals),
            FileType::StackedInterval => Some(Self::StackedIntervals),
            FileType::ChromSizes => Some(Self::ChromSizes),
            FileType::Other(_) => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Matrix => "matrix",
            Self::Vector => "vector",
            Self::LinearIntervals => "linear_intervals",
            Self::PairedIntervals => "paired_intervals",
            Self::StackedIntervals => "stacked_intervals",
            Self::ChromSizes => "chromsizes",
        }
    }
}

/// Cache statistics for monitoring.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub entries: usize,
    pub opens: u64,
    pub evictions: u64,
}

impl CacheStats {
    /// Calculate the cache hit rate (0.0 - 1.0).
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

/// Smallest `m` with `tile_size * 2^m >= length`.
pub(crate) fn zoom_levels_for(length: u64, tile_size: u64) -> u32 {
    let mut zoom = 0;
    while zoom < 63 && tile_size.saturating_mul(1u64 << zoom) < length {
        zoom += 1;
    }
    zoom
}
