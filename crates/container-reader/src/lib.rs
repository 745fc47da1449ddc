//! Multi-resolution container access for genomic tiles.
//!
//! This crate opens the on-disk containers behind each dataset and cuts
//! tiles out of them:
//!
//! - **Matrix pyramids**: symmetric contact matrices stored as Zarr V3
//!   arrays, one per zoom level, with optional balancing weights
//! - **Vector pyramids**: dense 1D signal, one Zarr array per zoom level
//! - **Interval databases**: SQLite files of importance-ranked features,
//!   in linear, paired (2D) or stacked layouts
//! - **Chrom-sizes tables**: chromosome name/length lists
//!
//! # Architecture
//!
//! ```text
//! Tile request (path, kind, zoom, coords, transform)
//!      │
//!      ▼
//! HandleCache::acquire(path, kind)
//!      │
//!      ├─► Entry present: reuse the open ContainerHandle
//!      │
//!      └─► Entry missing: single open per path, shared by waiters
//!               │
//!               ▼
//! ContainerHandle::read_tile(zoom, coords, transform)
//!      │
//!      ├─► Matrix: read block, mirror, apply weights, quantize
//!      ├─► Vector: read bin run, zero-fill, quantize
//!      └─► Intervals: ranked SQL query, bounded rows per tile
//!               │
//!               ▼
//!          TilePayload
//! ```
//!
//! The [`writer`] module produces the same layouts and is used by ingestion
//! tooling and tests.

pub mod cache;
pub mod config;
pub mod handle;
pub mod reader;
pub mod types;
pub mod writer;

// Re-export commonly used types at crate root
pub use cache::HandleCache;
pub use config::ReaderConfig;
pub use handle::ContainerHandle;
pub use reader::{
    ChromEntry, ChromSizes, IntervalDb, IntervalLayout, MatrixPyramid, Suggestion, TileReader,
    VectorPyramid,
};
pub use types::{CacheStats, ContainerKind};
pub use writer::{
    IntervalDbMeta, IntervalDbWriter, IntervalRecord, MatrixPyramidWriter, PyramidSummary, VectorPyramidWriter,
};

/// Result type for container operations.
pub type Result<T> = std::result::Result<T, tileset_common::TileError>;
