//! Common types shared across the genomic tile server crates.

pub mod address;
pub mod dataset;
pub mod error;
pub mod info;
pub mod payload;
pub mod sql;

pub use address::{TileAddress, TileCoords, Transform};
pub use dataset::{DatasetFilter, DatasetRecord, FileType, NewDataset, Requester, ViewConf};
pub use error::{TileError, TileResult};
pub use info::{InfoEntry, TilesetInfo, TransformSpec};
pub use payload::{DenseTile, Feature, TilePayload};
pub use sql::escape_like;
