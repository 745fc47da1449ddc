//! HTTP request handlers.
//!
//! - `tiles`: tile batches and tileset info
//! - `tilesets`: catalog listing, creation, deletion and filename lookup
//! - `search`: name suggestions
//! - `viewconfs`: view config storage
//! - `chromsizes`: chromosome size tables
//! - `metrics`: health checks and Prometheus metrics

pub mod chromsizes;
pub mod metrics;
pub mod search;
pub mod tiles;
pub mod tilesets;
pub mod viewconfs;

pub use chromsizes::{available_chrom_sizes_handler, chrom_sizes_handler};
pub use metrics::{health_handler, metrics_handler, ready_handler};
pub use search::suggest_handler;
pub use tiles::{tiles_handler, tileset_info_handler};
pub use tilesets::{create_tileset_handler, delete_tileset_handler, list_tilesets_handler, uids_by_filename_handler};
pub use viewconfs::{create_viewconf_handler, get_viewconf_handler};

use tileset_common::TileError;

use crate::error::ApiResult;

/// Query string as ordered pairs, so repeated keys (`d=a&d=b`) survive.
pub type QueryPairs = Vec<(String, String)>;

/// Every value given for `key`, in request order.
pub(crate) fn values(params: &[(String, String)], key: &str) -> Vec<String> {
    params
        .iter()
        .filter(|(k, _)| k == key)
        .map(|(_, v)| v.clone())
        .collect()
}

/// First value given for `key`.
pub(crate) fn first<'a>(params: &'a [(String, String)], key: &str) -> Option<&'a str> {
    params.iter().find(|(k, _)| k == key).map(|(_, v)| v.as_str())
}

/// First non-blank value for `key`, or `InvalidParameter`.
pub(crate) fn required<'a>(params: &'a [(String, String)], key: &str) -> ApiResult<&'a str> {
    first(params, key)
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .ok_or_else(|| TileError::invalid_parameter(key, "required").into())
}

pub(crate) fn number(params: &[(String, String)], key: &str) -> ApiResult<Option<usize>> {
    match first(params, key).map(str::trim).filter(|v| !v.is_empty()) {
        Some(raw) => raw
            .parse()
            .map(Some)
            .map_err(|_| TileError::invalid_parameter(key, format!("'{}' is not a number", raw)).into()),
        None => Ok(None),
    }
}
