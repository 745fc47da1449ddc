//! Metric names and recording helpers.

use container_reader::CacheStats;

pub const TILES_SERVED: &str = "tiles_served_total";
pub const TILES_OMITTED: &str = "tiles_omitted_total";
pub const TILESET_INFO_ERRORS: &str = "tileset_info_errors_total";
pub const BATCH_SIZE: &str = "tile_batch_size";
pub const DATASETS_CREATED: &str = "datasets_created_total";
pub const DATASETS_DELETED: &str = "datasets_deleted_total";
pub const HANDLE_CACHE_HITS: &str = "handle_cache_hits";
pub const HANDLE_CACHE_MISSES: &str = "handle_cache_misses";
pub const HANDLE_CACHE_ENTRIES: &str = "handle_cache_entries";
pub const HANDLE_CACHE_EVICTIONS: &str = "handle_cache_evictions";

pub(crate) fn record_tile_served(file_type: &str) {
    metrics::counter!(TILES_SERVED, "filetype" => file_type.to_string()).increment(1);
}

pub(crate) fn record_tile_omitted(reason: &'static str) {
    metrics::counter!(TILES_OMITTED, "reason" => reason).increment(1);
}

pub(crate) fn record_info_error(reason: &'static str) {
    metrics::counter!(TILESET_INFO_ERRORS, "reason" => reason).increment(1);
}

pub(crate) fn record_batch(kind: &'static str, size: usize) {
    metrics::histogram!(BATCH_SIZE, "kind" => kind).record(size as f64);
}

pub(crate) fn record_dataset_created(file_type: &str) {
    metrics::counter!(DATASETS_CREATED, "filetype" => file_type.to_string()).increment(1);
}

pub(crate) fn record_dataset_deleted() {
    metrics::counter!(DATASETS_DELETED).increment(1);
}

/// Publish handle cache statistics as gauges.
pub fn publish_cache_stats(stats: &CacheStats) {
    metrics::gauge!(HANDLE_CACHE_HITS).set(stats.hits as f64);
    metrics::gauge!(HANDLE_CACHE_MISSES).set(stats.misses as f64);
    metrics::gauge!(HANDLE_CACHE_ENTRIES).set(stats.entries as f64);
    metrics::gauge!(HANDLE_CACHE_EVICTIONS).set(stats.evictions as f64);
}
