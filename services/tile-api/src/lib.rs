//! HTTP API for the genomic tile server.
//!
//! Routes follow the `/api/v1/...` layout that tile viewers expect; every
//! handler forwards to [`tile_engine::TileService`].

pub mod config;
pub mod error;
pub mod handlers;
pub mod state;

use std::sync::Arc;

use axum::{
    extract::Extension,
    routing::{delete, get},
    Router,
};
use metrics_exporter_prometheus::PrometheusHandle;
use tower_http::{compression::CompressionLayer, cors::CorsLayer, trace::TraceLayer};

pub use config::ServiceConfig;
pub use state::AppState;

/// Build the application router.
///
/// `prometheus` is `None` when no recorder is installed (tests); `/metrics`
/// then answers 503.
pub fn build_router(state: Arc<AppState>, prometheus: Option<PrometheusHandle>) -> Router {
    Router::new()
        // Tiles
        .route("/api/v1/tiles/", get(handlers::tiles_handler))
        .route("/api/v1/tileset_info/", get(handlers::tileset_info_handler))
        // Catalog
        .route(
            "/api/v1/tilesets/",
            get(handlers::list_tilesets_handler).post(handlers::create_tileset_handler),
        )
        .route("/api/v1/tilesets/:uuid/", delete(handlers::delete_tileset_handler))
        .route("/api/v1/uids_by_filename/", get(handlers::uids_by_filename_handler))
        .route("/api/v1/suggest/", get(handlers::suggest_handler))
        // View configs
        .route(
            "/api/v1/viewconfs/",
            get(handlers::get_viewconf_handler).post(handlers::create_viewconf_handler),
        )
        // Chromosome sizes
        .route("/api/v1/available-chrom-sizes/", get(handlers::available_chrom_sizes_handler))
        .route("/api/v1/chrom-sizes/", get(handlers::chrom_sizes_handler))
        // Health check
        .route("/health", get(handlers::health_handler))
        .route("/ready", get(handlers::ready_handler))
        // Metrics
        .route("/metrics", get(handlers::metrics_handler))
        // Layer extensions
        .layer(Extension(state))
        .layer(Extension(prometheus))
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new())
        .layer(CorsLayer::permissive())
}
