//! Tile and tileset-info endpoints.

use std::sync::Arc;

use axum::{
    extract::{Extension, Query},
    http::HeaderMap,
    Json,
};
use tile_engine::{InfoBatch, TileBatch};
use tracing::{debug, instrument};

use super::{values, QueryPairs};
use crate::state::AppState;

/// GET /api/v1/tiles/?d=uuid.z.x[.y][.transform] - Batch of tiles
///
/// Addresses that cannot be served are left out of the response.
#[instrument(skip(state, headers))]
pub async fn tiles_handler(
    Extension(state): Extension<Arc<AppState>>,
    headers: HeaderMap,
    Query(params): Query<QueryPairs>,
) -> Json<TileBatch> {
    let requester = state.requester(&headers);
    let addresses = values(&params, "d");
    debug!(requested = addresses.len(), requester = %requester, "Tile request");

    Json(state.service.get_tiles(&requester, &addresses).await)
}

/// GET /api/v1/tileset_info/?d=uuid - Tileset info per id
///
/// Ids that cannot be described get an `{"error": ...}` entry.
#[instrument(skip(state, headers))]
pub async fn tileset_info_handler(
    Extension(state): Extension<Arc<AppState>>,
    headers: HeaderMap,
    Query(params): Query<QueryPairs>,
) -> Json<InfoBatch> {
    let requester = state.requester(&headers);
    let ids = values(&params, "d");

    Json(state.service.get_tileset_info(&requester, &ids).await)
}
