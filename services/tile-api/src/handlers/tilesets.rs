//! Dataset catalog endpoints.

use std::sync::Arc;

use axum::{
    extract::{Extension, Path, Query},
    http::{HeaderMap, StatusCode},
    Json,
};
use tile_engine::{ListQuery, ListResult};
use tileset_common::{DatasetFilter, DatasetRecord, FileType, NewDataset};
use tracing::{info, instrument};

use super::{first, number, required, values, QueryPairs};
use crate::error::ApiResult;
use crate::state::AppState;

// ============================================================================
// Query Parameters
// ============================================================================

/// Build a listing query from `dt`, `t`, `ac`, `o`, `r`, `offset` and `limit`.
fn list_query(params: &[(String, String)]) -> ApiResult<ListQuery> {
    let filter = DatasetFilter {
        data_types: values(params, "dt"),
        file_type: first(params, "t").map(FileType::parse),
        name_contains: first(params, "ac")
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(String::from),
        file_name: None,
    };

    Ok(ListQuery {
        filter,
        order_by: first(params, "o").map(String::from),
        reverse: matches!(first(params, "r"), Some("1") | Some("true")),
        offset: number(params, "offset")?.unwrap_or(0),
        limit: number(params, "limit")?,
    })
}

// ============================================================================
// Handlers
// ============================================================================

/// GET /api/v1/tilesets/ - List visible tilesets
#[instrument(skip(state, headers))]
pub async fn list_tilesets_handler(
    Extension(state): Extension<Arc<AppState>>,
    headers: HeaderMap,
    Query(params): Query<QueryPairs>,
) -> ApiResult<Json<ListResult<DatasetRecord>>> {
    let requester = state.requester(&headers);
    let query = list_query(&params)?;

    Ok(Json(state.service.list_datasets(&requester, &query).await?))
}

/// POST /api/v1/tilesets/ - Register a tileset owned by the caller
#[instrument(skip(state, headers))]
pub async fn create_tileset_handler(
    Extension(state): Extension<Arc<AppState>>,
    headers: HeaderMap,
    Json(new): Json<NewDataset>,
) -> ApiResult<(StatusCode, Json<DatasetRecord>)> {
    let requester = state.requester(&headers);
    let record = state.service.create_dataset(&requester, new).await?;

    Ok((StatusCode::CREATED, Json(record)))
}

/// DELETE /api/v1/tilesets/:uuid/ - Delete a tileset the caller owns
#[instrument(skip(state, headers))]
pub async fn delete_tileset_handler(
    Extension(state): Extension<Arc<AppState>>,
    headers: HeaderMap,
    Path(uuid): Path<String>,
) -> ApiResult<StatusCode> {
    let requester = state.requester(&headers);
    state.service.delete_dataset(&requester, &uuid).await?;
    info!(uuid = %uuid, "Tileset deleted via API");

    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/v1/uids_by_filename/?d=name - Ids of tilesets with this file name
#[instrument(skip(state, headers))]
pub async fn uids_by_filename_handler(
    Extension(state): Extension<Arc<AppState>>,
    headers: HeaderMap,
    Query(params): Query<QueryPairs>,
) -> ApiResult<Json<ListResult<String>>> {
    let requester = state.requester(&headers);
    let file_name = required(&params, "d")?;

    Ok(Json(state.service.uids_by_filename(&requester, file_name).await?))
}
