//! Chromosome size endpoints.

use std::sync::Arc;

use axum::{
    extract::{Extension, Query},
    http::{header, HeaderMap},
    response::{IntoResponse, Response},
    Json,
};
use tile_engine::{ChromSizesBody, ChromSizesFormat, ListResult};
use tileset_common::DatasetRecord;
use tracing::instrument;

use super::{first, required, QueryPairs};
use crate::error::ApiResult;
use crate::state::AppState;

/// GET /api/v1/available-chrom-sizes/ - Visible chrom-sizes tilesets
#[instrument(skip(state, headers))]
pub async fn available_chrom_sizes_handler(
    Extension(state): Extension<Arc<AppState>>,
    headers: HeaderMap,
) -> ApiResult<Json<ListResult<DatasetRecord>>> {
    let requester = state.requester(&headers);
    Ok(Json(state.service.available_chrom_sizes(&requester).await?))
}

/// GET /api/v1/chrom-sizes/?id=uuid&type=tsv|json - One chromosome table
#[instrument(skip(state, headers))]
pub async fn chrom_sizes_handler(
    Extension(state): Extension<Arc<AppState>>,
    headers: HeaderMap,
    Query(params): Query<QueryPairs>,
) -> ApiResult<Response> {
    let requester = state.requester(&headers);
    let uuid = required(&params, "id")?;
    let format = ChromSizesFormat::parse(first(&params, "type").unwrap_or(""))?;

    Ok(match state.service.chrom_sizes(&requester, uuid, format).await? {
        ChromSizesBody::Tsv(text) => ([(header::CONTENT_TYPE, "text/plain; charset=utf-8")], text).into_response(),
        ChromSizesBody::Json(map) => Json(map).into_response(),
    })
}
