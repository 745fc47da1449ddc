//! Name suggestions over annotation tilesets.

use std::sync::Arc;

use axum::{
    extract::{Extension, Query},
    http::HeaderMap,
    response::{IntoResponse, Response},
    Json,
};
use tracing::{debug, instrument};

use super::{first, required, QueryPairs};
use crate::error::ApiResult;
use crate::state::AppState;

/// GET /api/v1/suggest/?d=uuid&ac=text - Features whose names contain `ac`
///
/// Unknown or unsearchable tilesets answer with an empty list.
#[instrument(skip(state, headers))]
pub async fn suggest_handler(
    Extension(state): Extension<Arc<AppState>>,
    headers: HeaderMap,
    Query(params): Query<QueryPairs>,
) -> ApiResult<Response> {
    let requester = state.requester(&headers);
    let uuid = required(&params, "d")?;
    let text = first(&params, "ac").unwrap_or("");

    let hits = state.service.suggest(&requester, uuid, text).await?;
    debug!(uuid = %uuid, text = %text, hits = hits.len(), "Suggest");

    Ok(Json(hits).into_response())
}
