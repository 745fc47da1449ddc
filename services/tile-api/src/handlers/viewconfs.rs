//! View config storage endpoints.

use std::sync::Arc;

use axum::{
    extract::{Extension, Query},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use super::{required, QueryPairs};
use crate::error::ApiResult;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ViewConfUpload {
    #[serde(default)]
    pub uid: Option<String>,
    pub viewconf: serde_json::Value,
}

#[derive(Debug, Serialize)]
pub struct ViewConfCreated {
    pub uid: String,
}

/// GET /api/v1/viewconfs/?d=uid - The stored document
#[instrument(skip(state))]
pub async fn get_viewconf_handler(
    Extension(state): Extension<Arc<AppState>>,
    Query(params): Query<QueryPairs>,
) -> ApiResult<Json<serde_json::Value>> {
    let uid = required(&params, "d")?;
    let stored = state.service.get_viewconf(uid).await?;

    Ok(Json(stored.document))
}

/// POST /api/v1/viewconfs/ - Store a document under `uid` or a new id
#[instrument(skip(state, upload))]
pub async fn create_viewconf_handler(
    Extension(state): Extension<Arc<AppState>>,
    Json(upload): Json<ViewConfUpload>,
) -> ApiResult<Json<ViewConfCreated>> {
    let stored = state.service.create_viewconf(upload.uid, upload.viewconf).await?;
    info!(uid = %stored.uuid, "Stored view config");

    Ok(Json(ViewConfCreated { uid: stored.uuid }))
}
