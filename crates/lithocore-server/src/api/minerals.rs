use axum::{
    extract::{Query, State},
    Extension, Json,
};
use lithocore_core::MineralSummary;
use serde::{Deserialize, Serialize};

use super::{map_provider_error, ApiError, AppState};
use crate::middleware::RequestId;

#[derive(Debug, Deserialize)]
pub(super) struct SearchMineralQuery {
    query: Option<String>,
}

#[derive(Debug, Serialize)]
pub(super) struct MineralsResponse {
    minerals: Vec<MineralSummary>,
}

pub(super) async fn search_mineral(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(params): Query<SearchMineralQuery>,
) -> Result<Json<MineralsResponse>, ApiError> {
    let query = params
        .query
        .as_deref()
        .map(str::trim)
        .filter(|q| !q.is_empty())
        .ok_or_else(|| ApiError::bad_request("Missing query parameter"))?;

    let minerals = state
        .client
        .search_geomaterials(query)
        .await
        .map_err(|e| map_provider_error(&req_id.0, &e, "minerals"))?;

    tracing::debug!(request_id = %req_id.0, query, hits = minerals.len(), "mineral search served");
    Ok(Json(MineralsResponse { minerals }))
}
