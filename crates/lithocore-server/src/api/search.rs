use axum::{
    extract::{Query, State},
    Extension, Json,
};
use lithocore_layers::{
    LayerSnapshot, Notice, RecordingSurface, SearchMode, SessionBusy, SessionReport,
};
use serde::{Deserialize, Serialize};

use super::localities::parse_mineral_id;
use super::{ApiError, AppState};
use crate::middleware::RequestId;

#[derive(Debug, Deserialize)]
pub(super) struct SearchQuery {
    query: Option<String>,
    mode: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct SelectQuery {
    mineral_id: Option<String>,
    name: Option<String>,
}

/// A finished session plus everything the session showed the user and the
/// resulting layer state.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct SessionResponse {
    #[serde(flatten)]
    report: SessionReport,
    notices: Vec<Notice>,
    layers: Vec<LayerSnapshot>,
}

fn busy(req_id: &RequestId, _: SessionBusy) -> ApiError {
    tracing::info!(request_id = %req_id.0, "search rejected: session already in flight");
    ApiError::conflict("A search is already in progress")
}

async fn respond(
    state: &AppState,
    report: SessionReport,
    surface: RecordingSurface,
) -> Json<SessionResponse> {
    let layers = state.search.snapshot().await;
    Json(SessionResponse {
        report,
        notices: surface.notices,
        layers,
    })
}

pub(super) async fn run_search(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(params): Query<SearchQuery>,
) -> Result<Json<SessionResponse>, ApiError> {
    let query = params
        .query
        .as_deref()
        .map(str::trim)
        .filter(|q| !q.is_empty())
        .ok_or_else(|| ApiError::bad_request("Missing query parameter"))?;

    let mode = match params.mode.as_deref() {
        None => SearchMode::default(),
        Some(raw) => raw
            .parse::<SearchMode>()
            .map_err(|_| ApiError::bad_request("Invalid mode parameter"))?,
    };

    if !state.search.has_credential() {
        return Err(ApiError::provider_not_configured());
    }

    let mut surface = RecordingSurface::new();
    let report = state
        .search
        .try_submit(query, mode, &mut surface)
        .await
        .map_err(|e| busy(&req_id, e))?;

    tracing::info!(
        request_id = %req_id.0,
        query,
        status = ?report.status,
        placed = report.placed,
        "search served"
    );
    Ok(respond(&state, report, surface).await)
}

pub(super) async fn select_mineral(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(params): Query<SelectQuery>,
) -> Result<Json<SessionResponse>, ApiError> {
    let mineral_id = parse_mineral_id(params.mineral_id.as_deref())?;
    let name = params
        .name
        .as_deref()
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .map_or_else(|| format!("Mineral #{mineral_id}"), str::to_string);

    if !state.search.has_credential() {
        return Err(ApiError::provider_not_configured());
    }

    let mut surface = RecordingSurface::new();
    let report = state
        .search
        .try_select_mineral(mineral_id, &name, &mut surface)
        .await
        .map_err(|e| busy(&req_id, e))?;

    tracing::info!(
        request_id = %req_id.0,
        mineral_id,
        status = ?report.status,
        placed = report.placed,
        "mineral selection served"
    );
    Ok(respond(&state, report, surface).await)
}
