use axum::{
    extract::{Query, State},
    Extension, Json,
};
use lithocore_core::NormalizedLocality;
use lithocore_mindat::normalize_locality;
use serde::{Deserialize, Serialize};

use super::{map_provider_error, ApiError, AppState};
use crate::middleware::RequestId;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct LocalitiesQuery {
    mineral_id: Option<String>,
}

/// One locality as served to the map client. Unplaceable records are
/// included with null coordinates and no route link.
#[derive(Debug, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub(super) struct LocalityItem {
    id: i64,
    name: String,
    latitude: Option<f64>,
    longitude: Option<f64>,
    status: Option<String>,
    description: String,
    country: Option<String>,
    route_link: Option<String>,
}

impl From<NormalizedLocality> for LocalityItem {
    fn from(locality: NormalizedLocality) -> Self {
        let route_link = locality.route_link();
        Self {
            id: locality.id,
            latitude: locality.coordinate.map(|c| c.latitude()),
            longitude: locality.coordinate.map(|c| c.longitude()),
            name: locality.name,
            status: locality.raw_status,
            description: locality.description,
            country: locality.country,
            route_link,
        }
    }
}

#[derive(Debug, Serialize)]
pub(super) struct LocalitiesResponse {
    localities: Vec<LocalityItem>,
}

pub(super) fn parse_mineral_id(raw: Option<&str>) -> Result<i64, ApiError> {
    let raw = raw
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .ok_or_else(|| ApiError::bad_request("Missing mineralId parameter"))?;
    raw.parse::<i64>()
        .ok()
        .filter(|id| *id > 0)
        .ok_or_else(|| ApiError::bad_request("Invalid mineralId parameter"))
}

pub(super) async fn list_localities(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(params): Query<LocalitiesQuery>,
) -> Result<Json<LocalitiesResponse>, ApiError> {
    let mineral_id = parse_mineral_id(params.mineral_id.as_deref())?;

    let raw = state
        .client
        .fetch_localities_by_id(mineral_id)
        .await
        .map_err(|e| map_provider_error(&req_id.0, &e, "localities"))?;

    let localities: Vec<LocalityItem> = raw
        .iter()
        .map(|r| LocalityItem::from(normalize_locality(r)))
        .collect();

    tracing::debug!(
        request_id = %req_id.0,
        mineral_id,
        count = localities.len(),
        "localities served"
    );
    Ok(Json(LocalitiesResponse { localities }))
}
