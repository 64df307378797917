use axum::{
    extract::{Path, State},
    Json,
};
use lithocore_core::Category;
use lithocore_layers::LayerSnapshot;
use serde::{Deserialize, Serialize};

use super::{ApiError, AppState};

#[derive(Debug, Serialize)]
pub(super) struct LayersResponse {
    layers: Vec<LayerSnapshot>,
}

#[derive(Debug, Deserialize)]
pub(super) struct VisibilityBody {
    visible: bool,
}

pub(super) async fn list_layers(State(state): State<AppState>) -> Json<LayersResponse> {
    Json(LayersResponse {
        layers: state.search.snapshot().await,
    })
}

/// Shows or hides one category. Buckets keep their markers either way.
pub(super) async fn set_layer_visibility(
    State(state): State<AppState>,
    Path(category): Path<String>,
    Json(body): Json<VisibilityBody>,
) -> Result<Json<LayersResponse>, ApiError> {
    let category = category
        .parse::<Category>()
        .map_err(|_| ApiError::not_found(format!("Unknown layer '{category}'")))?;

    state.search.set_layer_visible(category, body.visible).await;
    tracing::debug!(%category, visible = body.visible, "layer visibility changed");

    Ok(Json(LayersResponse {
        layers: state.search.snapshot().await,
    }))
}
