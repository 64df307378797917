mod layers;
mod localities;
mod minerals;
mod search;

use std::time::Duration;

use axum::{
    extract::State,
    http::{header, HeaderName, HeaderValue, Method, StatusCode},
    response::IntoResponse,
    routing::{get, put},
    Json, Router,
};
use lithocore_layers::SharedSearchController;
use lithocore_mindat::{MindatClient, MindatError};
use serde::Serialize;
use tower::ServiceBuilder;
use tower_http::{
    compression::CompressionLayer, cors::CorsLayer, set_header::SetResponseHeaderLayer,
    trace::TraceLayer,
};

use crate::middleware::{enforce_rate_limit, request_id, RateLimitState};

#[derive(Clone)]
pub struct AppState {
    pub client: MindatClient,
    pub search: SharedSearchController<MindatClient>,
}

/// Error response. The body is always `{"error": "<short message>"}`; the
/// provider's own error body and the credential never reach it.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new(StatusCode::CONFLICT, message)
    }

    pub fn provider_not_configured() -> Self {
        Self::new(
            StatusCode::SERVICE_UNAVAILABLE,
            "Mineral data provider is not configured",
        )
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        (
            self.status,
            Json(ErrorBody {
                error: self.message,
            }),
        )
            .into_response()
    }
}

/// Maps a provider failure to a response, logging the detail.
///
/// `what` names the resource in the user-facing message, e.g. `"minerals"`.
pub(super) fn map_provider_error(request_id: &str, error: &MindatError, what: &str) -> ApiError {
    match error {
        MindatError::Configuration(_) => {
            tracing::warn!(request_id, "provider request rejected: credential missing");
            ApiError::provider_not_configured()
        }
        other => {
            tracing::error!(request_id, error = %other, "Mindat request failed");
            ApiError::new(
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Failed to fetch {what} from Mindat"),
            )
        }
    }
}

#[derive(Debug, Serialize, PartialEq, Eq)]
struct HealthData {
    status: &'static str,
    provider: &'static str,
}

fn build_cors() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::GET, Method::PUT])
        .allow_headers([
            header::CONTENT_TYPE,
            HeaderName::from_static("x-request-id"),
        ])
}

fn api_router(rate_limit: RateLimitState) -> Router<AppState> {
    Router::new()
        .route("/api/searchMineral", get(minerals::search_mineral))
        .route("/api/localities", get(localities::list_localities))
        .route("/api/search", get(search::run_search))
        .route("/api/select", get(search::select_mineral))
        .route("/api/layers", get(layers::list_layers))
        .route("/api/layers/{category}", put(layers::set_layer_visibility))
        .layer(axum::middleware::from_fn_with_state(
            rate_limit,
            enforce_rate_limit,
        ))
}

pub fn build_app(state: AppState, rate_limit: RateLimitState) -> Router {
    let public_routes = Router::new().route("/api/health", get(health));

    Router::new()
        .merge(public_routes)
        .merge(api_router(rate_limit))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(build_cors())
                .layer(CompressionLayer::new())
                .layer(SetResponseHeaderLayer::overriding(
                    header::CACHE_CONTROL,
                    HeaderValue::from_static("no-store"),
                ))
                .layer(axum::middleware::from_fn(request_id)),
        )
        .with_state(state)
}

async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let provider = if state.client.has_credential() {
        "configured"
    } else {
        "missing"
    };
    Json(HealthData {
        status: "ok",
        provider,
    })
}

#[must_use]
pub fn rate_limit_state(per_minute: usize) -> RateLimitState {
    RateLimitState::new(per_minute, Duration::from_secs(60))
}
