//! Catalog RPC surface.
//!
//! Two operations: a filtered list (`POST /v1/parts/list`) that never
//! errors for an empty result, and a point lookup
//! (`GET /v1/parts/:part_uuid`).

use crate::error::InventoryError;
use crate::model::{Part, PartsFilter};
use crate::service::InventoryService;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

/// Shared handler state.
pub struct ApiState {
    /// The catalog service.
    pub service: InventoryService,
}

/// Build the catalog router.
pub fn router(state: Arc<ApiState>) -> Router {
    Router::new()
        .route("/v1/parts/list", post(list_parts))
        .route("/v1/parts/:part_uuid", get(get_part))
        .route("/health", get(health))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[derive(Debug, Deserialize)]
struct ListPartsRequest {
    #[serde(default)]
    filter: PartsFilter,
}

#[derive(Debug, Serialize)]
struct ListPartsResponse {
    parts: Vec<Part>,
}

async fn list_parts(
    State(state): State<Arc<ApiState>>,
    Json(req): Json<ListPartsRequest>,
) -> Result<Json<ListPartsResponse>, ApiError> {
    let parts = state.service.list_parts(&req.filter).await?;
    Ok(Json(ListPartsResponse { parts }))
}

async fn get_part(
    State(state): State<Arc<ApiState>>,
    Path(part_uuid): Path<String>,
) -> Result<Json<Part>, ApiError> {
    let part = state.service.part(&part_uuid).await?;
    Ok(Json(part))
}

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

/// Response-side wrapper for [`InventoryError`].
#[derive(Debug)]
pub struct ApiError(pub InventoryError);

impl From<InventoryError> for ApiError {
    fn from(err: InventoryError) -> Self {
        Self(err)
    }
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    code: &'static str,
    message: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code) = match &self.0 {
            InventoryError::InvalidArgument(_) => (StatusCode::BAD_REQUEST, "INVALID_ARGUMENT"),
            InventoryError::PartNotFound => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            InventoryError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL"),
        };

        if status.is_server_error() {
            tracing::error!(status = %status, error = %self.0, "request failed");
        }

        let body = ErrorBody {
            code,
            message: self.0.to_string(),
        };
        (status, Json(body)).into_response()
    }
}
