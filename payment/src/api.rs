//! Payment RPC surface.

use crate::model::{PayOrder, PaymentError};
use crate::service::PaymentService;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Serialize;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use uuid::Uuid;

/// Shared handler state.
pub struct ApiState {
    /// The payment service.
    pub service: PaymentService,
}

/// Build the payment router.
pub fn router(state: Arc<ApiState>) -> Router {
    Router::new()
        .route("/v1/payments", post(pay_order))
        .route("/health", get(health))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[derive(Debug, Serialize)]
struct PayOrderResponse {
    transaction_uuid: Uuid,
}

async fn pay_order(
    State(state): State<Arc<ApiState>>,
    Json(req): Json<PayOrder>,
) -> Result<Json<PayOrderResponse>, ApiError> {
    let transaction_uuid = state.service.pay_order(&req)?;
    Ok(Json(PayOrderResponse { transaction_uuid }))
}

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

/// Response-side wrapper for [`PaymentError`].
#[derive(Debug)]
pub struct ApiError(pub PaymentError);

impl From<PaymentError> for ApiError {
    fn from(err: PaymentError) -> Self {
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
            PaymentError::InvalidArgument(_) => (StatusCode::BAD_REQUEST, "INVALID_ARGUMENT"),
            PaymentError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL"),
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
