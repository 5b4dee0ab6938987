//! HTTP API for the order service.
//!
//! JSON request/response bodies; the error body is `{code, message}`
//! with the status codes of the service contract. Prices cross the wire
//! as decimal strings with two fractional digits, never as floats.

use crate::error::OrderError;
use crate::model::{format_price_cents, CreateOrder, Order, PaymentMethod};
use crate::service::OrderService;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use uuid::Uuid;

/// Shared handler state.
pub struct ApiState {
    /// The order service.
    pub service: Arc<OrderService>,
}

/// Build the order router.
pub fn router(state: Arc<ApiState>) -> Router {
    Router::new()
        .route("/orders", post(create_order))
        .route(
            "/orders/:order_uuid",
            get(get_order).delete(cancel_order),
        )
        .route("/orders/:order_uuid/pay", post(pay_order))
        .route("/health", get(health))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[derive(Debug, Deserialize)]
struct CreateOrderRequest {
    user_uuid: Uuid,
    part_uuids: Vec<Uuid>,
}

#[derive(Debug, Serialize)]
struct CreateOrderResponse {
    order_uuid: Uuid,
    total_price: String,
}

#[derive(Debug, Deserialize)]
struct PayOrderRequest {
    payment_method: PaymentMethod,
}

#[derive(Debug, Serialize)]
struct PayOrderResponse {
    transaction_uuid: Uuid,
}

#[derive(Debug, Serialize)]
struct OrderResponse {
    order_uuid: Uuid,
    user_uuid: Uuid,
    part_uuids: Vec<Uuid>,
    total_price: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    transaction_uuid: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    payment_method: Option<PaymentMethod>,
    status: crate::model::OrderStatus,
}

impl From<Order> for OrderResponse {
    fn from(order: Order) -> Self {
        Self {
            order_uuid: order.id,
            user_uuid: order.user_id,
            part_uuids: order.part_ids,
            total_price: format_price_cents(order.total_price),
            transaction_uuid: order.transaction_id,
            payment_method: order.payment_method,
            status: order.status,
        }
    }
}

async fn create_order(
    State(state): State<Arc<ApiState>>,
    Json(req): Json<CreateOrderRequest>,
) -> Result<Json<CreateOrderResponse>, ApiError> {
    let result = state
        .service
        .create(CreateOrder {
            user_id: req.user_uuid,
            part_ids: req.part_uuids,
        })
        .await?;

    Ok(Json(CreateOrderResponse {
        order_uuid: result.id,
        total_price: format_price_cents(result.total_price),
    }))
}

async fn pay_order(
    State(state): State<Arc<ApiState>>,
    Path(order_uuid): Path<String>,
    Json(req): Json<PayOrderRequest>,
) -> Result<Json<PayOrderResponse>, ApiError> {
    let order_id = parse_order_uuid(&order_uuid)?;
    let transaction_uuid = state.service.pay(order_id, req.payment_method).await?;
    Ok(Json(PayOrderResponse { transaction_uuid }))
}

async fn get_order(
    State(state): State<Arc<ApiState>>,
    Path(order_uuid): Path<String>,
) -> Result<Json<OrderResponse>, ApiError> {
    let order_id = parse_order_uuid(&order_uuid)?;
    let order = state.service.order_by_id(order_id).await?;
    Ok(Json(order.into()))
}

async fn cancel_order(
    State(state): State<Arc<ApiState>>,
    Path(order_uuid): Path<String>,
) -> Result<StatusCode, ApiError> {
    let order_id = parse_order_uuid(&order_uuid)?;
    state.service.cancel(order_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

fn parse_order_uuid(raw: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(raw)
        .map_err(|_| ApiError(OrderError::Validation("invalid order_uuid".to_string())))
}

/// Response-side wrapper for [`OrderError`].
#[derive(Debug)]
pub struct ApiError(pub OrderError);

impl From<OrderError> for ApiError {
    fn from(err: OrderError) -> Self {
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
        let (status, code) = status_and_code(&self.0);

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

/// Map a domain error onto its HTTP status and stable error code.
#[must_use]
pub fn status_and_code(err: &OrderError) -> (StatusCode, &'static str) {
    match err {
        OrderError::Validation(_) => (StatusCode::BAD_REQUEST, "VALIDATION"),
        OrderError::OrderNotFound => (StatusCode::NOT_FOUND, "ORDER_NOT_FOUND"),
        OrderError::PartNotFound => (StatusCode::NOT_FOUND, "PART_NOT_FOUND"),
        OrderError::PartsOutOfStock(_) => (StatusCode::UNPROCESSABLE_ENTITY, "PARTS_OUT_OF_STOCK"),
        OrderError::OrderConflict => (StatusCode::CONFLICT, "ORDER_CONFLICT"),
        OrderError::BadGateway(_) => (StatusCode::BAD_GATEWAY, "BAD_GATEWAY"),
        OrderError::ServiceUnavailable => (StatusCode::SERVICE_UNAVAILABLE, "SERVICE_UNAVAILABLE"),
        OrderError::UnknownStatus(_) => (StatusCode::INTERNAL_SERVER_ERROR, "UNKNOWN_STATUS"),
        OrderError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_mapping_matches_contract() {
        let cases = [
            (OrderError::Validation("x".into()), StatusCode::BAD_REQUEST),
            (OrderError::OrderNotFound, StatusCode::NOT_FOUND),
            (OrderError::PartNotFound, StatusCode::NOT_FOUND),
            (
                OrderError::PartsOutOfStock(vec![Uuid::new_v4()]),
                StatusCode::UNPROCESSABLE_ENTITY,
            ),
            (OrderError::OrderConflict, StatusCode::CONFLICT),
            (OrderError::BadGateway("x".into()), StatusCode::BAD_GATEWAY),
            (OrderError::ServiceUnavailable, StatusCode::SERVICE_UNAVAILABLE),
            (
                OrderError::UnknownStatus("ON_FIRE".into()),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
            (
                OrderError::Internal(anyhow::anyhow!("x")),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (err, expected) in cases {
            assert_eq!(status_and_code(&err).0, expected, "{err}");
        }
    }

    #[test]
    fn invalid_uuid_is_a_validation_error() {
        let err = parse_order_uuid("not-a-uuid").unwrap_err();
        assert!(matches!(err.0, OrderError::Validation(_)));
    }
}
