//! Payment RPC client.

use crate::error::OrderError;
use crate::model::PaymentMethod;
use crate::service::PaymentClient;
use async_trait::async_trait;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Serialize)]
struct PayOrderRequest {
    order_uuid: Uuid,
    user_uuid: Uuid,
    payment_method: PaymentMethod,
}

#[derive(Deserialize)]
struct PayOrderResponse {
    transaction_uuid: String,
}

#[derive(Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: String,
}

/// reqwest-backed [`PaymentClient`].
///
/// The payment service's own validation failures (400) propagate as
/// [`OrderError::Validation`]; every other failure, transport included,
/// is [`OrderError::BadGateway`].
pub struct HttpPaymentClient {
    http: reqwest::Client,
    base_url: String,
}

impl HttpPaymentClient {
    /// Point the client at the payment service's base URL.
    #[must_use]
    pub fn new(http: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into(),
        }
    }
}

#[async_trait]
impl PaymentClient for HttpPaymentClient {
    async fn pay_order(
        &self,
        order_id: Uuid,
        user_id: Uuid,
        method: PaymentMethod,
    ) -> Result<String, OrderError> {
        let url = format!("{}/v1/payments", self.base_url);

        let response = self
            .http
            .post(&url)
            .json(&PayOrderRequest {
                order_uuid: order_id,
                user_uuid: user_id,
                payment_method: method,
            })
            .send()
            .await
            .map_err(|e| OrderError::BadGateway(format!("payment pay_order: {e}")))?;

        match response.status() {
            status if status.is_success() => {
                let body: PayOrderResponse = response.json().await.map_err(|e| {
                    OrderError::BadGateway(format!("payment pay_order: decode: {e}"))
                })?;
                Ok(body.transaction_uuid)
            }
            StatusCode::BAD_REQUEST => {
                let body: ErrorBody = response.json().await.unwrap_or(ErrorBody {
                    message: "payment rejected the request".to_string(),
                });
                Err(OrderError::Validation(body.message))
            }
            status => Err(OrderError::BadGateway(format!(
                "payment pay_order: unexpected status {status}"
            ))),
        }
    }
}
