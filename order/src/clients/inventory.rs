//! Catalog RPC client.

use crate::error::OrderError;
use crate::model::PartSummary;
use crate::service::{InventoryClient, PartsFilter};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

#[derive(Serialize)]
struct ListPartsRequest<'a> {
    filter: &'a PartsFilter,
}

#[derive(Deserialize)]
struct ListPartsResponse {
    parts: Vec<PartSummary>,
}

/// reqwest-backed [`InventoryClient`].
pub struct HttpInventoryClient {
    http: reqwest::Client,
    base_url: String,
}

impl HttpInventoryClient {
    /// Point the client at the catalog's base URL.
    #[must_use]
    pub fn new(http: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into(),
        }
    }
}

#[async_trait]
impl InventoryClient for HttpInventoryClient {
    async fn list_parts(&self, filter: &PartsFilter) -> Result<Vec<PartSummary>, OrderError> {
        let url = format!("{}/v1/parts/list", self.base_url);

        let response = self
            .http
            .post(&url)
            .json(&ListPartsRequest { filter })
            .send()
            .await
            .map_err(|e| OrderError::BadGateway(format!("inventory list_parts: {e}")))?;

        if !response.status().is_success() {
            return Err(OrderError::BadGateway(format!(
                "inventory list_parts: unexpected status {}",
                response.status()
            )));
        }

        let body: ListPartsResponse = response
            .json()
            .await
            .map_err(|e| OrderError::BadGateway(format!("inventory list_parts: decode: {e}")))?;

        Ok(body.parts)
    }
}
