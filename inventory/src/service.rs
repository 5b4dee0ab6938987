//! Catalog read operations.

use crate::error::InventoryError;
use crate::model::{Part, PartsFilter};
use crate::repository::PartRepository;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;
use uuid::Uuid;

/// The catalog service.
pub struct InventoryService {
    repo: Arc<dyn PartRepository>,
    read_timeout: Duration,
}

impl InventoryService {
    /// Wire up the service.
    pub fn new(repo: Arc<dyn PartRepository>, read_timeout: Duration) -> Self {
        Self { repo, read_timeout }
    }

    /// Load one part by its textual uuid.
    ///
    /// # Errors
    ///
    /// - [`InventoryError::InvalidArgument`] on a blank or malformed id
    /// - [`InventoryError::PartNotFound`] if it does not exist
    pub async fn part(&self, raw_id: &str) -> Result<Part, InventoryError> {
        let raw_id = raw_id.trim();
        if raw_id.is_empty() {
            return Err(InventoryError::InvalidArgument(
                "part uuid must be non-empty".into(),
            ));
        }
        let id = Uuid::parse_str(raw_id).map_err(|_| {
            InventoryError::InvalidArgument(format!("part uuid {raw_id:?} is not a uuid"))
        })?;

        self.read_scope(self.repo.part_by_id(id)).await
    }

    /// List the parts matching `filter`. An empty result is a success.
    ///
    /// # Errors
    ///
    /// Only store failures surface; an unmatched filter does not.
    pub async fn list_parts(&self, filter: &PartsFilter) -> Result<Vec<Part>, InventoryError> {
        let parts = self.read_scope(self.repo.list(filter)).await?;
        info!(
            requested_ids = filter.ids.len(),
            matched = parts.len(),
            "parts listed"
        );
        Ok(parts)
    }

    async fn read_scope<T>(
        &self,
        fut: impl Future<Output = Result<T, InventoryError>>,
    ) -> Result<T, InventoryError> {
        match tokio::time::timeout(self.read_timeout, fut).await {
            Ok(result) => result,
            Err(_) => Err(InventoryError::Internal(anyhow::anyhow!(
                "parts store deadline of {:?} exceeded",
                self.read_timeout
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::InMemoryPartRepository;

    fn service() -> InventoryService {
        InventoryService::new(
            Arc::new(InMemoryPartRepository::new()),
            Duration::from_secs(1),
        )
    }

    #[tokio::test]
    async fn blank_part_id_is_invalid() {
        let err = service().part("   ").await.unwrap_err();
        assert!(matches!(err, InventoryError::InvalidArgument(_)));
    }

    #[tokio::test]
    async fn malformed_part_id_is_invalid() {
        let err = service().part("not-a-uuid").await.unwrap_err();
        assert!(matches!(err, InventoryError::InvalidArgument(_)));
    }

    #[tokio::test]
    async fn unknown_part_is_not_found() {
        let err = service().part(&Uuid::new_v4().to_string()).await.unwrap_err();
        assert!(matches!(err, InventoryError::PartNotFound));
    }

    #[tokio::test]
    async fn empty_store_lists_nothing_without_error() {
        let parts = service().list_parts(&PartsFilter::default()).await.unwrap();
        assert!(parts.is_empty());
    }
}
