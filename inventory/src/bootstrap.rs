//! Composition root for the catalog service.

use crate::api::{self, ApiState};
use crate::config::Config;
use crate::repository::{InMemoryPartRepository, PartRepository};
use crate::seed;
use crate::service::InventoryService;
use anyhow::Context;
use axum::Router;
use std::sync::Arc;
use tracing::info;

/// Build the dependency graph: store, seed data, service, router.
///
/// # Errors
///
/// Fails if the seed data cannot be inserted.
pub async fn bootstrap(config: &Config) -> anyhow::Result<Router> {
    let repo: Arc<dyn PartRepository> = Arc::new(InMemoryPartRepository::new());

    seed::seed_parts(repo.as_ref())
        .await
        .context("seed parts catalog")?;
    info!("parts catalog seeded");

    let service = InventoryService::new(repo, config.read_timeout);
    Ok(api::router(Arc::new(ApiState { service })))
}
