//! Catalog error taxonomy.

use thiserror::Error;

/// Errors produced by the catalog service.
#[derive(Debug, Error)]
pub enum InventoryError {
    /// The request shape violates the contract (400).
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// The addressed part does not exist (404).
    #[error("part not found")]
    PartNotFound,

    /// Anything else unexpected (500).
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}
