//! Order error taxonomy.
//!
//! The variants are the sentinels the rest of the service classifies
//! against; the HTTP layer maps them to status codes and consumer seams
//! decide commit behavior by matching on them.

use thiserror::Error;
use uuid::Uuid;

/// Errors produced by the order service and its adapters.
#[derive(Debug, Error)]
pub enum OrderError {
    /// Input shape violates the contract (400).
    #[error("validation error: {0}")]
    Validation(String),

    /// The addressed order does not exist (404).
    #[error("order not found")]
    OrderNotFound,

    /// One or more requested parts do not exist (404).
    #[error("part not found")]
    PartNotFound,

    /// Requested parts exist but are not in stock (422).
    #[error("parts out of stock: {}", format_ids(.0))]
    PartsOutOfStock(Vec<Uuid>),

    /// State-machine violation (409).
    #[error("order conflict")]
    OrderConflict,

    /// Downstream RPC transport failure (502).
    #[error("bad gateway: {0}")]
    BadGateway(String),

    /// Load shedding (503).
    #[error("service unavailable")]
    ServiceUnavailable,

    /// A stored status outside the state machine; indicates corruption
    /// (500).
    #[error("unknown order status: {0}")]
    UnknownStatus(String),

    /// Anything else unexpected (500).
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

fn format_ids(ids: &[Uuid]) -> String {
    ids.iter()
        .map(Uuid::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn out_of_stock_lists_offending_ids() {
        let id = Uuid::new_v4();
        let err = OrderError::PartsOutOfStock(vec![id]);
        assert!(err.to_string().contains(&id.to_string()));
    }
}
