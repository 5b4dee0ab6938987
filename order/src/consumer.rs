//! Assembled-event consumer seam.

use crate::error::OrderError;
use crate::service::OrderService;
use astradock_platform::bus::{Message, MessageHandler};
use astradock_platform::events::AssembledShipEvent;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{error, warn};

/// Handler for `order.assembled` records: decode, then drive
/// [`OrderService::complete`].
///
/// This is the idempotency seam: an [`OrderError::OrderConflict`] from
/// `complete` means the order is already terminal, and the handler
/// swallows it to success so the offset progresses on replay instead of
/// looping forever. Every other error propagates, leaving the offset
/// unstored.
pub struct AssembledHandler {
    service: Arc<OrderService>,
}

impl AssembledHandler {
    /// Bind the handler to the order service.
    #[must_use]
    pub fn new(service: Arc<OrderService>) -> Self {
        Self { service }
    }
}

#[async_trait]
impl MessageHandler for AssembledHandler {
    async fn handle(&self, msg: &Message) -> anyhow::Result<()> {
        let event = AssembledShipEvent::decode(&msg.value).map_err(|e| {
            error!(topic = %msg.topic, offset = msg.offset, error = %e, "failed to decode assembled-ship record");
            anyhow::Error::new(e)
        })?;

        match self.service.complete(event.order_id).await {
            Ok(()) => Ok(()),
            Err(OrderError::OrderConflict) => {
                warn!(order_id = %event.order_id, "order already terminal; skipping completion");
                Ok(())
            }
            Err(e) => {
                error!(order_id = %event.order_id, error = %e, "failed to complete order");
                Err(e.into())
            }
        }
    }
}
