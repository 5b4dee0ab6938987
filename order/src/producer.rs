//! Paid-order event emission.

use crate::service::PaidOrderPublisher;
use astradock_platform::bus::Producer;
use astradock_platform::events::PaidOrderEvent;
use async_trait::async_trait;
use std::sync::Arc;

/// Publishes [`PaidOrderEvent`]s keyed by the order id, so every event
/// of one order lands on the same partition of `order.paid`.
pub struct OrderPaidProducer {
    producer: Arc<dyn Producer>,
}

impl OrderPaidProducer {
    /// Wrap a topic-bound producer.
    #[must_use]
    pub fn new(producer: Arc<dyn Producer>) -> Self {
        Self { producer }
    }
}

#[async_trait]
impl PaidOrderPublisher for OrderPaidProducer {
    async fn publish(&self, event: PaidOrderEvent) -> anyhow::Result<()> {
        let payload = event.encode()?;
        self.producer
            .send(event.order_id.as_bytes(), &payload)
            .await?;
        Ok(())
    }
}
