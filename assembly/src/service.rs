//! The delayed paid-to-assembled processor.

use astradock_platform::bus::{Message, MessageHandler, Producer};
use astradock_platform::events::{AssembledShipEvent, PaidOrderEvent};
use async_trait::async_trait;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{error, info};

/// Handler for `order.paid` records.
///
/// Each record simulates one build: wait out the assembly delay, then
/// emit an [`AssembledShipEvent`] keyed by the order id. Cancellation
/// during the wait aborts without emitting, so the uncommitted record is
/// redelivered and assembled again; duplicates downstream are accepted.
pub struct AssemblyService {
    producer: Arc<dyn Producer>,
    delay: Duration,
}

impl AssemblyService {
    /// Bind the worker to its output producer with the build delay.
    #[must_use]
    pub fn new(producer: Arc<dyn Producer>, delay: Duration) -> Self {
        Self { producer, delay }
    }
}

#[async_trait]
impl MessageHandler for AssemblyService {
    async fn handle(&self, msg: &Message) -> anyhow::Result<()> {
        let event = PaidOrderEvent::decode(&msg.value).map_err(|e| {
            error!(topic = %msg.topic, offset = msg.offset, error = %e, "failed to decode paid-order record");
            anyhow::Error::new(e)
        })?;

        let start = Instant::now();
        tokio::time::sleep(self.delay).await;

        info!(
            topic = %msg.topic,
            partition = msg.partition,
            offset = msg.offset,
            event_id = %event.event_id,
            order_id = %event.order_id,
            user_id = %event.user_id,
            payment_method = %event.payment_method,
            transaction_id = %event.transaction_id,
            "ship assembled"
        );

        let assembled = AssembledShipEvent {
            event_id: event.event_id,
            order_id: event.order_id,
            user_id: event.user_id,
            build_duration_secs: start.elapsed().as_secs(),
        };

        let payload = assembled.encode()?;
        self.producer
            .send(assembled.order_id.as_bytes(), &payload)
            .await
            .map_err(|e| {
                error!(order_id = %assembled.order_id, error = %e, "failed to send assembled-ship record");
                anyhow::Error::new(e)
            })?;

        Ok(())
    }
}
