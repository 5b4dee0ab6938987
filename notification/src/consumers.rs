//! Message handlers for the two order topics.

use crate::service::NotificationService;
use astradock_platform::bus::{Message, MessageHandler};
use astradock_platform::events::{AssembledShipEvent, PaidOrderEvent};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::error;

/// Handler for `order.paid` records.
pub struct OrderPaidNotifier {
    service: Arc<NotificationService>,
}

impl OrderPaidNotifier {
    /// Bind the handler to the notification service.
    #[must_use]
    pub fn new(service: Arc<NotificationService>) -> Self {
        Self { service }
    }
}

#[async_trait]
impl MessageHandler for OrderPaidNotifier {
    async fn handle(&self, msg: &Message) -> anyhow::Result<()> {
        let event = PaidOrderEvent::decode(&msg.value).map_err(|e| {
            error!(topic = %msg.topic, offset = msg.offset, error = %e, "failed to decode paid-order record");
            anyhow::Error::new(e)
        })?;

        self.service.notify_paid_order(&event).await.map_err(|e| {
            error!(order_id = %event.order_id, error = %e, "failed to notify about paid order");
            e
        })
    }
}

/// Handler for `order.assembled` records.
pub struct OrderAssembledNotifier {
    service: Arc<NotificationService>,
}

impl OrderAssembledNotifier {
    /// Bind the handler to the notification service.
    #[must_use]
    pub fn new(service: Arc<NotificationService>) -> Self {
        Self { service }
    }
}

#[async_trait]
impl MessageHandler for OrderAssembledNotifier {
    async fn handle(&self, msg: &Message) -> anyhow::Result<()> {
        let event = AssembledShipEvent::decode(&msg.value).map_err(|e| {
            error!(topic = %msg.topic, offset = msg.offset, error = %e, "failed to decode assembled-ship record");
            anyhow::Error::new(e)
        })?;

        self.service
            .notify_ship_assembled(&event)
            .await
            .map_err(|e| {
                error!(order_id = %event.order_id, error = %e, "failed to notify about assembled ship");
                e
            })
    }
}
