//! Fan-out of rendered events to subscribed chats.

use crate::client::MessageSender;
use crate::registry::SubscriberRegistry;
use crate::render;
use astradock_platform::events::{AssembledShipEvent, PaidOrderEvent};
use std::sync::Arc;
use tracing::info;

/// The notification service.
///
/// A failed send to any chat aborts that event's fan-out with an error,
/// so the record is redelivered and every chat sees the event at least
/// once; duplicate notifications are accepted.
pub struct NotificationService {
    sender: Arc<dyn MessageSender>,
    registry: Arc<SubscriberRegistry>,
}

impl NotificationService {
    /// Wire up the service.
    #[must_use]
    pub fn new(sender: Arc<dyn MessageSender>, registry: Arc<SubscriberRegistry>) -> Self {
        Self { sender, registry }
    }

    /// Notify every subscriber that an order was paid.
    ///
    /// # Errors
    ///
    /// Propagates the first failed send.
    pub async fn notify_paid_order(&self, event: &PaidOrderEvent) -> anyhow::Result<()> {
        let text = render::paid_order(event);
        self.broadcast(&text).await?;
        info!(order_id = %event.order_id, "paid-order notifications sent");
        Ok(())
    }

    /// Notify every subscriber that a ship was assembled.
    ///
    /// # Errors
    ///
    /// Propagates the first failed send.
    pub async fn notify_ship_assembled(&self, event: &AssembledShipEvent) -> anyhow::Result<()> {
        let text = render::ship_assembled(event);
        self.broadcast(&text).await?;
        info!(order_id = %event.order_id, "ship-assembled notifications sent");
        Ok(())
    }

    async fn broadcast(&self, text: &str) -> anyhow::Result<()> {
        self.registry
            .for_each_chat(|chat_id| {
                let sender = Arc::clone(&self.sender);
                let text = text.to_string();
                async move { sender.send_message(chat_id, &text).await }
            })
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Mutex;
    use uuid::Uuid;

    #[derive(Default)]
    struct CapturingSender {
        sent: Mutex<Vec<(i64, String)>>,
        fail_for: Option<i64>,
    }

    #[async_trait]
    impl MessageSender for CapturingSender {
        async fn send_message(&self, chat_id: i64, text: &str) -> anyhow::Result<()> {
            if self.fail_for == Some(chat_id) {
                anyhow::bail!("chat {chat_id} unreachable");
            }
            self.sent.lock().unwrap().push((chat_id, text.to_string()));
            Ok(())
        }
    }

    fn paid_event() -> PaidOrderEvent {
        PaidOrderEvent {
            event_id: Uuid::new_v4(),
            order_id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            payment_method: "SBP".into(),
            transaction_id: Uuid::new_v4(),
        }
    }

    #[tokio::test]
    async fn every_registered_chat_is_notified() {
        let sender = Arc::new(CapturingSender::default());
        let registry = Arc::new(SubscriberRegistry::new());
        registry.add_chat(1).await;
        registry.add_chat(2).await;

        let service = NotificationService::new(sender.clone(), registry);
        service.notify_paid_order(&paid_event()).await.unwrap();

        let sent = sender.sent.lock().unwrap();
        let mut chats: Vec<i64> = sent.iter().map(|(chat, _)| *chat).collect();
        chats.sort_unstable();
        assert_eq!(chats, vec![1, 2]);
    }

    #[tokio::test]
    async fn no_subscribers_is_a_quiet_success() {
        let sender = Arc::new(CapturingSender::default());
        let service =
            NotificationService::new(sender.clone(), Arc::new(SubscriberRegistry::new()));

        service.notify_paid_order(&paid_event()).await.unwrap();
        assert!(sender.sent.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn a_failed_send_aborts_the_fan_out() {
        let sender = Arc::new(CapturingSender {
            fail_for: Some(1),
            ..CapturingSender::default()
        });
        let registry = Arc::new(SubscriberRegistry::new());
        registry.add_chat(1).await;

        let service = NotificationService::new(sender, registry);
        assert!(service.notify_paid_order(&paid_event()).await.is_err());
    }
}
