//! Subscriber registry.

use std::collections::HashSet;
use tokio::sync::RwLock;

/// In-process set of subscribed chats.
///
/// Membership only grows within a process lifetime; there is no TTL and
/// nothing is persisted. Fan-out reads hold the read lock for the
/// duration of one event dispatch, registration takes the write lock
/// and always succeeds.
#[derive(Default)]
pub struct SubscriberRegistry {
    chats: RwLock<HashSet<i64>>,
}

impl SubscriberRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a chat. Re-registration is a no-op.
    pub async fn add_chat(&self, chat_id: i64) {
        self.chats.write().await.insert(chat_id);
    }

    /// Run `f` for every subscribed chat under the read lock, stopping
    /// at the first failure.
    ///
    /// # Errors
    ///
    /// Propagates the first error `f` returns.
    pub async fn for_each_chat<F, Fut>(&self, mut f: F) -> anyhow::Result<()>
    where
        F: FnMut(i64) -> Fut,
        Fut: std::future::Future<Output = anyhow::Result<()>>,
    {
        let chats = self.chats.read().await;
        for &chat_id in chats.iter() {
            f(chat_id).await?;
        }
        Ok(())
    }

    /// Number of subscribed chats.
    pub async fn len(&self) -> usize {
        self.chats.read().await.len()
    }

    /// Whether no chat is subscribed.
    pub async fn is_empty(&self) -> bool {
        self.chats.read().await.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn registration_is_idempotent() {
        let registry = SubscriberRegistry::new();
        registry.add_chat(42).await;
        registry.add_chat(42).await;
        registry.add_chat(7).await;
        assert_eq!(registry.len().await, 2);
    }

    #[tokio::test]
    async fn first_failure_stops_the_fan_out() {
        let registry = SubscriberRegistry::new();
        registry.add_chat(1).await;
        registry.add_chat(2).await;

        let mut attempted = 0;
        let result = registry
            .for_each_chat(|_chat| {
                attempted += 1;
                async { Err(anyhow::anyhow!("send failed")) }
            })
            .await;

        assert!(result.is_err());
        assert_eq!(attempted, 1);
    }
}
