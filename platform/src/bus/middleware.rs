//! Mandatory handler decorators: entry logging and panic recovery.

use super::{DynHandler, Message, MessageHandler, Middleware};
use async_trait::async_trait;
use futures::FutureExt;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use tracing::{error, info};

/// Emits one info record on handler entry.
pub struct LoggingMiddleware;

impl Middleware for LoggingMiddleware {
    fn wrap(&self, next: DynHandler) -> DynHandler {
        Arc::new(LoggingHandler { next })
    }
}

struct LoggingHandler {
    next: DynHandler,
}

#[async_trait]
impl MessageHandler for LoggingHandler {
    async fn handle(&self, msg: &Message) -> anyhow::Result<()> {
        info!(topic = %msg.topic, "message received");
        self.next.handle(msg).await
    }
}

/// Catches panics in downstream handlers.
///
/// A panic is logged and converted into an `Err`, so the offset of the
/// message that caused it is not stored and the message is redelivered.
pub struct RecoveryMiddleware;

impl Middleware for RecoveryMiddleware {
    fn wrap(&self, next: DynHandler) -> DynHandler {
        Arc::new(RecoveryHandler { next })
    }
}

struct RecoveryHandler {
    next: DynHandler,
}

#[async_trait]
impl MessageHandler for RecoveryHandler {
    async fn handle(&self, msg: &Message) -> anyhow::Result<()> {
        match AssertUnwindSafe(self.next.handle(msg)).catch_unwind().await {
            Ok(result) => result,
            Err(panic) => {
                let detail = panic
                    .downcast_ref::<&str>()
                    .map(ToString::to_string)
                    .or_else(|| panic.downcast_ref::<String>().cloned())
                    .unwrap_or_else(|| "unknown panic payload".to_string());
                error!(
                    topic = %msg.topic,
                    partition = msg.partition,
                    offset = msg.offset,
                    panic = %detail,
                    "recovered from panic in message handler"
                );
                Err(anyhow::anyhow!("message handler panicked: {detail}"))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    struct Panicking;

    #[async_trait]
    impl MessageHandler for Panicking {
        async fn handle(&self, _msg: &Message) -> anyhow::Result<()> {
            panic!("boom");
        }
    }

    struct Succeeding;

    #[async_trait]
    impl MessageHandler for Succeeding {
        async fn handle(&self, _msg: &Message) -> anyhow::Result<()> {
            Ok(())
        }
    }

    fn message() -> Message {
        Message {
            key: Vec::new(),
            value: Vec::new(),
            topic: "orders".into(),
            partition: 3,
            offset: 42,
            timestamp: None,
            headers: HashMap::new(),
        }
    }

    #[tokio::test]
    async fn recovery_converts_panic_to_error() {
        let chain = RecoveryMiddleware.wrap(Arc::new(Panicking));

        let err = chain.handle(&message()).await.unwrap_err();
        assert!(err.to_string().contains("boom"));
    }

    #[tokio::test]
    async fn recovery_passes_through_success() {
        let chain = RecoveryMiddleware.wrap(Arc::new(Succeeding));
        assert!(chain.handle(&message()).await.is_ok());
    }

    #[tokio::test]
    async fn logging_passes_through() {
        let chain = LoggingMiddleware.wrap(Arc::new(Succeeding));
        assert!(chain.handle(&message()).await.is_ok());
    }
}
