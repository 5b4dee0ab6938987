//! Event bus abstractions over a partitioned log.
//!
//! The services never talk to rdkafka directly. They see three seams:
//!
//! - [`Message`]: an owned view of one consumed record
//! - [`MessageHandler`]: the unit of message processing
//! - [`Producer`]: a keyed synchronous send
//!
//! [`KafkaConsumer`] drives a consumer-group session and invokes the
//! composed handler per record; offsets are stored for commit only after
//! the handler returns `Ok`, which gives every consumer at-least-once
//! delivery. [`Middleware`] wraps handlers; [`LoggingMiddleware`] and
//! [`RecoveryMiddleware`] are applied by every service.

mod consumer;
mod middleware;
mod producer;

pub use consumer::{ConsumerConfig, KafkaConsumer};
pub use middleware::{LoggingMiddleware, RecoveryMiddleware};
pub use producer::{KafkaProducer, ProducerConfig};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;

/// Errors raised by the bus substrate.
#[derive(Debug, Error)]
pub enum BusError {
    /// Could not create or connect a client.
    #[error("bus connection failed: {0}")]
    ConnectionFailed(String),

    /// A record could not be delivered to the broker.
    #[error("publish to topic '{topic}' failed: {reason}")]
    PublishFailed {
        /// Topic the record was addressed to.
        topic: String,
        /// Broker-side failure description.
        reason: String,
    },

    /// The consumer-group session failed fatally.
    #[error("consume failed: {0}")]
    ConsumeFailed(String),
}

/// Owned view of one consumed record.
///
/// Carries everything a handler may need: the key/value bytes, the
/// record's position in the log, its broker timestamp and decoded
/// headers.
#[derive(Debug, Clone)]
pub struct Message {
    /// Partitioning key (raw bytes).
    pub key: Vec<u8>,
    /// Record payload.
    pub value: Vec<u8>,
    /// Topic the record was read from.
    pub topic: String,
    /// Partition within the topic.
    pub partition: i32,
    /// Offset within the partition.
    pub offset: i64,
    /// Broker-assigned record timestamp, when present.
    pub timestamp: Option<DateTime<Utc>>,
    /// Decoded record headers.
    pub headers: HashMap<String, Vec<u8>>,
}

/// The unit of message processing.
///
/// Returning `Err` means the offset is not stored and the record will be
/// redelivered after the session is lost; handlers must therefore be
/// idempotent.
#[async_trait]
pub trait MessageHandler: Send + Sync {
    /// Process one record.
    async fn handle(&self, msg: &Message) -> anyhow::Result<()>;
}

/// Shared handler reference, as consumed by [`Middleware`] and
/// [`KafkaConsumer`].
pub type DynHandler = Arc<dyn MessageHandler>;

/// A handler decorator.
pub trait Middleware: Send + Sync {
    /// Wrap `next`, returning the decorated handler.
    fn wrap(&self, next: DynHandler) -> DynHandler;
}

/// Compose a handler with a middleware chain.
///
/// Middlewares apply in declared order, outermost first: for
/// `[logging, recovery]` a message passes through logging, then
/// recovery, then the handler.
#[must_use]
pub fn compose(handler: DynHandler, middlewares: &[Arc<dyn Middleware>]) -> DynHandler {
    let mut wrapped = handler;
    for mw in middlewares.iter().rev() {
        wrapped = mw.wrap(wrapped);
    }
    wrapped
}

/// A keyed synchronous send to one topic.
///
/// The key is mandatory: records for the same logical entity must carry
/// the same key so they land on the same partition and keep their order.
#[async_trait]
pub trait Producer: Send + Sync {
    /// Send one record and wait for broker acknowledgement.
    async fn send(&self, key: &[u8], value: &[u8]) -> Result<(), BusError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    struct Recording {
        label: &'static str,
        log: Arc<Mutex<Vec<&'static str>>>,
    }

    impl Middleware for Recording {
        fn wrap(&self, next: DynHandler) -> DynHandler {
            Arc::new(RecordingHandler {
                label: self.label,
                log: Arc::clone(&self.log),
                next,
            })
        }
    }

    struct RecordingHandler {
        label: &'static str,
        log: Arc<Mutex<Vec<&'static str>>>,
        next: DynHandler,
    }

    #[async_trait]
    impl MessageHandler for RecordingHandler {
        async fn handle(&self, msg: &Message) -> anyhow::Result<()> {
            self.log.lock().unwrap().push(self.label);
            self.next.handle(msg).await
        }
    }

    struct Terminal {
        log: Arc<Mutex<Vec<&'static str>>>,
    }

    #[async_trait]
    impl MessageHandler for Terminal {
        async fn handle(&self, _msg: &Message) -> anyhow::Result<()> {
            self.log.lock().unwrap().push("handler");
            Ok(())
        }
    }

    fn message() -> Message {
        Message {
            key: vec![1],
            value: vec![2],
            topic: "t".into(),
            partition: 0,
            offset: 0,
            timestamp: None,
            headers: HashMap::new(),
        }
    }

    #[tokio::test]
    async fn compose_applies_outermost_first() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let handler: DynHandler = Arc::new(Terminal {
            log: Arc::clone(&log),
        });
        let middlewares: Vec<Arc<dyn Middleware>> = vec![
            Arc::new(Recording {
                label: "outer",
                log: Arc::clone(&log),
            }),
            Arc::new(Recording {
                label: "inner",
                log: Arc::clone(&log),
            }),
        ];

        let chain = compose(handler, &middlewares);
        chain.handle(&message()).await.unwrap();

        assert_eq!(*log.lock().unwrap(), vec!["outer", "inner", "handler"]);
    }

    #[tokio::test]
    async fn compose_without_middlewares_is_identity() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let handler: DynHandler = Arc::new(Terminal {
            log: Arc::clone(&log),
        });

        let chain = compose(handler, &[]);
        chain.handle(&message()).await.unwrap();

        assert_eq!(*log.lock().unwrap(), vec!["handler"]);
    }
}
