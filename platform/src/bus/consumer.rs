//! Consumer-group session driver.

use super::{compose, BusError, DynHandler, Message, Middleware};
use chrono::DateTime;
use rdkafka::config::ClientConfig;
use rdkafka::consumer::{Consumer, StreamConsumer};
use rdkafka::message::{Headers, Message as KafkaMessage};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::{error, info};

/// Settings for one consumer-group binding.
#[derive(Debug, Clone)]
pub struct ConsumerConfig {
    /// Comma-separated broker addresses.
    pub brokers: String,
    /// Consumer group id.
    pub group_id: String,
}

/// A consumer-group member bound to a set of topics.
///
/// Offsets are stored for commit only after the composed handler returns
/// `Ok`; a failed handler leaves the offset alone and processing moves to
/// the next message, so the failed one is redelivered after the session
/// is lost (at-least-once).
///
/// New groups start from the earliest offset and partitions are assigned
/// round-robin across members.
pub struct KafkaConsumer {
    consumer: StreamConsumer,
    topics: Vec<String>,
    middlewares: Vec<Arc<dyn Middleware>>,
}

impl KafkaConsumer {
    /// Create the group session and subscribe to `topics`.
    ///
    /// # Errors
    ///
    /// Returns [`BusError::ConnectionFailed`] if the client cannot be
    /// created or the subscription is rejected.
    pub fn new(
        config: &ConsumerConfig,
        topics: Vec<String>,
        middlewares: Vec<Arc<dyn Middleware>>,
    ) -> Result<Self, BusError> {
        let consumer: StreamConsumer = ClientConfig::new()
            .set("bootstrap.servers", &config.brokers)
            .set("group.id", &config.group_id)
            .set("auto.offset.reset", "earliest")
            .set("partition.assignment.strategy", "roundrobin")
            .set("enable.auto.commit", "true")
            .set("enable.auto.offset.store", "false")
            .set("enable.partition.eof", "false")
            .create()
            .map_err(|e| BusError::ConnectionFailed(format!("create consumer: {e}")))?;

        let topic_refs: Vec<&str> = topics.iter().map(String::as_str).collect();
        consumer
            .subscribe(&topic_refs)
            .map_err(|e| BusError::ConnectionFailed(format!("subscribe {topics:?}: {e}")))?;

        info!(
            group = %config.group_id,
            topics = ?topics,
            "consumer group subscribed"
        );

        Ok(Self {
            consumer,
            topics,
            middlewares,
        })
    }

    /// Drive the session until `shutdown` fires.
    ///
    /// The handler runs under the session's cancellation scope: a
    /// shutdown signal arriving mid-handler drops the in-flight future,
    /// so a handler suspended on I/O or a timer stops without storing
    /// its offset.
    ///
    /// # Errors
    ///
    /// Currently only transport setup failures are fatal; receive errors
    /// are logged and the session re-enters the group by itself.
    pub async fn run(
        &self,
        handler: DynHandler,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), BusError> {
        let chain = compose(handler, &self.middlewares);
        info!(topics = ?self.topics, "consumer loop started");

        loop {
            tokio::select! {
                _ = shutdown.recv() => {
                    info!(topics = ?self.topics, "consumer loop stopping");
                    return Ok(());
                }
                received = self.consumer.recv() => {
                    match received {
                        Ok(record) => {
                            let msg = owned_message(&record);
                            let outcome = tokio::select! {
                                _ = shutdown.recv() => {
                                    info!(topics = ?self.topics, "consumer cancelled mid-message");
                                    return Ok(());
                                }
                                res = chain.handle(&msg) => res,
                            };
                            match outcome {
                                Ok(()) => {
                                    if let Err(e) = self.consumer.store_offset_from_message(&record) {
                                        error!(
                                            topic = %msg.topic,
                                            partition = msg.partition,
                                            offset = msg.offset,
                                            error = %e,
                                            "failed to store offset"
                                        );
                                    }
                                }
                                Err(e) => {
                                    // Offset left unstored: redelivered on rebalance.
                                    error!(
                                        topic = %msg.topic,
                                        partition = msg.partition,
                                        offset = msg.offset,
                                        error = %e,
                                        "message handler error"
                                    );
                                }
                            }
                        }
                        Err(e) => {
                            error!(topics = ?self.topics, error = %e, "kafka receive error");
                        }
                    }
                }
            }
        }
    }
}

fn owned_message(record: &rdkafka::message::BorrowedMessage<'_>) -> Message {
    let mut headers = HashMap::new();
    if let Some(raw) = record.headers() {
        for header in raw.iter() {
            if let Some(value) = header.value {
                headers.insert(header.key.to_string(), value.to_vec());
            }
        }
    }

    Message {
        key: record.key().map(<[u8]>::to_vec).unwrap_or_default(),
        value: record.payload().map(<[u8]>::to_vec).unwrap_or_default(),
        topic: record.topic().to_string(),
        partition: record.partition(),
        offset: record.offset(),
        timestamp: record
            .timestamp()
            .to_millis()
            .and_then(DateTime::from_timestamp_millis),
        headers,
    }
}
