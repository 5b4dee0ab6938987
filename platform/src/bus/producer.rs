//! Synchronous keyed producer.

use super::{BusError, Producer};
use async_trait::async_trait;
use rdkafka::config::ClientConfig;
use rdkafka::producer::{FutureProducer, FutureRecord, Producer as RdProducer};
use rdkafka::util::Timeout;
use std::time::Duration;
use tracing::{error, info};

/// Settings for a producer bound to one topic.
#[derive(Debug, Clone)]
pub struct ProducerConfig {
    /// Comma-separated broker addresses.
    pub brokers: String,
    /// Topic every record is sent to.
    pub topic: String,
}

/// Producer with `acks=all`: [`send`](Producer::send) returns only after
/// every in-sync replica has acknowledged the record.
pub struct KafkaProducer {
    producer: FutureProducer,
    topic: String,
    timeout: Duration,
}

impl KafkaProducer {
    /// Create the underlying client.
    ///
    /// # Errors
    ///
    /// Returns [`BusError::ConnectionFailed`] if the client cannot be
    /// created from the configuration.
    pub fn new(config: &ProducerConfig) -> Result<Self, BusError> {
        let producer: FutureProducer = ClientConfig::new()
            .set("bootstrap.servers", &config.brokers)
            .set("acks", "all")
            .set("message.timeout.ms", "5000")
            .create()
            .map_err(|e| BusError::ConnectionFailed(format!("create producer: {e}")))?;

        Ok(Self {
            producer,
            topic: config.topic.clone(),
            timeout: Duration::from_secs(5),
        })
    }

    /// Flush buffered records, giving in-flight sends `timeout` to land.
    pub fn flush(&self, timeout: Duration) -> Result<(), BusError> {
        self.producer
            .flush(Timeout::After(timeout))
            .map_err(|e| BusError::PublishFailed {
                topic: self.topic.clone(),
                reason: format!("flush: {e}"),
            })
    }
}

#[async_trait]
impl Producer for KafkaProducer {
    async fn send(&self, key: &[u8], value: &[u8]) -> Result<(), BusError> {
        let record = FutureRecord::to(&self.topic).key(key).payload(value);

        match self.producer.send(record, Timeout::After(self.timeout)).await {
            Ok((partition, offset)) => {
                info!(
                    topic = %self.topic,
                    partition,
                    offset,
                    key_len = key.len(),
                    "record sent"
                );
                Ok(())
            }
            Err((kafka_error, _)) => {
                error!(topic = %self.topic, error = %kafka_error, "failed to send record");
                Err(BusError::PublishFailed {
                    topic: self.topic.clone(),
                    reason: kafka_error.to_string(),
                })
            }
        }
    }
}
