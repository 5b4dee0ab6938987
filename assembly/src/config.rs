//! Assembly worker configuration.

use astradock_platform::env::{required, required_parse, ConfigError};
use std::time::Duration;

/// Full configuration of the assembly worker.
#[derive(Debug, Clone)]
pub struct Config {
    /// Comma-separated broker addresses.
    pub brokers: String,
    /// Topic paid-order events are consumed from.
    pub order_paid_topic: String,
    /// Topic assembled-ship events are produced to.
    pub order_assembled_topic: String,
    /// Consumer group for the paid-event consumer.
    pub paid_group_id: String,
    /// Simulated build time per order; 10 seconds is the canonical
    /// value.
    pub assembly_delay: Duration,
    /// Budget for graceful shutdown.
    pub shutdown_timeout: Duration,
    /// Default level when `RUST_LOG` is unset.
    pub log_level: String,
    /// Emit JSON records instead of the human format.
    pub log_as_json: bool,
}

impl Config {
    /// Load from the environment.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] on the first missing or unparsable
    /// variable.
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            brokers: required("KAFKA_BROKERS")?,
            order_paid_topic: required("ORDER_PAID_TOPIC_NAME")?,
            order_assembled_topic: required("ORDER_ASSEMBLED_TOPIC_NAME")?,
            paid_group_id: required("ORDER_PAID_CONSUMER_GROUP_ID")?,
            assembly_delay: Duration::from_secs(required_parse("ASSEMBLY_DELAY_SECS")?),
            shutdown_timeout: Duration::from_secs(required_parse("SHUTDOWN_TIMEOUT_SECS")?),
            log_level: required("LOG_LEVEL")?,
            log_as_json: required_parse("LOG_AS_JSON")?,
        })
    }
}
