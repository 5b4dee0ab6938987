//! Order service configuration.
//!
//! Everything comes from the environment and everything is required.

use astradock_platform::env::{required, required_parse, ConfigError};
use std::time::Duration;

/// Full configuration of the order service.
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP server and operation deadlines.
    pub server: ServerConfig,
    /// Broker, topics and consumer group.
    pub kafka: KafkaConfig,
    /// Database connection and migrations.
    pub postgres: PostgresConfig,
    /// Sibling service endpoints.
    pub clients: ClientsConfig,
    /// Log level and format.
    pub logger: LoggerConfig,
}

/// Server binding and deadlines.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address to bind, e.g. `0.0.0.0:8080`.
    pub bind_addr: String,
    /// Per-operation deadline for database reads.
    pub read_db_timeout: Duration,
    /// Per-operation deadline for database writes.
    pub write_db_timeout: Duration,
    /// Budget for the whole shutdown sequence.
    pub shutdown_timeout: Duration,
}

/// Kafka wiring.
#[derive(Debug, Clone)]
pub struct KafkaConfig {
    /// Comma-separated broker addresses.
    pub brokers: String,
    /// Topic paid-order events are produced to.
    pub order_paid_topic: String,
    /// Topic assembled-ship events are consumed from.
    pub order_assembled_topic: String,
    /// Consumer group for the assembled-event consumer.
    pub assembled_group_id: String,
}

/// Postgres connection pieces.
#[derive(Debug, Clone)]
pub struct PostgresConfig {
    /// Database host.
    pub host: String,
    /// Database port.
    pub port: u16,
    /// Role name.
    pub user: String,
    /// Role password.
    pub password: String,
    /// Database name.
    pub database: String,
    /// libpq ssl mode (`disable`, `prefer`, `require`, ...).
    pub ssl_mode: String,
    /// Directory holding the SQL migrations.
    pub migrations_dir: String,
}

impl PostgresConfig {
    /// Assemble the connection string.
    #[must_use]
    pub fn dsn(&self) -> String {
        format!(
            "postgres://{}:{}@{}:{}/{}?sslmode={}",
            self.user, self.password, self.host, self.port, self.database, self.ssl_mode
        )
    }
}

/// Endpoints of the sibling services.
#[derive(Debug, Clone)]
pub struct ClientsConfig {
    /// Base URL of the inventory service.
    pub inventory_base_url: String,
    /// Base URL of the payment service.
    pub payment_base_url: String,
}

/// Logging switches.
#[derive(Debug, Clone)]
pub struct LoggerConfig {
    /// Default level when `RUST_LOG` is unset.
    pub level: String,
    /// Emit JSON records instead of the human format.
    pub as_json: bool,
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
            server: ServerConfig {
                bind_addr: required("HTTP_ADDR")?,
                read_db_timeout: Duration::from_millis(required_parse("DB_READ_TIMEOUT_MS")?),
                write_db_timeout: Duration::from_millis(required_parse("DB_WRITE_TIMEOUT_MS")?),
                shutdown_timeout: Duration::from_secs(required_parse("SHUTDOWN_TIMEOUT_SECS")?),
            },
            kafka: KafkaConfig {
                brokers: required("KAFKA_BROKERS")?,
                order_paid_topic: required("ORDER_PAID_TOPIC_NAME")?,
                order_assembled_topic: required("ORDER_ASSEMBLED_TOPIC_NAME")?,
                assembled_group_id: required("ORDER_ASSEMBLED_CONSUMER_GROUP_ID")?,
            },
            postgres: PostgresConfig {
                host: required("POSTGRES_HOST")?,
                port: required_parse("POSTGRES_PORT")?,
                user: required("POSTGRES_USER")?,
                password: required("POSTGRES_PASSWORD")?,
                database: required("POSTGRES_DB")?,
                ssl_mode: required("POSTGRES_SSL_MODE")?,
                migrations_dir: required("MIGRATIONS_DIR")?,
            },
            clients: ClientsConfig {
                inventory_base_url: required("INVENTORY_BASE_URL")?,
                payment_base_url: required("PAYMENT_BASE_URL")?,
            },
            logger: LoggerConfig {
                level: required("LOG_LEVEL")?,
                as_json: required_parse("LOG_AS_JSON")?,
            },
        })
    }
}
