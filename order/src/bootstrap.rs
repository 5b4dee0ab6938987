//! Composition root for the order service.
//!
//! One explicit builder pass, run once at startup: database pool before
//! migrator before repository before service. Each resource registers
//! its teardown with the closer as it is constructed, so shutdown
//! releases them in reverse.

use crate::api::{self, ApiState};
use crate::clients::{HttpInventoryClient, HttpPaymentClient};
use crate::config::Config;
use crate::consumer::AssembledHandler;
use crate::producer::OrderPaidProducer;
use crate::repository::PgOrderRepository;
use crate::service::OrderService;
use anyhow::Context;
use astradock_platform::bus::{
    ConsumerConfig, DynHandler, KafkaConsumer, KafkaProducer, LoggingMiddleware, ProducerConfig,
    RecoveryMiddleware,
};
use astradock_platform::closer::Closer;
use axum::Router;
use sqlx::migrate::Migrator;
use sqlx::postgres::PgPoolOptions;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

/// Everything the run loop needs.
pub struct App {
    /// HTTP router.
    pub router: Router,
    /// Assembled-event consumer session.
    pub consumer: KafkaConsumer,
    /// Composed handler for the consumer.
    pub assembled_handler: DynHandler,
    /// Teardown registry, already populated.
    pub closer: Arc<Closer>,
}

/// Build the whole dependency graph.
///
/// # Errors
///
/// Fails if the database is unreachable, migrations cannot be applied,
/// or a Kafka client cannot be created.
pub async fn bootstrap(config: &Config) -> anyhow::Result<App> {
    let closer = Arc::new(Closer::new());

    let pool = PgPoolOptions::new()
        .max_connections(10)
        .connect(&config.postgres.dsn())
        .await
        .context("connect to postgres")?;
    {
        let pool = pool.clone();
        closer.add("postgres pool", move || async move {
            pool.close().await;
            Ok(())
        });
    }
    info!("postgres pool ready");

    let migrator = Migrator::new(Path::new(&config.postgres.migrations_dir))
        .await
        .context("load migrations")?;
    migrator.run(&pool).await.context("apply migrations")?;
    info!(dir = %config.postgres.migrations_dir, "migrations applied");

    let repo = Arc::new(PgOrderRepository::new(pool));

    let http = reqwest::Client::new();
    let inventory = Arc::new(HttpInventoryClient::new(
        http.clone(),
        config.clients.inventory_base_url.clone(),
    ));
    let payment = Arc::new(HttpPaymentClient::new(
        http,
        config.clients.payment_base_url.clone(),
    ));

    let kafka_producer = Arc::new(
        KafkaProducer::new(&ProducerConfig {
            brokers: config.kafka.brokers.clone(),
            topic: config.kafka.order_paid_topic.clone(),
        })
        .context("create paid-order producer")?,
    );
    {
        let producer = Arc::clone(&kafka_producer);
        closer.add("kafka producer", move || async move {
            tokio::task::spawn_blocking(move || producer.flush(Duration::from_secs(5)))
                .await
                .context("join flush task")??;
            Ok(())
        });
    }
    let publisher = Arc::new(OrderPaidProducer::new(kafka_producer));

    let service = Arc::new(OrderService::new(
        repo,
        inventory,
        payment,
        publisher,
        config.server.read_db_timeout,
        config.server.write_db_timeout,
    ));

    let consumer = KafkaConsumer::new(
        &ConsumerConfig {
            brokers: config.kafka.brokers.clone(),
            group_id: config.kafka.assembled_group_id.clone(),
        },
        vec![config.kafka.order_assembled_topic.clone()],
        vec![Arc::new(RecoveryMiddleware), Arc::new(LoggingMiddleware)],
    )
    .context("create assembled-event consumer")?;
    let assembled_handler: DynHandler = Arc::new(AssembledHandler::new(Arc::clone(&service)));

    let router = api::router(Arc::new(ApiState { service }));

    Ok(App {
        router,
        consumer,
        assembled_handler,
        closer,
    })
}
