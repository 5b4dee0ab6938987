//! Assembly worker binary.

use anyhow::Context;
use astradock_assembly::config::Config;
use astradock_assembly::service::AssemblyService;
use astradock_platform::bus::{
    ConsumerConfig, DynHandler, KafkaConsumer, KafkaProducer, LoggingMiddleware, ProducerConfig,
    RecoveryMiddleware,
};
use astradock_platform::closer::Closer;
use astradock_platform::{env, signal, telemetry};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;
use tracing::{error, info};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env::load_dotenv_if_local()?;
    let config = Config::from_env()?;
    telemetry::init(&config.log_level, config.log_as_json);

    info!("starting assembly worker");
    let closer = Arc::new(Closer::new());

    let producer = Arc::new(
        KafkaProducer::new(&ProducerConfig {
            brokers: config.brokers.clone(),
            topic: config.order_assembled_topic.clone(),
        })
        .context("create assembled-ship producer")?,
    );
    {
        let producer = Arc::clone(&producer);
        closer.add("kafka producer", move || async move {
            tokio::task::spawn_blocking(move || producer.flush(Duration::from_secs(5)))
                .await
                .context("join flush task")??;
            Ok(())
        });
    }

    let consumer = KafkaConsumer::new(
        &ConsumerConfig {
            brokers: config.brokers.clone(),
            group_id: config.paid_group_id.clone(),
        },
        vec![config.order_paid_topic.clone()],
        vec![Arc::new(RecoveryMiddleware), Arc::new(LoggingMiddleware)],
    )
    .context("create paid-order consumer")?;

    let handler: DynHandler = Arc::new(AssemblyService::new(producer, config.assembly_delay));

    let (shutdown_tx, shutdown_rx) = broadcast::channel::<()>(1);
    {
        let tx = shutdown_tx.clone();
        tokio::spawn(async move {
            signal::shutdown_signal().await;
            let _ = tx.send(());
        });
    }

    info!(delay = ?config.assembly_delay, "paid-order consumer running");
    let run_result = consumer
        .run(handler, shutdown_rx)
        .await
        .map_err(anyhow::Error::from);

    if let Err(e) = closer.close_all(config.shutdown_timeout).await {
        error!(error = %e, "shutdown finished with errors");
    } else {
        info!("assembly worker stopped");
    }

    run_result
}
