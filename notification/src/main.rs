//! Notification service binary.

use anyhow::Context;
use astradock_notification::bot;
use astradock_notification::client::BotClient;
use astradock_notification::config::Config;
use astradock_notification::consumers::{OrderAssembledNotifier, OrderPaidNotifier};
use astradock_notification::registry::SubscriberRegistry;
use astradock_notification::service::NotificationService;
use astradock_platform::bus::{
    ConsumerConfig, DynHandler, KafkaConsumer, LoggingMiddleware, RecoveryMiddleware,
};
use astradock_platform::{env, signal, telemetry};
use std::sync::Arc;
use tokio::sync::broadcast;
use tokio::task::{JoinError, JoinHandle};
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env::load_dotenv_if_local()?;
    let config = Config::from_env()?;
    telemetry::init(&config.log_level, config.log_as_json);

    info!("starting notification service");

    let client = Arc::new(BotClient::new(reqwest::Client::new(), &config.bot_token));
    let registry = Arc::new(SubscriberRegistry::new());
    let service = Arc::new(NotificationService::new(client.clone(), registry.clone()));

    let paid_consumer = KafkaConsumer::new(
        &ConsumerConfig {
            brokers: config.brokers.clone(),
            group_id: config.paid_group_id.clone(),
        },
        vec![config.order_paid_topic.clone()],
        vec![Arc::new(RecoveryMiddleware), Arc::new(LoggingMiddleware)],
    )
    .context("create paid-order consumer")?;

    let assembled_consumer = KafkaConsumer::new(
        &ConsumerConfig {
            brokers: config.brokers.clone(),
            group_id: config.assembled_group_id.clone(),
        },
        vec![config.order_assembled_topic.clone()],
        vec![Arc::new(RecoveryMiddleware), Arc::new(LoggingMiddleware)],
    )
    .context("create assembled-ship consumer")?;

    let (shutdown_tx, _guard_rx) = broadcast::channel::<()>(1);
    {
        let tx = shutdown_tx.clone();
        tokio::spawn(async move {
            signal::shutdown_signal().await;
            let _ = tx.send(());
        });
    }

    let paid_handler: DynHandler = Arc::new(OrderPaidNotifier::new(service.clone()));
    let paid_rx = shutdown_tx.subscribe();
    let mut paid_handle: JoinHandle<anyhow::Result<()>> = tokio::spawn(async move {
        info!("paid-order consumer running");
        paid_consumer
            .run(paid_handler, paid_rx)
            .await
            .map_err(anyhow::Error::from)
    });

    let assembled_handler: DynHandler = Arc::new(OrderAssembledNotifier::new(service));
    let assembled_rx = shutdown_tx.subscribe();
    let mut assembled_handle: JoinHandle<anyhow::Result<()>> = tokio::spawn(async move {
        info!("assembled-ship consumer running");
        assembled_consumer
            .run(assembled_handler, assembled_rx)
            .await
            .map_err(anyhow::Error::from)
    });

    let bot_rx = shutdown_tx.subscribe();
    let mut bot_handle: JoinHandle<anyhow::Result<()>> =
        tokio::spawn(bot::run_start_command_loop(client, registry, bot_rx));

    let grace = config.shutdown_timeout;
    let first: anyhow::Result<()> = tokio::select! {
        res = &mut paid_handle => {
            let _ = shutdown_tx.send(());
            let _ = tokio::time::timeout(grace, async {
                let _ = (&mut assembled_handle).await;
                let _ = (&mut bot_handle).await;
            })
            .await;
            flatten(res)
        }
        res = &mut assembled_handle => {
            let _ = shutdown_tx.send(());
            let _ = tokio::time::timeout(grace, async {
                let _ = (&mut paid_handle).await;
                let _ = (&mut bot_handle).await;
            })
            .await;
            flatten(res)
        }
        res = &mut bot_handle => {
            let _ = shutdown_tx.send(());
            let _ = tokio::time::timeout(grace, async {
                let _ = (&mut paid_handle).await;
                let _ = (&mut assembled_handle).await;
            })
            .await;
            flatten(res)
        }
    };

    info!("notification service stopped");
    first
}

fn flatten(res: Result<anyhow::Result<()>, JoinError>) -> anyhow::Result<()> {
    match res {
        Ok(inner) => inner,
        Err(join) => Err(anyhow::Error::new(join).context("worker task failed")),
    }
}
