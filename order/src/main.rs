//! Order service binary.

use anyhow::Context;
use astradock_order::bootstrap::{bootstrap, App};
use astradock_order::config::Config;
use astradock_platform::{env, signal, telemetry};
use tokio::sync::broadcast;
use tokio::task::JoinError;
use tracing::{error, info};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env::load_dotenv_if_local()?;
    let config = Config::from_env()?;
    telemetry::init(&config.logger.level, config.logger.as_json);

    info!("starting order service");
    let app = bootstrap(&config).await?;

    run(app, &config).await
}

/// Run the HTTP server and the assembled-event consumer until one of
/// them stops or a shutdown signal arrives; the first failure cancels
/// the sibling. Teardown then runs under a fresh shutdown budget that
/// does not inherit the run loop's cancellation.
async fn run(app: App, config: &Config) -> anyhow::Result<()> {
    let (shutdown_tx, _guard_rx) = broadcast::channel::<()>(1);

    {
        let tx = shutdown_tx.clone();
        tokio::spawn(async move {
            signal::shutdown_signal().await;
            let _ = tx.send(());
        });
    }

    let listener = tokio::net::TcpListener::bind(&config.server.bind_addr)
        .await
        .context("bind server address")?;
    info!(address = %config.server.bind_addr, "order server listening");

    let mut server_rx = shutdown_tx.subscribe();
    let router = app.router;
    let mut server_handle = tokio::spawn(async move {
        axum::serve(listener, router)
            .with_graceful_shutdown(async move {
                let _ = server_rx.recv().await;
            })
            .await
            .map_err(anyhow::Error::from)
    });

    let consumer_rx = shutdown_tx.subscribe();
    let consumer = app.consumer;
    let handler = app.assembled_handler;
    let mut consumer_handle = tokio::spawn(async move {
        info!("assembled-event consumer running");
        consumer
            .run(handler, consumer_rx)
            .await
            .map_err(anyhow::Error::from)
    });

    let grace = config.server.shutdown_timeout;
    let first: anyhow::Result<()> = tokio::select! {
        res = &mut server_handle => {
            let _ = shutdown_tx.send(());
            let _ = tokio::time::timeout(grace, &mut consumer_handle).await;
            flatten(res)
        }
        res = &mut consumer_handle => {
            let _ = shutdown_tx.send(());
            let _ = tokio::time::timeout(grace, &mut server_handle).await;
            flatten(res)
        }
    };

    if let Err(e) = app.closer.close_all(grace).await {
        error!(error = %e, "shutdown finished with errors");
    } else {
        info!("order service stopped");
    }

    first
}

fn flatten(res: Result<anyhow::Result<()>, JoinError>) -> anyhow::Result<()> {
    match res {
        Ok(inner) => inner,
        Err(join) => Err(anyhow::Error::new(join).context("worker task failed")),
    }
}
