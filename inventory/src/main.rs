//! Catalog service binary.

use anyhow::Context;
use astradock_inventory::bootstrap::bootstrap;
use astradock_inventory::config::Config;
use astradock_platform::{env, signal, telemetry};
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env::load_dotenv_if_local()?;
    let config = Config::from_env()?;
    telemetry::init(&config.log_level, config.log_as_json);

    info!("starting inventory service");
    let router = bootstrap(&config).await?;

    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .context("bind server address")?;
    info!(address = %config.bind_addr, "inventory server listening");

    axum::serve(listener, router)
        .with_graceful_shutdown(signal::shutdown_signal())
        .await
        .context("serve inventory api")?;

    info!("inventory service stopped");
    Ok(())
}
