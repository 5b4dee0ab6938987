//! Payment service binary.

use anyhow::Context;
use astradock_payment::api::{self, ApiState};
use astradock_payment::config::Config;
use astradock_payment::service::PaymentService;
use astradock_platform::{env, signal, telemetry};
use std::sync::Arc;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env::load_dotenv_if_local()?;
    let config = Config::from_env()?;
    telemetry::init(&config.log_level, config.log_as_json);

    info!("starting payment service");
    let router = api::router(Arc::new(ApiState {
        service: PaymentService::new(),
    }));

    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .context("bind server address")?;
    info!(address = %config.bind_addr, "payment server listening");

    axum::serve(listener, router)
        .with_graceful_shutdown(signal::shutdown_signal())
        .await
        .context("serve payment api")?;

    info!("payment service stopped");
    Ok(())
}
