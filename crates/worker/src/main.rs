use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use wayside_worker::SettlementPoller;

/// Default seconds between gateway settlement sweeps.
const DEFAULT_POLL_INTERVAL_SECS: u64 = 60;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "wayside_worker=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");
    let pool = wayside_db::create_pool(&database_url)
        .await
        .expect("Failed to connect to database");
    tracing::info!("Database connection pool created");

    let poll_interval_secs: u64 = std::env::var("GATEWAY_POLL_INTERVAL_SECS")
        .unwrap_or_else(|_| DEFAULT_POLL_INTERVAL_SECS.to_string())
        .parse()
        .expect("GATEWAY_POLL_INTERVAL_SECS must be a valid u64");

    let payments = Arc::new(wayside_payments::PaymentClient::new(
        wayside_payments::GatewayConfig::from_env(),
    ));

    let cancel = CancellationToken::new();
    let poller = SettlementPoller::new(
        pool,
        payments,
        Duration::from_secs(poll_interval_secs),
    );

    let poller_cancel = cancel.clone();
    let poller_handle = tokio::spawn(async move {
        poller.run(poller_cancel).await;
    });

    tracing::info!(poll_interval_secs, "Worker started");

    tokio::signal::ctrl_c()
        .await
        .expect("Failed to install Ctrl-C handler");
    tracing::info!("Received SIGINT, shutting down");

    cancel.cancel();
    let _ = tokio::time::timeout(Duration::from_secs(5), poller_handle).await;
    tracing::info!("Worker stopped");
}
