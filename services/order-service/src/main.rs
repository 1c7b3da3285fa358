use anyhow::{Context, Result};
use common::telemetry::{init_telemetry, shutdown_telemetry, TelemetryConfig};
use common::AppConfig;
use domain::SchemaValidator;
use messaging::{IngestionPipeline, OrderConsumer};
use order_store::PostgresOrderStore;
use read_model::{spawn_sweeper, warm_up, MemoryCache, OrderReader};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::watch;
use tracing::{error, info};

mod handlers;
mod ingest;
mod routes;
mod shutdown;
mod state;

use ingest::PersistAndCache;
use state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();

    let config = AppConfig::from_env()?;

    init_telemetry(TelemetryConfig::for_service("order-service", &config))
        .map_err(|e| anyhow::anyhow!("failed to initialize telemetry: {e}"))?;

    info!(
        port = config.port,
        brokers = %config.kafka.brokers,
        topic = %config.kafka.topic,
        group_id = %config.kafka.group_id,
        cache_ttl_secs = config.cache.ttl_seconds,
        "Starting order service"
    );

    let store = Arc::new(
        PostgresOrderStore::connect(&config.database.url(), config.database.max_connections)
            .await
            .context("failed to connect to Postgres")?,
    );

    if config.run_migrations {
        store
            .migrate()
            .await
            .context("failed to apply migrations")?;
    }

    let cache = Arc::new(MemoryCache::new(
        config.cache.ttl(),
        config.cache.cleanup_interval(),
    ));

    let warmed = warm_up(store.as_ref(), cache.as_ref())
        .await
        .context("failed to warm the cache")?;
    info!(orders = warmed, "Cache warm-up complete");

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let shutdown_tx = Arc::new(shutdown_tx);
    let (signals, signal_task) = shutdown::spawn_signal_listener(shutdown_tx.clone())?;

    let sweeper = spawn_sweeper(cache.clone(), shutdown_rx.clone());

    let consumer = OrderConsumer::new(
        &config.kafka.brokers,
        &config.kafka.group_id,
        &config.kafka.topic,
        &config.kafka.offset_reset,
    )?;
    let pipeline = IngestionPipeline::new(
        consumer,
        Arc::new(SchemaValidator),
        PersistAndCache::new(store.clone(), cache.clone()),
    );
    let pipeline_shutdown = shutdown_rx.clone();
    let pipeline_task = tokio::spawn(async move {
        match pipeline.run(pipeline_shutdown).await {
            Ok(stats) => info!(?stats, "Ingestion finished"),
            Err(e) => error!(error = %e, "Ingestion pipeline stopped, lookups are still served"),
        }
    });

    let reader = Arc::new(OrderReader::new(store.clone(), cache.clone()));
    let app = routes::create_router(AppState::new(reader, cache.clone()));

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!(%addr, "Order service listening");

    let served = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown::wait_for_shutdown(shutdown_rx))
        .await;

    // The server may also end on an I/O error; stop the background tasks either way
    let _ = shutdown_tx.send(true);
    signals.close();
    let (pipeline_done, sweeper_done, signals_done) =
        tokio::join!(pipeline_task, sweeper, signal_task);
    for (task, done) in [
        ("ingestion", pipeline_done),
        ("cache sweeper", sweeper_done),
        ("signal listener", signals_done),
    ] {
        if let Err(e) = done {
            error!(task, error = %e, "Background task failed");
        }
    }

    store.close().await;
    info!("Order service stopped");
    shutdown_telemetry();

    served.context("server error")
}
