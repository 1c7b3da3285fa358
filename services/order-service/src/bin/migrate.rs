use anyhow::{Context, Result};
use common::telemetry::init_basic_telemetry;
use common::AppConfig;
use order_store::PostgresOrderStore;
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();

    let config = AppConfig::from_env()?;
    init_basic_telemetry(&config.log_level);

    info!("Applying order store migrations...");

    let store = PostgresOrderStore::connect(&config.database.url(), 1)
        .await
        .context("failed to connect to Postgres")?;
    store
        .migrate()
        .await
        .context("failed to apply migrations")?;
    store.close().await;

    info!("Migrations applied successfully");
    Ok(())
}
