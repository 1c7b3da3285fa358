use anyhow::{Context, Result};
use clap::Parser;
use common::telemetry::init_basic_telemetry;
use domain::fake::fake_order;
use domain::Order;
use messaging::{ensure_topic_exists, OrderPublisher};
use tracing::info;

/// Publish randomly generated orders to the order topic
#[derive(Debug, Parser)]
#[command(name = "order-producer", version)]
struct Args {
    /// Number of orders to generate
    #[arg(short = 'n', long = "count", default_value_t = 10)]
    count: usize,

    /// Comma-separated Kafka bootstrap servers
    #[arg(long, env = "KAFKA_BROKERS", default_value = "localhost:9092")]
    brokers: String,

    /// Topic the orders are published to
    #[arg(long, env = "KAFKA_TOPIC", default_value = "orders")]
    topic: String,

    /// Log filter when RUST_LOG is unset
    #[arg(long, default_value = "info")]
    log_level: String,
}

fn generate_orders(count: usize) -> Vec<Order> {
    (0..count).map(|_| fake_order()).collect()
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    let args = Args::parse();
    init_basic_telemetry(&args.log_level);

    ensure_topic_exists(&args.brokers, &args.topic)
        .await
        .context("failed to prepare topic")?;

    let publisher = OrderPublisher::new(&args.brokers, args.topic.as_str())?;

    info!(count = args.count, topic = %args.topic, "Generating and sending orders...");
    let orders = generate_orders(args.count);
    for order in &orders {
        info!(order_uid = %order.order_uid, "Generated order");
    }

    let sent = publisher
        .publish_batch(&orders)
        .await
        .context("failed to publish orders")?;

    info!(sent, "Orders sent successfully");
    Ok(())
}
