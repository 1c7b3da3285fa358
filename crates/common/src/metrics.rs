use lazy_static::lazy_static;
use prometheus::{
    register_counter_vec, register_histogram_vec, register_int_gauge, CounterVec, Encoder,
    HistogramVec, IntGauge, TextEncoder,
};

lazy_static! {
    // Ingestion metrics
    pub static ref INGESTED_MESSAGES: CounterVec = register_counter_vec!(
        "orders_ingested_messages_total",
        "Stream messages handled by the ingestion pipeline, by outcome",
        &["outcome"]
    )
    .expect("metric cannot be created");

    // Lookup metrics
    pub static ref LOOKUP_COUNTER: CounterVec = register_counter_vec!(
        "orders_lookups_total",
        "Order lookups, by where the answer came from",
        &["source"]
    )
    .expect("metric cannot be created");

    pub static ref LOOKUP_DURATION: HistogramVec = register_histogram_vec!(
        "orders_lookup_duration_seconds",
        "Order lookup duration in seconds",
        &["source"],
        vec![0.0001, 0.0005, 0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0]
    )
    .expect("metric cannot be created");

    // Cache metrics
    pub static ref CACHE_HIT_COUNTER: CounterVec = register_counter_vec!(
        "orders_cache_requests_total",
        "Total number of cache requests",
        &["cache_type", "status"]
    )
    .expect("metric cannot be created");

    pub static ref CACHE_WARMED_ORDERS: IntGauge = register_int_gauge!(
        "orders_cache_warmed_orders",
        "Orders loaded into the cache by the last warm-up"
    )
    .expect("metric cannot be created");

    // Durable store metrics
    pub static ref STORE_OPERATIONS: CounterVec = register_counter_vec!(
        "orders_store_operations_total",
        "Total number of order store operations",
        &["operation", "status"]
    )
    .expect("metric cannot be created");

    pub static ref STORE_DURATION: HistogramVec = register_histogram_vec!(
        "orders_store_duration_seconds",
        "Order store operation duration in seconds",
        &["operation"],
        vec![0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 5.0]
    )
    .expect("metric cannot be created");
}

/// Get all metrics in Prometheus text format
pub fn gather_metrics() -> Result<String, Box<dyn std::error::Error>> {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();
    encoder.encode(&metric_families, &mut buffer)?;
    Ok(String::from_utf8(buffer)?)
}

/// Record the outcome of one ingested message
pub fn record_ingested(outcome: &str) {
    INGESTED_MESSAGES.with_label_values(&[outcome]).inc();
}

/// Record a lookup and where it was answered from
pub fn record_lookup(source: &str, duration_secs: f64) {
    LOOKUP_COUNTER.with_label_values(&[source]).inc();
    LOOKUP_DURATION
        .with_label_values(&[source])
        .observe(duration_secs);
}

/// Helper function to record cache hit/miss
pub fn record_cache_request(cache_type: &str, hit: bool) {
    let status = if hit { "hit" } else { "miss" };
    CACHE_HIT_COUNTER
        .with_label_values(&[cache_type, status])
        .inc();
}

pub fn record_warm_up(orders: usize) {
    CACHE_WARMED_ORDERS.set(orders as i64);
}

/// Helper function to record a durable store operation
pub fn record_store_operation(operation: &str, success: bool, duration_secs: f64) {
    let status = if success { "success" } else { "error" };
    STORE_OPERATIONS
        .with_label_values(&[operation, status])
        .inc();
    STORE_DURATION
        .with_label_values(&[operation])
        .observe(duration_secs);
}
