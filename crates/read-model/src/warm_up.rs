use common::metrics;
use order_store::OrderRepository;
use tracing::info;

use crate::{OrderCache, ReadModelError};

/// Load every stored order into the cache. Returns how many were loaded.
///
/// Runs once before serving starts; an error here must abort startup.
pub async fn warm_up(
    repository: &dyn OrderRepository,
    cache: &dyn OrderCache,
) -> Result<usize, ReadModelError> {
    let orders = repository.get_all().await?;
    let count = orders.len();

    if count == 0 {
        info!("No orders in store, cache starts empty");
    } else {
        cache.bulk_set(orders);
        info!(count, "Cache warmed from store");
    }

    metrics::record_warm_up(count);
    Ok(count)
}
