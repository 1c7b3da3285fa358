use common::metrics;
use domain::Order;
use order_store::OrderRepository;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error};

use crate::{OrderCache, ReadModelError};

/// Cache-aside point lookups.
///
/// Reads the cache first and falls back to the durable store on a miss,
/// writing a store hit back into the cache. Never writes to the store.
pub struct OrderReader {
    repository: Arc<dyn OrderRepository>,
    cache: Arc<dyn OrderCache>,
}

impl OrderReader {
    pub fn new(repository: Arc<dyn OrderRepository>, cache: Arc<dyn OrderCache>) -> Self {
        Self { repository, cache }
    }

    /// `Ok(None)` means the order does not exist; `Err` is an internal failure.
    pub async fn lookup(&self, order_uid: &str) -> Result<Option<Order>, ReadModelError> {
        let start = Instant::now();

        if let Some(order) = self.cache.get(order_uid) {
            debug!(order_uid = %order_uid, "Cache hit");
            metrics::record_lookup("cache", start.elapsed().as_secs_f64());
            return Ok(Some(order));
        }

        debug!(order_uid = %order_uid, "Cache miss, querying store");

        match self.repository.get_by_id(order_uid).await {
            Ok(Some(order)) => {
                self.cache.set(order_uid, order.clone());
                metrics::record_lookup("store", start.elapsed().as_secs_f64());
                Ok(Some(order))
            }
            Ok(None) => {
                metrics::record_lookup("not_found", start.elapsed().as_secs_f64());
                Ok(None)
            }
            Err(e) => {
                error!(order_uid = %order_uid, error = %e, "Failed to load order from store");
                metrics::record_lookup("error", start.elapsed().as_secs_f64());
                Err(e.into())
            }
        }
    }
}
