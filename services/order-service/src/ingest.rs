use async_trait::async_trait;
use domain::Order;
use messaging::{HandlerResult, OrderHandler};
use order_store::OrderRepository;
use read_model::OrderCache;
use std::sync::Arc;

/// Persistence step of the ingestion pipeline: durable upsert, then cache.
///
/// The cache is only written once the store has accepted the order.
pub struct PersistAndCache {
    repository: Arc<dyn OrderRepository>,
    cache: Arc<dyn OrderCache>,
}

impl PersistAndCache {
    pub fn new(repository: Arc<dyn OrderRepository>, cache: Arc<dyn OrderCache>) -> Self {
        Self { repository, cache }
    }
}

#[async_trait]
impl OrderHandler for PersistAndCache {
    async fn handle(&self, order: Order) -> HandlerResult {
        self.repository.upsert(&order).await?;
        let order_uid = order.order_uid.clone();
        self.cache.set(&order_uid, order);
        Ok(())
    }
}
