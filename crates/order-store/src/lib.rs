pub mod memory;
pub mod postgres_order_store;

pub use memory::InMemoryOrderStore;
pub use postgres_order_store::PostgresOrderStore;

use async_trait::async_trait;
use domain::Order;
use thiserror::Error;

/// Durable order storage keyed by `order_uid`.
///
/// The order is kept as one opaque JSON payload; only the key is indexed.
#[async_trait]
pub trait OrderRepository: Send + Sync {
    /// Insert the order, or replace the payload already stored under its UID.
    /// The write is atomic.
    async fn upsert(&self, order: &Order) -> Result<(), StoreError>;

    /// Load one order. `Ok(None)` means the UID is unknown.
    async fn get_by_id(&self, order_uid: &str) -> Result<Option<Order>, StoreError>;

    /// Load every stored order. Unbounded; used only to warm the cache.
    async fn get_all(&self) -> Result<Vec<Order>, StoreError>;
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Stored payload for order {order_uid} is corrupt: {source}")]
    Corrupt {
        order_uid: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
}

/// Decode a stored payload. A payload that no longer decodes is corruption,
/// never absence.
pub(crate) fn decode_payload(
    order_uid: &str,
    payload: serde_json::Value,
) -> Result<Order, StoreError> {
    serde_json::from_value(payload).map_err(|source| StoreError::Corrupt {
        order_uid: order_uid.to_string(),
        source,
    })
}
