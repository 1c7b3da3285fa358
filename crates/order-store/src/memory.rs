//! In-process stand-in for the Postgres store.
//!
//! Payloads are kept in their encoded JSON form, like the real table, and
//! every call is counted so callers can assert how often the durable store was
//! reached.

use super::{decode_payload, OrderRepository, StoreError};
use async_trait::async_trait;
use domain::Order;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::RwLock;

#[derive(Default)]
pub struct InMemoryOrderStore {
    payloads: RwLock<BTreeMap<String, serde_json::Value>>,
    upserts: AtomicUsize,
    point_reads: AtomicUsize,
    full_reads: AtomicUsize,
}

impl InMemoryOrderStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a raw payload without encoding checks
    pub async fn insert_raw(&self, order_uid: &str, payload: serde_json::Value) {
        self.payloads
            .write()
            .await
            .insert(order_uid.to_string(), payload);
    }

    pub async fn len(&self) -> usize {
        self.payloads.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.payloads.read().await.is_empty()
    }

    pub fn upsert_calls(&self) -> usize {
        self.upserts.load(Ordering::SeqCst)
    }

    pub fn get_by_id_calls(&self) -> usize {
        self.point_reads.load(Ordering::SeqCst)
    }

    pub fn get_all_calls(&self) -> usize {
        self.full_reads.load(Ordering::SeqCst)
    }

    /// Total number of reads of any kind
    pub fn read_calls(&self) -> usize {
        self.get_by_id_calls() + self.get_all_calls()
    }
}

#[async_trait]
impl OrderRepository for InMemoryOrderStore {
    async fn upsert(&self, order: &Order) -> Result<(), StoreError> {
        self.upserts.fetch_add(1, Ordering::SeqCst);
        let payload = serde_json::to_value(order)?;
        self.payloads
            .write()
            .await
            .insert(order.order_uid.clone(), payload);
        Ok(())
    }

    async fn get_by_id(&self, order_uid: &str) -> Result<Option<Order>, StoreError> {
        self.point_reads.fetch_add(1, Ordering::SeqCst);
        let payload = self.payloads.read().await.get(order_uid).cloned();
        payload
            .map(|payload| decode_payload(order_uid, payload))
            .transpose()
    }

    async fn get_all(&self) -> Result<Vec<Order>, StoreError> {
        self.full_reads.fetch_add(1, Ordering::SeqCst);
        let payloads = self.payloads.read().await;
        payloads
            .iter()
            .map(|(order_uid, payload)| decode_payload(order_uid, payload.clone()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use domain::fake::{fake_order, fake_order_with_uid};

    #[tokio::test]
    async fn test_upsert_then_get_returns_equal_order() {
        let store = InMemoryOrderStore::new();
        let order = fake_order();

        store.upsert(&order).await.unwrap();

        let loaded = store.get_by_id(&order.order_uid).await.unwrap();
        assert_eq!(loaded, Some(order));
    }

    #[tokio::test]
    async fn test_last_write_wins() {
        let store = InMemoryOrderStore::new();
        let first = fake_order_with_uid("same-uid");
        let second = fake_order_with_uid("same-uid");

        store.upsert(&first).await.unwrap();
        store.upsert(&second).await.unwrap();

        assert_eq!(store.get_by_id("same-uid").await.unwrap(), Some(second));
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn test_unknown_id_is_none() {
        let store = InMemoryOrderStore::new();
        assert!(store.get_by_id("missing").await.unwrap().is_none());
        assert_eq!(store.get_by_id_calls(), 1);
    }

    #[tokio::test]
    async fn test_get_all_returns_every_order() {
        let store = InMemoryOrderStore::new();
        for _ in 0..3 {
            store.upsert(&fake_order()).await.unwrap();
        }

        assert_eq!(store.get_all().await.unwrap().len(), 3);
        assert_eq!(store.get_all_calls(), 1);
    }

    #[tokio::test]
    async fn test_corrupt_payload_is_an_error() {
        let store = InMemoryOrderStore::new();
        store
            .insert_raw("broken", serde_json::json!({"payment": 42}))
            .await;

        assert!(matches!(
            store.get_by_id("broken").await,
            Err(StoreError::Corrupt { .. })
        ));
        assert!(store.get_all().await.is_err());
    }
}
