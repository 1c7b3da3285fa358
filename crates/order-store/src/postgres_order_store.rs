use super::{decode_payload, OrderRepository, StoreError};
use async_trait::async_trait;
use common::metrics;
use domain::Order;
use sqlx::migrate::Migrator;
use sqlx::postgres::PgPoolOptions;
use sqlx::{PgPool, Row};
use std::time::Instant;
use tracing::{debug, info};

static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

/// PostgreSQL implementation of the order repository
pub struct PostgresOrderStore {
    pool: PgPool,
}

impl PostgresOrderStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Open a pool and verify the database is reachable
    pub async fn connect(database_url: &str, max_connections: u32) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await?;

        info!(max_connections, "Postgres connection pool established");
        Ok(Self::new(pool))
    }

    /// Apply the embedded schema migrations
    pub async fn migrate(&self) -> Result<(), StoreError> {
        MIGRATOR.run(&self.pool).await?;
        info!("Order store migrations applied");
        Ok(())
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    pub async fn close(&self) {
        self.pool.close().await;
    }

    async fn upsert_in_tx(&self, order: &Order) -> Result<(), StoreError> {
        let payload = serde_json::to_value(order)?;

        // Rolled back on drop unless committed
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO orders (order_uid, payload)
            VALUES ($1, $2)
            ON CONFLICT (order_uid)
            DO UPDATE SET payload = EXCLUDED.payload, updated_at = now()
            "#,
        )
        .bind(&order.order_uid)
        .bind(&payload)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(())
    }

    async fn fetch_one(&self, order_uid: &str) -> Result<Option<Order>, StoreError> {
        let payload: Option<serde_json::Value> =
            sqlx::query_scalar("SELECT payload FROM orders WHERE order_uid = $1")
                .bind(order_uid)
                .fetch_optional(&self.pool)
                .await?;

        payload
            .map(|payload| decode_payload(order_uid, payload))
            .transpose()
    }

    async fn fetch_all(&self) -> Result<Vec<Order>, StoreError> {
        let rows = sqlx::query("SELECT order_uid, payload FROM orders ORDER BY order_uid")
            .fetch_all(&self.pool)
            .await?;

        rows.into_iter()
            .map(|row| {
                let order_uid: String = row.try_get("order_uid")?;
                let payload: serde_json::Value = row.try_get("payload")?;
                decode_payload(&order_uid, payload)
            })
            .collect()
    }
}

#[async_trait]
impl OrderRepository for PostgresOrderStore {
    async fn upsert(&self, order: &Order) -> Result<(), StoreError> {
        let start = Instant::now();
        let result = self.upsert_in_tx(order).await;
        metrics::record_store_operation("upsert", result.is_ok(), start.elapsed().as_secs_f64());

        if result.is_ok() {
            debug!(order_uid = %order.order_uid, "Order upserted");
        }
        result
    }

    async fn get_by_id(&self, order_uid: &str) -> Result<Option<Order>, StoreError> {
        let start = Instant::now();
        let result = self.fetch_one(order_uid).await;
        metrics::record_store_operation("get_by_id", result.is_ok(), start.elapsed().as_secs_f64());

        debug!(
            order_uid = %order_uid,
            found = matches!(result, Ok(Some(_))),
            "Order lookup in store"
        );
        result
    }

    async fn get_all(&self) -> Result<Vec<Order>, StoreError> {
        let start = Instant::now();
        let result = self.fetch_all().await;
        metrics::record_store_operation("get_all", result.is_ok(), start.elapsed().as_secs_f64());

        if let Ok(orders) = &result {
            debug!(count = orders.len(), "Loaded all orders from store");
        }
        result
    }
}
