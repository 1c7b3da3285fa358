use dashmap::DashMap;
use domain::Order;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, MissedTickBehavior};
use tracing::{debug, info, warn};

use super::OrderCache;
use common::metrics;

struct CacheEntry {
    order: Order,
    /// `None` when the deadline is past what `Instant` can represent
    expires_at: Option<Instant>,
}

impl CacheEntry {
    fn is_expired(&self, now: Instant) -> bool {
        self.expires_at.is_some_and(|deadline| now >= deadline)
    }
}

/// Shortest sweep period, used when a zero interval is configured
const MIN_CLEANUP_INTERVAL: Duration = Duration::from_secs(1);

/// Concurrent in-process order cache with per-entry deadlines.
///
/// Expired entries are hidden from `get` at once and physically removed
/// either on the next read of that key or by [`spawn_sweeper`].
pub struct MemoryCache {
    entries: DashMap<String, CacheEntry>,
    default_ttl: Duration,
    cleanup_interval: Duration,
}

impl MemoryCache {
    pub fn new(default_ttl: Duration, cleanup_interval: Duration) -> Self {
        info!(
            ttl_secs = default_ttl.as_secs(),
            cleanup_interval_secs = cleanup_interval.as_secs(),
            "In-memory order cache initialized"
        );
        Self {
            entries: DashMap::new(),
            default_ttl,
            cleanup_interval,
        }
    }

    pub fn default_ttl(&self) -> Duration {
        self.default_ttl
    }

    pub fn cleanup_interval(&self) -> Duration {
        self.cleanup_interval
    }

    /// Number of live (unexpired) entries
    pub fn len(&self) -> usize {
        let now = Instant::now();
        self.entries
            .iter()
            .filter(|entry| !entry.is_expired(now))
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of stored entries, expired ones included
    pub fn entry_count(&self) -> usize {
        self.entries.len()
    }

    /// Drop every expired entry, returning how many were removed
    pub fn purge_expired(&self) -> usize {
        let now = Instant::now();
        let before = self.entries.len();
        self.entries.retain(|_, entry| !entry.is_expired(now));
        before.saturating_sub(self.entries.len())
    }
}

impl OrderCache for MemoryCache {
    fn get(&self, order_uid: &str) -> Option<Order> {
        let now = Instant::now();

        // The map guard must be released before a removal on the same shard
        let lookup = self
            .entries
            .get(order_uid)
            .map(|entry| (!entry.is_expired(now)).then(|| entry.order.clone()));

        let hit = match lookup {
            Some(Some(order)) => Some(order),
            Some(None) => {
                self.entries
                    .remove_if(order_uid, |_, entry| entry.is_expired(now));
                debug!(order_uid = %order_uid, "Cache entry expired");
                None
            }
            None => None,
        };

        metrics::record_cache_request("memory", hit.is_some());
        hit
    }

    fn set(&self, order_uid: &str, order: Order) {
        let entry = CacheEntry {
            order,
            expires_at: Instant::now().checked_add(self.default_ttl),
        };
        self.entries.insert(order_uid.to_string(), entry);
        debug!(order_uid = %order_uid, "Cached order");
    }
}

/// Periodically purge expired entries until `shutdown` flips to `true` or its
/// sender is dropped.
pub fn spawn_sweeper(cache: Arc<MemoryCache>, mut shutdown: watch::Receiver<bool>) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut period = cache.cleanup_interval();
        if period.is_zero() {
            warn!(
                fallback_secs = MIN_CLEANUP_INTERVAL.as_secs(),
                "Zero cache cleanup interval, using fallback"
            );
            period = MIN_CLEANUP_INTERVAL;
        }
        let mut ticker = interval_at(tokio::time::Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        debug!("Cache sweeper shutting down");
                        break;
                    }
                }
                _ = ticker.tick() => {
                    let removed = cache.purge_expired();
                    if removed > 0 {
                        debug!(removed, "Purged expired cache entries");
                    }
                }
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use domain::fake::{fake_order, fake_order_with_uid};

    fn cache_with_ttl(ttl: Duration) -> MemoryCache {
        MemoryCache::new(ttl, Duration::from_secs(600))
    }

    #[test]
    fn test_set_then_get() {
        let cache = cache_with_ttl(Duration::from_secs(60));
        let order = fake_order();

        cache.set(&order.order_uid, order.clone());

        assert_eq!(cache.get(&order.order_uid), Some(order));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_get_missing_is_none() {
        let cache = cache_with_ttl(Duration::from_secs(60));
        assert!(cache.get("missing").is_none());
    }

    #[test]
    fn test_set_replaces_existing_entry() {
        let cache = cache_with_ttl(Duration::from_secs(60));
        let first = fake_order_with_uid("uid");
        let second = fake_order_with_uid("uid");

        cache.set("uid", first);
        cache.set("uid", second.clone());

        assert_eq!(cache.get("uid"), Some(second));
        assert_eq!(cache.entry_count(), 1);
    }

    #[tokio::test]
    async fn test_entry_invisible_after_ttl() {
        let cache = cache_with_ttl(Duration::from_millis(20));
        let order = fake_order();
        cache.set(&order.order_uid, order.clone());

        tokio::time::sleep(Duration::from_millis(60)).await;

        assert!(cache.get(&order.order_uid).is_none());
        // Lazily removed on read
        assert_eq!(cache.entry_count(), 0);
    }

    #[tokio::test]
    async fn test_set_restarts_ttl() {
        let cache = cache_with_ttl(Duration::from_millis(400));
        let order = fake_order();
        cache.set(&order.order_uid, order.clone());

        tokio::time::sleep(Duration::from_millis(250)).await;
        cache.set(&order.order_uid, order.clone());
        tokio::time::sleep(Duration::from_millis(250)).await;

        assert_eq!(cache.get(&order.order_uid), Some(order));
    }

    #[test]
    fn test_bulk_set_keys_by_order_uid() {
        let cache = cache_with_ttl(Duration::from_secs(60));
        let orders: Vec<Order> = (0..5).map(|_| fake_order()).collect();

        cache.bulk_set(orders.clone());

        for order in &orders {
            assert_eq!(cache.get(&order.order_uid).as_ref(), Some(order));
        }
        assert_eq!(cache.len(), 5);
    }

    #[tokio::test]
    async fn test_purge_expired_only_removes_stale_entries() {
        let cache = cache_with_ttl(Duration::from_millis(20));
        cache.set("old", fake_order_with_uid("old"));
        tokio::time::sleep(Duration::from_millis(60)).await;

        let fresh = MemoryCache::new(Duration::from_secs(60), Duration::from_secs(600));
        fresh.set("new", fake_order_with_uid("new"));

        assert_eq!(cache.purge_expired(), 1);
        assert_eq!(fresh.purge_expired(), 0);
        assert_eq!(fresh.entry_count(), 1);
    }

    #[tokio::test]
    async fn test_sweeper_purges_and_stops_on_shutdown() {
        let cache = Arc::new(MemoryCache::new(
            Duration::from_millis(10),
            Duration::from_millis(20),
        ));
        cache.set("uid", fake_order_with_uid("uid"));

        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let handle = spawn_sweeper(cache.clone(), shutdown_rx);

        tokio::time::sleep(Duration::from_millis(100)).await;
        assert_eq!(cache.entry_count(), 0);

        shutdown_tx.send(true).unwrap();
        tokio::time::timeout(Duration::from_secs(1), handle)
            .await
            .expect("sweeper did not stop")
            .unwrap();
    }

    #[test]
    fn test_set_with_unrepresentable_ttl_never_expires() {
        let cache = cache_with_ttl(Duration::MAX);
        let order = fake_order();

        cache.set(&order.order_uid, order.clone());

        assert_eq!(cache.get(&order.order_uid), Some(order));
        assert_eq!(cache.purge_expired(), 0);
    }

    #[tokio::test]
    async fn test_sweeper_with_zero_interval_keeps_running() {
        let cache = Arc::new(MemoryCache::new(Duration::from_millis(10), Duration::ZERO));
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let handle = spawn_sweeper(cache, shutdown_rx);

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(!handle.is_finished());

        shutdown_tx.send(true).unwrap();
        tokio::time::timeout(Duration::from_secs(1), handle)
            .await
            .expect("sweeper did not stop")
            .expect("sweeper panicked");
    }

    #[tokio::test]
    async fn test_concurrent_readers_and_writer() {
        let cache = Arc::new(cache_with_ttl(Duration::from_secs(60)));
        let order = fake_order_with_uid("shared");
        cache.set("shared", order.clone());

        let mut tasks = Vec::new();
        for _ in 0..8 {
            let cache = cache.clone();
            tasks.push(tokio::spawn(async move {
                for _ in 0..100 {
                    assert!(cache.get("shared").is_some());
                }
            }));
        }
        for _ in 0..100 {
            cache.set("shared", order.clone());
        }
        for task in tasks {
            task.await.unwrap();
        }
    }
}
