pub mod memory_cache;

pub use memory_cache::{spawn_sweeper, MemoryCache};

use domain::Order;

/// Lossy, time-bounded copy of orders keyed by `order_uid`.
///
/// "Absent" and "expired" look the same to callers; the cache never reports
/// errors and never touches the durable store.
pub trait OrderCache: Send + Sync {
    fn get(&self, order_uid: &str) -> Option<Order>;

    /// Insert or replace, restarting the entry's TTL
    fn set(&self, order_uid: &str, order: Order);

    /// `set` for every order, keyed by its own UID. Not atomic.
    fn bulk_set(&self, orders: Vec<Order>) {
        for order in orders {
            let order_uid = order.order_uid.clone();
            self.set(&order_uid, order);
        }
    }
}
