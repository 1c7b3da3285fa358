pub mod cache;
pub mod reader;
pub mod warm_up;

pub use cache::{spawn_sweeper, MemoryCache, OrderCache};
pub use reader::OrderReader;
pub use warm_up::warm_up;

use order_store::StoreError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ReadModelError {
    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}
