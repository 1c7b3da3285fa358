use read_model::{MemoryCache, OrderReader};
use std::sync::Arc;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub reader: Arc<OrderReader>,
    pub cache: Arc<MemoryCache>,
}

impl AppState {
    pub fn new(reader: Arc<OrderReader>, cache: Arc<MemoryCache>) -> Self {
        Self { reader, cache }
    }
}
