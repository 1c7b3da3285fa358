pub mod consumer;
pub mod pipeline;
pub mod producer;

pub use consumer::{ConsumerError, MessageSource, OrderConsumer};
pub use pipeline::{HandlerResult, IngestStats, IngestionPipeline, MessageOutcome, OrderHandler};
pub use producer::{ensure_topic_exists, OrderPublisher, PublisherError};
