use async_trait::async_trait;
use rdkafka::config::ClientConfig;
use rdkafka::consumer::{Consumer, StreamConsumer};
use rdkafka::message::Message;
use thiserror::Error;
use tokio::sync::mpsc;
use tracing::{debug, info};

#[derive(Debug, Error)]
pub enum ConsumerError {
    #[error("Kafka error: {0}")]
    Kafka(#[from] rdkafka::error::KafkaError),

    #[error("Message has no payload")]
    NoPayload,

    #[error("Message source closed")]
    Closed,
}

/// Ordered source of raw message payloads.
///
/// `recv` must be cancel safe: the ingestion loop drops a pending `recv`
/// when shutdown is signalled.
#[async_trait]
pub trait MessageSource: Send {
    async fn recv(&mut self) -> Result<Vec<u8>, ConsumerError>;
}

/// Kafka consumer for the inbound order topic.
///
/// Offsets are auto-committed on a fixed interval, independently of whether a
/// message was persisted.
pub struct OrderConsumer {
    consumer: StreamConsumer,
}

impl OrderConsumer {
    /// Create a consumer subscribed to `topic`. Connecting to the brokers
    /// happens lazily on the first receive.
    pub fn new(
        brokers: &str,
        group_id: &str,
        topic: &str,
        offset_reset: &str,
    ) -> Result<Self, ConsumerError> {
        info!(
            group_id = %group_id,
            topic = %topic,
            "Creating Kafka consumer"
        );

        let consumer: StreamConsumer = ClientConfig::new()
            .set("group.id", group_id)
            .set("bootstrap.servers", brokers)
            .set("enable.auto.commit", "true")
            .set("auto.commit.interval.ms", "1000")
            .set("auto.offset.reset", offset_reset)
            .set("enable.partition.eof", "false")
            .set("session.timeout.ms", "30000")
            .set("heartbeat.interval.ms", "3000")
            .create()?;

        consumer.subscribe(&[topic])?;

        info!("Kafka consumer created successfully");
        Ok(Self { consumer })
    }
}

#[async_trait]
impl MessageSource for OrderConsumer {
    async fn recv(&mut self) -> Result<Vec<u8>, ConsumerError> {
        let message = self.consumer.recv().await?;

        debug!(
            topic = message.topic(),
            partition = message.partition(),
            offset = message.offset(),
            "Received message"
        );

        message
            .payload()
            .map(<[u8]>::to_vec)
            .ok_or(ConsumerError::NoPayload)
    }
}

/// In-process source, used to feed the pipeline without a broker
#[async_trait]
impl MessageSource for mpsc::Receiver<Vec<u8>> {
    async fn recv(&mut self) -> Result<Vec<u8>, ConsumerError> {
        mpsc::Receiver::recv(self).await.ok_or(ConsumerError::Closed)
    }
}
