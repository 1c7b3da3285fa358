use domain::Order;
use rdkafka::admin::{AdminClient, AdminOptions, NewTopic, TopicReplication};
use rdkafka::client::DefaultClientContext;
use rdkafka::config::ClientConfig;
use rdkafka::error::RDKafkaErrorCode;
use rdkafka::producer::{FutureProducer, FutureRecord};
use rdkafka::util::Timeout;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info, warn};

#[derive(Debug, Error)]
pub enum PublisherError {
    #[error("Failed to create Kafka client: {0}")]
    ClientCreation(String),

    #[error("Failed to serialize order: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Failed to publish order: {0}")]
    PublishFailed(String),

    #[error("Failed to create topic '{topic}': {reason}")]
    TopicCreation { topic: String, reason: String },
}

/// Kafka publisher for order messages, keyed by order UID
pub struct OrderPublisher {
    producer: FutureProducer,
    topic: String,
}

impl OrderPublisher {
    /// Create a publisher for `topic`.
    ///
    /// # Example
    /// ```no_run
    /// use messaging::OrderPublisher;
    ///
    /// let publisher = OrderPublisher::new("localhost:9092", "orders")
    ///     .expect("Failed to create publisher");
    /// ```
    pub fn new(brokers: &str, topic: impl Into<String>) -> Result<Self, PublisherError> {
        let topic = topic.into();
        info!(brokers = %brokers, topic = %topic, "Creating Kafka producer");

        let producer: FutureProducer = ClientConfig::new()
            .set("bootstrap.servers", brokers)
            .set("message.timeout.ms", "5000")
            .set("acks", "all")
            .set("retries", "3")
            .create()
            .map_err(|e| PublisherError::ClientCreation(e.to_string()))?;

        Ok(Self { producer, topic })
    }

    pub fn topic(&self) -> &str {
        &self.topic
    }

    /// Publish one order as JSON. The key decides the partition.
    pub async fn publish(&self, key: &str, order: &Order) -> Result<(), PublisherError> {
        let payload = serde_json::to_vec(order)?;

        let record = FutureRecord::to(&self.topic).key(key).payload(&payload);

        match self
            .producer
            .send(record, Timeout::After(Duration::from_secs(5)))
            .await
        {
            Ok((partition, offset)) => {
                debug!(
                    order_uid = %key,
                    partition,
                    offset,
                    "Order published"
                );
                Ok(())
            }
            Err((err, _)) => {
                warn!(order_uid = %key, error = %err, "Failed to publish order");
                Err(PublisherError::PublishFailed(err.to_string()))
            }
        }
    }

    /// Publish orders one after another, each keyed by its UID.
    /// Stops at the first failure.
    pub async fn publish_batch(&self, orders: &[Order]) -> Result<usize, PublisherError> {
        for order in orders {
            self.publish(&order.order_uid, order).await?;
        }
        Ok(orders.len())
    }
}

/// Create `topic` with one partition and replication factor one.
/// An already existing topic is not an error.
pub async fn ensure_topic_exists(brokers: &str, topic: &str) -> Result<(), PublisherError> {
    let admin: AdminClient<DefaultClientContext> = ClientConfig::new()
        .set("bootstrap.servers", brokers)
        .create()
        .map_err(|e| PublisherError::ClientCreation(e.to_string()))?;

    let new_topic = NewTopic::new(topic, 1, TopicReplication::Fixed(1));
    let options = AdminOptions::new().operation_timeout(Some(Duration::from_secs(10)));

    let results = admin
        .create_topics(&[new_topic], &options)
        .await
        .map_err(|e| PublisherError::TopicCreation {
            topic: topic.to_string(),
            reason: e.to_string(),
        })?;

    for result in results {
        match result {
            Ok(name) => info!(topic = %name, "Topic created"),
            Err((name, RDKafkaErrorCode::TopicAlreadyExists)) => {
                debug!(topic = %name, "Topic already exists")
            }
            Err((name, code)) => {
                return Err(PublisherError::TopicCreation {
                    topic: name,
                    reason: code.to_string(),
                })
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use domain::fake::fake_order;

    #[test]
    fn test_publisher_creation_does_not_connect() {
        let result = OrderPublisher::new("", "test-topic");
        assert!(result.is_ok());
        assert_eq!(result.unwrap().topic(), "test-topic");
    }

    #[test]
    fn test_published_payload_decodes_to_same_order() {
        let order = fake_order();
        let payload = serde_json::to_vec(&order).unwrap();
        let decoded: Order = serde_json::from_slice(&payload).unwrap();
        assert_eq!(decoded, order);
    }

    #[test]
    fn test_topic_creation_error_names_topic() {
        let err = PublisherError::TopicCreation {
            topic: "orders".to_string(),
            reason: "Broker: Invalid replication factor".to_string(),
        };
        assert!(err.to_string().contains("'orders'"));
    }
}
