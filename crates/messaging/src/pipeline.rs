//! Stream ingestion loop.
//!
//! Each message goes through decode, validate and handle, strictly in
//! delivery order. A message that fails any step is logged and skipped; the
//! loop only ends when shutdown is signalled or the source closes.

use async_trait::async_trait;
use common::metrics;
use domain::{Order, OrderValidator};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tracing::{error, info, warn};

use crate::consumer::{ConsumerError, MessageSource};

pub type HandlerResult = Result<(), Box<dyn std::error::Error + Send + Sync>>;

/// Persistence callback invoked with each valid order
#[async_trait]
pub trait OrderHandler: Send + Sync {
    async fn handle(&self, order: Order) -> HandlerResult;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageOutcome {
    Persisted,
    Malformed,
    Rejected,
    Failed,
}

impl MessageOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            MessageOutcome::Persisted => "persisted",
            MessageOutcome::Malformed => "malformed",
            MessageOutcome::Rejected => "rejected",
            MessageOutcome::Failed => "failed",
        }
    }
}

/// Counters collected over one run of the pipeline
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IngestStats {
    pub received: u64,
    pub persisted: u64,
    pub malformed: u64,
    pub rejected: u64,
    pub failed: u64,
}

impl IngestStats {
    fn record(&mut self, outcome: MessageOutcome) {
        match outcome {
            MessageOutcome::Persisted => self.persisted += 1,
            MessageOutcome::Malformed => self.malformed += 1,
            MessageOutcome::Rejected => self.rejected += 1,
            MessageOutcome::Failed => self.failed += 1,
        }
        metrics::record_ingested(outcome.as_str());
    }
}

pub struct IngestionPipeline<S, H> {
    source: S,
    validator: Arc<dyn OrderValidator>,
    handler: H,
    error_backoff: Duration,
}

impl<S, H> IngestionPipeline<S, H>
where
    S: MessageSource,
    H: OrderHandler,
{
    pub fn new(source: S, validator: Arc<dyn OrderValidator>, handler: H) -> Self {
        Self {
            source,
            validator,
            handler,
            error_backoff: Duration::from_secs(1),
        }
    }

    /// Pause after a source error before receiving again
    pub fn with_error_backoff(mut self, error_backoff: Duration) -> Self {
        self.error_backoff = error_backoff;
        self
    }

    /// Consume until `shutdown` becomes `true` (or its sender is dropped).
    ///
    /// Returns `Err(ConsumerError::Closed)` if the source ends on its own.
    /// The source is dropped, releasing its connection, when this returns.
    pub async fn run(
        mut self,
        mut shutdown: watch::Receiver<bool>,
    ) -> Result<IngestStats, ConsumerError> {
        let mut stats = IngestStats::default();
        info!("Ingestion pipeline started");

        loop {
            if *shutdown.borrow() {
                break;
            }

            let received = tokio::select! {
                biased;
                changed = shutdown.changed() => {
                    if changed.is_err() {
                        break;
                    }
                    continue;
                }
                received = self.source.recv() => received,
            };

            match received {
                Ok(payload) => {
                    stats.received += 1;
                    let outcome = self.process(&payload).await;
                    stats.record(outcome);
                }
                Err(ConsumerError::NoPayload) => {
                    stats.received += 1;
                    warn!("Skipping message without payload");
                    stats.record(MessageOutcome::Malformed);
                }
                Err(ConsumerError::Closed) => {
                    warn!(?stats, "Message source closed, ingestion stopped");
                    return Err(ConsumerError::Closed);
                }
                Err(e) => {
                    error!(error = %e, "Error receiving from message source");
                    tokio::select! {
                        _ = shutdown.changed() => {}
                        _ = tokio::time::sleep(self.error_backoff) => {}
                    }
                }
            }
        }

        info!(
            received = stats.received,
            persisted = stats.persisted,
            malformed = stats.malformed,
            rejected = stats.rejected,
            failed = stats.failed,
            "Ingestion pipeline stopped"
        );
        Ok(stats)
    }

    async fn process(&self, payload: &[u8]) -> MessageOutcome {
        let order: Order = match serde_json::from_slice(payload) {
            Ok(order) => order,
            Err(e) => {
                warn!(error = %e, "Skipping malformed order message");
                return MessageOutcome::Malformed;
            }
        };

        if let Err(e) = self.validator.validate(&order) {
            warn!(order_uid = %order.order_uid, error = %e, "Skipping invalid order");
            return MessageOutcome::Rejected;
        }

        let order_uid = order.order_uid.clone();
        match self.handler.handle(order).await {
            Ok(()) => {
                info!(order_uid = %order_uid, "Order processed and cached");
                MessageOutcome::Persisted
            }
            Err(e) => {
                error!(order_uid = %order_uid, error = %e, "Failed to persist order");
                MessageOutcome::Failed
            }
        }
    }
}
