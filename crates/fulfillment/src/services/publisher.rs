//! Lifecycle event publisher trait, Kafka implementation and in-memory implementation.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use domain::OrderEvent;
use rdkafka::config::ClientConfig;
use rdkafka::producer::{FutureProducer, FutureRecord};
use rdkafka::util::Timeout;
use tokio::sync::RwLock;

use crate::error::PublishError;

/// Emits lifecycle events to the shared bus.
///
/// Delivery is at-most-once: one attempt, no outbox, no idempotency key.
/// Consumers must tolerate events that never arrive.
#[async_trait]
pub trait EventPublisher: Send + Sync {
    /// Makes a single attempt to place the event on the bus.
    async fn try_publish(&self, event: &OrderEvent) -> Result<(), PublishError>;

    /// Publishes the event, logging instead of propagating any failure.
    ///
    /// Returns whether the bus accepted the event.
    async fn publish(&self, event: &OrderEvent) -> bool {
        match self.try_publish(event).await {
            Ok(()) => {
                tracing::info!(
                    event_type = event.event_type(),
                    order_id = %event.order_id(),
                    "published event"
                );
                true
            }
            Err(e) => {
                tracing::error!(
                    error = %e,
                    event_type = event.event_type(),
                    order_id = %event.order_id(),
                    "failed to publish event"
                );
                false
            }
        }
    }
}

/// Publishes events as JSON to a Kafka topic, keyed by order id.
#[derive(Clone)]
pub struct KafkaEventPublisher {
    producer: FutureProducer,
    topic: String,
    send_timeout: Duration,
}

impl KafkaEventPublisher {
    /// Creates a producer for the given brokers and topic.
    ///
    /// The producer is configured not to retry, so a failed send is final.
    pub fn new(brokers: &str, topic: impl Into<String>) -> Result<Self, PublishError> {
        let producer: FutureProducer = ClientConfig::new()
            .set("bootstrap.servers", brokers)
            .set("message.timeout.ms", "5000")
            .set("message.send.max.retries", "0")
            .create()?;

        Ok(Self {
            producer,
            topic: topic.into(),
            send_timeout: Duration::from_secs(5),
        })
    }
}

#[async_trait]
impl EventPublisher for KafkaEventPublisher {
    async fn try_publish(&self, event: &OrderEvent) -> Result<(), PublishError> {
        let payload = serde_json::to_string(event)?;
        let key = event.order_id().to_string();

        let record = FutureRecord::to(&self.topic).key(&key).payload(&payload);

        self.producer
            .send(record, Timeout::After(self.send_timeout))
            .await
            .map_err(|(e, _)| PublishError::Kafka(e))?;

        tracing::debug!(topic = %self.topic, %payload, "event delivered");
        Ok(())
    }
}

#[derive(Debug, Default)]
struct InMemoryPublisherState {
    events: Vec<OrderEvent>,
    fail: bool,
}

/// In-memory event publisher for testing.
#[derive(Debug, Clone, Default)]
pub struct InMemoryEventPublisher {
    state: Arc<RwLock<InMemoryPublisherState>>,
}

impl InMemoryEventPublisher {
    /// Creates a new in-memory publisher.
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every publish fail while set.
    pub async fn set_fail(&self, fail: bool) {
        self.state.write().await.fail = fail;
    }

    /// Returns the events accepted so far.
    pub async fn events(&self) -> Vec<OrderEvent> {
        self.state.read().await.events.clone()
    }
}

#[async_trait]
impl EventPublisher for InMemoryEventPublisher {
    async fn try_publish(&self, event: &OrderEvent) -> Result<(), PublishError> {
        let mut state = self.state.write().await;
        if state.fail {
            return Err(PublishError::Rejected("broker unavailable".to_string()));
        }
        state.events.push(event.clone());
        Ok(())
    }
}
