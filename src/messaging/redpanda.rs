use anyhow::{Context, Result};
use async_trait::async_trait;
use rdkafka::{
    config::ClientConfig,
    producer::{FutureProducer, FutureRecord},
};
use std::sync::Arc;
use std::time::Duration;

use crate::messaging::DomainEventDispatcher;
use crate::metrics::Metrics;
use crate::seedwork::{serialize_event, DomainEvent, EventEnvelope};
use crate::utils::{
    retry_with_backoff, CircuitBreaker, CircuitBreakerConfig, CircuitBreakerError, RetryConfig, RetryResult,
};

// ============================================================================
// Redpanda Integration
// ============================================================================
//
// RedpandaClient is the raw producer behind a circuit breaker.
// RedpandaEventPublisher turns it into a DomainEventDispatcher: envelopes are
// published as JSON, keyed by aggregate id so one aggregate's events stay
// ordered within a partition.
//
// ============================================================================

pub struct RedpandaClient {
    producer: FutureProducer,
    circuit_breaker: CircuitBreaker,
}

impl RedpandaClient {
    pub fn new(brokers: &str) -> Result<Self> {
        let producer: FutureProducer = ClientConfig::new()
            .set("bootstrap.servers", brokers)
            .set("message.timeout.ms", "5000")
            .create()
            .context("Failed to create Redpanda producer")?;

        let cb_config = CircuitBreakerConfig {
            failure_threshold: 5,
            timeout: Duration::from_secs(30),
            success_threshold: 3,
        };

        Ok(Self {
            producer,
            circuit_breaker: CircuitBreaker::new(cb_config),
        })
    }

    pub fn with_metrics(mut self, metrics: Arc<Metrics>) -> Self {
        self.circuit_breaker = self.circuit_breaker.with_metrics(metrics);
        self
    }

    pub async fn publish(&self, topic: &str, key: &str, payload: &str) -> Result<()> {
        let result = self
            .circuit_breaker
            .call(async {
                let record = FutureRecord::to(topic).key(key).payload(payload);

                self.producer
                    .send(record, rdkafka::util::Timeout::After(Duration::from_secs(5)))
                    .await
                    .map_err(|(e, _)| anyhow::anyhow!("Kafka send error: {}", e))?;

                Ok::<(), anyhow::Error>(())
            })
            .await;

        match result {
            Ok(_) => {
                tracing::debug!(topic = %topic, key = %key, "Published to Redpanda");
                Ok(())
            }
            Err(CircuitBreakerError::CircuitOpen) => {
                tracing::error!(topic = %topic, "Circuit breaker open - Redpanda unavailable");
                Err(anyhow::anyhow!("Circuit breaker open for Redpanda"))
            }
            Err(CircuitBreakerError::OperationFailed(e)) => {
                tracing::error!(error = %e, topic = %topic, "Failed to publish to Redpanda");
                Err(e)
            }
        }
    }

    pub async fn get_circuit_breaker_state(&self) -> crate::utils::CircuitState {
        self.circuit_breaker.get_state().await
    }

    pub async fn reset_circuit_breaker(&self) {
        self.circuit_breaker.reset().await;
    }
}

/// Publishes domain event envelopes for one aggregate type to a topic
pub struct RedpandaEventPublisher {
    client: Arc<RedpandaClient>,
    topic: String,
    retry: RetryConfig,
}

impl RedpandaEventPublisher {
    pub fn new(client: Arc<RedpandaClient>, topic: impl Into<String>) -> Self {
        Self {
            client,
            topic: topic.into(),
            retry: RetryConfig::for_publishing(),
        }
    }

    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    pub fn topic(&self) -> &str {
        &self.topic
    }
}

#[async_trait]
impl<E: DomainEvent> DomainEventDispatcher<E> for RedpandaEventPublisher {
    async fn dispatch(&self, envelope: &EventEnvelope<E>) -> Result<()> {
        let payload = serialize_event(envelope)?;
        let key = envelope.aggregate_id.to_string();

        let outcome = retry_with_backoff(self.retry.clone(), |_attempt| {
            self.client.publish(&self.topic, &key, &payload)
        })
        .await;

        match outcome {
            RetryResult::Success(()) => Ok(()),
            RetryResult::Failed(e) | RetryResult::PermanentFailure(e) => Err(e.context(format!(
                "publishing {} {} to {}",
                envelope.event_type, envelope.event_id, self.topic
            ))),
        }
    }
}
