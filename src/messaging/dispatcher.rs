use async_trait::async_trait;
use futures_util::future::join_all;
use std::sync::Arc;

use crate::seedwork::{DomainEvent, EventEnvelope};

// ============================================================================
// Domain Event Dispatch
// ============================================================================
//
// Events are dispatched after the aggregate has been persisted. Dispatch is
// best effort: a failing handler is reported, never rolled back into the
// command that produced the event.
//
// ============================================================================

/// Delivers an event to whoever is interested in it
#[async_trait]
pub trait DomainEventDispatcher<E: DomainEvent>: Send + Sync {
    async fn dispatch(&self, envelope: &EventEnvelope<E>) -> anyhow::Result<()>;
}

/// One in-process subscriber
#[async_trait]
pub trait DomainEventHandler<E: DomainEvent>: Send + Sync {
    fn name(&self) -> &'static str;

    async fn handle(&self, envelope: &EventEnvelope<E>) -> anyhow::Result<()>;
}

/// Fans an event out to every registered handler concurrently
pub struct InProcessDispatcher<E: DomainEvent> {
    handlers: Vec<Arc<dyn DomainEventHandler<E>>>,
}

impl<E: DomainEvent> InProcessDispatcher<E> {
    pub fn new() -> Self {
        Self { handlers: Vec::new() }
    }

    pub fn with_handler(mut self, handler: Arc<dyn DomainEventHandler<E>>) -> Self {
        self.handlers.push(handler);
        self
    }

    pub fn handler_count(&self) -> usize {
        self.handlers.len()
    }
}

impl<E: DomainEvent> Default for InProcessDispatcher<E> {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl<E: DomainEvent> DomainEventDispatcher<E> for InProcessDispatcher<E> {
    async fn dispatch(&self, envelope: &EventEnvelope<E>) -> anyhow::Result<()> {
        let results = join_all(self.handlers.iter().map(|handler| async move {
            (handler.name(), handler.handle(envelope).await)
        }))
        .await;

        let failed: Vec<String> = results
            .into_iter()
            .filter_map(|(name, result)| result.err().map(|e| format!("{name}: {e}")))
            .collect();

        if failed.is_empty() {
            Ok(())
        } else {
            anyhow::bail!(
                "{} handler(s) failed for {}: {}",
                failed.len(),
                envelope.event_type,
                failed.join("; ")
            )
        }
    }
}

/// Writes every event to the log; the default subscriber in local runs
pub struct LoggingEventHandler;

#[async_trait]
impl<E: DomainEvent> DomainEventHandler<E> for LoggingEventHandler {
    fn name(&self) -> &'static str {
        "logging"
    }

    async fn handle(&self, envelope: &EventEnvelope<E>) -> anyhow::Result<()> {
        tracing::info!(
            event_id = %envelope.event_id,
            event_type = %envelope.event_type,
            aggregate_type = %envelope.aggregate_type,
            aggregate_id = %envelope.aggregate_id,
            sequence_number = envelope.sequence_number,
            correlation_id = %envelope.correlation_id,
            "Domain event"
        );
        Ok(())
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::seedwork::store::test_support::{Ledger, LedgerEvent};
    use tokio::sync::Mutex;
    use uuid::Uuid;

    /// Records what it receives and optionally fails for one event type
    pub(crate) struct RecordingHandler {
        pub seen: Mutex<Vec<String>>,
        pub fail_on: Option<&'static str>,
    }

    impl RecordingHandler {
        pub fn new() -> Arc<Self> {
            Arc::new(Self { seen: Mutex::new(Vec::new()), fail_on: None })
        }

        pub fn failing_on(event_type: &'static str) -> Arc<Self> {
            Arc::new(Self { seen: Mutex::new(Vec::new()), fail_on: Some(event_type) })
        }
    }

    #[async_trait]
    impl<E: DomainEvent> DomainEventHandler<E> for RecordingHandler {
        fn name(&self) -> &'static str {
            "recording"
        }

        async fn handle(&self, envelope: &EventEnvelope<E>) -> anyhow::Result<()> {
            self.seen.lock().await.push(envelope.event_type.clone());
            if self.fail_on == Some(envelope.event_type.as_str()) {
                anyhow::bail!("refusing {}", envelope.event_type);
            }
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_dispatch_reaches_every_handler() {
        let first = RecordingHandler::new();
        let second = RecordingHandler::new();
        let dispatcher: InProcessDispatcher<LedgerEvent> = InProcessDispatcher::new()
            .with_handler(first.clone())
            .with_handler(second.clone())
            .with_handler(Arc::new(LoggingEventHandler));
        assert_eq!(dispatcher.handler_count(), 3);

        let (_, events) = Ledger::open("ops");
        let envelope = EventEnvelope::new("Ledger", 1, events[0].clone(), Uuid::now_v7());

        dispatcher.dispatch(&envelope).await.unwrap();

        assert_eq!(*first.seen.lock().await, vec!["LedgerOpened"]);
        assert_eq!(*second.seen.lock().await, vec!["LedgerOpened"]);
    }

    #[tokio::test]
    async fn test_failing_handler_does_not_starve_the_others() {
        let failing = RecordingHandler::failing_on("LedgerOpened");
        let healthy = RecordingHandler::new();
        let dispatcher: InProcessDispatcher<LedgerEvent> = InProcessDispatcher::new()
            .with_handler(failing.clone())
            .with_handler(healthy.clone());

        let (_, events) = Ledger::open("ops");
        let envelope = EventEnvelope::new("Ledger", 1, events[0].clone(), Uuid::now_v7());

        let err = dispatcher.dispatch(&envelope).await.unwrap_err();
        assert!(err.to_string().contains("recording: refusing LedgerOpened"));
        assert_eq!(healthy.seen.lock().await.len(), 1);
    }
}
