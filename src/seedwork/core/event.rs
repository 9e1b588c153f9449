use serde::{Deserialize, Serialize};
use serde::de::DeserializeOwned;
use uuid::Uuid;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use anyhow::Result;

// ============================================================================
// Event Envelope - Industry Standard Event Metadata
// ============================================================================
//
// Wraps domain events with metadata for dispatching and publishing.
// This is GENERIC and works with ANY event type.
//
// ============================================================================

/// Generic Event Envelope - wraps any domain event with metadata
///
/// Type Parameter:
/// - `E`: The domain event type (must implement DomainEvent trait)
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct EventEnvelope<E> {
    // Event Identity
    pub event_id: Uuid,
    pub aggregate_id: Uuid,
    pub aggregate_type: String,
    /// Aggregate version right after this event was applied
    pub sequence_number: i64,

    // Event Type Information
    pub event_type: String,
    pub event_version: i32,

    // Event Payload
    pub event_data: E,

    // Causation & Correlation (for distributed tracing)
    pub causation_id: Option<Uuid>,      // What command/event caused this
    pub correlation_id: Uuid,            // Groups related events across aggregates

    // Actor Information
    pub user_id: Option<Uuid>,           // Who triggered this event

    // Timing
    pub timestamp: DateTime<Utc>,

    // Additional Metadata
    pub metadata: HashMap<String, String>,
}

impl<E: DomainEvent> EventEnvelope<E> {
    pub fn new(
        aggregate_type: &str,
        sequence_number: i64,
        event_data: E,
        correlation_id: Uuid,
    ) -> Self {
        Self {
            event_id: Uuid::now_v7(),
            aggregate_id: event_data.aggregate_id(),
            aggregate_type: aggregate_type.to_string(),
            sequence_number,
            event_type: event_data.event_type().to_string(),
            event_version: E::event_version(),
            timestamp: event_data.occurred_at(),
            event_data,
            causation_id: None,
            correlation_id,
            user_id: None,
            metadata: HashMap::new(),
        }
    }
}

impl<E> EventEnvelope<E> {
    pub fn with_user(mut self, user_id: Uuid) -> Self {
        self.user_id = Some(user_id);
        self
    }

    pub fn with_causation(mut self, causation_id: Uuid) -> Self {
        self.causation_id = Some(causation_id);
        self
    }

    pub fn with_metadata(mut self, key: String, value: String) -> Self {
        self.metadata.insert(key, value);
        self
    }
}

// ============================================================================
// Domain Event Trait
// ============================================================================

/// Generic Domain Event trait
///
/// All domain events must implement this trait to be dispatched or published.
pub trait DomainEvent:
    Serialize + DeserializeOwned + Clone + std::fmt::Debug + Send + Sync + 'static
{
    /// Variant name, e.g. "CustomerStatusChanged"
    fn event_type(&self) -> &'static str;
    fn aggregate_id(&self) -> Uuid;
    fn occurred_at(&self) -> DateTime<Utc>;
    fn event_version() -> i32 where Self: Sized { 1 }
}

// ============================================================================
// Event Serialization Helpers
// ============================================================================

pub fn serialize_event<E: Serialize>(event: &E) -> Result<String> {
    Ok(serde_json::to_string(event)?)
}

pub fn deserialize_event<E: DeserializeOwned>(json: &str) -> Result<E> {
    Ok(serde_json::from_str(json)?)
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Serialize, Deserialize, Clone, Debug)]
    struct TestEvent {
        id: Uuid,
        data: String,
        at: DateTime<Utc>,
    }

    impl DomainEvent for TestEvent {
        fn event_type(&self) -> &'static str { "TestEvent" }
        fn aggregate_id(&self) -> Uuid { self.id }
        fn occurred_at(&self) -> DateTime<Utc> { self.at }
    }

    #[test]
    fn test_event_envelope_creation() {
        let aggregate_id = Uuid::new_v4();
        let correlation_id = Uuid::new_v4();
        let at = Utc::now();

        let event = TestEvent {
            id: aggregate_id,
            data: "test".to_string(),
            at,
        };

        let envelope = EventEnvelope::new("Test", 1, event, correlation_id);

        assert_eq!(envelope.aggregate_id, aggregate_id);
        assert_eq!(envelope.aggregate_type, "Test");
        assert_eq!(envelope.sequence_number, 1);
        assert_eq!(envelope.event_type, "TestEvent");
        assert_eq!(envelope.event_version, 1);
        assert_eq!(envelope.correlation_id, correlation_id);
        assert_eq!(envelope.timestamp, at);
    }

    #[test]
    fn test_envelope_builders_attach_tracing_metadata() {
        let causation = Uuid::new_v4();
        let user = Uuid::new_v4();
        let envelope = EventEnvelope::new(
            "Test",
            3,
            TestEvent { id: Uuid::new_v4(), data: "x".into(), at: Utc::now() },
            Uuid::new_v4(),
        )
        .with_causation(causation)
        .with_user(user)
        .with_metadata("source".to_string(), "unit-test".to_string());

        assert_eq!(envelope.causation_id, Some(causation));
        assert_eq!(envelope.user_id, Some(user));
        assert_eq!(envelope.metadata.get("source").map(String::as_str), Some("unit-test"));
    }

    #[test]
    fn test_event_serialization() {
        let event = TestEvent {
            id: Uuid::new_v4(),
            data: "test data".to_string(),
            at: Utc::now(),
        };

        let json = serialize_event(&event).unwrap();
        let deserialized: TestEvent = deserialize_event(&json).unwrap();

        assert_eq!(event.data, deserialized.data);
    }
}
