use super::entity::{Entity, EntityMetadata};
use super::errors::DomainResult;
use super::event::DomainEvent;

// ============================================================================
// Aggregate Root Pattern
// ============================================================================
//
// Key Principles:
// 1. Commands are validated (business rules) before emitting events
// 2. Events represent facts that have already happened
// 3. All state changes flow through `apply`, which bumps the version once
// 4. Mutations RETURN their events; the unit of work owns the queue
//
// This is the GENERIC aggregate trait that works for ANY domain aggregate.
//
// ============================================================================

/// A request to change one aggregate
pub trait DomainCommand: Send + Sync {
    /// Short name used in logs and metrics labels
    fn name(&self) -> &'static str;
}

/// Generic Aggregate trait - all aggregates implement this
///
/// Type Parameters:
/// - `Event`: The domain event type for this aggregate
/// - `Command`: The command type for this aggregate
pub trait AggregateRoot: Entity + Sized + Send + Sync {
    type Event: DomainEvent;
    type Command: DomainCommand;

    /// Aggregate type name used for storage partitions and event envelopes
    const AGGREGATE_TYPE: &'static str;

    fn metadata_mut(&mut self) -> &mut EntityMetadata;

    /// Handle command and emit events (business logic, no mutation)
    fn handle_command(&self, command: &Self::Command) -> DomainResult<Vec<Self::Event>>;

    /// Apply the state change carried by an event
    fn apply_event(&mut self, event: &Self::Event);

    /// Apply an event and advance the version exactly once
    fn apply(&mut self, event: &Self::Event) {
        self.apply_event(event);
        self.metadata_mut().record_change(event.occurred_at());
    }

    /// Validate a command, apply the resulting events and hand them back
    fn execute(&mut self, command: &Self::Command) -> DomainResult<Vec<Self::Event>> {
        let events = self.handle_command(command)?;
        for event in &events {
            self.apply(event);
        }
        Ok(events)
    }
}
