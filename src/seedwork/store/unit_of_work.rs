use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Instant;
use uuid::Uuid;

use crate::messaging::DomainEventDispatcher;
use crate::metrics::Metrics;
use crate::seedwork::core::{AggregateRoot, DomainError, DomainEvent, DomainResult, Entity, EventEnvelope};
use super::repository::Repository;

// ============================================================================
// Unit of Work
// ============================================================================
//
// Collects the aggregates changed by one command together with the events
// their mutations returned, then:
//
//   1. save_changes: persist each aggregate with a compare-and-swap on the
//      version it had before the events were applied
//   2. dispatch_domain_events: drain the outbox in raise order, best effort
//
// The expected version is derived, not trusted: an aggregate registered with
// N events must be exactly N versions ahead of what is stored.
//
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeKind {
    New,
    Updated,
    Deleted,
}

impl ChangeKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ChangeKind::New => "new",
            ChangeKind::Updated => "updated",
            ChangeKind::Deleted => "deleted",
        }
    }
}

struct PendingChange<A: AggregateRoot> {
    kind: ChangeKind,
    aggregate: A,
    expected_version: i64,
    events: Vec<A::Event>,
}

/// Outcome of draining the outbox
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatchReport {
    pub dispatched: usize,
    pub failed: usize,
}

pub struct UnitOfWork<A: AggregateRoot> {
    repository: Arc<dyn Repository<A>>,
    dispatcher: Arc<dyn DomainEventDispatcher<A::Event>>,
    metrics: Option<Arc<Metrics>>,
    correlation_id: Uuid,
    user_id: Option<Uuid>,
    pending: Vec<PendingChange<A>>,
    outbox: VecDeque<EventEnvelope<A::Event>>,
}

impl<A: AggregateRoot + 'static> UnitOfWork<A> {
    pub fn new(
        repository: Arc<dyn Repository<A>>,
        dispatcher: Arc<dyn DomainEventDispatcher<A::Event>>,
    ) -> Self {
        Self {
            repository,
            dispatcher,
            metrics: None,
            correlation_id: Uuid::now_v7(),
            user_id: None,
            pending: Vec::new(),
            outbox: VecDeque::new(),
        }
    }

    pub fn with_metrics(mut self, metrics: Arc<Metrics>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    pub fn with_correlation_id(mut self, correlation_id: Uuid) -> Self {
        self.correlation_id = correlation_id;
        self
    }

    pub fn with_user(mut self, user_id: Uuid) -> Self {
        self.user_id = Some(user_id);
        self
    }

    pub fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }

    pub fn has_changes(&self) -> bool {
        !self.pending.is_empty()
    }

    /// Envelopes saved but not yet dispatched
    pub fn outbox_len(&self) -> usize {
        self.outbox.len()
    }

    // ========================================================================
    // Registration
    // ========================================================================

    pub fn register_new(&mut self, aggregate: A, events: Vec<A::Event>) -> DomainResult<()> {
        self.register(ChangeKind::New, aggregate, events)
    }

    pub fn register_updated(&mut self, aggregate: A, events: Vec<A::Event>) -> DomainResult<()> {
        self.register(ChangeKind::Updated, aggregate, events)
    }

    pub fn register_deleted(&mut self, aggregate: A, events: Vec<A::Event>) -> DomainResult<()> {
        if !aggregate.is_deleted() {
            return Err(DomainError::invalid_operation(format!(
                "{} {} is registered as deleted but was never deleted",
                A::AGGREGATE_TYPE,
                aggregate.id()
            )));
        }
        self.register(ChangeKind::Deleted, aggregate, events)
    }

    fn register(&mut self, kind: ChangeKind, aggregate: A, events: Vec<A::Event>) -> DomainResult<()> {
        // Nothing happened, nothing to persist
        if events.is_empty() {
            tracing::debug!(
                aggregate_type = A::AGGREGATE_TYPE,
                aggregate_id = %aggregate.id(),
                "Skipping registration without events"
            );
            return Ok(());
        }

        if let Some(foreign) = events.iter().find(|e| e.aggregate_id() != aggregate.id()) {
            return Err(DomainError::invalid_operation(format!(
                "{} raised by {} cannot be committed with {} {}",
                foreign.event_type(),
                foreign.aggregate_id(),
                A::AGGREGATE_TYPE,
                aggregate.id()
            )));
        }

        let expected_version = aggregate.version() - events.len() as i64;

        if expected_version < 0 || (kind == ChangeKind::New && expected_version != 0) {
            return Err(DomainError::invalid_operation(format!(
                "{} {} at version {} does not match {} registered event(s)",
                A::AGGREGATE_TYPE,
                aggregate.id(),
                aggregate.version(),
                events.len()
            )));
        }

        self.pending.push(PendingChange {
            kind,
            aggregate,
            expected_version,
            events,
        });
        Ok(())
    }

    // ========================================================================
    // Persistence
    // ========================================================================

    /// Persist every registered change in registration order.
    ///
    /// Stops at the first failure. Events of changes saved before the failure
    /// stay in the outbox; events of the failed and later changes are dropped.
    pub async fn save_changes(&mut self) -> DomainResult<usize> {
        let pending = std::mem::take(&mut self.pending);
        let mut saved = 0;

        for change in pending {
            let started = Instant::now();
            let aggregate_id = change.aggregate.id();

            let result = match change.kind {
                ChangeKind::New => self.repository.add(&change.aggregate).await,
                ChangeKind::Updated => {
                    self.repository
                        .update(&change.aggregate, change.expected_version)
                        .await
                }
                ChangeKind::Deleted => {
                    self.repository
                        .delete(&change.aggregate, change.expected_version)
                        .await
                }
            };

            if let Err(e) = result {
                if e.is_concurrency_conflict() {
                    tracing::warn!(
                        aggregate_type = A::AGGREGATE_TYPE,
                        aggregate_id = %aggregate_id,
                        expected_version = change.expected_version,
                        error = %e,
                        "Concurrency conflict while saving aggregate"
                    );
                    if let Some(metrics) = &self.metrics {
                        metrics.record_concurrency_conflict(A::AGGREGATE_TYPE);
                    }
                } else {
                    tracing::error!(
                        aggregate_type = A::AGGREGATE_TYPE,
                        aggregate_id = %aggregate_id,
                        error = %e,
                        "Failed to save aggregate"
                    );
                }
                return Err(e);
            }

            if let Some(metrics) = &self.metrics {
                metrics.record_commit(A::AGGREGATE_TYPE, change.kind.as_str(), started.elapsed().as_secs_f64());
            }

            tracing::debug!(
                aggregate_type = A::AGGREGATE_TYPE,
                aggregate_id = %aggregate_id,
                kind = change.kind.as_str(),
                version = change.aggregate.version(),
                events = change.events.len(),
                "Aggregate saved"
            );

            for (offset, event) in change.events.into_iter().enumerate() {
                let mut envelope = EventEnvelope::new(
                    A::AGGREGATE_TYPE,
                    change.expected_version + offset as i64 + 1,
                    event,
                    self.correlation_id,
                );
                if let Some(user_id) = self.user_id {
                    envelope = envelope.with_user(user_id);
                }
                self.outbox.push_back(envelope);
            }

            saved += 1;
        }

        Ok(saved)
    }

    /// Deliver every saved event exactly once, in raise order.
    ///
    /// Failures are logged and counted; they never undo the save.
    pub async fn dispatch_domain_events(&mut self) -> DispatchReport {
        let mut report = DispatchReport::default();

        while let Some(envelope) = self.outbox.pop_front() {
            let result = self.dispatcher.dispatch(&envelope).await;
            let success = result.is_ok();

            if let Err(e) = result {
                tracing::warn!(
                    event_id = %envelope.event_id,
                    event_type = %envelope.event_type,
                    aggregate_id = %envelope.aggregate_id,
                    error = %e,
                    "Domain event dispatch failed"
                );
                report.failed += 1;
            } else {
                report.dispatched += 1;
            }

            if let Some(metrics) = &self.metrics {
                metrics.record_event_dispatch(&envelope.event_type, success);
            }
        }

        report
    }

    /// save_changes followed by dispatch_domain_events
    pub async fn commit(&mut self) -> DomainResult<DispatchReport> {
        let saved = self.save_changes().await?;
        let report = self.dispatch_domain_events().await;

        tracing::debug!(
            correlation_id = %self.correlation_id,
            saved = saved,
            dispatched = report.dispatched,
            failed = report.failed,
            "Unit of work committed"
        );

        Ok(report)
    }
}
