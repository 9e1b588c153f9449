use std::sync::Arc;
use uuid::Uuid;

use crate::messaging::DomainEventDispatcher;
use crate::metrics::Metrics;
use crate::seedwork::core::{AggregateRoot, DomainCommand, DomainError, DomainResult, Entity};
use crate::utils::{retry_on_transient, RetryConfig};
use super::repository::Repository;
use super::unit_of_work::{DispatchReport, UnitOfWork};

// ============================================================================
// Command Executor - load → execute → commit, with conflict retries
// ============================================================================
//
// One unit of work per attempt. A ConcurrencyConflict (or storage error)
// reloads the aggregate and runs the command again; rule violations and
// invalid operations fail immediately.
//
// ============================================================================

const DEFAULT_MAX_ATTEMPTS: u32 = 3;

/// Result of a successfully committed command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommandOutcome {
    pub aggregate_id: Uuid,
    /// Version after the command's events were applied
    pub version: i64,
    pub events: usize,
    pub dispatch: DispatchReport,
}

pub struct CommandExecutor<A: AggregateRoot> {
    repository: Arc<dyn Repository<A>>,
    dispatcher: Arc<dyn DomainEventDispatcher<A::Event>>,
    metrics: Option<Arc<Metrics>>,
    retry: RetryConfig,
}

impl<A: AggregateRoot + 'static> CommandExecutor<A> {
    pub fn new(repository: Arc<dyn Repository<A>>, dispatcher: Arc<dyn DomainEventDispatcher<A::Event>>) -> Self {
        Self {
            repository,
            dispatcher,
            metrics: None,
            retry: RetryConfig::for_conflicts(DEFAULT_MAX_ATTEMPTS),
        }
    }

    pub fn with_metrics(mut self, metrics: Arc<Metrics>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    pub fn repository(&self) -> &Arc<dyn Repository<A>> {
        &self.repository
    }

    pub async fn load(&self, id: Uuid) -> DomainResult<A> {
        self.repository
            .get_by_id(id)
            .await?
            .ok_or_else(|| DomainError::NotFound {
                aggregate_type: A::AGGREGATE_TYPE,
                id,
            })
    }

    /// Persist a freshly created aggregate and dispatch its creation events
    pub async fn create(&self, aggregate: A, events: Vec<A::Event>, correlation_id: Uuid) -> DomainResult<CommandOutcome> {
        let result = self.commit(aggregate, events, false, correlation_id).await;
        if let Err(e) = &result {
            self.record_failure(e);
        }
        result
    }

    /// Persist changes made by calling the aggregate directly, for operations
    /// that hand a value back to the caller. Not retried.
    pub async fn commit_changes(&self, aggregate: A, events: Vec<A::Event>, correlation_id: Uuid) -> DomainResult<CommandOutcome> {
        let deleted = aggregate.is_deleted();
        let result = self.commit(aggregate, events, deleted, correlation_id).await;
        if let Err(e) = &result {
            self.record_failure(e);
        }
        result
    }

    /// Run `command` against the stored aggregate `id`
    pub async fn execute(&self, id: Uuid, command: &A::Command, correlation_id: Uuid) -> DomainResult<CommandOutcome> {
        let operation = command.name();

        let result = retry_on_transient(self.retry.clone(), move |attempt| async move {
            if attempt > 1 {
                if let Some(metrics) = &self.metrics {
                    metrics.record_retry_attempt(operation, attempt);
                }
            }
            self.execute_once(id, command, correlation_id).await
        })
        .await
        .into_result();

        match &result {
            Ok(outcome) => {
                tracing::info!(
                    aggregate_type = A::AGGREGATE_TYPE,
                    aggregate_id = %id,
                    command = operation,
                    version = outcome.version,
                    correlation_id = %correlation_id,
                    "Command handled"
                );
            }
            Err(e) => {
                tracing::warn!(
                    aggregate_type = A::AGGREGATE_TYPE,
                    aggregate_id = %id,
                    command = operation,
                    error = %e,
                    error_code = e.error_code(),
                    "Command rejected"
                );
                self.record_failure(e);
            }
        }

        if let Some(metrics) = &self.metrics {
            if self.retry.max_attempts > 1 {
                metrics.record_retry_outcome(operation, result.is_ok());
            }
        }

        result
    }

    async fn execute_once(&self, id: Uuid, command: &A::Command, correlation_id: Uuid) -> DomainResult<CommandOutcome> {
        let mut aggregate = self.load(id).await?;
        let was_deleted = aggregate.is_deleted();
        let events = aggregate.execute(command)?;
        let deleted = !was_deleted && aggregate.is_deleted();
        self.commit(aggregate, events, deleted, correlation_id).await
    }

    async fn commit(
        &self,
        aggregate: A,
        events: Vec<A::Event>,
        deleted: bool,
        correlation_id: Uuid,
    ) -> DomainResult<CommandOutcome> {
        let aggregate_id = aggregate.id();
        let version = aggregate.version();
        let event_count = events.len();
        let is_new = version == event_count as i64;

        let mut uow = UnitOfWork::new(self.repository.clone(), self.dispatcher.clone())
            .with_correlation_id(correlation_id);
        if let Some(metrics) = &self.metrics {
            uow = uow.with_metrics(metrics.clone());
        }

        if deleted {
            uow.register_deleted(aggregate, events)?;
        } else if is_new {
            uow.register_new(aggregate, events)?;
        } else {
            uow.register_updated(aggregate, events)?;
        }

        let dispatch = uow.commit().await?;
        Ok(CommandOutcome {
            aggregate_id,
            version,
            events: event_count,
            dispatch,
        })
    }

    /// Count the rules behind a rejected command
    pub fn record_failure(&self, error: &DomainError) {
        if let (Some(metrics), DomainError::RuleViolation(violation)) = (&self.metrics, error) {
            metrics.record_rule_violations(violation.broken_rules());
        }
    }
}
