use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::seedwork::core::{AggregateRoot, DomainError, DomainResult, Entity, Queryable, Specification};
use super::repository::{Page, Repository};

// ============================================================================
// In-Memory Repository
// ============================================================================
//
// Reference implementation of the repository contract. Used by tests and by
// local runs without a database. The version check and the write happen under
// one write lock, which makes `update` a true compare-and-swap.
//
// ============================================================================

pub struct InMemoryRepository<A> {
    items: RwLock<HashMap<Uuid, A>>,
}

impl<A> InMemoryRepository<A> {
    pub fn new() -> Self {
        Self {
            items: RwLock::new(HashMap::new()),
        }
    }

    pub async fn len(&self) -> usize {
        self.items.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.items.read().await.is_empty()
    }
}

impl<A> Default for InMemoryRepository<A> {
    fn default() -> Self {
        Self::new()
    }
}

impl<A: AggregateRoot + Clone> InMemoryRepository<A> {
    async fn compare_and_swap(&self, aggregate: &A, expected_version: i64) -> DomainResult<()> {
        let mut items = self.items.write().await;

        let stored = items.get(&aggregate.id()).ok_or(DomainError::NotFound {
            aggregate_type: A::AGGREGATE_TYPE,
            id: aggregate.id(),
        })?;

        if stored.version() != expected_version {
            return Err(DomainError::ConcurrencyConflict {
                aggregate_type: A::AGGREGATE_TYPE,
                aggregate_id: aggregate.id(),
                expected: expected_version,
                actual: stored.version(),
            });
        }

        items.insert(aggregate.id(), aggregate.clone());
        Ok(())
    }
}

#[async_trait]
impl<A> Repository<A> for InMemoryRepository<A>
where
    A: AggregateRoot + Queryable + Clone + 'static,
{
    async fn get_by_id(&self, id: Uuid) -> DomainResult<Option<A>> {
        Ok(self.items.read().await.get(&id).cloned())
    }

    async fn find(&self, spec: &Specification<A>) -> DomainResult<Vec<A>> {
        let items = self.items.read().await;
        Ok(spec.apply(items.values().cloned()))
    }

    async fn find_paged(&self, spec: &Specification<A>) -> DomainResult<Page<A>> {
        let items = self.items.read().await;
        let (page, total_count) = spec.apply_counted(items.values().cloned());

        Ok(Page {
            items: page,
            total_count,
            skip: spec.skip(),
            take: spec.take(),
        })
    }

    async fn count(&self, spec: &Specification<A>) -> DomainResult<usize> {
        let items = self.items.read().await;
        Ok(items.values().filter(|item| spec.is_satisfied_by(item)).count())
    }

    async fn add(&self, aggregate: &A) -> DomainResult<()> {
        let mut items = self.items.write().await;

        if let Some(existing) = items.get(&aggregate.id()) {
            return Err(DomainError::ConcurrencyConflict {
                aggregate_type: A::AGGREGATE_TYPE,
                aggregate_id: aggregate.id(),
                expected: 0,
                actual: existing.version(),
            });
        }

        items.insert(aggregate.id(), aggregate.clone());
        Ok(())
    }

    async fn update(&self, aggregate: &A, expected_version: i64) -> DomainResult<()> {
        self.compare_and_swap(aggregate, expected_version).await
    }

    async fn delete(&self, aggregate: &A, expected_version: i64) -> DomainResult<()> {
        if !aggregate.is_deleted() {
            return Err(DomainError::invalid_operation(format!(
                "{} {} must be marked deleted before it is persisted as deleted",
                A::AGGREGATE_TYPE,
                aggregate.id()
            )));
        }
        self.compare_and_swap(aggregate, expected_version).await
    }
}
