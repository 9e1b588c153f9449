use async_trait::async_trait;
use serde::Serialize;
use uuid::Uuid;

use crate::seedwork::core::{AggregateRoot, DomainResult, Specification};

// ============================================================================
// Repository Contract
// ============================================================================
//
// The persistence-facing interface the domain core depends on.
//
// Concurrency: `update`/`delete` are compare-and-swap on the version the
// aggregate had when it was loaded (`expected_version`). A mismatch must
// surface as DomainError::ConcurrencyConflict, never as a rule violation.
//
// Deletion is soft: `delete` persists an aggregate already flagged deleted.
//
// ============================================================================

/// One page of query results
#[derive(Debug, Clone, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    /// Matches before paging was applied
    pub total_count: usize,
    pub skip: usize,
    pub take: Option<usize>,
}

impl<T> Page<T> {
    pub fn has_more(&self) -> bool {
        self.skip + self.items.len() < self.total_count
    }
}

#[async_trait]
pub trait Repository<A: AggregateRoot>: Send + Sync {
    async fn get_by_id(&self, id: Uuid) -> DomainResult<Option<A>>;

    async fn find(&self, spec: &Specification<A>) -> DomainResult<Vec<A>>;

    async fn find_paged(&self, spec: &Specification<A>) -> DomainResult<Page<A>>;

    async fn count(&self, spec: &Specification<A>) -> DomainResult<usize>;

    async fn exists(&self, spec: &Specification<A>) -> DomainResult<bool> {
        Ok(self.count(spec).await? > 0)
    }

    /// Insert a new aggregate; fails with a conflict if the id already exists
    async fn add(&self, aggregate: &A) -> DomainResult<()>;

    /// Replace the stored state if it is still at `expected_version`
    async fn update(&self, aggregate: &A, expected_version: i64) -> DomainResult<()>;

    /// Persist a soft-deleted aggregate (same concurrency check as `update`)
    async fn delete(&self, aggregate: &A, expected_version: i64) -> DomainResult<()>;
}
