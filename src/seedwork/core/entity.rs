use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ============================================================================
// Entity Metadata - Identity, Lifecycle and Version
// ============================================================================
//
// Embedded in every aggregate instead of inheriting from a base class.
// Only `record_change` moves the version forward, and it is called exactly
// once per applied domain event (see AggregateRoot::apply).
//
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityMetadata {
    id: Uuid,
    created_at: DateTime<Utc>,
    updated_at: Option<DateTime<Utc>>,
    is_deleted: bool,
    deleted_at: Option<DateTime<Utc>>,
    deleted_by: Option<String>,
    version: i64,
}

impl EntityMetadata {
    pub fn new(id: Uuid, created_at: DateTime<Utc>) -> Self {
        Self {
            id,
            created_at,
            updated_at: None,
            is_deleted: false,
            deleted_at: None,
            deleted_by: None,
            version: 0,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> Option<DateTime<Utc>> {
        self.updated_at
    }

    pub fn is_deleted(&self) -> bool {
        self.is_deleted
    }

    pub fn deleted_at(&self) -> Option<DateTime<Utc>> {
        self.deleted_at
    }

    pub fn deleted_by(&self) -> Option<&str> {
        self.deleted_by.as_deref()
    }

    pub fn version(&self) -> i64 {
        self.version
    }

    /// Stamp a state change and advance the optimistic-concurrency version
    pub(crate) fn record_change(&mut self, at: DateTime<Utc>) {
        self.updated_at = Some(at);
        self.version += 1;
    }

    /// Flag as deleted; rows are never physically removed
    pub(crate) fn mark_deleted(&mut self, by: impl Into<String>, at: DateTime<Utc>) {
        self.is_deleted = true;
        self.deleted_at = Some(at);
        self.deleted_by = Some(by.into());
    }
}

/// Anything with identity. Equality of entities is equality of ids.
pub trait Entity {
    fn metadata(&self) -> &EntityMetadata;

    fn id(&self) -> Uuid {
        self.metadata().id()
    }

    fn version(&self) -> i64 {
        self.metadata().version()
    }

    fn is_deleted(&self) -> bool {
        self.metadata().is_deleted()
    }

    fn same_identity_as(&self, other: &Self) -> bool
    where
        Self: Sized,
    {
        self.id() == other.id()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_metadata_starts_at_version_zero() {
        let now = Utc::now();
        let meta = EntityMetadata::new(Uuid::now_v7(), now);

        assert_eq!(meta.version(), 0);
        assert_eq!(meta.created_at(), now);
        assert!(meta.updated_at().is_none());
        assert!(!meta.is_deleted());
    }

    #[test]
    fn test_record_change_bumps_version_and_keeps_created_at() {
        let created = Utc::now();
        let mut meta = EntityMetadata::new(Uuid::now_v7(), created);

        let later = created + chrono::Duration::minutes(5);
        meta.record_change(later);
        meta.record_change(later);

        assert_eq!(meta.version(), 2);
        assert_eq!(meta.created_at(), created);
        assert_eq!(meta.updated_at(), Some(later));
    }

    #[test]
    fn test_mark_deleted_sets_soft_delete_markers() {
        let now = Utc::now();
        let mut meta = EntityMetadata::new(Uuid::now_v7(), now);

        meta.mark_deleted("admin", now);

        assert!(meta.is_deleted());
        assert_eq!(meta.deleted_by(), Some("admin"));
        assert_eq!(meta.deleted_at(), Some(now));
        // Deletion alone does not move the version; the applied event does
        assert_eq!(meta.version(), 0);
    }
}
