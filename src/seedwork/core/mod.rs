// ============================================================================
// Seedwork Core - Generic Domain Abstractions
// ============================================================================
//
// This module contains GENERIC, reusable domain building blocks
// that work with ANY aggregate.
//
// Key Principles:
// - No domain-specific code (no Customer, MfaMethod, etc.)
// - Generic over aggregate types
// - Reusable across all aggregates
//
// ============================================================================

pub mod aggregate;
pub mod entity;
pub mod errors;
pub mod event;
pub mod specification;

// Re-export core types for convenience
pub use aggregate::{AggregateRoot, DomainCommand};
pub use entity::{Entity, EntityMetadata};
pub use errors::{DomainError, DomainResult};
pub use event::{DomainEvent, EventEnvelope, serialize_event, deserialize_event};
pub use specification::{Criteria, FieldValue, Queryable, Specification};
