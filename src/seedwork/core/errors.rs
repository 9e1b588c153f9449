use uuid::Uuid;

use crate::seedwork::rules::BusinessRuleViolation;

// ============================================================================
// Domain Error Taxonomy
// ============================================================================
//
// - Validation: value object / input guard failures (raised at construction)
// - RuleViolation: one or more business rules broken (recoverable, user-facing)
// - InvalidOperation: illegal state transition (caller bug)
// - ConcurrencyConflict: stale version on save (retry by re-reading)
// - NotFound / Storage: persistence collaborators
//
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum DomainError {
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error(transparent)]
    RuleViolation(#[from] BusinessRuleViolation),

    #[error("Invalid operation: {0}")]
    InvalidOperation(String),

    #[error(
        "Concurrency conflict on {aggregate_type} {aggregate_id}: expected version {expected}, but current is {actual}"
    )]
    ConcurrencyConflict {
        aggregate_type: &'static str,
        aggregate_id: Uuid,
        expected: i64,
        actual: i64,
    },

    #[error("{aggregate_type} not found: {id}")]
    NotFound {
        aggregate_type: &'static str,
        id: Uuid,
    },

    #[error(transparent)]
    Storage(#[from] anyhow::Error),
}

pub type DomainResult<T> = Result<T, DomainError>;

impl DomainError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn invalid_operation(message: impl Into<String>) -> Self {
        Self::InvalidOperation(message.into())
    }

    /// Stable code for converting domain failures at the application boundary
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::RuleViolation(_) => "BUSINESS_RULE_VIOLATION",
            Self::InvalidOperation(_) => "INVALID_OPERATION",
            Self::ConcurrencyConflict { .. } => "CONCURRENCY_CONFLICT",
            Self::NotFound { .. } => "NOT_FOUND",
            Self::Storage(_) => "STORAGE_ERROR",
        }
    }

    pub fn is_concurrency_conflict(&self) -> bool {
        matches!(self, Self::ConcurrencyConflict { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes_are_distinct_for_conflicts_and_rule_violations() {
        let conflict = DomainError::ConcurrencyConflict {
            aggregate_type: "Customer",
            aggregate_id: Uuid::new_v4(),
            expected: 3,
            actual: 4,
        };
        let violation = DomainError::from(BusinessRuleViolation::new("Customer must be active"));

        assert_eq!(conflict.error_code(), "CONCURRENCY_CONFLICT");
        assert_eq!(violation.error_code(), "BUSINESS_RULE_VIOLATION");
        assert!(conflict.is_concurrency_conflict());
        assert!(!violation.is_concurrency_conflict());
    }

    #[test]
    fn test_rule_violation_displays_its_message() {
        let err = DomainError::from(BusinessRuleViolation::new("Customer must be verified"));
        assert_eq!(err.to_string(), "Customer must be verified");
    }

    #[test]
    fn test_conflict_message_mentions_versions() {
        let err = DomainError::ConcurrencyConflict {
            aggregate_type: "Customer",
            aggregate_id: Uuid::nil(),
            expected: 2,
            actual: 5,
        };
        let message = err.to_string();
        assert!(message.contains("expected version 2"));
        assert!(message.contains("current is 5"));
    }
}
