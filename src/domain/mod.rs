// ============================================================================
// Domain Layer - Business Logic
// ============================================================================
//
// Shared value objects live in `value_objects`. Each aggregate has its own
// subdirectory with:
// - Events
// - Commands
// - Aggregate implementation
// - Specifications
// - Command handler
//
// Generic building blocks (rules, specifications, stores) are in seedwork.
//
// ============================================================================

pub mod customer;
pub mod mfa;
pub mod value_objects;
