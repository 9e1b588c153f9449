// ============================================================================
// Seedwork - Domain Building Blocks
// ============================================================================
//
// Generic, reusable domain infrastructure.
// Domain-specific code is in src/domain/
//
// ============================================================================

// Core abstractions (GENERIC - works with any aggregate)
pub mod core;
pub mod rules;
pub mod store;

// Re-export core infrastructure
pub use self::core::*;
pub use rules::*;
pub use store::*;
