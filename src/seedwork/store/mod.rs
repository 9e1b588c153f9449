// ============================================================================
// Store - Persistence Contracts and Adapters
// ============================================================================
//
// - repository: the contract the domain depends on
// - unit_of_work: save-then-dispatch over one repository
// - executor: load → execute → commit with conflict retries
// - in_memory / scylla: repository implementations
//
// ============================================================================

pub mod executor;
pub mod in_memory;
pub mod repository;
pub mod scylla;
pub mod unit_of_work;

#[cfg(test)]
pub(crate) mod test_support;

pub use executor::{CommandExecutor, CommandOutcome};
pub use in_memory::InMemoryRepository;
pub use repository::{Page, Repository};
pub use self::scylla::{ensure_snapshot_schema, ScyllaRepository};
pub use unit_of_work::{ChangeKind, DispatchReport, UnitOfWork};
