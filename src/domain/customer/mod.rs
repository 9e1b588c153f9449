// ============================================================================
// Customer Domain - Business Logic for Customer Aggregate
// ============================================================================
//
// This module contains ALL Customer-specific code:
// - Status (CustomerStatus lifecycle)
// - Events (CustomerRegistered, CustomerStatusChanged, ...)
// - Commands (RegisterCustomer, CustomerCommand)
// - Rules, rule sets per operation and reusable specifications
// - Aggregate (Customer with business logic)
// - Command Handler (CustomerCommandHandler)
//
// Shared value objects (Email, PhoneNumber, ...) live in domain::value_objects.
//
// ============================================================================

pub mod value_objects;
pub mod events;
pub mod commands;
pub mod rules;
pub mod rules_factory;
pub mod specifications;
pub mod aggregate;
pub mod command_handler;

#[cfg(test)]
pub(crate) mod test_support;

// Re-export for convenience
pub use value_objects::*;
pub use events::*;
pub use commands::*;
pub use rules::*;
pub use rules_factory::{CustomerBusinessRulesFactory, CustomerOperation};
pub use specifications::CustomerSpecifications;
pub use aggregate::Customer;
pub use command_handler::CustomerCommandHandler;
