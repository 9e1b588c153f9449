//! Account domain core: value objects, business rules, the Customer and
//! MfaMethod aggregates, specifications and the persistence contracts they
//! depend on, with Scylla, Redpanda and Prometheus adapters.

pub mod config;
pub mod domain;
pub mod messaging;
pub mod metrics;
pub mod seedwork;
pub mod utils;
