pub mod dispatcher;
pub mod redpanda;

pub use dispatcher::{DomainEventDispatcher, DomainEventHandler, InProcessDispatcher, LoggingEventHandler};
pub use redpanda::{RedpandaClient, RedpandaEventPublisher};
