//! The event record, its context-mapping side table, and the bus mechanics
//! the store uses to fan `EventRecorded` notifications out to subscribers.

mod bus;
mod context_mapping;
mod event;
mod in_memory_bus;

pub use bus::{EventBus, Subscription};
pub use context_mapping::ContextMapping;
pub use event::Event;
pub use in_memory_bus::{InMemoryBusError, InMemoryEventBus};
